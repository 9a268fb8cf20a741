//! The [`Client`]: registration, loading and lookup behind one state machine.
//!
//! Registration and loading are serialized by a compare-and-swap on the
//! state field; a conflicting call fails immediately with
//! [`ErrorKind::IllegalState`](crate::ErrorKind::IllegalState). Readers never
//! touch the state and are served from the last published snapshot.

use std::{
    collections::HashMap,
    fmt::{Display, Formatter},
    panic::Location,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU8, Ordering},
    },
};

use arc_swap::ArcSwapOption;
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::Error,
    formats::DocumentFormat,
    locale::Locale,
    metadata::extract_locale_name,
    node::MergeContext,
    sentinel::TranslationFailure,
    source::{SourceDescriptor, SourceInput, SourceRegistry},
    types::{Args, Tree},
};

/// Lifecycle state of a [`Client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum State {
    /// Idle; sources may be registered, and loaded if some are pending.
    Standby = 0,
    /// A registration is running.
    SourcePending = 1,
    /// A load is running.
    LoadPending = 2,
    /// Translations are loaded and nothing new is pending.
    Ready = 10,
}

impl State {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(State::Standby),
            1 => Some(State::SourcePending),
            2 => Some(State::LoadPending),
            10 => Some(State::Ready),
            _ => None,
        }
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Standby => write!(f, "standby"),
            State::SourcePending => write!(f, "registering sources"),
            State::LoadPending => write!(f, "loading"),
            State::Ready => write!(f, "ready"),
        }
    }
}

/// Counts describing the loaded translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Stats {
    pub locales: usize,
    pub phrases: u64,
    pub sources: usize,
}

/// Everything one successful load produced, published as a single unit.
#[derive(Debug)]
struct Catalog {
    locales: HashMap<String, Arc<Locale>>,
    sources: Vec<SourceDescriptor>,
    phrases: u64,
}

impl Catalog {
    fn stats(&self) -> Stats {
        Stats {
            locales: self.locales.len(),
            phrases: self.phrases,
            sources: self.sources.len(),
        }
    }
}

/// Holds the state between entry and exit of a registration or load and
/// stores `settle` when dropped.
struct Transition<'a> {
    state: &'a AtomicU8,
    settle: State,
}

impl Drop for Transition<'_> {
    fn drop(&mut self) {
        self.state.store(self.settle as u8, Ordering::Release);
    }
}

/// A locale-phrase store.
///
/// ```rust
/// use phrasebook::{Args, Client};
///
/// let client = Client::new();
/// client.register([
///     &b"__metadata__:\n  locale: en_US\ngreeting: Hello, {{name}}!"[..],
///     &b"greeting = \"Hallo, {{name}}!\"\n[__metadata__]\nlocale = \"de_DE\""[..],
/// ])?;
/// client.commit()?;
///
/// let args = Args::new().with("name", "Frank");
/// assert_eq!(client.translate("de_DE", "greeting", Some(&args)), "Hallo, Frank!");
/// assert_eq!(
///     client.translate("fr_FR", "greeting", None),
///     "i18nErr: LocaleIsNil. Key: greeting"
/// );
/// # Ok::<(), phrasebook::Error>(())
/// ```
#[derive(Debug)]
pub struct Client {
    state: AtomicU8,
    overwrite_existing_key: AtomicBool,
    empty_locale_name_as_none: AtomicBool,
    locale_not_found_as_none: AtomicBool,
    pending: Mutex<SourceRegistry>,
    live: ArcSwapOption<Catalog>,
    default_locale: ArcSwapOption<Locale>,
}

impl Default for Client {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            state: AtomicU8::new(State::Standby as u8),
            overwrite_existing_key: AtomicBool::new(config.overwrite_existing_key),
            empty_locale_name_as_none: AtomicBool::new(config.empty_locale_name_as_none),
            locale_not_found_as_none: AtomicBool::new(config.locale_not_found_as_none),
            pending: Mutex::new(SourceRegistry::new()),
            live: ArcSwapOption::empty(),
            default_locale: ArcSwapOption::empty(),
        }
    }

    pub fn config(&self) -> Config {
        Config {
            overwrite_existing_key: self.overwrite_existing_key.load(Ordering::Relaxed),
            empty_locale_name_as_none: self.empty_locale_name_as_none.load(Ordering::Relaxed),
            locale_not_found_as_none: self.locale_not_found_as_none.load(Ordering::Relaxed),
        }
    }

    /// Replaces the configuration.
    ///
    /// Lookups see the new switches immediately; a running load keeps the
    /// overwrite setting it started with.
    pub fn set_config(&self, config: Config) {
        self.overwrite_existing_key
            .store(config.overwrite_existing_key, Ordering::Relaxed);
        self.empty_locale_name_as_none
            .store(config.empty_locale_name_as_none, Ordering::Relaxed);
        self.locale_not_found_as_none
            .store(config.locale_not_found_as_none, Ordering::Relaxed);
    }

    pub fn state(&self) -> State {
        // Only `State` discriminants are ever stored.
        State::from_u8(self.state.load(Ordering::Acquire)).unwrap_or(State::Standby)
    }

    /// Validates `inputs` and queues them for the next [`Client::commit`].
    ///
    /// Accepts paths (files or directories) and byte buffers, see
    /// [`SourceInput`]. Buffers are named after the caller's location.
    /// Either the whole batch is queued or none of it.
    #[track_caller]
    pub fn register<I>(&self, inputs: I) -> Result<usize, Error>
    where
        I: IntoIterator,
        I::Item: Into<SourceInput>,
    {
        let caller = Location::caller();
        let mut transition = self.begin(&[State::Standby, State::Ready], State::SourcePending)?;
        let mut pending = self.lock_pending()?;
        if !pending.is_empty() {
            transition.settle = State::Standby;
        }

        let added = pending.register_from(inputs, caller)?;
        transition.settle = State::Standby;
        debug!(added, pending = pending.len(), "sources registered");
        Ok(added)
    }

    /// Decodes and merges every pending source, then publishes the result.
    ///
    /// The new translations replace the previous ones as a whole and the
    /// default locale is unset. On any failure the pending sources are
    /// dropped and the previous translations stay in place.
    pub fn commit(&self) -> Result<Stats, Error> {
        if self.state() == State::Ready {
            return Err(Error::illegal_state(
                "no sources were registered since the last load",
                State::Ready,
            ));
        }
        let mut transition = self.begin(&[State::Standby], State::LoadPending)?;
        let overwrite = self.overwrite_existing_key.load(Ordering::Relaxed);

        let mut sources = self.lock_pending()?.flush();
        if sources.is_empty() {
            return Err(Error::illegal_state(
                "there are no registered sources",
                State::LoadPending,
            ));
        }

        let (locales, phrases) = match build_locales(&mut sources, overwrite) {
            Ok(built) => built,
            Err(err) => {
                warn!(error = %err, "load failed, previous translations are kept");
                return Err(err);
            }
        };

        for source in &mut sources {
            source.release_content();
        }
        let catalog = Catalog {
            locales: locales
                .into_iter()
                .map(|(name, locale)| (name, Arc::new(locale)))
                .collect(),
            sources,
            phrases,
        };
        let stats = catalog.stats();

        self.live.store(Some(Arc::new(catalog)));
        self.default_locale.store(None);
        transition.settle = State::Ready;

        info!(
            locales = stats.locales,
            phrases = stats.phrases,
            sources = stats.sources,
            "translations loaded"
        );
        Ok(stats)
    }

    /// The loaded locale called `name`, or the default locale.
    ///
    /// The default is returned for an empty or unknown name unless
    /// [`Config::empty_locale_name_as_none`] or
    /// [`Config::locale_not_found_as_none`] says otherwise.
    pub fn lookup(&self, name: &str) -> Option<Arc<Locale>> {
        if name.is_empty() {
            if self.empty_locale_name_as_none.load(Ordering::Relaxed) {
                return None;
            }
            return self.default_locale.load_full();
        }

        let found = self
            .live
            .load_full()
            .and_then(|catalog| catalog.locales.get(name).cloned());
        if found.is_some() || self.locale_not_found_as_none.load(Ordering::Relaxed) {
            return found;
        }
        self.default_locale.load_full()
    }

    /// Translates `key` for `locale`, substituting `args` into the phrase.
    ///
    /// Never fails: problems are reported as `i18nErr: ...` sentinel text.
    pub fn translate(&self, locale: &str, key: &str, args: Option<&Args>) -> String {
        match self.lookup(locale) {
            Some(locale) => locale.translate(key, args),
            None => TranslationFailure::LocaleIsNil.sentinel(key),
        }
    }

    /// Makes the loaded locale `name` the fallback of [`Client::lookup`].
    pub fn mark_default(&self, name: &str) -> Result<(), Error> {
        let locale = self
            .live
            .load_full()
            .and_then(|catalog| catalog.locales.get(name).cloned())
            .ok_or_else(|| Error::LocaleNotFound(name.to_string()))?;
        self.default_locale.store(Some(locale));
        debug!(locale = name, "default locale marked");
        Ok(())
    }

    pub fn clear_default(&self) {
        self.default_locale.store(None);
    }

    pub fn default_locale(&self) -> Option<Arc<Locale>> {
        self.default_locale.load_full()
    }

    /// Names of the loaded locales, sorted.
    pub fn locale_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .live
            .load()
            .iter()
            .flat_map(|catalog| catalog.locales.keys().cloned())
            .collect();
        names.sort();
        names
    }

    /// Descriptors of the sources behind the loaded translations.
    pub fn sources(&self) -> Vec<SourceDescriptor> {
        self.live
            .load()
            .iter()
            .flat_map(|catalog| catalog.sources.iter().cloned())
            .collect()
    }

    pub fn stats(&self) -> Stats {
        self.live
            .load_full()
            .map(|catalog| catalog.stats())
            .unwrap_or_default()
    }

    fn begin(&self, from: &[State], to: State) -> Result<Transition<'_>, Error> {
        let current = self.state();
        if !from.contains(&current) {
            return Err(Error::illegal_state(
                format!("cannot start {} now", to),
                current,
            ));
        }
        self.state
            .compare_exchange(
                current as u8,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|actual| {
                Error::illegal_state(
                    format!("cannot start {} now", to),
                    State::from_u8(actual).unwrap_or(current),
                )
            })?;

        let settle = if self.live.load().is_some() {
            State::Ready
        } else {
            State::Standby
        };
        Ok(Transition {
            state: &self.state,
            settle,
        })
    }

    fn lock_pending(&self) -> Result<MutexGuard<'_, SourceRegistry>, Error> {
        self.pending
            .try_lock()
            .ok_or_else(|| Error::Internal("pending sources are locked outside a transition".to_string()))
    }
}

/// Decodes and merges `sources` into a fresh set of locales.
fn build_locales(
    sources: &mut [SourceDescriptor],
    overwrite: bool,
) -> Result<(HashMap<String, Locale>, u64), Error> {
    let mut locales: HashMap<String, Locale> = HashMap::new();

    for index in 0..sources.len() {
        let (name, tree) = prepare_source(&mut sources[index])
            .map_err(|err| Error::in_source(sources[index].origin(), err))?;

        let ctx = MergeContext {
            sources: &*sources,
            source_index: index,
            overwrite,
        };
        let locale = locales
            .entry(name.clone())
            .or_insert_with(|| Locale::new(name.clone()));
        let added = locale
            .merge(tree, &ctx)
            .map_err(|err| Error::in_source(sources[index].origin(), err))?;
        debug!(origin = sources[index].origin(), locale = %name, added, "source merged");
    }

    let phrases: u64 = locales.values().map(Locale::phrase_count).sum();
    if phrases == 0 {
        return Err(Error::NoPhrases);
    }
    Ok((locales, phrases))
}

/// Decodes one source and resolves its locale name.
fn prepare_source(source: &mut SourceDescriptor) -> Result<(String, Tree), Error> {
    let content = source
        .content()
        .ok_or_else(|| Error::Internal("source content was already released".to_string()))?;
    let (format, mut tree) = match source.kind().format() {
        Some(format) => (format, format.decode(content)?),
        None => decode_unknown(content)?,
    };
    source.resolve_format(format);

    if tree.is_empty() {
        return Err(Error::InvalidDocument(format!(
            "valid {} but no content",
            format
        )));
    }

    let origin_path = source.kind().is_file().then(|| Path::new(source.origin()));
    let name = extract_locale_name(&mut tree, origin_path)?;
    source.set_locale_name(name.clone());
    debug!(origin = source.origin(), kind = %source.kind(), locale = %name, "source decoded");
    Ok((name, tree))
}

/// Tries every format in turn; the first one that decodes wins.
fn decode_unknown(content: &[u8]) -> Result<(DocumentFormat, Tree), Error> {
    let mut failures = Vec::new();
    for format in DocumentFormat::ALL {
        match format.decode(content) {
            Ok(tree) => return Ok((format, tree)),
            Err(err) => failures.push(format!("{}: {}", format, err)),
        }
    }
    Err(Error::InvalidDocument(format!(
        "content matches no supported format ({})",
        failures.join("; ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::source::SourceKind;

    const EN: &[u8] = b"__metadata__:\n  locale: en_US\na:\n  b: Hello, {{name}}!";
    const ZH: &[u8] = "[__metadata__]\nlocale = \"zh_CN\"\n[a]\nb = \"{{name}}, 你好!\"".as_bytes();

    #[test]
    fn test_state_flow() {
        let client = Client::new();
        assert_eq!(client.state(), State::Standby);

        client.register([EN]).unwrap();
        assert_eq!(client.state(), State::Standby);

        client.commit().unwrap();
        assert_eq!(client.state(), State::Ready);

        let err = client.commit().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalState);
        assert_eq!(client.state(), State::Ready);
    }

    #[test]
    fn test_commit_without_sources() {
        let client = Client::new();
        let err = client.commit().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalState);
        assert_eq!(client.state(), State::Standby);
    }

    #[test]
    fn test_busy_state_fails_fast() {
        let client = Client::new();
        client
            .state
            .store(State::SourcePending as u8, Ordering::Release);
        let err = client.register([EN]).unwrap_err();
        assert!(matches!(
            err,
            Error::IllegalState {
                state: State::SourcePending,
                ..
            }
        ));

        client.state.store(State::LoadPending as u8, Ordering::Release);
        assert_eq!(client.commit().unwrap_err().kind(), ErrorKind::IllegalState);
        assert_eq!(client.state(), State::LoadPending);
    }

    #[test]
    fn test_contended_registry_is_internal_error() {
        let client = Client::new();
        let guard = client.pending.lock();
        let err = client.register([EN]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalError);
        drop(guard);
        assert_eq!(client.state(), State::Standby);
    }

    #[test]
    fn test_failed_register_after_load_returns_to_ready() {
        let client = Client::new();
        client.register([EN]).unwrap();
        client.commit().unwrap();

        let err = client.register([Vec::<u8>::new()]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalArgument);
        assert_eq!(client.state(), State::Ready);
    }

    #[test]
    fn test_failed_register_keeps_earlier_pending() {
        let client = Client::new();
        client.register([EN]).unwrap();
        assert!(client.register([EN]).is_err());
        assert_eq!(client.state(), State::Standby);
        assert_eq!(client.commit().unwrap().sources, 1);
    }

    #[test]
    fn test_unknown_content_is_resolved() {
        let client = Client::new();
        client.register([EN, ZH]).unwrap();
        let stats = client.commit().unwrap();
        assert_eq!(
            stats,
            Stats {
                locales: 2,
                phrases: 2,
                sources: 2
            }
        );

        let sources = client.sources();
        assert_eq!(sources[0].kind(), SourceKind::ContentYaml);
        assert_eq!(sources[1].kind(), SourceKind::ContentToml);
        assert_eq!(sources[1].locale_name(), Some("zh_CN"));
        assert!(sources.iter().all(|source| source.content().is_none()));
        assert_eq!(client.locale_names(), vec!["en_US", "zh_CN"]);
    }

    #[test]
    fn test_undecodable_content() {
        let client = Client::new();
        client.register([b"key: [unclosed\n= nope"]).unwrap();
        let err = client.commit().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalFormat);
        assert!(matches!(err, Error::Source { .. }));
        assert_eq!(client.state(), State::Standby);
    }

    #[test]
    fn test_metadata_only_document_has_no_phrases() {
        let client = Client::new();
        client.register([b"__metadata__:\n  locale: en_US"]).unwrap();
        let err = client.commit().unwrap_err();
        assert!(matches!(err, Error::NoPhrases));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_lookup_fallbacks() {
        let client = Client::new();
        client.register([EN, ZH]).unwrap();
        client.commit().unwrap();

        assert!(client.lookup("").is_none());
        assert!(client.lookup("ru_RU").is_none());

        client.mark_default("en_US").unwrap();
        assert_eq!(client.lookup("").map(|l| l.name().to_string()).as_deref(), Some("en_US"));
        assert_eq!(client.lookup("ru_RU").map(|l| l.name().to_string()).as_deref(), Some("en_US"));
        assert_eq!(client.lookup("zh_CN").map(|l| l.name().to_string()).as_deref(), Some("zh_CN"));

        let name = |locale: Option<Arc<Locale>>| locale.map(|l| l.name().to_string());

        client.set_config(Config::new().with_empty_locale_name_as_none(true));
        assert!(client.lookup("").is_none());
        assert_eq!(name(client.lookup("ru_RU")).as_deref(), Some("en_US"));

        client.set_config(Config::new().with_locale_not_found_as_none(true));
        assert_eq!(name(client.lookup("")).as_deref(), Some("en_US"));
        assert!(client.lookup("ru_RU").is_none());
        assert_eq!(name(client.lookup("zh_CN")).as_deref(), Some("zh_CN"));

        client.set_config(
            Config::new()
                .with_empty_locale_name_as_none(true)
                .with_locale_not_found_as_none(true),
        );
        assert!(client.lookup("").is_none());
        assert!(client.lookup("ru_RU").is_none());

        client.set_config(Config::new());
        client.clear_default();
        assert!(client.default_locale().is_none());
        assert!(client.lookup("ru_RU").is_none());
    }

    #[test]
    fn test_mark_unknown_default() {
        let client = Client::new();
        let err = client.mark_default("en_US").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::new().with_overwrite_existing_key(true);
        let client = Client::with_config(config);
        assert_eq!(client.config(), config);
        assert_eq!(Client::new().stats(), Stats::default());
    }
}
