//! Pending translation sources: files, directory trees and in-memory buffers.
//!
//! Registration only checks that inputs exist, are readable and carry a
//! supported extension. Document content is validated later, when the
//! sources are loaded.

use std::{
    fmt::{Display, Formatter},
    fs,
    panic::Location,
    path::{Component, Path, PathBuf},
};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{error::Error, formats::DocumentFormat};

/// How deep directory registration descends before giving up.
pub const MAX_SCAN_DEPTH: usize = 16;

/// One registration input.
///
/// Strings and paths name a file or directory; byte buffers are document
/// content of not yet known format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceInput {
    Path(PathBuf),
    Content(Vec<u8>),
}

impl From<&str> for SourceInput {
    fn from(path: &str) -> Self {
        SourceInput::Path(PathBuf::from(path))
    }
}

impl From<String> for SourceInput {
    fn from(path: String) -> Self {
        SourceInput::Path(PathBuf::from(path))
    }
}

impl From<&String> for SourceInput {
    fn from(path: &String) -> Self {
        SourceInput::Path(PathBuf::from(path))
    }
}

impl From<&Path> for SourceInput {
    fn from(path: &Path) -> Self {
        SourceInput::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for SourceInput {
    fn from(path: PathBuf) -> Self {
        SourceInput::Path(path)
    }
}

impl From<&PathBuf> for SourceInput {
    fn from(path: &PathBuf) -> Self {
        SourceInput::Path(path.clone())
    }
}

impl From<Vec<u8>> for SourceInput {
    fn from(content: Vec<u8>) -> Self {
        SourceInput::Content(content)
    }
}

impl From<&[u8]> for SourceInput {
    fn from(content: &[u8]) -> Self {
        SourceInput::Content(content.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for SourceInput {
    fn from(content: &[u8; N]) -> Self {
        SourceInput::Content(content.to_vec())
    }
}

/// What a [`SourceDescriptor`] holds and how it is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// A `.yml`/`.yaml` file.
    FileYaml,
    /// A `.toml` file.
    FileToml,
    /// An in-memory buffer whose format has not been resolved yet.
    Content,
    /// An in-memory buffer that decoded as YAML.
    ContentYaml,
    /// An in-memory buffer that decoded as TOML.
    ContentToml,
}

impl SourceKind {
    fn file(format: DocumentFormat) -> Self {
        match format {
            DocumentFormat::Yaml => SourceKind::FileYaml,
            DocumentFormat::Toml => SourceKind::FileToml,
        }
    }

    fn content(format: DocumentFormat) -> Self {
        match format {
            DocumentFormat::Yaml => SourceKind::ContentYaml,
            DocumentFormat::Toml => SourceKind::ContentToml,
        }
    }

    /// Whether the origin of this source is a filesystem path.
    pub fn is_file(&self) -> bool {
        matches!(self, SourceKind::FileYaml | SourceKind::FileToml)
    }

    /// The decoder for this source, `None` while the format is unresolved.
    pub fn format(&self) -> Option<DocumentFormat> {
        match self {
            SourceKind::FileYaml | SourceKind::ContentYaml => Some(DocumentFormat::Yaml),
            SourceKind::FileToml | SourceKind::ContentToml => Some(DocumentFormat::Toml),
            SourceKind::Content => None,
        }
    }
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::FileYaml => write!(f, "yaml file"),
            SourceKind::FileToml => write!(f, "toml file"),
            SourceKind::Content => write!(f, "content"),
            SourceKind::ContentYaml => write!(f, "yaml content"),
            SourceKind::ContentToml => write!(f, "toml content"),
        }
    }
}

/// One registered unit of input awaiting (or done with) loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    kind: SourceKind,
    origin: String,
    locale_name: Option<String>,
    content: Option<Vec<u8>>,
    content_hash: [u8; 32],
}

impl SourceDescriptor {
    fn new(kind: SourceKind, origin: String, content: Vec<u8>) -> Self {
        let content_hash = Sha256::digest(&content).into();
        Self {
            kind,
            origin,
            locale_name: None,
            content: Some(content),
            content_hash,
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Absolute file path, or the `file:line` of the registering call for buffers.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Locale this source declared, known once it has been loaded.
    pub fn locale_name(&self) -> Option<&str> {
        self.locale_name.as_deref()
    }

    /// Raw content, `None` once it has been released after a successful load.
    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }

    /// SHA-256 digest of the content.
    pub fn content_hash(&self) -> &[u8; 32] {
        &self.content_hash
    }

    pub(crate) fn resolve_format(&mut self, format: DocumentFormat) {
        if self.kind == SourceKind::Content {
            self.kind = SourceKind::content(format);
        }
    }

    pub(crate) fn set_locale_name(&mut self, name: String) {
        self.locale_name = Some(name);
    }

    pub(crate) fn release_content(&mut self) {
        self.content = None;
    }
}

/// Validated sources waiting for the next load.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    pending: Vec<SourceDescriptor>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[SourceDescriptor] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Validates `inputs` and appends them to the pending sources.
    ///
    /// Directories are scanned recursively; files with an unsupported (or no)
    /// extension are skipped. The whole batch is rejected if any input fails,
    /// if two sources share the same content (within the batch or with an
    /// already pending source), or if no source was produced at all.
    ///
    /// Returns the number of sources added.
    #[track_caller]
    pub fn register<I>(&mut self, inputs: I) -> Result<usize, Error>
    where
        I: IntoIterator,
        I::Item: Into<SourceInput>,
    {
        self.register_from(inputs, Location::caller())
    }

    pub(crate) fn register_from<I>(
        &mut self,
        inputs: I,
        caller: &Location<'_>,
    ) -> Result<usize, Error>
    where
        I: IntoIterator,
        I::Item: Into<SourceInput>,
    {
        let mut batch = Vec::new();
        let mut input_count = 0usize;

        for input in inputs {
            input_count += 1;
            match input.into() {
                SourceInput::Path(path) => scan_root(&mut batch, &path)?,
                SourceInput::Content(content) => {
                    let origin = format!("{}:{} (input {})", caller.file(), caller.line(), input_count);
                    if content.is_empty() {
                        return Err(Error::InvalidArgument(format!(
                            "empty content registered at {}",
                            origin
                        )));
                    }
                    debug!(%origin, bytes = content.len(), "registered content source");
                    batch.push(SourceDescriptor::new(SourceKind::Content, origin, content));
                }
            }
        }

        if input_count == 0 {
            return Err(Error::InvalidArgument("there are no sources".to_string()));
        }

        self.check_duplicates(&batch)?;

        if batch.is_empty() {
            return Err(Error::InvalidArgument(
                "there are no sources with a supported format".to_string(),
            ));
        }

        let added = batch.len();
        self.pending.append(&mut batch);
        Ok(added)
    }

    /// Returns and clears every pending source.
    pub fn flush(&mut self) -> Vec<SourceDescriptor> {
        std::mem::take(&mut self.pending)
    }

    fn check_duplicates(&self, batch: &[SourceDescriptor]) -> Result<(), Error> {
        for (i, source) in batch.iter().enumerate() {
            let duplicate = batch[i + 1..]
                .iter()
                .chain(self.pending.iter())
                .find(|other| other.content_hash == source.content_hash);
            if let Some(other) = duplicate {
                return Err(Error::DuplicateSource {
                    first: source.origin.clone(),
                    second: other.origin.clone(),
                });
            }
        }
        Ok(())
    }
}

fn scan_root(dest: &mut Vec<SourceDescriptor>, path: &Path) -> Result<(), Error> {
    let trimmed = match path.to_str() {
        Some(s) => PathBuf::from(s.trim()),
        None => path.to_path_buf(),
    };
    if trimmed.as_os_str().is_empty() {
        return Err(Error::InvalidArgument("source path is empty".to_string()));
    }

    let absolute = std::path::absolute(&trimmed).map_err(|err| {
        Error::Internal(format!(
            "cannot make `{}` absolute: {}",
            trimmed.display(),
            err
        ))
    })?;

    scan_path(dest, &normalize(&absolute), 0)
}

/// Drops `.` and folds `..` into its parent without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn scan_path(dest: &mut Vec<SourceDescriptor>, path: &Path, depth: usize) -> Result<(), Error> {
    let io_error = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(path).map_err(io_error)?;

    if !metadata.is_dir() {
        let Some(format) = DocumentFormat::from_path(path) else {
            debug!(path = %path.display(), "skipping file with unsupported extension");
            return Ok(());
        };
        let content = fs::read(path).map_err(io_error)?;
        debug!(path = %path.display(), %format, bytes = content.len(), "registered file source");
        dest.push(SourceDescriptor::new(
            SourceKind::file(format),
            path.display().to_string(),
            content,
        ));
        return Ok(());
    }

    if depth == MAX_SCAN_DEPTH {
        return Err(Error::DepthExceeded {
            path: path.to_path_buf(),
            limit: MAX_SCAN_DEPTH,
        });
    }

    let mut entries = fs::read_dir(path)
        .map_err(io_error)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error)?;
    entries.sort();

    for entry in entries {
        scan_path(dest, &entry, depth + 1)?;
    }

    Ok(())
}
