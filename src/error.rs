//! All error types for the phrasebook crate.
//!
//! These are returned from every fallible registration, decoding and load
//! operation. Translation lookups never return them; see [`crate::sentinel`].

use std::path::PathBuf;

use thiserror::Error;

use crate::client::State;

/// Coarse classification of an [`Error`].
///
/// Callers that only need to branch on the failure class should match on
/// [`Error::kind`] instead of the individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad caller input: empty or unusable source, empty key.
    IllegalArgument,
    /// Operation attempted from a disallowed state, or raced with another one.
    IllegalState,
    /// Malformed document, metadata, locale name or value type.
    IllegalFormat,
    /// Two or more locale-name declarations for one document.
    AmbiguousMetadata,
    /// Duplicate translation key without overwrite permission.
    AlreadyExists,
    /// I/O failure: unreadable file, directory scan failure.
    DataUnavailable,
    /// Nothing to serve: no phrases, or an unknown locale.
    NotFound,
    /// An invariant was violated; this is a bug.
    InternalError,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("two sources with the same content: `{first}` and `{second}`")]
    DuplicateSource { first: String, second: String },

    #[error("illegal state: {message} (current state: {state})")]
    IllegalState { message: String, state: State },

    #[error("I/O error at `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("directory nesting deeper than {limit} levels at `{}`", path.display())]
    DepthExceeded { path: PathBuf, limit: usize },

    #[error("YAML decode error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML decode error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("invalid value at `{key}`: {message}")]
    InvalidValue { key: String, message: String },

    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("invalid locale name `{0}`, expected `ll_CC`")]
    InvalidLocaleName(String),

    #[error("ambiguous metadata: {0}")]
    AmbiguousMetadata(String),

    #[error(
        "translation key `{key}` already exists (old value: {old_value:?}, new value: {new_value:?}, loaded from: {})",
        origins.join(", ")
    )]
    KeyExists {
        key: String,
        new_value: String,
        old_value: String,
        origins: Vec<String>,
    },

    #[error("sources were decoded but contain no translation phrases")]
    NoPhrases,

    #[error("locale `{0}` is not loaded")]
    LocaleNotFound(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("failed to load `{origin}`: {source}")]
    Source {
        origin: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wraps an error raised while loading one source so the source is named.
    pub fn in_source(origin: impl Into<String>, source: Error) -> Self {
        Error::Source {
            origin: origin.into(),
            source: Box::new(source),
        }
    }

    /// Creates a new illegal-state error.
    pub fn illegal_state(message: impl Into<String>, state: State) -> Self {
        Error::IllegalState {
            message: message.into(),
            state,
        }
    }

    /// Returns the failure class, looking through [`Error::Source`] wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) | Error::DuplicateSource { .. } => ErrorKind::IllegalArgument,
            Error::IllegalState { .. } => ErrorKind::IllegalState,
            Error::Io { .. } | Error::DepthExceeded { .. } => ErrorKind::DataUnavailable,
            Error::Yaml(_)
            | Error::Toml(_)
            | Error::InvalidDocument(_)
            | Error::InvalidValue { .. }
            | Error::InvalidMetadata(_)
            | Error::InvalidLocaleName(_) => ErrorKind::IllegalFormat,
            Error::AmbiguousMetadata(_) => ErrorKind::AmbiguousMetadata,
            Error::KeyExists { .. } => ErrorKind::AlreadyExists,
            Error::NoPhrases | Error::LocaleNotFound(_) => ErrorKind::NotFound,
            Error::Internal(_) => ErrorKind::InternalError,
            Error::Source { source, .. } => source.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_duplicate_source_names_both_origins() {
        let error = Error::DuplicateSource {
            first: "/a/en_US.yaml".to_string(),
            second: "/b/en_US.yaml".to_string(),
        };
        let display = error.to_string();
        assert!(display.contains("/a/en_US.yaml"));
        assert!(display.contains("/b/en_US.yaml"));
        assert_eq!(error.kind(), ErrorKind::IllegalArgument);
    }

    #[test]
    fn test_io_error() {
        let error = Error::Io {
            path: PathBuf::from("/missing.yaml"),
            source: io::Error::new(io::ErrorKind::NotFound, "File not found"),
        };
        assert!(error.to_string().contains("I/O error"));
        assert!(error.to_string().contains("/missing.yaml"));
        assert_eq!(error.kind(), ErrorKind::DataUnavailable);
    }

    #[test]
    fn test_depth_exceeded_is_data_unavailable() {
        let error = Error::DepthExceeded {
            path: PathBuf::from("/deep"),
            limit: 16,
        };
        assert!(error.to_string().contains("16"));
        assert_eq!(error.kind(), ErrorKind::DataUnavailable);
    }

    #[test]
    fn test_key_exists_reports_values_and_origins() {
        let error = Error::KeyExists {
            key: "a/b".to_string(),
            new_value: "new".to_string(),
            old_value: "old".to_string(),
            origins: vec!["first.yaml".to_string(), "second.yaml".to_string()],
        };
        let display = error.to_string();
        assert!(display.contains("`a/b`"));
        assert!(display.contains("\"old\""));
        assert!(display.contains("\"new\""));
        assert!(display.contains("first.yaml, second.yaml"));
        assert_eq!(error.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_illegal_state_mentions_state() {
        let error = Error::illegal_state("another load is running", State::LoadPending);
        assert!(error.to_string().contains("another load is running"));
        assert_eq!(error.kind(), ErrorKind::IllegalState);
    }

    #[test]
    fn test_source_wrapper_keeps_inner_kind() {
        let error = Error::in_source(
            "src/main.rs:10",
            Error::AmbiguousMetadata("two sections".to_string()),
        );
        assert!(error.to_string().contains("src/main.rs:10"));
        assert_eq!(error.kind(), ErrorKind::AmbiguousMetadata);
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_format_errors_share_kind() {
        let errors = vec![
            Error::InvalidDocument("test".to_string()),
            Error::InvalidMetadata("test".to_string()),
            Error::InvalidLocaleName("test".to_string()),
            Error::InvalidValue {
                key: "test".to_string(),
                message: "arrays are not allowed".to_string(),
            },
        ];

        for error in errors {
            assert_eq!(error.kind(), ErrorKind::IllegalFormat);
            assert!(error.to_string().contains("test"));
        }
    }

    #[test]
    fn test_not_found_kinds() {
        assert_eq!(Error::NoPhrases.kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::LocaleNotFound("ru_RU".to_string()).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_error_debug() {
        let error = Error::InvalidLocaleName("english".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("InvalidLocaleName"));
        assert!(debug.contains("english"));
    }
}
