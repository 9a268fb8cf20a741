//! Lookup failures rendered as plain strings.
//!
//! Translation never fails loudly: every miss becomes a recognizable
//! `i18nErr: <class>. Key: <key>` text embedded in the caller's output.

use std::fmt::{Display, Formatter};

const SENTINEL_PREFIX: &str = "i18nErr: ";

/// Why a translation could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationFailure {
    /// No locale was found and no default applies.
    LocaleIsNil,
    /// The key is empty.
    KeyIsEmpty,
    /// The key has an empty `/` segment.
    KeyIsIncorrect,
    /// The key does not resolve to a phrase.
    NotFound,
}

impl TranslationFailure {
    /// The class name used in the sentinel string.
    pub fn class(&self) -> &'static str {
        match self {
            TranslationFailure::LocaleIsNil => "LocaleIsNil",
            TranslationFailure::KeyIsEmpty => "TranslationKeyIsEmpty",
            TranslationFailure::KeyIsIncorrect => "TranslationKeyIsIncorrect",
            TranslationFailure::NotFound => "TranslationNotFound",
        }
    }

    /// Renders the sentinel for `key`.
    ///
    /// ```rust
    /// use phrasebook::TranslationFailure;
    /// assert_eq!(
    ///     TranslationFailure::NotFound.sentinel("menu/open"),
    ///     "i18nErr: TranslationNotFound. Key: menu/open"
    /// );
    /// ```
    pub fn sentinel(&self, key: &str) -> String {
        format!("{}{}. Key: {}", SENTINEL_PREFIX, self.class(), key)
    }
}

impl Display for TranslationFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.class())
    }
}

/// Whether `text` is a sentinel produced by a failed translation.
pub fn is_sentinel(text: &str) -> bool {
    text.starts_with(SENTINEL_PREFIX)
}
