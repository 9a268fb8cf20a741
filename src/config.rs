//! Behavior switches for a [`crate::Client`].

use serde::{Deserialize, Serialize};

/// Load and lookup options for [`crate::Client`].
///
/// Every switch defaults to `false`. Missing fields deserialize to their
/// default, so a host can embed this in its own configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Lets a later document replace a key an earlier one already defined.
    pub overwrite_existing_key: bool,
    /// An empty locale name yields no locale instead of the default one.
    pub empty_locale_name_as_none: bool,
    /// An unknown locale name yields no locale instead of the default one.
    pub locale_not_found_as_none: bool,
}

impl Config {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables/disables overwriting of already loaded keys.
    pub fn with_overwrite_existing_key(mut self, overwrite: bool) -> Self {
        self.overwrite_existing_key = overwrite;
        self
    }

    /// Enables/disables the default-locale fallback for empty names.
    pub fn with_empty_locale_name_as_none(mut self, as_none: bool) -> Self {
        self.empty_locale_name_as_none = as_none;
        self
    }

    /// Enables/disables the default-locale fallback for unknown names.
    pub fn with_locale_not_found_as_none(mut self, as_none: bool) -> Self {
        self.locale_not_found_as_none = as_none;
        self
    }
}
