//! All supported translation document formats for phrasebook.
//!
//! This module re-exports the decoder for each format and provides
//! the [`DocumentFormat`] enum for generic format handling across the crate.

pub mod toml;
pub mod yaml;

use std::{
    fmt::{Display, Formatter},
    path::Path,
    str::FromStr,
};

// Reexporting the formats for easier access
pub use self::toml::Format as TomlFormat;
pub use self::yaml::Format as YamlFormat;

use crate::{Error, traits::Decoder, types::Tree};

/// Represents all supported document formats for generic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// YAML documents (`.yml`, `.yaml`).
    Yaml,
    /// TOML documents (`.toml`).
    Toml,
}

impl DocumentFormat {
    /// Every format, in the order they are tried on content of unknown format.
    pub const ALL: [DocumentFormat; 2] = [DocumentFormat::Yaml, DocumentFormat::Toml];

    /// Maps a file extension (without the dot, any case) to a format.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "yml" | "yaml" => Some(DocumentFormat::Yaml),
            "toml" => Some(DocumentFormat::Toml),
            _ => None,
        }
    }

    /// Infers the format from a path's extension.
    ///
    /// # Example
    /// ```rust
    /// use phrasebook::formats::DocumentFormat;
    /// assert_eq!(DocumentFormat::from_path("en_US.YML"), Some(DocumentFormat::Yaml));
    /// assert_eq!(DocumentFormat::from_path("locales/ru_RU.toml"), Some(DocumentFormat::Toml));
    /// assert_eq!(DocumentFormat::from_path("README"), None);
    /// assert_eq!(DocumentFormat::from_path("notes.txt"), None);
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
    }

    /// Decodes `bytes` with this format's decoder.
    pub fn decode(&self, bytes: &[u8]) -> Result<Tree, Error> {
        match self {
            DocumentFormat::Yaml => YamlFormat::decode(bytes),
            DocumentFormat::Toml => TomlFormat::decode(bytes),
        }
    }
}

impl Display for DocumentFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentFormat::Yaml => write!(f, "yaml"),
            DocumentFormat::Toml => write!(f, "toml"),
        }
    }
}

/// Accepts `"yaml"`, `"yml"` and `"toml"`, case-insensitively.
impl FromStr for DocumentFormat {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::from_extension(s)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown document format `{}`", s)))
    }
}
