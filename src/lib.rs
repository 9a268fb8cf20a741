//! Locale-phrase store for application internationalization.
//!
//! Translation documents (YAML or TOML, from files, directory trees or
//! in-memory buffers) are registered with a [`Client`], loaded in one
//! all-or-nothing step and then served lock-free with `{{name}}`
//! interpolation.
//!
//! Every document names its locale (`ll_CC`) in a `__metadata__` block or
//! in its file path:
//!
//! ```yaml
//! __metadata__:
//!   locale: en_US
//! menu:
//!   open: Open {{file}}
//! ```
//!
//! ```rust
//! use phrasebook::{Args, Client};
//!
//! let client = Client::new();
//! client.register([&b"__metadata__:\n  locale: en_US\nmenu:\n  open: Open {{file}}"[..]])?;
//! client.commit()?;
//!
//! let args = Args::new().with("file", "notes.txt");
//! assert_eq!(client.translate("en_US", "menu/open", Some(&args)), "Open notes.txt");
//! assert_eq!(
//!     client.translate("en_US", "menu/close", None),
//!     "i18nErr: TranslationNotFound. Key: menu/close"
//! );
//! # Ok::<(), phrasebook::Error>(())
//! ```

#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod formats;
pub mod interpolate;
pub mod locale;
pub mod metadata;
pub mod node;
pub mod sentinel;
pub mod source;
pub mod traits;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    client::{Client, State, Stats},
    config::Config,
    error::{Error, ErrorKind},
    formats::DocumentFormat,
    interpolate::interpolate,
    locale::Locale,
    metadata::is_valid_locale_name,
    node::LocaleNode,
    sentinel::TranslationFailure,
    source::{SourceDescriptor, SourceInput, SourceKind, SourceRegistry},
    types::{Args, Tree, Value},
};
