//! Locale identity of a decoded document.
//!
//! A document names its locale either in a `__metadata__` block or through an
//! `ll_CC` token somewhere in its file path, never both.

use std::path::{Component, Path};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    error::Error,
    types::{Tree, Value},
};

/// Top-level key of the metadata block, matched case-insensitively.
pub const METADATA_KEY: &str = "__metadata__";

/// Keys inside the metadata block that carry the locale name.
pub const LOCALE_NAME_ALIASES: [&str; 4] = ["locale", "locale_name", "localename", "name"];

const PATH_DELIMITERS: [char; 4] = ['-', '_', '.', ' '];

lazy_static! {
    static ref LOCALE_NAME_REGEX: Regex = Regex::new(r"^[a-z]{2}_[A-Z]{2}$").unwrap();
}

/// Checks a locale name against the `ll_CC` pattern.
///
/// ```rust
/// use phrasebook::is_valid_locale_name;
/// assert!(is_valid_locale_name("en_US"));
/// assert!(!is_valid_locale_name("en-US"));
/// assert!(!is_valid_locale_name("EN_us"));
/// ```
pub fn is_valid_locale_name(name: &str) -> bool {
    LOCALE_NAME_REGEX.is_match(name)
}

/// Resolves the locale name of `tree` and strips its metadata block.
///
/// `origin_path` is only given for file-backed sources. The metadata key is
/// removed from `tree` before any other check, so on success the tree holds
/// translation content only.
pub fn extract_locale_name(tree: &mut Tree, origin_path: Option<&Path>) -> Result<String, Error> {
    let from_metadata = match take_metadata(tree)? {
        Some(metadata) => locale_name_from_metadata(&metadata)?,
        None => None,
    };
    let from_path = match origin_path {
        Some(path) => locale_name_from_path(path)?,
        None => None,
    };

    let name = match (from_metadata, from_path) {
        (Some(declared), Some(embedded)) => {
            return Err(Error::AmbiguousMetadata(format!(
                "locale `{}` is declared in metadata and `{}` in the file path",
                declared, embedded
            )));
        }
        (None, None) => {
            return Err(Error::InvalidMetadata(
                "no locale name in metadata or file path".to_string(),
            ));
        }
        (Some(name), None) | (None, Some(name)) => name,
    };

    if !is_valid_locale_name(&name) {
        return Err(Error::InvalidLocaleName(name));
    }
    Ok(name)
}

/// Removes the metadata block from `tree` and returns its inner table.
fn take_metadata(tree: &mut Tree) -> Result<Option<Tree>, Error> {
    let mut keys = tree
        .keys()
        .filter(|key| key.eq_ignore_ascii_case(METADATA_KEY))
        .cloned();
    let Some(key) = keys.next() else {
        return Ok(None);
    };
    if let Some(second) = keys.next() {
        return Err(Error::AmbiguousMetadata(format!(
            "metadata declared twice as `{}` and `{}`",
            key, second
        )));
    }

    let value = tree
        .remove(&key)
        .ok_or_else(|| Error::Internal(format!("metadata key `{}` vanished", key)))?;

    let metadata = match value {
        Value::Tree(table) => table,
        Value::List(mut items) if items.len() == 1 => match items.pop() {
            Some(Value::Tree(table)) => table,
            Some(other) => {
                return Err(Error::InvalidMetadata(format!(
                    "metadata list must hold a table, found {}",
                    other.type_name()
                )));
            }
            None => return Err(Error::Internal("metadata list emptied".to_string())),
        },
        Value::List(items) => {
            return Err(Error::InvalidMetadata(format!(
                "metadata list must hold exactly one table, found {} items",
                items.len()
            )));
        }
        other => {
            return Err(Error::InvalidMetadata(format!(
                "metadata must be a table, found {}",
                other.type_name()
            )));
        }
    };

    if metadata.is_empty() {
        return Err(Error::InvalidMetadata("metadata table is empty".to_string()));
    }
    Ok(Some(metadata))
}

fn locale_name_from_metadata(metadata: &Tree) -> Result<Option<String>, Error> {
    let mut found: Option<(&str, &str)> = None;
    for (key, value) in metadata {
        if !LOCALE_NAME_ALIASES
            .iter()
            .any(|alias| key.eq_ignore_ascii_case(alias))
        {
            continue;
        }
        let Some(name) = value.as_str() else {
            return Err(Error::InvalidMetadata(format!(
                "metadata field `{}` must be a string, found {}",
                key,
                value.type_name()
            )));
        };
        if let Some((first_key, _)) = found {
            return Err(Error::AmbiguousMetadata(format!(
                "locale name declared by both `{}` and `{}`",
                first_key, key
            )));
        }
        found = Some((key.as_str(), name));
    }
    Ok(found.map(|(_, name)| name.to_string()))
}

/// Finds the single `ll_CC` token embedded in a path, if any.
///
/// Every path component is split on `-`, `_`, `.` and space; a locale name is
/// three consecutive tokens (two letters, a delimiter, two letters) that
/// together match the pattern.
pub fn locale_name_from_path(path: &Path) -> Result<Option<String>, Error> {
    let mut candidates = Vec::new();

    for component in path.components() {
        let Component::Normal(segment) = component else {
            continue;
        };
        let segment = segment.to_string_lossy();
        let tokens = tokenize(&segment);

        let mut i = 0;
        while i + 2 < tokens.len() {
            let candidate = tokens[i..i + 3].concat();
            if candidate.len() == 5 && is_valid_locale_name(&candidate) {
                candidates.push(candidate);
                i += 3;
            } else {
                i += 1;
            }
        }
    }

    if candidates.len() > 1 {
        return Err(Error::AmbiguousMetadata(format!(
            "path `{}` embeds several locale names: {}",
            path.display(),
            candidates.join(", ")
        )));
    }
    Ok(candidates.pop())
}

/// Splits on the path delimiters, keeping each delimiter as its own token.
fn tokenize(segment: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    for (i, c) in segment.char_indices() {
        if PATH_DELIMITERS.contains(&c) {
            if start < i {
                tokens.push(&segment[start..i]);
            }
            tokens.push(&segment[i..i + c.len_utf8()]);
            start = i + c.len_utf8();
        }
    }
    if start < segment.len() {
        tokens.push(&segment[start..]);
    }
    tokens
}
