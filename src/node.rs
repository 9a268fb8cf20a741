//! The per-locale key tree and the merge of decoded documents into it.
//!
//! A document is merged into the staging maps of the nodes it touches and
//! only becomes visible once [`LocaleNode::promote`] moves it into the
//! committed maps.

use std::collections::{BTreeMap, HashMap};

use crate::{
    error::Error,
    source::SourceDescriptor,
    types::{Tree, Value},
};

/// Separator between the segments of a translation key.
pub const KEY_SEPARATOR: char = '/';

/// Inputs shared by every node visited while merging one document.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MergeContext<'a> {
    /// Every source of the running load, used to name contributors on conflicts.
    pub sources: &'a [SourceDescriptor],
    /// Index of the document being merged.
    pub source_index: usize,
    pub overwrite: bool,
}

/// One namespace segment of a locale's key hierarchy.
#[derive(Debug, Default, Clone)]
pub struct LocaleNode {
    children: HashMap<String, LocaleNode>,
    committed: HashMap<String, String>,
    staging: HashMap<String, String>,
    contributors: Vec<usize>,
}

impl LocaleNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Child namespace named `segment`.
    pub fn child(&self, segment: &str) -> Option<&LocaleNode> {
        self.children.get(segment)
    }

    /// Committed phrase stored directly under `key` in this node.
    pub fn phrase(&self, key: &str) -> Option<&str> {
        self.committed.get(key).map(String::as_str)
    }

    /// Indices of the sources that put keys into this exact node.
    pub fn contributors(&self) -> &[usize] {
        &self.contributors
    }

    pub fn phrases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.committed.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merges `tree` into the staging maps of this subtree.
    ///
    /// `prefix` is the key path of this node, used in error messages.
    pub(crate) fn merge(&mut self, tree: Tree, ctx: &MergeContext<'_>, prefix: &str) -> Result<(), Error> {
        for (key, value) in tree {
            let path = join_key(prefix, &key);
            if key.is_empty() {
                return Err(Error::InvalidValue {
                    key: path,
                    message: "empty keys are not allowed".to_string(),
                });
            }

            match value {
                Value::Tree(subtree) => {
                    self.children
                        .entry(key)
                        .or_default()
                        .merge(subtree, ctx, &path)?;
                }
                Value::List(_) => {
                    return Err(Error::InvalidValue {
                        key: path,
                        message: "arrays are not allowed".to_string(),
                    });
                }
                scalar => {
                    let phrase = scalar.to_phrase().ok_or_else(|| {
                        Error::Internal(format!("{} at `{}` has no phrase form", scalar.type_name(), path))
                    })?;
                    self.store(key, phrase, ctx, path)?;
                }
            }
        }

        if !self.contributors.contains(&ctx.source_index) {
            self.contributors.push(ctx.source_index);
        }
        Ok(())
    }

    fn store(&mut self, key: String, phrase: String, ctx: &MergeContext<'_>, path: String) -> Result<(), Error> {
        if !ctx.overwrite {
            if let Some(old_value) = self.committed.get(&key) {
                let origins = self
                    .contributors
                    .iter()
                    .filter_map(|&index| ctx.sources.get(index))
                    .map(|source| source.origin().to_string())
                    .collect();
                return Err(Error::KeyExists {
                    key: path,
                    new_value: phrase,
                    old_value: old_value.clone(),
                    origins,
                });
            }
        }
        self.staging.insert(key, phrase);
        Ok(())
    }

    /// Moves every staged phrase of this subtree into committed storage.
    ///
    /// Returns how many keys were new; replaced keys are not counted again.
    pub(crate) fn promote(&mut self) -> u64 {
        let mut added = 0;
        for (key, phrase) in self.staging.drain() {
            if self.committed.insert(key, phrase).is_none() {
                added += 1;
            }
        }
        for child in self.children.values_mut() {
            added += child.promote();
        }
        added
    }

    /// Drops every staged phrase of this subtree.
    pub(crate) fn discard_staging(&mut self) {
        self.staging.clear();
        for child in self.children.values_mut() {
            child.discard_staging();
        }
    }

    pub(crate) fn collect_phrases(&self, prefix: &str, dest: &mut BTreeMap<String, String>) {
        for (key, phrase) in &self.committed {
            dest.insert(join_key(prefix, key), phrase.clone());
        }
        for (segment, child) in &self.children {
            child.collect_phrases(&join_key(prefix, segment), dest);
        }
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}{}{}", prefix, KEY_SEPARATOR, key)
    }
}
