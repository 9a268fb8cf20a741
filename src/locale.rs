//! One language's phrase tree.

use std::collections::BTreeMap;

use crate::{
    error::Error,
    interpolate::interpolate,
    node::{KEY_SEPARATOR, LocaleNode, MergeContext},
    sentinel::TranslationFailure,
    types::{Args, Tree},
};

/// A loaded locale: its `ll_CC` name and committed phrase tree.
#[derive(Debug, Clone)]
pub struct Locale {
    name: String,
    root: LocaleNode,
    phrase_count: u64,
}

impl Locale {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: LocaleNode::new(),
            phrase_count: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of committed phrases in the whole tree.
    pub fn phrase_count(&self) -> u64 {
        self.phrase_count
    }

    /// Merges one decoded document and promotes it on success.
    ///
    /// On failure nothing of the document stays staged.
    pub(crate) fn merge(&mut self, tree: Tree, ctx: &MergeContext<'_>) -> Result<u64, Error> {
        if let Err(err) = self.root.merge(tree, ctx, "") {
            self.root.discard_staging();
            return Err(err);
        }
        let added = self.root.promote();
        self.phrase_count += added;
        Ok(added)
    }

    /// Raw phrase stored under a `/`-separated key.
    pub fn get(&self, key: &str) -> Result<&str, TranslationFailure> {
        if key.is_empty() {
            return Err(TranslationFailure::KeyIsEmpty);
        }

        let mut node = &self.root;
        let mut rest = key;
        while let Some((segment, tail)) = rest.split_once(KEY_SEPARATOR) {
            if segment.is_empty() || tail.is_empty() {
                return Err(TranslationFailure::KeyIsIncorrect);
            }
            node = node.child(segment).ok_or(TranslationFailure::NotFound)?;
            rest = tail;
        }

        node.phrase(rest).ok_or(TranslationFailure::NotFound)
    }

    /// Looks up `key` and substitutes `args` into it.
    ///
    /// Failures come back as sentinel strings, see [`TranslationFailure::sentinel`].
    pub fn translate(&self, key: &str, args: Option<&Args>) -> String {
        match self.get(key) {
            Ok(phrase) => match args {
                Some(args) => interpolate(phrase, args).into_owned(),
                None => phrase.to_string(),
            },
            Err(failure) => failure.sentinel(key),
        }
    }

    /// Every committed phrase keyed by its full `/`-separated key.
    pub fn phrases(&self) -> BTreeMap<String, String> {
        let mut phrases = BTreeMap::new();
        self.root.collect_phrases("", &mut phrases);
        phrases
    }
}
