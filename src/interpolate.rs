//! `{{name}}` verb substitution.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::types::Args;

lazy_static! {
    static ref VERB_REGEX: Regex = Regex::new(r"\{\{([^{}]*)\}\}").unwrap();
}

/// Substitutes every `{{name}}` verb found in `args`.
///
/// Verbs without a matching argument are kept byte-for-byte, unused
/// arguments are ignored and an unterminated `{{` stays literal.
///
/// ```rust
/// use phrasebook::{interpolate, Args};
/// let args = Args::new().with("name", "Frank");
/// assert_eq!(interpolate("Hello, {{name}}!", &args), "Hello, Frank!");
/// assert_eq!(interpolate("{{unknown}}", &args), "{{unknown}}");
/// ```
pub fn interpolate<'a>(phrase: &'a str, args: &Args) -> Cow<'a, str> {
    if args.is_empty() || !phrase.contains("{{") {
        return Cow::Borrowed(phrase);
    }
    VERB_REGEX.replace_all(phrase, |caps: &Captures<'_>| match args.get(&caps[1]) {
        Some(value) => value.to_string(),
        None => caps[0].to_string(),
    })
}
