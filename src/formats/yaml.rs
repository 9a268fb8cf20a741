//! YAML document decoder.
//!
//! Mapping keys may be any scalar and are stringified; the document root must
//! be a mapping (or empty). Custom tags are rejected.

use serde_yaml::{Mapping, Value as YamlValue};

use crate::{
    error::Error,
    traits::Decoder,
    types::{Tree, Value},
};

/// Decoder for YAML translation documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct Format;

impl Decoder for Format {
    fn decode(bytes: &[u8]) -> Result<Tree, Error> {
        let document: YamlValue = serde_yaml::from_slice(bytes)?;
        match document {
            YamlValue::Null => Ok(Tree::new()),
            YamlValue::Mapping(mapping) => convert_mapping(mapping),
            other => Err(Error::InvalidDocument(format!(
                "YAML document root must be a mapping, found {}",
                yaml_type_name(&other)
            ))),
        }
    }
}

fn convert_mapping(mapping: Mapping) -> Result<Tree, Error> {
    let mut tree = Tree::new();
    for (key, value) in mapping {
        let key = match key {
            YamlValue::String(key) => key,
            YamlValue::Bool(key) => key.to_string(),
            YamlValue::Number(key) => key.to_string(),
            other => {
                return Err(Error::InvalidDocument(format!(
                    "YAML mapping keys must be scalars, found {}",
                    yaml_type_name(&other)
                )));
            }
        };
        let value = convert_value(value).map_err(|err| match err {
            Error::InvalidDocument(message) => Error::InvalidValue {
                key: key.clone(),
                message,
            },
            other => other,
        })?;
        if tree.contains_key(&key) {
            return Err(Error::InvalidDocument(format!(
                "YAML mapping key `{}` appears more than once",
                key
            )));
        }
        tree.insert(key, value);
    }
    Ok(tree)
}

fn convert_value(value: YamlValue) -> Result<Value, Error> {
    Ok(match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(value) => Value::Bool(value),
        YamlValue::Number(number) => {
            if let Some(value) = number.as_i64() {
                Value::Int(value)
            } else if let Some(value) = number.as_u64() {
                Value::UInt(value)
            } else if let Some(value) = number.as_f64() {
                Value::Float(value)
            } else {
                return Err(Error::InvalidDocument(format!(
                    "unrepresentable YAML number `{}`",
                    number
                )));
            }
        }
        YamlValue::String(value) => Value::String(value),
        YamlValue::Sequence(items) => Value::List(
            items
                .into_iter()
                .map(convert_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        YamlValue::Mapping(mapping) => Value::Tree(convert_mapping(mapping)?),
        YamlValue::Tagged(tagged) => {
            return Err(Error::InvalidDocument(format!(
                "YAML tag `{}` is not supported",
                tagged.tag
            )));
        }
    })
}

fn yaml_type_name(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "boolean",
        YamlValue::Number(_) => "number",
        YamlValue::String(_) => "string",
        YamlValue::Sequence(_) => "sequence",
        YamlValue::Mapping(_) => "mapping",
        YamlValue::Tagged(_) => "tagged value",
    }
}
