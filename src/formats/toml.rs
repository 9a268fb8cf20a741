//! TOML document decoder.

use toml::{Table, Value as TomlValue};

use crate::{
    error::Error,
    traits::Decoder,
    types::{Tree, Value},
};

/// Decoder for TOML translation documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct Format;

impl Decoder for Format {
    fn decode(bytes: &[u8]) -> Result<Tree, Error> {
        let text = std::str::from_utf8(bytes)
            .map_err(|err| Error::InvalidDocument(format!("TOML content is not UTF-8: {}", err)))?;
        let table: Table = toml::from_str(text)?;
        convert_table(table)
    }
}

fn convert_table(table: Table) -> Result<Tree, Error> {
    table
        .into_iter()
        .map(|(key, value)| {
            let value = convert_value(value).map_err(|message| Error::InvalidValue {
                key: key.clone(),
                message,
            })?;
            Ok((key, value))
        })
        .collect()
}

fn convert_value(value: TomlValue) -> Result<Value, String> {
    Ok(match value {
        TomlValue::String(value) => Value::String(value),
        TomlValue::Integer(value) => Value::Int(value),
        TomlValue::Float(value) => Value::Float(value),
        TomlValue::Boolean(value) => Value::Bool(value),
        TomlValue::Datetime(value) => {
            return Err(format!("TOML datetime `{}` is not a supported value", value));
        }
        TomlValue::Array(items) => Value::List(
            items
                .into_iter()
                .map(convert_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        TomlValue::Table(table) => Value::Tree(convert_table(table).map_err(|err| err.to_string())?),
    })
}
