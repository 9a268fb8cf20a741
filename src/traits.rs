//! Traits for format-agnostic document decoding in phrasebook.

use std::{fs::File, io::Read, path::Path};

use crate::{error::Error, types::Tree};

/// A trait for decoding one translation document into a generic [`Tree`].
///
/// # Example
///
/// ```rust
/// use phrasebook::traits::Decoder;
/// use phrasebook::formats::YamlFormat;
/// let tree = YamlFormat::decode_str("greeting: Hello")?;
/// assert!(tree.contains_key("greeting"));
/// Ok::<(), phrasebook::Error>(())
/// ```
pub trait Decoder {
    /// Decode from raw bytes.
    fn decode(bytes: &[u8]) -> Result<Tree, Error>;

    /// Decode from a string.
    fn decode_str(s: &str) -> Result<Tree, Error> {
        Self::decode(s.as_bytes())
    }

    /// Decode from any reader; `origin` names it in I/O errors.
    fn decode_reader<R: Read>(mut reader: R, origin: &Path) -> Result<Tree, Error> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|source| Error::Io {
                path: origin.to_path_buf(),
                source,
            })?;
        Self::decode(&bytes)
    }

    /// Decode from file path.
    fn decode_file<P: AsRef<Path>>(path: P) -> Result<Tree, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode_reader(file, path)
    }
}
