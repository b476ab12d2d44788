//! Configuration document readers.
//!
//! | scheme | reader | include mode |
//! |---|---|---|
//! | `file` | [`FileConfigReader`] | strict |
//! | `memory` | [`MemoryConfigReader`] | never |
//! | `http`, `https` | [`HttpConfigReader`] | always |

mod error;
mod file;
mod http;
mod memory;

pub use error::ReaderError;
pub use file::FileConfigReader;
pub use http::{HttpConfigReader, HttpReaderConfig};
pub use memory::MemoryConfigReader;

use encoding_rs::Encoding;

/// Largest document a reader accepts, in bytes.
pub const MAX_BUFFER_SIZE: usize = 131_072;

/// Decode document bytes, enforcing [`MAX_BUFFER_SIZE`] and the requested
/// encoding. Without an encoding the bytes must be UTF-8.
pub(crate) fn decode_document(
    bytes: Vec<u8>,
    encoding: Option<&str>,
    location: &str,
) -> Result<String, ReaderError> {
    if bytes.len() > MAX_BUFFER_SIZE {
        return Err(ReaderError::TooLarge {
            location: location.to_owned(),
            limit: MAX_BUFFER_SIZE,
        });
    }
    let invalid = || ReaderError::InvalidText {
        location: location.to_owned(),
    };
    let Some(label) = encoding else {
        return String::from_utf8(bytes).map_err(|_| invalid());
    };

    let codec = encoding_for(label).ok_or_else(|| ReaderError::UnsupportedEncoding {
        encoding: label.to_owned(),
    })?;
    codec
        .decode_without_bom_handling_and_without_replacement(&bytes)
        .map(std::borrow::Cow::into_owned)
        .ok_or_else(invalid)
}

/// Resolve an encoding label, also accepting spellings such as `latin-1`
/// and `utf_8`.
fn encoding_for(label: &str) -> Option<&'static Encoding> {
    let label = label.trim();
    Encoding::for_label(label.as_bytes()).or_else(|| {
        let compact: String = label.chars().filter(|c| !matches!(c, '-' | '_')).collect();
        Encoding::for_label(compact.as_bytes())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_documents_are_rejected() {
        let bytes = vec![b'#'; MAX_BUFFER_SIZE + 1];
        assert!(matches!(
            decode_document(bytes, None, "/tmp/big.cfg"),
            Err(ReaderError::TooLarge { limit: MAX_BUFFER_SIZE, .. })
        ));
        assert!(decode_document(vec![b'#'; MAX_BUFFER_SIZE], None, "x").is_ok());
    }

    #[test]
    fn requested_encodings_decode() -> Result<(), ReaderError> {
        assert_eq!(decode_document(b"json://host".to_vec(), Some("UTF_8"), "x")?, "json://host");
        assert_eq!(
            decode_document(b"json://caf\xe9".to_vec(), Some("latin-1"), "x")?,
            "json://caf\u{e9}"
        );
        assert_eq!(
            decode_document(vec![0x82, 0xa0], Some("shift_jis"), "x")?,
            "\u{3042}"
        );
        Ok(())
    }

    #[test]
    fn unknown_labels_and_bad_bytes_fail() {
        assert!(matches!(
            decode_document(b"json://host".to_vec(), Some("klingon"), "x"),
            Err(ReaderError::UnsupportedEncoding { .. })
        ));
        assert!(matches!(
            decode_document(vec![0xff, 0xfe], None, "x"),
            Err(ReaderError::InvalidText { .. })
        ));
        assert!(matches!(
            decode_document(vec![0xff, 0xfe], Some("utf-8"), "x"),
            Err(ReaderError::InvalidText { .. })
        ));
    }
}
