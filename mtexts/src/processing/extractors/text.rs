use crate::error::{MtextsError, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub struct TextExtractor;

impl TextExtractor {
    /// Permissive decode: invalid sequences become U+FFFD, never an error.
    pub fn decode(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    /// Strict decode for server-side exports, which are always UTF-8.
    pub fn decode_export(bytes: &[u8]) -> Result<String> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        String::from_utf8(bytes.to_vec())
            .map_err(|e| MtextsError::Processing(format!("Export is not valid UTF-8: {e}")))
    }
}
