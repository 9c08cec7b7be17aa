//! Plain-text extractor. Lossy UTF-8: stray bytes become replacement
//! characters rather than failing the whole import.

use crate::models::payloads::RawExtract;

pub fn extract(bytes: &[u8]) -> RawExtract {
    RawExtract::Txt {
        text: String::from_utf8_lossy(bytes).into_owned(),
    }
}
