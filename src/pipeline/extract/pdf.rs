//! PDF text extractor. Digital PDFs only — there is no OCR fallback;
//! a PDF without a text layer simply yields empty text.

use crate::models::payloads::RawExtract;
use crate::pipeline::ImportError;

pub fn extract(bytes: &[u8]) -> Result<RawExtract, ImportError> {
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
        ImportError::MalformedContent {
            format: "pdf",
            reason: e.to_string(),
        }
    })?;

    Ok(RawExtract::Pdf { text })
}
