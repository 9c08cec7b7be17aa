//! Spreadsheet extractor. Reads the first worksheet; rows share the same
//! positional column layout as the delimited extractor.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::models::payloads::RawExtract;
use crate::pipeline::ImportError;

use super::candidates_from_rows;

pub fn extract(bytes: &[u8]) -> Result<RawExtract, ImportError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|e| ImportError::MalformedContent {
            format: "xlsx",
            reason: e.to_string(),
        })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::MalformedContent {
            format: "xlsx",
            reason: "workbook has no worksheets".into(),
        })?
        .map_err(|e| ImportError::MalformedContent {
            format: "xlsx",
            reason: e.to_string(),
        })?;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(RawExtract::Xlsx {
        questions: candidates_from_rows(&rows),
    })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}
