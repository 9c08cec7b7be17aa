//! Delimited-table extractor (CSV/TSV) with delimiter auto-detection.

use crate::models::payloads::RawExtract;
use crate::pipeline::ImportError;

use super::candidates_from_rows;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

pub fn extract(bytes: &[u8]) -> Result<RawExtract, ImportError> {
    let delimiter = detect_delimiter(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::MalformedContent {
            format: "csv",
            reason: e.to_string(),
        })?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    Ok(RawExtract::Csv {
        questions: candidates_from_rows(&rows),
    })
}

/// Pick the delimiter that splits the first non-empty line into the most
/// fields. Comma wins ties by its position in the candidate list.
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes
        .split(|&b| b == b'\n')
        .find(|line| !line.iter().all(u8::is_ascii_whitespace))
        .unwrap_or(b"");

    let mut best = b',';
    let mut best_count = 0usize;
    for &candidate in DELIMITERS {
        let count = first_line.iter().filter(|&&b| b == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_candidates() {
        let data = b"What is 2+2?,3,4,5,6,,B,simple arithmetic\n\
                     Capital of France?,London,Paris,Berlin,Rome,,B,\n";
        let extract = extract(data).unwrap();
        let questions = extract.tabular_questions().unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].prompt, "What is 2+2?");
        assert_eq!(questions[0].correct.as_deref(), Some("B"));
        assert_eq!(questions[0].explanation.as_deref(), Some("simple arithmetic"));
        assert_eq!(questions[1].options[1], "Paris");
    }

    #[test]
    fn detects_tab_delimiter() {
        let data = b"Q1\ta\tb\tc\td\t\tA\t\n";
        let extract = extract(data).unwrap();
        let questions = extract.tabular_questions().unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].options, vec!["a", "b", "c", "d", ""]);
    }

    #[test]
    fn detects_semicolon_delimiter() {
        let data = b"Q1;a;b;c;d;;C;why\n";
        let extract = extract(data).unwrap();
        let questions = extract.tabular_questions().unwrap();
        assert_eq!(questions[0].correct.as_deref(), Some("C"));
    }

    #[test]
    fn skips_header_and_blank_rows() {
        let data = b"prompt,option_a,option_b,option_c,option_d,option_e,correct,explanation\n\
                     ,,,,,,,\n\
                     Q1,a,b,c,d,,A,\n";
        let extract = extract(data).unwrap();
        assert_eq!(extract.tabular_questions().unwrap().len(), 1);
    }

    #[test]
    fn quoted_fields_keep_embedded_commas() {
        let data = b"\"Pick one, carefully\",a,b,c,d,,D,\n";
        let extract = extract(data).unwrap();
        let questions = extract.tabular_questions().unwrap();
        assert_eq!(questions[0].prompt, "Pick one, carefully");
    }

    #[test]
    fn empty_input_yields_no_candidates() {
        let extract = extract(b"").unwrap();
        assert!(extract.tabular_questions().unwrap().is_empty());
    }
}
