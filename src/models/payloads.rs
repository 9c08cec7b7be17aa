//! Kind-discriminated pipeline payloads.
//!
//! `raw_extract` and `ai_suggested` are closed variant sets validated at
//! deserialization. The curator's `final_approved` payload is deliberately
//! free-form (`serde_json::Value`) and only upcast to candidates at the
//! apply boundary, where validity actually matters.

use serde::{Deserialize, Serialize};

/// Letters addressing candidate option slots, in slot order.
pub const OPTION_LETTERS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];

/// A not-yet-committed question produced by extraction or structuring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateQuestion {
    pub prompt: String,
    /// Up to 5 option texts, positional: index 0 = letter A.
    #[serde(default)]
    pub options: Vec<String>,
    /// Designated correct letter ("A".."E").
    #[serde(default)]
    pub correct: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl CandidateQuestion {
    /// Non-empty options paired with their original letter, capped at 5 slots.
    pub fn lettered_options(&self) -> Vec<(char, &str)> {
        self.options
            .iter()
            .take(OPTION_LETTERS.len())
            .enumerate()
            .filter_map(|(i, text)| {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some((OPTION_LETTERS[i], trimmed))
                }
            })
            .collect()
    }
}

/// Normalized output of a format extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RawExtract {
    Csv { questions: Vec<CandidateQuestion> },
    Xlsx { questions: Vec<CandidateQuestion> },
    Pdf { text: String },
    Txt { text: String },
}

impl RawExtract {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Csv { .. } => "csv",
            Self::Xlsx { .. } => "xlsx",
            Self::Pdf { .. } => "pdf",
            Self::Txt { .. } => "txt",
        }
    }

    /// Questions already in tabular shape, if this extract carries them.
    pub fn tabular_questions(&self) -> Option<&[CandidateQuestion]> {
        match self {
            Self::Csv { questions } | Self::Xlsx { questions } => Some(questions),
            _ => None,
        }
    }

    /// Free text requiring external structuring, if this extract carries it.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Pdf { text } | Self::Txt { text } => Some(text),
            _ => None,
        }
    }
}

/// Output of the structuring stage: which model produced the candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSuggested {
    pub model: String,
    pub questions: Vec<CandidateQuestion>,
}

/// Model name recorded when a tabular extract bypasses the structuring
/// collaborator entirely.
pub const PASSTHROUGH_MODEL: &str = "passthrough";
