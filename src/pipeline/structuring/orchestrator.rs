//! Structuring stage: raw extract → candidate questions.

use rusqlite::Connection;
use uuid::Uuid;

use super::types::StructuringClient;
use crate::audit;
use crate::db::repository;
use crate::models::enums::ImportStatus;
use crate::models::import_record::ImportRecord;
use crate::models::payloads::{AiSuggested, PASSTHROUGH_MODEL};
use crate::pipeline::ImportError;

/// Minimum input length for the external structuring call (characters).
const MIN_INPUT_LENGTH: usize = 10;

/// Advance an import from EXTRACTED to AI_SUGGESTED.
///
/// Tabular extracts already carrying a questions list pass through verbatim
/// (`model:"passthrough"`) with no external call. Text extracts go to the
/// structuring collaborator; if that call fails nothing is written and the
/// record stays EXTRACTED.
pub fn structure_import(
    conn: &Connection,
    client: &dyn StructuringClient,
    import_id: &Uuid,
) -> Result<ImportRecord, ImportError> {
    let record = repository::get_import_record(conn, import_id)?
        .ok_or(ImportError::ImportNotFound(*import_id))?;

    let extract = record.raw_extract.as_ref().ok_or(ImportError::MissingStage {
        import_id: *import_id,
        stage: "raw_extract",
    })?;

    let suggested = if let Some(questions) = extract.tabular_questions() {
        tracing::debug!(import_id = %import_id, kind = extract.kind(), "Tabular extract, structuring pass-through");
        AiSuggested {
            model: PASSTHROUGH_MODEL.to_string(),
            questions: questions.to_vec(),
        }
    } else {
        let text = extract.text().unwrap_or_default();
        if text.trim().len() < MIN_INPUT_LENGTH {
            return Err(super::StructuringError::InputTooShort {
                min: MIN_INPUT_LENGTH,
            }
            .into());
        }
        let structured = client.structure(text)?;
        tracing::info!(
            import_id = %import_id,
            model = %structured.model,
            candidates = structured.questions.len(),
            "Text extract structured"
        );
        AiSuggested {
            model: structured.model,
            questions: structured.questions,
        }
    };

    repository::update_suggested_stage(conn, import_id, &suggested)?;

    audit::record(
        conn,
        &record.created_by,
        "import:structure",
        "ImportRecord",
        import_id,
        Some(serde_json::json!({ "status": record.status.as_str() })),
        Some(serde_json::json!({
            "status": ImportStatus::AiSuggested.as_str(),
            "model": suggested.model,
        })),
    );

    repository::get_import_record(conn, import_id)?
        .ok_or(ImportError::ImportNotFound(*import_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::identity::Caller;
    use crate::models::enums::ImportStatus;
    use crate::models::import_record::SourceLocation;
    use crate::models::payloads::{CandidateQuestion, RawExtract};
    use crate::pipeline::imports::create_import;
    use crate::pipeline::structuring::types::MockStructuringClient;

    fn candidate(prompt: &str) -> CandidateQuestion {
        CandidateQuestion {
            prompt: prompt.into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct: Some("A".into()),
            explanation: None,
        }
    }

    fn seeded_import(conn: &Connection, extract: RawExtract) -> ImportRecord {
        let caller = Caller::staff(Uuid::new_v4());
        let record = create_import(
            conn,
            &caller,
            SourceLocation {
                bucket: "uploads".into(),
                path: "doc.csv".into(),
                mime: None,
            },
        )
        .unwrap();
        repository::update_extract_stage(conn, &record.id, &extract).unwrap();
        repository::get_import_record(conn, &record.id).unwrap().unwrap()
    }

    #[test]
    fn tabular_extract_passes_through_identically() {
        let conn = open_memory_database().unwrap();
        let questions = vec![candidate("Q1"), candidate("Q2"), candidate("Q3")];
        let record = seeded_import(
            &conn,
            RawExtract::Csv {
                questions: questions.clone(),
            },
        );

        // A failing client proves no external call happens on pass-through
        let client = MockStructuringClient::failing("must not be called");
        let structured = structure_import(&conn, &client, &record.id).unwrap();

        assert_eq!(structured.status, ImportStatus::AiSuggested);
        let suggested = structured.ai_suggested.unwrap();
        assert_eq!(suggested.model, "passthrough");
        assert_eq!(suggested.questions, questions);
    }

    #[test]
    fn successful_structuring_is_audited() {
        let conn = open_memory_database().unwrap();
        let record = seeded_import(
            &conn,
            RawExtract::Csv {
                questions: vec![candidate("Q1")],
            },
        );

        let client = MockStructuringClient::failing("not called for tabular input");
        structure_import(&conn, &client, &record.id).unwrap();

        let entries = crate::db::repository::query_audit_by_entity(
            &conn,
            "ImportRecord",
            &record.id.to_string(),
        )
        .unwrap();
        assert!(entries
            .iter()
            .any(|(_, _, action)| action == "import:structure"));
    }

    #[test]
    fn text_extract_goes_through_collaborator() {
        let conn = open_memory_database().unwrap();
        let record = seeded_import(
            &conn,
            RawExtract::Txt {
                text: "Long enough prose about ownership and borrowing".into(),
            },
        );

        let client =
            MockStructuringClient::with_questions("structurer-v2", vec![candidate("Generated")]);
        let structured = structure_import(&conn, &client, &record.id).unwrap();

        let suggested = structured.ai_suggested.unwrap();
        assert_eq!(suggested.model, "structurer-v2");
        assert_eq!(suggested.questions.len(), 1);
    }

    #[test]
    fn collaborator_failure_leaves_record_extracted() {
        let conn = open_memory_database().unwrap();
        let record = seeded_import(
            &conn,
            RawExtract::Pdf {
                text: "Extracted pdf text, plenty of characters".into(),
            },
        );

        let client = MockStructuringClient::failing("model overloaded");
        let err = structure_import(&conn, &client, &record.id).unwrap_err();
        assert!(matches!(err, ImportError::Structuring(_)));

        let reloaded = repository::get_import_record(&conn, &record.id).unwrap().unwrap();
        assert_eq!(reloaded.status, ImportStatus::Extracted);
        assert!(reloaded.ai_suggested.is_none());
    }

    #[test]
    fn missing_extract_is_invalid_state() {
        let conn = open_memory_database().unwrap();
        let caller = Caller::staff(Uuid::new_v4());
        let record = create_import(
            &conn,
            &caller,
            SourceLocation {
                bucket: "uploads".into(),
                path: "doc.txt".into(),
                mime: None,
            },
        )
        .unwrap();

        let client = MockStructuringClient::failing("unused");
        let err = structure_import(&conn, &client, &record.id).unwrap_err();
        assert!(matches!(err, ImportError::MissingStage { stage: "raw_extract", .. }));
    }

    #[test]
    fn too_short_text_is_rejected() {
        let conn = open_memory_database().unwrap();
        let record = seeded_import(&conn, RawExtract::Txt { text: "short".into() });

        let client = MockStructuringClient::with_questions("structurer-v2", vec![]);
        let err = structure_import(&conn, &client, &record.id).unwrap_err();
        assert!(matches!(
            err,
            ImportError::Structuring(super::super::StructuringError::InputTooShort { .. })
        ));
    }
}
