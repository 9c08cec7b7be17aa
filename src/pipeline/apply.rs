//! Apply-to-quiz merger: folds approved candidates into a Draft quiz's
//! live question bank.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit;
use crate::db::repository;
use crate::identity::Caller;
use crate::models::enums::{ApplySource, DifficultyTier, WorkflowStatus};
use crate::models::payloads::CandidateQuestion;
use crate::models::quiz::{QuizOption, QuizQuestion};
use crate::versioning::{locks, QuizLocks};

use super::ImportError;

/// Minimum non-empty options a candidate needs to become a live question.
const MIN_OPTIONS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkipReason {
    EmptyPrompt,
    TooFewOptions { found: usize },
    CorrectLetterUnmatched { letter: Option<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedCandidate {
    /// Position in the source candidate list.
    pub index: usize,
    pub reason: SkipReason,
}

/// Merge result. `created_questions` is the primary outcome; `skipped`
/// itemizes candidates the leniency policy silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyOutcome {
    pub created_questions: usize,
    pub skipped: Vec<SkippedCandidate>,
}

/// Validate and insert an import's candidates into a Draft quiz.
///
/// Candidates are processed strictly in source order; `order_index` is
/// assigned contiguously from `max(existing) + 1` under the quiz's lock,
/// so the appended block is dense and gap-free even with skips. Invalid
/// candidates are skipped, never fatal; a non-Draft target is fatal.
pub fn apply_import_to_quiz(
    conn: &Connection,
    quiz_locks: &QuizLocks,
    caller: &Caller,
    import_id: &Uuid,
    quiz_id: &Uuid,
    source: &ApplySource,
) -> Result<ApplyOutcome, ImportError> {
    let record = repository::get_import_record(conn, import_id)?
        .ok_or(ImportError::ImportNotFound(*import_id))?;
    let quiz =
        repository::get_quiz(conn, quiz_id)?.ok_or(ImportError::QuizNotFound(*quiz_id))?;

    // Applying into a live quiz would corrupt the published bank.
    if quiz.workflow_status != WorkflowStatus::Draft {
        return Err(ImportError::InvalidState(format!(
            "apply requires a Draft quiz, found {}",
            quiz.workflow_status.as_str()
        )));
    }

    let candidates = select_candidates(&record, source, import_id)?;

    let lock = quiz_locks.for_quiz(quiz_id);
    let _guard = locks::acquire(&lock);

    let tx = conn.unchecked_transaction().map_err(crate::db::DatabaseError::from)?;
    let mut next_index = repository::max_order_index(&tx, quiz_id)?
        .map(|max| max + 1)
        .unwrap_or(0);

    let mut created = 0usize;
    let mut skipped = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        match validate_candidate(candidate) {
            Err(reason) => skipped.push(SkippedCandidate { index, reason }),
            Ok(correct_position) => {
                insert_candidate(&tx, &quiz, caller, candidate, correct_position, next_index)?;
                next_index += 1;
                created += 1;
            }
        }
    }

    tx.commit().map_err(crate::db::DatabaseError::from)?;

    tracing::info!(
        import_id = %import_id,
        quiz_id = %quiz_id,
        source = source.as_str(),
        created,
        skipped = skipped.len(),
        "Import applied to quiz"
    );
    audit::record(
        conn,
        &caller.id,
        "import:apply",
        "Quiz",
        quiz_id,
        Some(serde_json::json!({ "import_id": import_id })),
        Some(serde_json::json!({ "created_questions": created })),
    );

    Ok(ApplyOutcome {
        created_questions: created,
        skipped,
    })
}

/// Pick the candidate list for the chosen source, upcasting the stored
/// payload. The free-form final payload is only validated here, at its
/// consumption boundary.
fn select_candidates(
    record: &crate::models::import_record::ImportRecord,
    source: &ApplySource,
    import_id: &Uuid,
) -> Result<Vec<CandidateQuestion>, ImportError> {
    match source {
        ApplySource::Ai => {
            let suggested = record.ai_suggested.as_ref().ok_or(ImportError::MissingStage {
                import_id: *import_id,
                stage: "ai_suggested",
            })?;
            Ok(suggested.questions.clone())
        }
        ApplySource::Final => {
            let payload = record.final_approved.as_ref().ok_or(ImportError::MissingStage {
                import_id: *import_id,
                stage: "final_approved",
            })?;
            let questions = payload.get("questions").ok_or_else(|| {
                ImportError::ValidationFailed(
                    "final payload carries no questions array".into(),
                )
            })?;
            serde_json::from_value(questions.clone()).map_err(|e| {
                ImportError::ValidationFailed(format!("malformed final questions: {e}"))
            })
        }
    }
}

/// Check one candidate; returns the index (within the normalized option
/// list) of the correct option.
fn validate_candidate(candidate: &CandidateQuestion) -> Result<usize, SkipReason> {
    if candidate.prompt.trim().is_empty() {
        return Err(SkipReason::EmptyPrompt);
    }

    let lettered = candidate.lettered_options();
    if lettered.len() < MIN_OPTIONS {
        return Err(SkipReason::TooFewOptions {
            found: lettered.len(),
        });
    }

    let correct_letter = candidate
        .correct
        .as_deref()
        .map(str::trim)
        .and_then(|s| s.chars().next())
        .map(|c| c.to_ascii_uppercase());

    match correct_letter {
        Some(letter) => lettered
            .iter()
            .position(|(option_letter, _)| *option_letter == letter)
            .ok_or_else(|| SkipReason::CorrectLetterUnmatched {
                letter: candidate.correct.clone(),
            }),
        None => Err(SkipReason::CorrectLetterUnmatched { letter: None }),
    }
}

fn insert_candidate(
    conn: &Connection,
    quiz: &crate::models::quiz::Quiz,
    caller: &Caller,
    candidate: &CandidateQuestion,
    correct_position: usize,
    order_index: i64,
) -> Result<(), ImportError> {
    let question = QuizQuestion {
        id: Uuid::new_v4(),
        quiz_id: quiz.id,
        prompt: candidate.prompt.trim().to_string(),
        difficulty: DifficultyTier::Basic,
        order_index,
        created_by: caller.id,
        created_at: chrono::Local::now().naive_local(),
    };
    repository::insert_question(conn, &question)?;

    for (position, (_, text)) in candidate.lettered_options().iter().enumerate() {
        let is_correct = position == correct_position;
        repository::insert_option(
            conn,
            &QuizOption {
                id: Uuid::new_v4(),
                question_id: question.id,
                text: text.to_string(),
                is_correct,
                explanation: if is_correct {
                    candidate.explanation.clone()
                } else {
                    None
                },
            },
        )?;
    }
    Ok(())
}
