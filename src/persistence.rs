//! JSON array-of-objects representation of a question batch.
//!
//! This is the on-disk and transport format used for printable quizzes, one object per
//! question with the exact keys `question`, `A`, `B`, `C`, `D`, `reponse` and an
//! optional `explanation`.

use std::path::Path;

use schemars::{schema_for, Schema};
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

use crate::error::PersistenceError;
use crate::question::{Question, QuestionBatch};
use crate::validate::{clean_values, CleanReport};

pub fn to_json(questions: &[Question]) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string_pretty(questions)?)
}

/// Parse a JSON array of question records, validating each one. Malformed records
/// end up in `CleanReport::rejected`; a document that is not an array is an error.
pub fn from_json(json: &str) -> Result<CleanReport, PersistenceError> {
    let records: Vec<Value> = serde_json::from_str(json)?;
    Ok(clean_values(records))
}

/// JSON Schema of the batch format, for downstream consumers.
pub fn question_batch_schema() -> Schema {
    schema_for!(QuestionBatch)
}

#[instrument(target = "quizgen::persistence", skip(questions), fields(count = questions.len()))]
pub async fn save_batch(path: &Path, questions: &[Question]) -> Result<(), PersistenceError> {
    let json = to_json(questions)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let mut file = fs::File::create(path).await?;
    file.write_all(json.as_bytes()).await?;
    file.flush().await?;
    info!(path = %path.display(), "Saved question batch");
    Ok(())
}

#[instrument(target = "quizgen::persistence")]
pub async fn load_batch(path: &Path) -> Result<CleanReport, PersistenceError> {
    let json = fs::read_to_string(path).await?;
    let report = from_json(&json)?;
    info!(
        path = %path.display(),
        kept = report.questions.len(),
        rejected = report.rejected.len(),
        "Loaded question batch"
    );
    Ok(report)
}
