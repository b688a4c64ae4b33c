//! Question validator/cleaner.
//!
//! A record is valid iff `question`, `A`, `B`, `C`, `D` and `reponse` are present and
//! non-empty and `reponse` is exactly one of `A`, `B`, `C`, `D` (no trimming, no case
//! folding). Invalid records are dropped from the batch and reported; they never
//! abort it.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::question::{AnswerLetter, Question, QuestionBatch};

pub const REQUIRED_FIELDS: [&str; 6] = ["question", "A", "B", "C", "D", "reponse"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "field", rename_all = "snake_case")]
pub enum RejectionReason {
    NotAnObject,
    MissingField(String),
    EmptyField(String),
    NotAString(String),
    InvalidAnswer(String),
    /// Passed the field checks but still did not deserialize into a `Question`.
    Malformed(String),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::NotAnObject => write!(f, "record is not an object"),
            RejectionReason::MissingField(field) => write!(f, "missing field `{}`", field),
            RejectionReason::EmptyField(field) => write!(f, "empty field `{}`", field),
            RejectionReason::NotAString(field) => write!(f, "field `{}` is not a string", field),
            RejectionReason::InvalidAnswer(answer) => {
                write!(f, "answer {:?} is not one of A, B, C, D", answer)
            }
            RejectionReason::Malformed(error) => write!(f, "malformed record: {}", error),
        }
    }
}

/// A dropped record together with why it was dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub record: Value,
    pub reason: RejectionReason,
}

/// Outcome of cleaning a batch: surviving questions in their original order, and
/// everything that was dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanReport {
    pub questions: QuestionBatch,
    pub rejected: Vec<Rejection>,
}

impl CleanReport {
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    fn reject(&mut self, record: Value, reason: RejectionReason) {
        warn!(target: "quizgen::validate", %reason, record = %record, "Dropping malformed question");
        self.rejected.push(Rejection { record, reason });
    }
}

pub fn validate_question(question: &Question) -> Result<(), RejectionReason> {
    let fields = [
        ("question", &question.question),
        ("A", &question.a),
        ("B", &question.b),
        ("C", &question.c),
        ("D", &question.d),
        ("reponse", &question.reponse),
    ];
    if let Some((name, _)) = fields.iter().find(|(_, value)| value.is_empty()) {
        return Err(RejectionReason::EmptyField(name.to_string()));
    }
    check_answer(&question.reponse)
}

fn check_answer(answer: &str) -> Result<(), RejectionReason> {
    AnswerLetter::from_exact(answer)
        .map(|_| ())
        .ok_or_else(|| RejectionReason::InvalidAnswer(answer.to_string()))
}

/// Validate an untyped record (e.g. loaded from JSON) and convert it when valid.
pub fn validate_value(record: &Value) -> Result<Question, RejectionReason> {
    let object = record.as_object().ok_or(RejectionReason::NotAnObject)?;

    for field in REQUIRED_FIELDS {
        match object.get(field) {
            None | Some(Value::Null) => return Err(RejectionReason::MissingField(field.to_string())),
            Some(Value::String(s)) if s.is_empty() => {
                return Err(RejectionReason::EmptyField(field.to_string()))
            }
            Some(Value::String(_)) => {}
            Some(_) => return Err(RejectionReason::NotAString(field.to_string())),
        }
    }
    // `null` reads as an absent explanation
    match object.get("explanation") {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(_) => return Err(RejectionReason::NotAString("explanation".to_string())),
    }

    let question: Question = serde_json::from_value(record.clone())
        .map_err(|e| RejectionReason::Malformed(e.to_string()))?;
    check_answer(&question.reponse)?;
    Ok(question)
}

/// Keep valid questions, report the rest.
pub fn clean_questions(questions: QuestionBatch) -> CleanReport {
    let mut report = CleanReport::default();
    for question in questions {
        match validate_question(&question) {
            Ok(()) => report.questions.push(question),
            Err(reason) => {
                let record = serde_json::to_value(&question).unwrap_or(Value::Null);
                report.reject(record, reason);
            }
        }
    }
    debug!(
        target: "quizgen::validate",
        kept = report.questions.len(),
        rejected = report.rejected.len(),
        "Cleaned question batch"
    );
    report
}

/// `clean_questions` for untyped records.
pub fn clean_values(records: Vec<Value>) -> CleanReport {
    let mut report = CleanReport::default();
    for record in records {
        match validate_value(&record) {
            Ok(question) => report.questions.push(question),
            Err(reason) => report.reject(record, reason),
        }
    }
    report
}
