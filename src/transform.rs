//! Record transformer: flat field mappings → canonical questions.
//!
//! Input is tagged once at the boundary. The parser always produces
//! `TransformInput::RawPositional`; anything already in canonical form (a loaded
//! quiz, a previous transform) is `TransformInput::Canonical` and passes through
//! unchanged.

use tracing::{debug, instrument};

use crate::error::TransformError;
use crate::question::{keys, AnswerLetter, FieldMapping, Question, QuestionBatch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformInput {
    RawPositional(Vec<FieldMapping>),
    Canonical(QuestionBatch),
}

impl From<FieldMapping> for TransformInput {
    fn from(mapping: FieldMapping) -> Self {
        TransformInput::RawPositional(vec![mapping])
    }
}

impl From<Vec<FieldMapping>> for TransformInput {
    fn from(mappings: Vec<FieldMapping>) -> Self {
        TransformInput::RawPositional(mappings)
    }
}

impl From<QuestionBatch> for TransformInput {
    fn from(questions: QuestionBatch) -> Self {
        TransformInput::Canonical(questions)
    }
}

/// Produce the question batch for `input`, mappings in order and questions within a
/// mapping by ascending index.
#[instrument(target = "quizgen::transform", skip(input))]
pub fn transform(input: impl Into<TransformInput>) -> Result<QuestionBatch, TransformError> {
    match input.into() {
        TransformInput::Canonical(questions) => Ok(questions),
        TransformInput::RawPositional(mappings) => {
            let mut questions = Vec::new();
            for mapping in &mappings {
                questions.extend(transform_mapping(mapping)?);
            }
            debug!(mappings = mappings.len(), questions = questions.len(), "Transformed field mappings");
            Ok(questions)
        }
    }
}

/// Questions of a single mapping. Values are trimmed; a missing companion field
/// fails the whole mapping.
pub fn transform_mapping(mapping: &FieldMapping) -> Result<QuestionBatch, TransformError> {
    let mut indices: Vec<char> = mapping.keys().filter_map(keys::question_index).collect();
    indices.sort_unstable();

    indices
        .into_iter()
        .map(|n| build_question(mapping, n))
        .collect()
}

fn build_question(mapping: &FieldMapping, n: char) -> Result<Question, TransformError> {
    let required = |key: String| -> Result<String, TransformError> {
        mapping
            .get(&key)
            .map(|v| v.trim().to_string())
            .ok_or(TransformError::MissingField { field: key, index: n })
    };

    Ok(Question {
        question: required(keys::question(n))?,
        a: required(keys::option(AnswerLetter::A, n))?,
        b: required(keys::option(AnswerLetter::B, n))?,
        c: required(keys::option(AnswerLetter::C, n))?,
        d: required(keys::option(AnswerLetter::D, n))?,
        reponse: required(keys::reponse(n))?,
        explanation: mapping
            .get(&keys::explanation(n))
            .map(|v| v.trim().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, &str)]) -> FieldMapping {
        pairs.iter().copied().collect()
    }

    #[test]
    fn trims_captured_values() {
        let m = mapping(&[
            ("question1", " Q1 "),
            ("A_1", "a\r"),
            ("B_1", "b"),
            ("C_1", "c"),
            ("D_1", "d"),
            ("reponse1", "B  "),
        ]);
        let questions = transform_mapping(&m).unwrap();
        assert_eq!(questions[0].question, "Q1");
        assert_eq!(questions[0].a, "a");
        assert_eq!(questions[0].reponse, "B");
    }

    #[test]
    fn ignores_multi_digit_question_keys() {
        let m = mapping(&[("question10", "ignored"), ("note", "x")]);
        assert!(transform_mapping(&m).unwrap().is_empty());
    }

    #[test]
    fn missing_answer_names_the_field() {
        let m = mapping(&[
            ("question2", "Q2"),
            ("A_2", "a"),
            ("B_2", "b"),
            ("C_2", "c"),
            ("D_2", "d"),
        ]);
        assert_eq!(
            transform_mapping(&m),
            Err(TransformError::MissingField { field: "reponse2".into(), index: '2' })
        );
    }
}
