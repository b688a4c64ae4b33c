use std::time::Duration;

use thiserror::Error;

use crate::validate::Rejection;

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("AI error: {0}")]
    Ai(#[from] AIError),
    #[error(transparent)]
    Parse(#[from] ParseFailure),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("No valid questions left after cleaning ({} rejected)", rejected.len())]
    NoValidQuestions { rejected: Vec<Rejection> },
    #[error("Max retries exceeded after {attempts} attempts: {last}")]
    MaxRetriesExceeded { attempts: usize, last: ParseFailure },
    #[error("Generation task failed: {0}")]
    TaskFailed(String),
}

impl QuizError {
    /// Whether a caller should offer to regenerate the quiz from the same document.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            QuizError::Parse(_)
                | QuizError::MaxRetriesExceeded { .. }
                | QuizError::NoValidQuestions { .. }
                | QuizError::Ai(AIError::Timeout(_))
                | QuizError::Ai(AIError::DeepSeek(DeepSeekError::RateLimit))
                | QuizError::Ai(AIError::OpenAI(OpenAIError::RateLimit))
        )
    }
}

/// The model completion did not match the requested layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Completion did not match the {layout} layout ({completion_len} bytes): {preview:?}")]
pub struct ParseFailure {
    pub layout: &'static str,
    pub completion_len: usize,
    pub preview: String,
}

impl ParseFailure {
    const PREVIEW_CHARS: usize = 120;

    pub fn new(layout: &'static str, completion: &str) -> Self {
        Self {
            layout,
            completion_len: completion.len(),
            preview: completion.chars().take(Self::PREVIEW_CHARS).collect(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("Missing field `{field}` for question {index}")]
    MissingField { field: String, index: char },
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot start a game with no questions")]
    EmptyGame,
    #[error("Question {0} was already answered")]
    AlreadyAnswered(usize),
    #[error("Game is over")]
    GameOver,
}

#[derive(Error, Debug)]
pub enum AIError {
    #[error("DeepSeek API error: {0}")]
    DeepSeek(#[from] DeepSeekError),
    #[error("OpenAI API error: {0}")]
    OpenAI(#[from] OpenAIError),
    #[error("Mock client error: {0}")]
    Mock(String),
    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Error, Debug)]
pub enum OpenAIError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

#[derive(Error, Debug)]
pub enum DeepSeekError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_failure_preview_is_bounded() {
        let completion = "x".repeat(500);
        let failure = ParseFailure::new("pair", &completion);
        assert_eq!(failure.completion_len, 500);
        assert_eq!(failure.preview.chars().count(), 120);
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = TransformError::MissingField { field: "A_1".into(), index: '1' };
        assert_eq!(err.to_string(), "Missing field `A_1` for question 1");
    }

    #[test]
    fn retryable_classification() {
        let parse = QuizError::Parse(ParseFailure::new("pair", "nope"));
        assert!(parse.is_retryable());

        let auth = QuizError::Ai(AIError::DeepSeek(DeepSeekError::Authentication));
        assert!(!auth.is_retryable());

        let missing = QuizError::Transform(TransformError::MissingField {
            field: "reponse2".into(),
            index: '2',
        });
        assert!(!missing.is_retryable());
    }
}
