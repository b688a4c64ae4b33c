pub mod clients;
pub mod config;
pub mod core;
pub mod error;
pub mod interceptors;
pub mod parser;
pub mod persistence;
pub mod prompt;
pub mod question;
pub mod session;
pub mod transform;
pub mod validate;

// Convenient re-exports
pub use crate::core::{GeneratedQuiz, LowLevelClient, QuizGenerator, RetryConfig};
pub use error::{QuizError, ParseFailure, TransformError};
pub use parser::{CompletionParser, QuestionLayout};
pub use prompt::{build_prompt, PromptBuilder};
pub use question::{AnswerLetter, FieldMapping, Question, QuestionBatch};
pub use transform::{transform, TransformInput};
pub use validate::{clean_questions, CleanReport, Rejection, RejectionReason};
