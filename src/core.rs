//! Core pipeline: wraps a low-level model client and turns a source document into a
//! validated question batch.
//!
//! prompt → model call → parse → transform → clean
//!
//! - `QuizGenerator::generate` runs the whole pipeline for one document
//! - `QuizGenerator::generate_many` fans out over independent documents with a cap on
//!   in-flight model calls
//! - `QuizGenerator::process_completion` runs only the synchronous tail, for callers
//!   that talk to the model themselves

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, warn};

use crate::config::GeneratorConfig;
use crate::error::{AIError, QuizError};
use crate::interceptors::Interceptor;
use crate::parser::{CompletionParser, QuestionLayout};
use crate::prompt::PromptBuilder;
use crate::question::QuestionBatch;
use crate::transform::transform;
use crate::validate::{clean_questions, CleanReport, Rejection};

/// Low-level model client abstraction.
///
/// Implementors provide `ask_raw`, which sends one prompt and returns the raw
/// completion text. No structured output mode is assumed.
#[async_trait]
pub trait LowLevelClient: Send + Sync + Debug {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError>;

    /// Clone this client into a boxed trait object
    fn clone_box(&self) -> Box<dyn LowLevelClient>;
}

impl Clone for Box<dyn LowLevelClient> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[async_trait]
impl LowLevelClient for Box<dyn LowLevelClient> {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        self.as_ref().ask_raw(prompt).await
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        self.as_ref().clone_box()
    }
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Extra model calls allowed when a completion fails to parse.
    pub parse_retries: usize,
    pub model_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            parse_retries: 0,
            model_timeout: Duration::from_secs(120),
        }
    }
}

/// A generated quiz. It may hold fewer questions than were asked for: a reduced set of
/// valid questions is still a usable quiz, but `is_degraded` reports it.
#[derive(Debug, Clone)]
pub struct GeneratedQuiz {
    pub questions: QuestionBatch,
    pub rejected: Vec<Rejection>,
    /// Questions the prompt asked for.
    pub requested: usize,
    /// Model calls made, including parse retries.
    pub attempts: usize,
}

impl GeneratedQuiz {
    /// Requested questions that are not in the quiz.
    pub fn missing(&self) -> usize {
        self.requested.saturating_sub(self.questions.len())
    }

    pub fn is_degraded(&self) -> bool {
        !self.rejected.is_empty() || self.missing() > 0
    }
}

#[derive(Clone)]
pub struct QuizGenerator<C: LowLevelClient> {
    client: C,
    prompt: PromptBuilder,
    parser: CompletionParser,
    config: RetryConfig,
    max_concurrency: usize,
    interceptor: Option<Arc<dyn Interceptor>>,
}

impl<C: LowLevelClient> Debug for QuizGenerator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizGenerator")
            .field("client", &self.client)
            .field("layout", &self.parser.layout())
            .field("config", &self.config)
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}

impl<C: LowLevelClient> QuizGenerator<C> {
    pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

    pub fn new(client: C, layout: QuestionLayout) -> Self {
        info!(layout = layout.name(), "Creating new QuizGenerator");
        Self {
            client,
            prompt: PromptBuilder::new(layout),
            parser: CompletionParser::new(layout),
            config: RetryConfig::default(),
            max_concurrency: Self::DEFAULT_MAX_CONCURRENCY,
            interceptor: None,
        }
    }

    pub fn from_config(client: C, config: &GeneratorConfig) -> Self {
        let mut generator = Self::new(client, config.layout)
            .with_retry_config(config.retry.clone())
            .with_max_concurrency(config.max_concurrency);
        if let Some(dir) = &config.transcript_dir {
            generator = generator.with_interceptor(Arc::new(
                crate::interceptors::FileInterceptor::new(dir.clone()),
            ));
        }
        generator
    }

    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn layout(&self) -> QuestionLayout {
        self.parser.layout()
    }

    /// Prompt that `generate` would send for `document`.
    pub fn prompt_for(&self, document: &str) -> String {
        self.prompt.build(document)
    }

    /// Generate a quiz from one source document.
    ///
    /// A completion that does not parse is retried with the same prompt up to
    /// `RetryConfig::parse_retries` times. Model-call failures and missing fields abort
    /// immediately.
    #[instrument(target = "quizgen::pipeline", skip(self, document), fields(document_len = document.len()))]
    pub async fn generate(&self, document: &str) -> Result<GeneratedQuiz, QuizError> {
        let prompt = self.prompt.build(document);
        let mut attempts = 0;

        loop {
            attempts += 1;
            let completion = self.ask(&prompt).await?;

            match self.process_completion(&completion) {
                Ok(report) => {
                    let quiz = GeneratedQuiz {
                        questions: report.questions,
                        rejected: report.rejected,
                        requested: self.layout().requested_count(),
                        attempts,
                    };
                    let extracted = quiz.questions.len() + quiz.rejected.len();
                    if extracted < quiz.requested {
                        warn!(
                            requested = quiz.requested,
                            extracted,
                            "Completion held fewer questions than requested"
                        );
                    }
                    info!(
                        attempts,
                        questions = quiz.questions.len(),
                        rejected = quiz.rejected.len(),
                        missing = quiz.missing(),
                        "Generated quiz"
                    );
                    return Ok(quiz);
                }
                Err(QuizError::Parse(failure)) => {
                    warn!(attempt = attempts, error = %failure, "Completion did not parse");
                    if attempts > self.config.parse_retries {
                        return Err(if attempts == 1 {
                            QuizError::Parse(failure)
                        } else {
                            QuizError::MaxRetriesExceeded { attempts, last: failure }
                        });
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Parse, transform and clean a raw completion.
    pub fn process_completion(&self, completion: &str) -> Result<CleanReport, QuizError> {
        let mappings = self.parser.parse(completion)?;
        let questions = transform(mappings)?;
        let report = clean_questions(questions);
        if report.questions.is_empty() {
            return Err(QuizError::NoValidQuestions { rejected: report.rejected });
        }
        Ok(report)
    }

    async fn ask(&self, prompt: &str) -> Result<String, AIError> {
        let timeout = self.config.model_timeout;
        debug!(prompt_len = prompt.len(), ?timeout, "Calling model");

        let completion = tokio::time::timeout(timeout, self.client.ask_raw(prompt.to_string()))
            .await
            .map_err(|_| {
                error!(?timeout, "Model call timed out");
                AIError::Timeout(timeout)
            })??;

        if let Some(interceptor) = &self.interceptor {
            if let Err(e) = interceptor.save(prompt, &completion).await {
                warn!(error = %e, "Failed to save transcript");
            }
        }
        Ok(completion)
    }
}

impl<C: LowLevelClient + Clone + 'static> QuizGenerator<C> {
    /// Generate one quiz per document, with at most `max_concurrency` pipelines
    /// in flight. Results are in input order.
    #[instrument(target = "quizgen::pipeline", skip(self, documents), fields(documents = documents.len()))]
    pub async fn generate_many(&self, documents: Vec<String>) -> Vec<Result<GeneratedQuiz, QuizError>> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));

        let handles: Vec<_> = documents
            .into_iter()
            .map(|document| {
                let generator = self.clone();
                let semaphore = Arc::clone(&semaphore);
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await;
                    generator.generate(&document).await
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await.unwrap_or_else(|e| {
                error!(error = %e, "Generation task failed");
                Err(QuizError::TaskFailed(e.to_string()))
            }));
        }
        results
    }
}
