use crate::config::KeyFromEnv;
use crate::core::LowLevelClient;
use crate::error::{AIError, OpenAIError};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OpenAIModel {
    Gpt4o,
    #[default]
    Gpt4oMini,
    Gpt41,
    Gpt41Mini,
    Gpt35Turbo,
    Override(String),
}

impl OpenAIModel {
    pub fn id(&self) -> &str {
        match self {
            Self::Gpt4o => "gpt-4o",
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::Gpt41 => "gpt-4.1",
            Self::Gpt41Mini => "gpt-4.1-mini",
            Self::Gpt35Turbo => "gpt-3.5-turbo",
            Self::Override(s) => s.as_str(),
        }
    }

    pub fn from_id(id: &str) -> Self {
        [Self::Gpt4o, Self::Gpt4oMini, Self::Gpt41, Self::Gpt41Mini, Self::Gpt35Turbo]
            .into_iter()
            .find(|m| m.id() == id)
            .unwrap_or_else(|| Self::Override(id.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub model: OpenAIModel,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: OpenAIModel::default(),
            base_url: OPENAI_BASE_URL.to_string(),
            max_tokens: 2048,
            temperature: 0.2,
        }
    }
}

#[derive(Clone)]
pub struct OpenAIClient {
    config: OpenAIConfig,
    http: reqwest::Client,
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("model", &self.config.model.id())
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl KeyFromEnv for OpenAIClient {
    const KEY_NAME: &'static str = "OPENAI_API_KEY";
}

impl OpenAIClient {
    pub fn new(config: OpenAIConfig) -> Self {
        info!(model = %config.model.id(), "Creating new OpenAI client");
        Self { config, http: reqwest::Client::new() }
    }

    /// Build from `OPENAI_API_KEY` (environment or .env) and optional `OPENAI_MODEL`.
    pub fn from_env() -> Result<Self, AIError> {
        let api_key = Self::find_key().ok_or(AIError::OpenAI(OpenAIError::Authentication))?;
        let model = std::env::var("OPENAI_MODEL")
            .map(|id| OpenAIModel::from_id(&id))
            .unwrap_or_default();
        Ok(Self::new(OpenAIConfig { api_key, model, ..Default::default() }))
    }

    fn messages_body(&self, prompt: String) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model.id(),
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        })
    }
}

#[async_trait]
impl LowLevelClient for OpenAIClient {
    #[instrument(target = "quizgen::client", skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model.id()))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        let body = self.messages_body(prompt);
        debug!("Sending request to OpenAI API");
        let resp = self.http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send().await
            .map_err(|e| AIError::OpenAI(OpenAIError::Http(e.to_string())))?;

        if resp.status() == 401 { return Err(AIError::OpenAI(OpenAIError::Authentication)); }
        if resp.status() == 429 { return Err(AIError::OpenAI(OpenAIError::RateLimit)); }
        if !resp.status().is_success() {
            let txt = resp.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(error = %txt, "OpenAI API error");
            return Err(AIError::OpenAI(OpenAIError::Api(txt)));
        }

        #[derive(Deserialize)]
        struct Choices { choices: Vec<Choice> }
        #[derive(Deserialize)]
        struct Choice { message: Msg }
        #[derive(Deserialize)]
        struct Msg { content: Option<String> }

        let parsed: Choices = resp.json().await
            .map_err(|e| AIError::OpenAI(OpenAIError::Http(e.to_string())))?;
        let content = parsed.choices.into_iter().next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AIError::OpenAI(OpenAIError::Api("No choices".into())))?;
        info!(completion_len = content.len(), "Received OpenAI completion");
        Ok(content)
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> { Box::new(self.clone()) }
}
