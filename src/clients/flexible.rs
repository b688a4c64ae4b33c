use crate::core::LowLevelClient;
use crate::error::AIError;
use async_trait::async_trait;
use std::env;
use std::sync::Arc;


/// Which model backend to use, chosen at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    #[cfg(feature = "deepseek")]
    DeepSeek,
    #[cfg(feature = "openai")]
    OpenAI,
    Mock,
}

impl Default for ClientType {
    /// Pick the first backend with an API key available, falling back to the mock
    fn default() -> Self {
        #[allow(unused_variables)]
        let has_key = |name: &str| {
            env::var(name).is_ok()
                || std::fs::read_to_string(".env").map_or(false, |content| content.contains(name))
        };
        #[cfg(feature = "deepseek")]
        if has_key("DEEPSEEK_API_KEY") {
            return Self::DeepSeek;
        }
        #[cfg(feature = "openai")]
        if has_key("OPENAI_API_KEY") {
            return Self::OpenAI;
        }
        Self::Mock
    }
}

impl ClientType {
    /// Parse client type from string (case insensitive)
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            #[cfg(feature = "deepseek")]
            "deepseek" => Ok(Self::DeepSeek),
            #[cfg(feature = "openai")]
            "openai" => Ok(Self::OpenAI),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown client type: '{}'. Supported: deepseek, openai, mock", s))
        }
    }
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "deepseek")]
            ClientType::DeepSeek => write!(f, "DeepSeek"),
            #[cfg(feature = "openai")]
            ClientType::OpenAI => write!(f, "OpenAI"),
            ClientType::Mock => write!(f, "Mock"),
        }
    }
}


/// Runtime-selected client behind a single concrete type
#[derive(Debug, Clone)]
pub struct FlexibleClient {
    inner: Arc<dyn LowLevelClient>,
    client_type: ClientType,
}

impl FlexibleClient {
    /// Create a FlexibleClient wrapping the given client
    pub fn new(client: Box<dyn LowLevelClient>, client_type: ClientType) -> Self {
        Self { inner: Arc::from(client), client_type }
    }

    /// Build the backend for `client_type`, reading API keys from the environment.
    /// The mock variant comes without a handle and so has no scripted replies.
    pub fn from_type(client_type: ClientType) -> Result<Self, AIError> {
        let client: Box<dyn LowLevelClient> = match client_type {
            #[cfg(feature = "deepseek")]
            ClientType::DeepSeek => Box::new(super::deepseek::DeepSeekClient::from_env()?),
            #[cfg(feature = "openai")]
            ClientType::OpenAI => Box::new(super::openai::OpenAIClient::from_env()?),
            ClientType::Mock => Box::new(super::mock::MockClient::new().0),
        };
        Ok(Self::new(client, client_type))
    }

    /// Create a FlexibleClient with a mock and return the handle for configuration
    pub fn mock() -> (Self, Arc<super::mock::MockHandle>) {
        let (mock_client, handle) = super::mock::MockClient::new();
        (Self::new(Box::new(mock_client), ClientType::Mock), handle)
    }

    pub fn client_type(&self) -> ClientType {
        self.client_type
    }
}

#[async_trait]
impl LowLevelClient for FlexibleClient {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        self.inner.ask_raw(prompt).await
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::mock::MockResponse;

    #[test]
    fn client_type_parsing() {
        assert_eq!(ClientType::from_str("MOCK"), Ok(ClientType::Mock));
        #[cfg(feature = "deepseek")]
        assert_eq!(ClientType::from_str("deepseek"), Ok(ClientType::DeepSeek));
        #[cfg(feature = "openai")]
        assert_eq!(ClientType::from_str("OpenAI"), Ok(ClientType::OpenAI));
        assert!(ClientType::from_str("claude").is_err());
    }

    #[tokio::test]
    async fn mock_handle_drives_flexible_client() {
        let (client, handle) = FlexibleClient::mock();
        handle.add_response(MockResponse::Success("ok".into()));
        let cloned = client.clone_box();
        assert_eq!(cloned.ask_raw("p".into()).await.unwrap(), "ok");
        assert_eq!(client.client_type(), ClientType::Mock);
        assert_eq!(handle.call_count(), 1);
    }
}
