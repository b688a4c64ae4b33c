use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::RetryConfig;
use crate::parser::{QuestionLayout, PAIR_QUESTION_COUNT};

/// Trait for types that can retrieve their configuration key from environment variables
pub trait KeyFromEnv {
    /// The environment variable name for this client's API key
    const KEY_NAME: &'static str;

    /// Find the API key by checking environment variables first, then .env file
    fn find_key() -> Option<String> {
        // Silently continue when there is no .env file
        let _ = dotenvy::dotenv();

        env::var(Self::KEY_NAME).ok().filter(|key| !key.trim().is_empty())
    }
}

/// Pipeline settings, read from `QUIZGEN_*` environment variables.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub layout: QuestionLayout,
    pub max_concurrency: usize,
    pub retry: RetryConfig,
    /// Where prompt/completion transcripts are written; disabled when unset.
    pub transcript_dir: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            layout: QuestionLayout::Pair,
            max_concurrency: 4,
            retry: RetryConfig::default(),
            transcript_dir: None,
        }
    }
}

impl GeneratorConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unknown or unparsable values fall back to
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let number = |key: &str| lookup(key).and_then(|v| v.trim().parse::<usize>().ok());

        let count = number("QUIZGEN_QUESTIONS_PER_CALL").unwrap_or(PAIR_QUESTION_COUNT);
        let layout = lookup("QUIZGEN_LAYOUT")
            .and_then(|v| QuestionLayout::from_str(&v, count).ok())
            .unwrap_or(defaults.layout);

        Self {
            layout,
            max_concurrency: number("QUIZGEN_MAX_CONCURRENCY")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_concurrency),
            retry: RetryConfig {
                parse_retries: number("QUIZGEN_PARSE_RETRIES").unwrap_or(defaults.retry.parse_retries),
                model_timeout: number("QUIZGEN_MODEL_TIMEOUT_SECS")
                    .map(|secs| Duration::from_secs(secs as u64))
                    .unwrap_or(defaults.retry.model_timeout),
            },
            transcript_dir: lookup("QUIZGEN_TRANSCRIPT_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = GeneratorConfig::from_lookup(lookup(&[]));
        assert_eq!(config.layout, QuestionLayout::Pair);
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.retry.parse_retries, 0);
        assert_eq!(config.retry.model_timeout, Duration::from_secs(120));
        assert!(config.transcript_dir.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = GeneratorConfig::from_lookup(lookup(&[
            ("QUIZGEN_LAYOUT", "blocks"),
            ("QUIZGEN_QUESTIONS_PER_CALL", "6"),
            ("QUIZGEN_MAX_CONCURRENCY", "2"),
            ("QUIZGEN_PARSE_RETRIES", "3"),
            ("QUIZGEN_MODEL_TIMEOUT_SECS", "30"),
            ("QUIZGEN_TRANSCRIPT_DIR", "transcripts"),
        ]));
        assert_eq!(config.layout, QuestionLayout::Blocks { count: 6 });
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.retry.parse_retries, 3);
        assert_eq!(config.retry.model_timeout, Duration::from_secs(30));
        assert_eq!(config.transcript_dir, Some(PathBuf::from("transcripts")));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = GeneratorConfig::from_lookup(lookup(&[
            ("QUIZGEN_LAYOUT", "triple"),
            ("QUIZGEN_MAX_CONCURRENCY", "0"),
            ("QUIZGEN_PARSE_RETRIES", "many"),
        ]));
        assert_eq!(config.layout, QuestionLayout::Pair);
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.retry.parse_retries, 0);
    }
}
