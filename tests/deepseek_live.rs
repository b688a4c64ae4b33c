#![cfg(feature = "deepseek")]

use quizgen::clients::flexible::{ClientType, FlexibleClient};
use quizgen::{QuestionLayout, QuizGenerator, RetryConfig};
use std::sync::Once;

fn init_tracing() {
    static START: Once = Once::new();
    START.call_once(|| {
        // Load .env first so RUST_LOG in .env is seen
        let _ = dotenvy::dotenv();
        let filter = if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::EnvFilter::from_default_env()
        } else {
            tracing_subscriber::EnvFilter::new("quizgen::pipeline=info,quizgen::validate=warn")
        };

        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .without_time()
            .with_env_filter(filter)
            .try_init();
    });
}

const DOCUMENT: &str = "La fotosíntesis es el proceso por el cual las plantas verdes \
transforman la energía de la luz en energía química. Tiene lugar en los cloroplastos, \
que contienen clorofila. Los productos principales son glucosa y oxígeno, y los \
reactivos son dióxido de carbono y agua.";

#[tokio::test]
#[ignore]
async fn deepseek_pair_layout_yields_questions() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let client = FlexibleClient::from_type(ClientType::DeepSeek)?;
    let generator = QuizGenerator::new(client, QuestionLayout::Pair)
        .with_retry_config(RetryConfig { parse_retries: 2, ..Default::default() });

    let quiz = generator.generate(DOCUMENT).await?;
    println!("[deepseek_pair_layout_yields_questions] {} questions after {} attempts", quiz.questions.len(), quiz.attempts);

    assert!(!quiz.questions.is_empty() && quiz.questions.len() <= 2);
    for question in &quiz.questions {
        assert!(question.answer_letter().is_some());
    }
    Ok(())
}

#[tokio::test]
#[ignore]
async fn deepseek_blocks_layout_yields_questions() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let client = FlexibleClient::from_type(ClientType::DeepSeek)?;
    let generator = QuizGenerator::new(client, QuestionLayout::Blocks { count: 4 })
        .with_retry_config(RetryConfig { parse_retries: 2, ..Default::default() });

    let quiz = generator.generate(DOCUMENT).await?;
    println!(
        "[deepseek_blocks_layout_yields_questions] kept={} rejected={}",
        quiz.questions.len(),
        quiz.rejected.len()
    );
    assert!(!quiz.questions.is_empty());
    Ok(())
}
