use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use quizgen::clients::{ClientType, FlexibleClient};
use quizgen::config::GeneratorConfig;
use quizgen::parser::{QuestionLayout, PAIR_QUESTION_COUNT};
use quizgen::persistence::{question_batch_schema, save_batch, to_json};
use quizgen::QuizGenerator;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Generate a multiple-choice quiz from a document", long_about = None)]
#[command(after_help = "ENVIRONMENT VARIABLES:
    DEEPSEEK_API_KEY             API key for the DeepSeek client
    OPENAI_API_KEY               API key for the OpenAI client
    QUIZGEN_LAYOUT               pair|blocks
    QUIZGEN_QUESTIONS_PER_CALL   Questions requested in blocks layout
    QUIZGEN_PARSE_RETRIES        Extra model calls when a completion does not parse
    QUIZGEN_MODEL_TIMEOUT_SECS   Model call timeout
    QUIZGEN_TRANSCRIPT_DIR       Save every prompt/completion under this directory
    RUST_LOG                     Log filter (default: quizgen=info)

EXAMPLES:
    quizgen --input notes.txt
    cat notes.txt | quizgen --layout blocks --questions 5 --output quiz.json
    quizgen --schema")]
struct Args {
    /// Document to read [default: stdin]
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Model backend: deepseek, openai, mock [default: auto-detect]
    #[arg(short, long)]
    client: Option<String>,

    /// Completion layout: pair, blocks
    #[arg(short, long)]
    layout: Option<String>,

    /// Questions to request in blocks layout
    #[arg(short, long)]
    questions: Option<usize>,

    /// Extra model calls when a completion does not parse
    #[arg(short, long)]
    retries: Option<usize>,

    /// Directory for prompt/completion transcripts
    #[arg(long)]
    transcripts: Option<PathBuf>,

    /// Write the JSON batch here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the JSON Schema of the batch format and exit
    #[arg(long)]
    schema: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quizgen=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Layer CLI flags over the environment config.
fn apply_overrides(mut config: GeneratorConfig, args: &Args) -> anyhow::Result<GeneratorConfig> {
    if let Some(layout) = &args.layout {
        let count = config.layout.requested_count();
        config.layout = QuestionLayout::from_str(layout, count).map_err(anyhow::Error::msg)?;
    }
    if let Some(count) = args.questions {
        match config.layout {
            QuestionLayout::Blocks { .. } => {
                config.layout = QuestionLayout::Blocks { count: count.max(1) };
            }
            QuestionLayout::Pair => bail!(
                "--questions only applies to the blocks layout; pair always asks for {PAIR_QUESTION_COUNT}"
            ),
        }
    }
    if let Some(retries) = args.retries {
        config.retry.parse_retries = retries;
    }
    if let Some(dir) = &args.transcripts {
        config.transcript_dir = Some(dir.clone());
    }
    Ok(config)
}

fn read_document(input: Option<&PathBuf>) -> anyhow::Result<String> {
    let document = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };
    if document.trim().is_empty() {
        bail!("document is empty");
    }
    Ok(document)
}

async fn run(args: Args) -> anyhow::Result<()> {
    if args.schema {
        println!("{}", serde_json::to_string_pretty(&question_batch_schema())?);
        return Ok(());
    }

    let config = apply_overrides(GeneratorConfig::from_env(), &args)?;
    let client_type = match &args.client {
        Some(name) => ClientType::from_str(name).map_err(anyhow::Error::msg)?,
        None => ClientType::default(),
    };
    if client_type == ClientType::Mock {
        warn!("Using the mock client: no scripted replies, generation will fail");
    }
    let client = FlexibleClient::from_type(client_type)?;
    let document = read_document(args.input.as_ref())?;

    info!(client = %client_type, layout = config.layout.name(), "Generating quiz");
    let generator = QuizGenerator::from_config(client, &config);
    let quiz = generator.generate(&document).await?;

    if quiz.is_degraded() {
        warn!(
            requested = quiz.requested,
            kept = quiz.questions.len(),
            rejected = quiz.rejected.len(),
            "Quiz has fewer questions than requested"
        );
    }

    match &args.output {
        Some(path) => save_batch(path, &quiz.questions).await?,
        None => println!("{}", to_json(&quiz.questions)?),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Quiz generation failed");
            if let Some(quiz_error) = e.downcast_ref::<quizgen::QuizError>() {
                if quiz_error.is_retryable() {
                    eprintln!("Could not generate questions from this document. Try again to regenerate the quiz.");
                }
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("quizgen").chain(argv.iter().copied()))
    }

    #[test]
    fn questions_flag_sets_block_count() {
        let config = apply_overrides(GeneratorConfig::default(), &args(&["--layout", "blocks", "--questions", "6"])).unwrap();
        assert_eq!(config.layout, QuestionLayout::Blocks { count: 6 });
    }

    #[test]
    fn questions_flag_overrides_env_block_count() {
        let base = GeneratorConfig { layout: QuestionLayout::Blocks { count: 3 }, ..Default::default() };
        let config = apply_overrides(base, &args(&["--questions", "8"])).unwrap();
        assert_eq!(config.layout, QuestionLayout::Blocks { count: 8 });
    }

    #[test]
    fn questions_flag_is_rejected_for_pair_layout() {
        assert!(apply_overrides(GeneratorConfig::default(), &args(&["--questions", "5"])).is_err());
        assert!(apply_overrides(GeneratorConfig::default(), &args(&["--layout", "pair", "--questions", "5"])).is_err());
    }

    #[test]
    fn layout_flag_keeps_env_block_count() {
        let base = GeneratorConfig { layout: QuestionLayout::Blocks { count: 4 }, ..Default::default() };
        let config = apply_overrides(base, &args(&["--layout", "blocks", "--retries", "2"])).unwrap();
        assert_eq!(config.layout, QuestionLayout::Blocks { count: 4 });
        assert_eq!(config.retry.parse_retries, 2);
    }
}
