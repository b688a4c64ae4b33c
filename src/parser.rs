//! Completion parser: raw model text → flat, index-suffixed field mappings.
//!
//! Two layouts are supported:
//! - `Pair`: one all-or-nothing match of exactly two questions separated by a blank
//!   line. Any deviation (missing line, different label casing, extra punctuation)
//!   fails the whole completion.
//! - `Blocks`: a single-question grammar applied repeatedly over the completion, so
//!   any number of questions can be extracted. Each block may carry an
//!   `Explicacion:` line.
//!
//! Captured values are not trimmed here.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::{debug, instrument};

use crate::error::ParseFailure;
use crate::question::{FieldMapping, QuestionFields};

/// Highest question index a single mapping can carry (`question1`..`question9`).
pub const MAX_QUESTIONS_PER_MAPPING: usize = 9;

/// Questions requested and matched per model call in the `Pair` layout.
pub const PAIR_QUESTION_COUNT: usize = 2;

const OPTION_LABELS: [&str; 4] = ["OPCION_A", "OPCION_B", "OPCION_C", "OPCION_D"];
const OPTION_KEYS: [&str; 4] = ["A", "B", "C", "D"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionLayout {
    /// Exactly two questions per completion.
    Pair,
    /// Any number of questions; `count` is what the prompt asks for.
    Blocks { count: usize },
}

impl QuestionLayout {
    pub fn name(&self) -> &'static str {
        match self {
            QuestionLayout::Pair => "pair",
            QuestionLayout::Blocks { .. } => "blocks",
        }
    }

    /// Questions the prompt asks the model for.
    pub fn requested_count(&self) -> usize {
        match self {
            QuestionLayout::Pair => PAIR_QUESTION_COUNT,
            QuestionLayout::Blocks { count } => *count,
        }
    }

    pub fn from_str(s: &str, count: usize) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pair" => Ok(Self::Pair),
            "blocks" => Ok(Self::Blocks { count: count.max(1) }),
            _ => Err(format!("Unknown layout: '{}'. Supported: pair, blocks", s)),
        }
    }
}

impl Default for QuestionLayout {
    fn default() -> Self {
        Self::Pair
    }
}

/// Regex fragment for question `n`. Group names are the mapping keys
/// (`question1`, `A_1`, .., `reponse1`).
fn pair_question_pattern(n: usize) -> String {
    let mut pattern = format!(r"Pregunta:\s?\n?(?P<question{n}>.*?)");
    for (label, key) in OPTION_LABELS.iter().zip(OPTION_KEYS) {
        pattern.push_str(&format!(r"\n{label}:\s?(?P<{key}_{n}>.*?)"));
    }
    pattern
}

fn pair_regex() -> &'static Regex {
    static PAIR: OnceLock<Regex> = OnceLock::new();
    PAIR.get_or_init(|| {
        let pattern = format!(
            r"{}\nRespuesta:\s?(?P<reponse1>.*?)\n\n{}\nRespuesta:\s?(?P<reponse2>.*)",
            pair_question_pattern(1),
            pair_question_pattern(2),
        );
        Regex::new(&pattern).expect("pair pattern is a valid regex")
    })
}

fn block_regex() -> &'static Regex {
    static BLOCK: OnceLock<Regex> = OnceLock::new();
    BLOCK.get_or_init(|| {
        let mut pattern = String::from(r"Pregunta:\s?\n?(?P<question>.*?)");
        for (label, key) in OPTION_LABELS.iter().zip(OPTION_KEYS) {
            pattern.push_str(&format!(r"\n{label}:\s?(?P<{key}>.*?)"));
        }
        pattern.push_str(r"\nRespuesta:[ \t]?(?P<reponse>.*)");
        pattern.push_str(r"(?:\nExplicaci(?:o|ó)n:[ \t]?(?P<explanation>.*))?");
        Regex::new(&pattern).expect("block pattern is a valid regex")
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionParser {
    layout: QuestionLayout,
}

impl CompletionParser {
    pub fn new(layout: QuestionLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> QuestionLayout {
        self.layout
    }

    /// Parse `completion` into one or more mappings. `Pair` always yields exactly one.
    pub fn parse(&self, completion: &str) -> Result<Vec<FieldMapping>, ParseFailure> {
        match self.layout {
            QuestionLayout::Pair => parse_pair(completion).map(|mapping| vec![mapping]),
            QuestionLayout::Blocks { .. } => parse_blocks(completion),
        }
    }
}

/// Match the fixed two-question layout; on success all 12 fields are present.
#[instrument(target = "quizgen::parser", skip(completion), fields(completion_len = completion.len()))]
pub fn parse_pair(completion: &str) -> Result<FieldMapping, ParseFailure> {
    let regex = pair_regex();
    let captures = regex
        .captures(completion)
        .ok_or_else(|| ParseFailure::new("pair", completion))?;

    let mapping: FieldMapping = regex
        .capture_names()
        .flatten()
        .filter_map(|name| captures.name(name).map(|m| (name, m.as_str())))
        .collect();

    debug!(fields = mapping.len(), "Parsed two-question completion");
    Ok(mapping)
}

/// Collect every question block in `completion`, packed into mappings of at most
/// `MAX_QUESTIONS_PER_MAPPING` questions each.
#[instrument(target = "quizgen::parser", skip(completion), fields(completion_len = completion.len()))]
pub fn parse_blocks(completion: &str) -> Result<Vec<FieldMapping>, ParseFailure> {
    let blocks: Vec<Captures<'_>> = block_regex().captures_iter(completion).collect();
    if blocks.is_empty() {
        return Err(ParseFailure::new("blocks", completion));
    }

    let mappings: Vec<FieldMapping> = blocks
        .chunks(MAX_QUESTIONS_PER_MAPPING)
        .map(|chunk| {
            let mut mapping = FieldMapping::new();
            for (i, caps) in chunk.iter().enumerate() {
                let n = char::from(b'1' + i as u8);
                let field = |name: &str| caps.name(name).map_or("", |m| m.as_str());
                mapping.insert_question(
                    n,
                    QuestionFields {
                        question: field("question"),
                        options: [field("A"), field("B"), field("C"), field("D")],
                        reponse: field("reponse"),
                        explanation: caps.name("explanation").map(|m| m.as_str()),
                    },
                );
            }
            mapping
        })
        .collect();

    debug!(questions = blocks.len(), mappings = mappings.len(), "Parsed question blocks");
    Ok(mappings)
}
