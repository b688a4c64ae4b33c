//! Question records shared by every pipeline stage.
//!
//! `Question` is the canonical multiple-choice schema handed to the game layer and
//! written to disk. Its serialized field names (`question`, `A`..`D`, `reponse`,
//! `explanation`) are a compatibility contract with downstream consumers and must
//! not be re-keyed.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Ordered questions of one generated quiz, in extraction order.
pub type QuestionBatch = Vec<Question>;

/// Canonical question record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Question", description = "Multiple-choice question with four options")]
pub struct Question {
    /// Question text
    pub question: String,
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "D")]
    pub d: String,
    /// Letter of the correct option, one of `A`, `B`, `C`, `D`
    pub reponse: String,
    /// Optional rationale for the correct answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    pub fn new(
        question: impl Into<String>,
        options: [&str; 4],
        reponse: impl Into<String>,
    ) -> Self {
        let [a, b, c, d] = options;
        Self {
            question: question.into(),
            a: a.to_string(),
            b: b.to_string(),
            c: c.to_string(),
            d: d.to_string(),
            reponse: reponse.into(),
            explanation: None,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn option(&self, letter: AnswerLetter) -> &str {
        match letter {
            AnswerLetter::A => &self.a,
            AnswerLetter::B => &self.b,
            AnswerLetter::C => &self.c,
            AnswerLetter::D => &self.d,
        }
    }

    /// Options in display order, labelled.
    pub fn options(&self) -> [(AnswerLetter, &str); 4] {
        AnswerLetter::ALL.map(|letter| (letter, self.option(letter)))
    }

    /// The correct letter, if `reponse` is exactly one of `A`..`D`.
    pub fn answer_letter(&self) -> Option<AnswerLetter> {
        AnswerLetter::from_exact(&self.reponse)
    }

    pub fn is_correct(&self, selected: AnswerLetter) -> bool {
        self.answer_letter() == Some(selected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum AnswerLetter {
    A,
    B,
    C,
    D,
}

impl AnswerLetter {
    pub const ALL: [AnswerLetter; 4] = [AnswerLetter::A, AnswerLetter::B, AnswerLetter::C, AnswerLetter::D];

    /// Case-sensitive, whitespace-sensitive match.
    pub fn from_exact(s: &str) -> Option<Self> {
        match s {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl fmt::Display for AnswerLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerLetter {
    type Err = String;

    /// Lenient parse for user input: surrounding whitespace and lowercase accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_exact(&s.trim().to_ascii_uppercase())
            .ok_or_else(|| format!("Unknown answer letter: '{}'. Expected A, B, C or D", s))
    }
}

/// Flat, index-suffixed fields produced by parsing one completion
/// (`question1`, `A_1`, .., `reponse1`, optional `explanation1`, ...).
///
/// Iteration order is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping(HashMap<String, String>);

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert all fields of one question under index `n`.
    pub fn insert_question(&mut self, n: char, fields: QuestionFields<'_>) {
        self.insert(keys::question(n), fields.question);
        self.insert(keys::option(AnswerLetter::A, n), fields.options[0]);
        self.insert(keys::option(AnswerLetter::B, n), fields.options[1]);
        self.insert(keys::option(AnswerLetter::C, n), fields.options[2]);
        self.insert(keys::option(AnswerLetter::D, n), fields.options[3]);
        self.insert(keys::reponse(n), fields.reponse);
        if let Some(explanation) = fields.explanation {
            self.insert(keys::explanation(n), explanation);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Borrowed field values of a single question, before they are keyed.
#[derive(Debug, Clone, Copy)]
pub struct QuestionFields<'a> {
    pub question: &'a str,
    pub options: [&'a str; 4],
    pub reponse: &'a str,
    pub explanation: Option<&'a str>,
}

/// Field-name scheme of a `FieldMapping`.
pub mod keys {
    use super::AnswerLetter;

    pub const QUESTION_PREFIX: &str = "question";

    pub fn question(n: char) -> String {
        format!("{QUESTION_PREFIX}{n}")
    }

    pub fn option(letter: AnswerLetter, n: char) -> String {
        format!("{letter}_{n}")
    }

    pub fn reponse(n: char) -> String {
        format!("reponse{n}")
    }

    pub fn explanation(n: char) -> String {
        format!("explanation{n}")
    }

    /// `question<digit>` → the digit. Longer suffixes are not question keys.
    pub fn question_index(key: &str) -> Option<char> {
        let mut rest = key.strip_prefix(QUESTION_PREFIX)?.chars();
        match (rest.next(), rest.next()) {
            (Some(n), None) if n.is_ascii_digit() => Some(n),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_contract_field_names() {
        let q = Question::new("Q", ["a", "b", "c", "d"], "B");
        let json = serde_json::to_string(&q).unwrap();
        assert_eq!(
            json,
            r#"{"question":"Q","A":"a","B":"b","C":"c","D":"d","reponse":"B"}"#
        );

        let with = q.with_explanation("because");
        let json = serde_json::to_value(&with).unwrap();
        assert_eq!(json["explanation"], "because");
    }

    #[test]
    fn answer_letter_is_exact() {
        assert_eq!(AnswerLetter::from_exact("C"), Some(AnswerLetter::C));
        assert_eq!(AnswerLetter::from_exact("c"), None);
        assert_eq!(AnswerLetter::from_exact("C "), None);
        assert_eq!(" c ".parse::<AnswerLetter>(), Ok(AnswerLetter::C));
        assert!("E".parse::<AnswerLetter>().is_err());
    }

    #[test]
    fn question_index_requires_single_digit() {
        assert_eq!(keys::question_index("question1"), Some('1'));
        assert_eq!(keys::question_index("question9"), Some('9'));
        assert_eq!(keys::question_index("question10"), None);
        assert_eq!(keys::question_index("question"), None);
        assert_eq!(keys::question_index("questionX"), None);
        assert_eq!(keys::question_index("A_1"), None);
    }

    #[test]
    fn options_are_labelled_in_order() {
        let q = Question::new("Q", ["w", "x", "y", "z"], "D");
        let labels: Vec<String> = q.options().iter().map(|(l, t)| format!("{l}:{t}")).collect();
        assert_eq!(labels, vec!["A:w", "B:x", "C:y", "D:z"]);
        assert!(q.is_correct(AnswerLetter::D));
        assert!(!q.is_correct(AnswerLetter::A));
    }
}
