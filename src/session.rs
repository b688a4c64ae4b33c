//! Per-user game state: the library of generated games, the game currently being
//! played, and cumulative progress.
//!
//! Everything here is plain owned data. Handlers receive a `&mut GameSession` or
//! `&mut UserProgress` from whoever owns the user's session; nothing is global.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::error::{PersistenceError, SessionError};
use crate::question::{AnswerLetter, Question, QuestionBatch};

pub const POINTS_PER_CORRECT_ANSWER: u32 = 10;
pub const POINTS_PER_LEVEL: u32 = 100;
pub const MAX_LEVEL: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Longer quizzes are rated harder.
    pub fn for_question_count(count: usize) -> Self {
        match count {
            0..=5 => Difficulty::Easy,
            6..=10 => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: u32,
    pub title: String,
    pub subject: String,
    pub questions: QuestionBatch,
    pub difficulty: Difficulty,
    pub best_score: u32,
    pub times_played: u32,
    pub created_at: DateTime<Utc>,
}

impl Game {
    pub fn record_result(&mut self, summary: &GameSummary) -> bool {
        self.times_played += 1;
        let new_best = summary.score > self.best_score;
        if new_best {
            self.best_score = summary.score;
        }
        new_best
    }
}

/// Games generated during a user's session. Ids are assigned from 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameLibrary {
    games: Vec<Game>,
}

impl GameLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        title: impl Into<String>,
        subject: impl Into<String>,
        questions: QuestionBatch,
    ) -> &Game {
        let game = Game {
            id: self.games.len() as u32 + 1,
            title: title.into(),
            subject: subject.into(),
            difficulty: Difficulty::for_question_count(questions.len()),
            questions,
            best_score: 0,
            times_played: 0,
            created_at: Utc::now(),
        };
        debug!(id = game.id, questions = game.questions.len(), "Added game to library");
        self.games.push(game);
        &self.games[self.games.len() - 1]
    }

    pub fn get(&self, id: u32) -> Option<&Game> {
        self.games.iter().find(|g| g.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Game> {
        self.games.iter_mut().find(|g| g.id == id)
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Results,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub selected: AnswerLetter,
    pub correct: Option<AnswerLetter>,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub correct: Option<AnswerLetter>,
    pub points_awarded: u32,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    pub game_id: u32,
    pub correct: u32,
    pub answered: u32,
    pub total_questions: u32,
    /// Percentage over answered questions.
    pub accuracy: f64,
    pub score: u32,
    pub elapsed_secs: i64,
}

/// One play-through of a game.
#[derive(Debug, Clone)]
pub struct GameSession {
    game_id: u32,
    questions: QuestionBatch,
    state: GameState,
    current_index: usize,
    score: u32,
    answers: Vec<AnswerRecord>,
    started_at: DateTime<Utc>,
}

impl GameSession {
    pub fn start(game: &Game) -> Result<Self, SessionError> {
        if game.questions.is_empty() {
            return Err(SessionError::EmptyGame);
        }
        info!(game_id = game.id, questions = game.questions.len(), "Starting game");
        Ok(Self {
            game_id: game.id,
            questions: game.questions.clone(),
            state: GameState::Playing,
            current_index: 0,
            score: 0,
            answers: Vec::new(),
            started_at: Utc::now(),
        })
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            GameState::Playing => self.questions.get(self.current_index),
            GameState::Results => None,
        }
    }

    /// Check `selected` against the current question's `reponse`.
    pub fn answer(&mut self, selected: AnswerLetter) -> Result<AnswerOutcome, SessionError> {
        let question = self.current_question().ok_or(SessionError::GameOver)?;
        if self.answers.iter().any(|a| a.question_index == self.current_index) {
            return Err(SessionError::AlreadyAnswered(self.current_index));
        }

        let correct = question.answer_letter();
        let is_correct = question.is_correct(selected);
        let explanation = question.explanation.clone();
        let points_awarded = if is_correct { POINTS_PER_CORRECT_ANSWER } else { 0 };

        self.score += points_awarded;
        self.answers.push(AnswerRecord {
            question_index: self.current_index,
            selected,
            correct,
            is_correct,
        });
        debug!(index = self.current_index, %selected, is_correct, "Answered question");

        Ok(AnswerOutcome { is_correct, correct, points_awarded, explanation })
    }

    /// Move to the next question. Returns false once the game has moved to results.
    pub fn advance(&mut self) -> bool {
        if self.state == GameState::Results {
            return false;
        }
        self.current_index += 1;
        if self.current_index >= self.questions.len() {
            self.state = GameState::Results;
            return false;
        }
        true
    }

    pub fn finish(&mut self) -> GameSummary {
        self.state = GameState::Results;
        let correct = self.answers.iter().filter(|a| a.is_correct).count() as u32;
        let answered = self.answers.len() as u32;
        let accuracy = if answered > 0 {
            f64::from(correct) / f64::from(answered) * 100.0
        } else {
            0.0
        };
        GameSummary {
            game_id: self.game_id,
            correct,
            answered,
            total_questions: self.questions.len() as u32,
            accuracy,
            score: self.score,
            elapsed_secs: (Utc::now() - self.started_at).num_seconds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub level: u32,
    pub points: u32,
    pub total_games: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub achievements: Vec<String>,
}

impl Default for UserProgress {
    fn default() -> Self {
        Self {
            level: 1,
            points: 0,
            total_games: 0,
            correct_answers: 0,
            total_questions: 0,
            achievements: Vec::new(),
        }
    }
}

impl UserProgress {
    pub fn level_for_points(points: u32) -> u32 {
        (points / POINTS_PER_LEVEL + 1).clamp(1, MAX_LEVEL)
    }

    /// Points still needed to reach the next level; zero at the level cap.
    pub fn points_to_next_level(&self) -> u32 {
        let level = Self::level_for_points(self.points);
        if level >= MAX_LEVEL {
            return 0;
        }
        (level * POINTS_PER_LEVEL).saturating_sub(self.points)
    }

    /// Fold a finished game into the totals. Returns true on level-up.
    pub fn record_game(&mut self, summary: &GameSummary) -> bool {
        let previous = self.level;
        self.points += summary.score;
        self.total_games += 1;
        self.correct_answers += summary.correct;
        self.total_questions += summary.answered;
        self.level = Self::level_for_points(self.points);
        self.level > previous
    }

    pub fn accuracy(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        f64::from(self.correct_answers) / f64::from(self.total_questions) * 100.0
    }

    #[instrument(target = "quizgen::session", skip(self))]
    pub async fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?).await?;
        Ok(())
    }

    /// Load progress from `path`; a missing file yields fresh progress.
    #[instrument(target = "quizgen::session")]
    pub async fn load(path: &Path) -> Result<Self, PersistenceError> {
        match fs::read_to_string(path).await {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No saved progress, starting fresh");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}
