use std::collections::HashSet;

use include_dir::{include_dir, Dir};
use serde::Deserialize;
use thiserror::Error;

use crate::feedback::{Feedback, FeedbackEvent};
use crate::stimulus::StimulusGenerator;

static WORDS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/words");

pub const STARTING_LIVES: u32 = 3;
pub const DEFAULT_WORD_LIST: &str = "verbal";

#[derive(Debug, Error)]
pub enum WordPoolError {
    #[error("word list '{0}' not found")]
    NotFound(String),
    #[error("word list '{0}' is not valid utf-8")]
    NotUtf8(String),
    #[error("malformed word list: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("word list has no usable words")]
    Empty,
}

#[derive(Deserialize, Debug)]
struct WordListFile {
    #[allow(dead_code)]
    name: String,
    words: Vec<String>,
}

/// Fixed, de-duplicated candidate words
#[derive(Debug, Clone, PartialEq)]
pub struct WordPool {
    words: Vec<String>,
}

impl WordPool {
    /// The list shipped with the binary
    pub fn embedded() -> Result<Self, WordPoolError> {
        Self::load(DEFAULT_WORD_LIST)
    }

    pub fn load(name: &str) -> Result<Self, WordPoolError> {
        let file_name = format!("{name}.json");
        let file = WORDS_DIR
            .get_file(&file_name)
            .ok_or_else(|| WordPoolError::NotFound(file_name.clone()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| WordPoolError::NotUtf8(file_name.clone()))?;
        Self::from_json(contents)
    }

    pub fn from_json(json: &str) -> Result<Self, WordPoolError> {
        let list: WordListFile = serde_json::from_str(json)?;
        Self::from_words(list.words)
    }

    /// Trims, drops blanks and keeps the first occurrence of each word
    pub fn from_words<I, S>(words: I) -> Result<Self, WordPoolError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.into().trim().to_string())
            .filter(|w| !w.is_empty() && seen.insert(w.clone()))
            .collect();
        if words.is_empty() {
            return Err(WordPoolError::Empty);
        }
        Ok(Self { words })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum VerbalPhase {
    Idle,
    Play,
    Result,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerbalSnapshot {
    pub phase: VerbalPhase,
    pub score: u32,
    pub best: u32,
    pub lives: u32,
    pub current_word: Option<String>,
    pub seen_count: usize,
}

/// Seen-or-new word recognition with three lives
#[derive(Debug)]
pub struct VerbalMemoryGame {
    phase: VerbalPhase,
    score: u32,
    best: u32,
    lives: u32,
    current_word: Option<String>,
    seen: HashSet<String>,
    pool: WordPool,
    stimulus: StimulusGenerator,
    feedback: Feedback,
}

impl VerbalMemoryGame {
    pub fn new(pool: WordPool, stimulus: StimulusGenerator, feedback: Feedback) -> Self {
        Self {
            phase: VerbalPhase::Idle,
            score: 0,
            best: 0,
            lives: STARTING_LIVES,
            current_word: None,
            seen: HashSet::new(),
            pool,
            stimulus,
            feedback,
        }
    }

    pub fn phase(&self) -> VerbalPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn current_word(&self) -> Option<&str> {
        self.current_word.as_deref()
    }

    pub fn has_seen(&self, word: &str) -> bool {
        self.seen.contains(word)
    }

    pub fn snapshot(&self) -> VerbalSnapshot {
        VerbalSnapshot {
            phase: self.phase,
            score: self.score,
            best: self.best,
            lives: self.lives,
            current_word: self.current_word.clone(),
            seen_count: self.seen.len(),
        }
    }

    pub fn start(&mut self) {
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.seen.clear();
        self.transition(VerbalPhase::Play);
        self.next_word();
    }

    /// Judge the current word: `true` claims it was shown before in this run
    pub fn mark_seen(&mut self, claim: bool) {
        if self.phase != VerbalPhase::Play {
            return;
        }
        let Some(word) = self.current_word.take() else {
            return;
        };

        let actually_seen = self.seen.contains(&word);
        if claim == actually_seen {
            self.score += 1;
            self.best = self.best.max(self.score);
            self.seen.insert(word);
            self.next_word();
            self.feedback.emit(FeedbackEvent::Correct);
        } else {
            self.lives = self.lives.saturating_sub(1);
            self.feedback.emit(FeedbackEvent::Wrong);
            log::debug!("verbal: misjudged '{word}', {} lives left", self.lives);
            if self.lives == 0 {
                self.current_word = Some(word);
                self.transition(VerbalPhase::Result);
            } else {
                self.next_word();
            }
        }
    }

    pub fn claim_seen(&mut self) {
        self.mark_seen(true);
    }

    pub fn claim_new(&mut self) {
        self.mark_seen(false);
    }

    /// Back to idle with full lives. `best` is kept for the life of this game.
    pub fn reset(&mut self) {
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.current_word = None;
        self.seen.clear();
        self.transition(VerbalPhase::Idle);
    }

    fn next_word(&mut self) {
        self.current_word = self
            .stimulus
            .pick_word(self.pool.words())
            .map(str::to_string);
    }

    fn transition(&mut self, to: VerbalPhase) {
        if self.phase != to {
            log::debug!("verbal: {} -> {}", self.phase, to);
        }
        self.phase = to;
    }
}
