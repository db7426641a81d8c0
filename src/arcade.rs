use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

use crate::aim::AimTrainerGame;
use crate::clock::Clock;
use crate::config::Config;
use crate::feedback::Feedback;
use crate::number_memory::{NumberMemoryGame, NumberPhase};
use crate::reaction::ReactionGame;
use crate::stimulus::{Point, StimulusGenerator, Surface};
use crate::verbal_memory::{VerbalMemoryGame, VerbalPhase, WordPool};

/// Surface units per terminal column
pub const CELL_WIDTH: f64 = 8.0;
/// Surface units per terminal row
pub const CELL_HEIGHT: f64 = 16.0;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    #[default]
    Reaction,
    Aim,
    Number,
    Verbal,
}

impl GameKind {
    pub const ALL: [GameKind; 4] = [
        GameKind::Reaction,
        GameKind::Aim,
        GameKind::Number,
        GameKind::Verbal,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            GameKind::Reaction => "Reaction Sprint",
            GameKind::Aim => "Focus Aim",
            GameKind::Number => "Number Recall",
            GameKind::Verbal => "Verbal Map",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|k| k == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

fn stimulus_for(seed: Option<u64>, salt: u64) -> StimulusGenerator {
    match seed {
        Some(seed) => StimulusGenerator::seeded(seed.wrapping_add(salt)),
        None => StimulusGenerator::from_entropy(),
    }
}

/// One live session of every game, plus the terminal-side aim cursor
#[derive(Debug)]
pub struct Arcade<C: Clock + Clone> {
    pub selected: GameKind,
    pub reaction: ReactionGame<C>,
    pub aim: AimTrainerGame<C>,
    pub number: NumberMemoryGame<C>,
    pub verbal: VerbalMemoryGame,
    board: (u16, u16),
    cursor: (u16, u16),
    clock: C,
}

impl<C: Clock + Clone> Arcade<C> {
    /// `feedback` is called once per game so each owns its own sink
    pub fn new(clock: C, config: &Config, pool: WordPool, feedback: impl Fn() -> Feedback) -> Self {
        Self {
            selected: config.start_tab,
            reaction: ReactionGame::new(clock.clone(), stimulus_for(config.seed, 0), feedback()),
            aim: AimTrainerGame::new(
                clock.clone(),
                config.aim_settings(),
                stimulus_for(config.seed, 1),
                feedback(),
            ),
            number: NumberMemoryGame::new(
                clock.clone(),
                stimulus_for(config.seed, 2),
                feedback(),
            ),
            verbal: VerbalMemoryGame::new(pool, stimulus_for(config.seed, 3), feedback()),
            board: (0, 0),
            cursor: (0, 0),
            clock,
        }
    }

    pub fn select(&mut self, kind: GameKind) {
        if self.selected != kind {
            log::debug!("arcade: switching to {kind}");
        }
        self.selected = kind;
    }

    /// Apply due timers of every game
    pub fn pump(&mut self) {
        self.reaction.pump();
        self.aim.pump();
        self.number.pump();
    }

    pub fn next_deadline(&self) -> Option<u64> {
        [
            self.reaction.next_deadline(),
            self.aim.next_deadline(),
            self.number.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Time left until the earliest game timer; zero once it is due
    pub fn until_next_deadline(&self) -> Option<Duration> {
        let now = self.clock.now_ms();
        self.next_deadline()
            .map(|due| Duration::from_millis(due.saturating_sub(now)))
    }

    pub fn teardown(&mut self) {
        self.reaction.teardown();
        self.aim.teardown();
        self.number.teardown();
    }

    /// Size of the aim board in terminal cells, reported on every draw
    pub fn set_board(&mut self, cols: u16, rows: u16) {
        self.board = (cols, rows);
        self.cursor = (
            self.cursor.0.min(cols.saturating_sub(1)),
            self.cursor.1.min(rows.saturating_sub(1)),
        );
        self.aim.set_surface(Surface::new(
            cols as f64 * CELL_WIDTH,
            rows as f64 * CELL_HEIGHT,
        ));
    }

    pub fn board(&self) -> (u16, u16) {
        self.board
    }

    pub fn cursor(&self) -> (u16, u16) {
        self.cursor
    }

    pub fn move_cursor(&mut self, dx: i32, dy: i32) {
        let clamp = |v: u16, d: i32, max: u16| -> u16 {
            (v as i32 + d).clamp(0, max.saturating_sub(1) as i32) as u16
        };
        self.cursor = (
            clamp(self.cursor.0, dx, self.board.0),
            clamp(self.cursor.1, dy, self.board.1),
        );
    }

    /// Centre of the cursor cell in surface units
    pub fn cursor_point(&self) -> Point {
        Point::new(
            (self.cursor.0 as f64 + 0.5) * CELL_WIDTH,
            (self.cursor.1 as f64 + 0.5) * CELL_HEIGHT,
        )
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return KeyOutcome::Quit;
        }

        match key.code {
            KeyCode::Tab => {
                self.select(self.selected.next());
                return KeyOutcome::Continue;
            }
            KeyCode::BackTab => {
                self.select(self.selected.prev());
                return KeyOutcome::Continue;
            }
            _ => {}
        }

        let typing_digits =
            self.selected == GameKind::Number && self.number.phase() == NumberPhase::Input;
        if let KeyCode::Char(c @ '1'..='4') = key.code {
            if !typing_digits {
                let idx = c as usize - '1' as usize;
                self.select(GameKind::ALL[idx]);
                return KeyOutcome::Continue;
            }
        }

        match self.selected {
            GameKind::Reaction => self.reaction_key(key.code),
            GameKind::Aim => self.aim_key(key.code),
            GameKind::Number => self.number_key(key.code),
            GameKind::Verbal => self.verbal_key(key.code),
        }
        KeyOutcome::Continue
    }

    fn reaction_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(' ') | KeyCode::Enter => self.reaction.tap(),
            KeyCode::Char('s') => self.reaction.start(),
            KeyCode::Char('r') => self.reaction.reset(),
            _ => {}
        }
    }

    fn aim_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(-1, 0),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(1, 0),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(0, -1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(0, 1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                let point = self.cursor_point();
                self.aim.tap_at(point);
            }
            KeyCode::Char('s') => self.aim.start(),
            KeyCode::Char('r') => self.aim.reset(),
            _ => {}
        }
    }

    fn number_key(&mut self, code: KeyCode) {
        match (self.number.phase(), code) {
            (NumberPhase::Input, KeyCode::Char(c)) if c.is_ascii_digit() => self.number.push_char(c),
            (NumberPhase::Input, KeyCode::Backspace) => self.number.backspace(),
            (NumberPhase::Input, KeyCode::Enter) => self.number.submit(),
            (NumberPhase::Idle | NumberPhase::Result, KeyCode::Enter | KeyCode::Char(' ')) => {
                self.number.start()
            }
            (_, KeyCode::Char('s')) => self.number.start(),
            (_, KeyCode::Char('r')) => self.number.reset(),
            _ => {}
        }
    }

    fn verbal_key(&mut self, code: KeyCode) {
        match (self.verbal.phase(), code) {
            (VerbalPhase::Play, KeyCode::Char('y')) => self.verbal.claim_seen(),
            (VerbalPhase::Play, KeyCode::Char('n')) => self.verbal.claim_new(),
            (VerbalPhase::Idle | VerbalPhase::Result, KeyCode::Enter | KeyCode::Char(' ')) => {
                self.verbal.start()
            }
            (_, KeyCode::Char('s')) => self.verbal.start(),
            (_, KeyCode::Char('r')) => self.verbal.reset(),
            _ => {}
        }
    }
}
