use crate::clock::{Clock, Fired, Scheduler, TimerHandle};
use crate::feedback::{Feedback, FeedbackEvent};
use crate::stimulus::{DigitSequence, StimulusGenerator};

pub const STARTING_LENGTH: usize = 1;
/// Blank pause before the first digit of a round
pub const LEAD_IN_MS: u64 = 600;
/// How long each digit stays on screen
pub const DIGIT_MS: u64 = 700;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum NumberPhase {
    Idle,
    Show,
    Input,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RevealTimer {
    Step,
}

/// Step-indexed reveal: `cursor` digits have been shown so far
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Reveal {
    cursor: usize,
    visible: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberSnapshot {
    pub phase: NumberPhase,
    pub length: usize,
    pub best: usize,
    pub sequence: Option<String>,
    pub visible_digit: Option<u8>,
    pub reveal_cursor: usize,
    pub input: String,
}

/// Growing digit-sequence recall
#[derive(Debug)]
pub struct NumberMemoryGame<C: Clock> {
    phase: NumberPhase,
    length: usize,
    best: usize,
    sequence: DigitSequence,
    reveal: Reveal,
    input: String,
    pending: Option<TimerHandle>,
    timers: Scheduler<RevealTimer, C>,
    stimulus: StimulusGenerator,
    feedback: Feedback,
}

impl<C: Clock> NumberMemoryGame<C> {
    pub fn new(clock: C, stimulus: StimulusGenerator, feedback: Feedback) -> Self {
        Self {
            phase: NumberPhase::Idle,
            length: STARTING_LENGTH,
            best: STARTING_LENGTH,
            sequence: DigitSequence::default(),
            reveal: Reveal::default(),
            input: String::new(),
            pending: None,
            timers: Scheduler::new(clock),
            stimulus,
            feedback,
        }
    }

    pub fn phase(&self) -> NumberPhase {
        self.phase
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn best(&self) -> usize {
        self.best
    }

    pub fn sequence(&self) -> &DigitSequence {
        &self.sequence
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn visible_digit(&self) -> Option<u8> {
        self.reveal.visible
    }

    pub fn reveal_cursor(&self) -> usize {
        self.reveal.cursor
    }

    pub fn snapshot(&self) -> NumberSnapshot {
        // The sequence is only shown while revealing or after a miss
        let sequence = match self.phase {
            NumberPhase::Show | NumberPhase::Result => Some(self.sequence.to_string()),
            NumberPhase::Idle | NumberPhase::Input => None,
        };
        NumberSnapshot {
            phase: self.phase,
            length: self.length,
            best: self.best,
            sequence,
            visible_digit: self.reveal.visible,
            reveal_cursor: self.reveal.cursor,
            input: self.input.clone(),
        }
    }

    /// Start a fresh run at the starting length
    pub fn start(&mut self) {
        self.length = STARTING_LENGTH;
        self.best = self.best.max(self.length);
        self.begin_round();
    }

    /// Replace the typed answer, keeping digits only
    pub fn set_input(&mut self, text: &str) {
        if self.phase != NumberPhase::Input {
            return;
        }
        self.input = text.chars().filter(char::is_ascii_digit).collect();
    }

    pub fn push_char(&mut self, c: char) {
        if self.phase == NumberPhase::Input && c.is_ascii_digit() {
            self.input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.phase == NumberPhase::Input {
            self.input.pop();
        }
    }

    pub fn submit(&mut self) {
        if self.phase != NumberPhase::Input {
            return;
        }
        if self.sequence.matches(&self.input) {
            self.length += 1;
            self.best = self.best.max(self.length);
            log::debug!("number: recalled {}, next length {}", self.sequence, self.length);
            self.begin_round();
            self.feedback.emit(FeedbackEvent::Correct);
        } else {
            log::debug!("number: expected {}, got {:?}", self.sequence, self.input);
            self.transition(NumberPhase::Result);
            self.feedback.emit(FeedbackEvent::Wrong);
        }
    }

    /// Back to idle at the starting length. `best` survives for this instance.
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.length = STARTING_LENGTH;
        self.sequence = DigitSequence::default();
        self.reveal = Reveal::default();
        self.input.clear();
        self.transition(NumberPhase::Idle);
    }

    pub fn teardown(&mut self) {
        self.timers.cancel_all();
        self.pending = None;
    }

    pub fn pump(&mut self) {
        while let Some(fired) = self.timers.pop_due() {
            self.on_timer(fired);
        }
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    fn begin_round(&mut self) {
        self.cancel_pending();
        self.sequence = self.stimulus.digit_sequence(self.length);
        self.reveal = Reveal::default();
        self.input.clear();
        self.transition(NumberPhase::Show);
        self.pending = Some(self.timers.after(LEAD_IN_MS, RevealTimer::Step));
    }

    fn on_timer(&mut self, fired: Fired<RevealTimer>) {
        if self.pending != Some(fired.handle) || self.phase != NumberPhase::Show {
            log::trace!("number: ignoring stale timer {:?}", fired.handle);
            return;
        }
        match fired.payload {
            RevealTimer::Step => self.step_reveal(fired.due_at),
        }
    }

    /// Steps are paced from the previous step's deadline, not from when it
    /// was pumped, so a late pump does not stretch the reveal.
    fn step_reveal(&mut self, due_at: u64) {
        match self.sequence.digit(self.reveal.cursor) {
            Some(digit) => {
                self.reveal.visible = Some(digit);
                self.reveal.cursor += 1;
                let next = due_at.saturating_add(DIGIT_MS);
                self.pending = Some(self.timers.at(next, RevealTimer::Step));
            }
            None => {
                self.reveal.visible = None;
                self.pending = None;
                self.transition(NumberPhase::Input);
            }
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.timers.cancel(handle);
        }
    }

    fn transition(&mut self, to: NumberPhase) {
        if self.phase != to {
            log::debug!("number: {} -> {}", self.phase, to);
        }
        self.phase = to;
    }
}
