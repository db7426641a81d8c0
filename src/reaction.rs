use crate::clock::{Clock, Fired, Scheduler, TimerHandle};
use crate::feedback::{Feedback, FeedbackEvent};
use crate::history::{History, REACTION_HISTORY_LEN};
use crate::stimulus::StimulusGenerator;

/// Shortest anticipation delay before the go signal
pub const MIN_DELAY_MS: u64 = 1200;
/// Exclusive upper bound of the anticipation delay
pub const MAX_DELAY_MS: u64 = 3400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ReactionPhase {
    Idle,
    Waiting,
    Ready,
    TooSoon,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ReactionTimer {
    GoSignal,
}

/// Everything the front end needs to draw the reaction pad
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionSnapshot {
    pub phase: ReactionPhase,
    pub last_time: Option<u64>,
    pub best_time: Option<u64>,
    pub history: Vec<u64>,
    pub average: Option<f64>,
    pub std_dev: Option<f64>,
}

/// Visual reaction timer: wait for the go signal, then tap as fast as possible
#[derive(Debug)]
pub struct ReactionGame<C: Clock> {
    phase: ReactionPhase,
    last_time: Option<u64>,
    best_time: Option<u64>,
    history: History<u64>,
    started_at: Option<u64>,
    pending: Option<TimerHandle>,
    timers: Scheduler<ReactionTimer, C>,
    stimulus: StimulusGenerator,
    feedback: Feedback,
}

impl<C: Clock> ReactionGame<C> {
    pub fn new(clock: C, stimulus: StimulusGenerator, feedback: Feedback) -> Self {
        Self {
            phase: ReactionPhase::Idle,
            last_time: None,
            best_time: None,
            history: History::with_capacity(REACTION_HISTORY_LEN),
            started_at: None,
            pending: None,
            timers: Scheduler::new(clock),
            stimulus,
            feedback,
        }
    }

    pub fn phase(&self) -> ReactionPhase {
        self.phase
    }

    pub fn last_time(&self) -> Option<u64> {
        self.last_time
    }

    pub fn best_time(&self) -> Option<u64> {
        self.best_time
    }

    pub fn history(&self) -> &History<u64> {
        &self.history
    }

    pub fn snapshot(&self) -> ReactionSnapshot {
        ReactionSnapshot {
            phase: self.phase,
            last_time: self.last_time,
            best_time: self.best_time,
            history: self.history.to_vec(),
            average: self.history.average(),
            std_dev: self.history.std_dev(),
        }
    }

    /// Begin a new attempt with a fresh random delay
    pub fn start(&mut self) {
        self.cancel_pending();
        self.started_at = None;
        let delay = self.stimulus.uniform_delay(MIN_DELAY_MS, MAX_DELAY_MS);
        self.pending = Some(self.timers.after(delay, ReactionTimer::GoSignal));
        self.transition(ReactionPhase::Waiting);
        log::debug!("reaction: go signal in {delay} ms");
    }

    /// The single input on the reaction pad
    pub fn tap(&mut self) {
        match self.phase {
            ReactionPhase::Idle | ReactionPhase::TooSoon | ReactionPhase::Result => self.start(),
            ReactionPhase::Waiting => {
                self.cancel_pending();
                self.transition(ReactionPhase::TooSoon);
                self.feedback.emit(FeedbackEvent::Wrong);
            }
            ReactionPhase::Ready => self.finish(),
        }
    }

    /// Back to idle, clearing last, best and history
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.started_at = None;
        self.last_time = None;
        self.best_time = None;
        self.history.clear();
        self.transition(ReactionPhase::Idle);
    }

    /// Drop every outstanding timer; nothing fires against this session afterwards
    pub fn teardown(&mut self) {
        self.timers.cancel_all();
        self.pending = None;
    }

    /// Apply every timer that has come due
    pub fn pump(&mut self) {
        while let Some(fired) = self.timers.pop_due() {
            self.on_timer(fired);
        }
    }

    /// Next instant at which `pump` has work to do
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    fn on_timer(&mut self, fired: Fired<ReactionTimer>) {
        if self.pending != Some(fired.handle) || self.phase != ReactionPhase::Waiting {
            log::trace!("reaction: ignoring stale timer {:?}", fired.handle);
            return;
        }
        match fired.payload {
            ReactionTimer::GoSignal => {
                self.pending = None;
                self.started_at = Some(self.timers.now());
                self.transition(ReactionPhase::Ready);
            }
        }
    }

    fn finish(&mut self) {
        let now = self.timers.now();
        // Clamped at zero against a clock that went backwards
        let reaction_time = self
            .started_at
            .map_or(0, |started| now.saturating_sub(started));

        self.last_time = Some(reaction_time);
        self.best_time = Some(self.best_time.map_or(reaction_time, |b| b.min(reaction_time)));
        self.history.record(reaction_time);
        self.started_at = None;
        self.transition(ReactionPhase::Result);
        self.feedback.emit(FeedbackEvent::Correct);
        log::debug!("reaction: {reaction_time} ms");
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.timers.cancel(handle);
        }
    }

    fn transition(&mut self, to: ReactionPhase) {
        if self.phase != to {
            log::debug!("reaction: {} -> {}", self.phase, to);
        }
        self.phase = to;
    }
}
