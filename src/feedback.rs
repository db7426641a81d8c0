use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

/// Discrete cue emitted by a game for sound or visual feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum FeedbackEvent {
    Hit,
    Miss,
    Correct,
    Wrong,
}

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("feedback output unavailable")]
    Unavailable,
    #[error("feedback output failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Receiver of feedback cues. Implementations may fail; games never see it.
pub trait FeedbackSink {
    fn play(&self, event: FeedbackEvent) -> Result<(), FeedbackError>;
}

/// Discards every cue
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FeedbackSink for NullSink {
    fn play(&self, _event: FeedbackEvent) -> Result<(), FeedbackError> {
        Ok(())
    }
}

/// Keeps every cue it receives; clones share the log
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<FeedbackEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.events.borrow().clone()
    }

    pub fn last(&self) -> Option<FeedbackEvent> {
        self.events.borrow().last().copied()
    }
}

impl FeedbackSink for RecordingSink {
    fn play(&self, event: FeedbackEvent) -> Result<(), FeedbackError> {
        self.events.borrow_mut().push(event);
        Ok(())
    }
}

/// Fire-and-forget wrapper the games hold. Sink errors are logged and dropped.
pub struct Feedback {
    sink: Option<Box<dyn FeedbackSink>>,
}

impl Feedback {
    pub fn new(sink: impl FeedbackSink + 'static) -> Self {
        Self {
            sink: Some(Box::new(sink)),
        }
    }

    pub fn silent() -> Self {
        Self { sink: None }
    }

    pub fn emit(&self, event: FeedbackEvent) {
        if let Some(sink) = &self.sink {
            if let Err(err) = sink.play(event) {
                log::debug!("dropping {event} feedback: {err}");
            }
        }
    }
}

impl Default for Feedback {
    fn default() -> Self {
        Self::silent()
    }
}

impl std::fmt::Debug for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feedback")
            .field("attached", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenSink;

    impl FeedbackSink for BrokenSink {
        fn play(&self, _event: FeedbackEvent) -> Result<(), FeedbackError> {
            Err(FeedbackError::Unavailable)
        }
    }

    #[test]
    fn recording_sink_shares_log() {
        let sink = RecordingSink::new();
        let feedback = Feedback::new(sink.clone());
        feedback.emit(FeedbackEvent::Hit);
        feedback.emit(FeedbackEvent::Wrong);
        assert_eq!(sink.events(), vec![FeedbackEvent::Hit, FeedbackEvent::Wrong]);
        assert_eq!(sink.last(), Some(FeedbackEvent::Wrong));
    }

    #[test]
    fn broken_sink_is_swallowed() {
        let feedback = Feedback::new(BrokenSink);
        feedback.emit(FeedbackEvent::Correct);
    }

    #[test]
    fn silent_feedback_does_nothing() {
        Feedback::silent().emit(FeedbackEvent::Miss);
        Feedback::new(NullSink).emit(FeedbackEvent::Miss);
    }

    #[test]
    fn event_names_are_lowercase() {
        assert_eq!(FeedbackEvent::Hit.to_string(), "hit");
        assert_eq!(FeedbackEvent::Wrong.to_string(), "wrong");
    }
}
