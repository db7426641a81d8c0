// Library surface for the games and their shared timing core.
// The terminal front end in main.rs is only one possible presentation layer.
pub mod aim;
pub mod arcade;
pub mod clock;
pub mod config;
pub mod feedback;
pub mod history;
pub mod number_memory;
pub mod reaction;
pub mod runtime;
pub mod stimulus;
pub mod verbal_memory;

pub use aim::{AimPhase, AimTrainerGame};
pub use arcade::{Arcade, GameKind};
pub use clock::{Clock, ManualClock, Scheduler, SystemClock, TimerHandle};
pub use feedback::{Feedback, FeedbackEvent, FeedbackSink};
pub use number_memory::{NumberMemoryGame, NumberPhase};
pub use reaction::{ReactionGame, ReactionPhase};
pub use stimulus::StimulusGenerator;
pub use verbal_memory::{VerbalMemoryGame, VerbalPhase, WordPool};
