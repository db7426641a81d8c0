use crate::clock::{Clock, Fired, Scheduler, TimerHandle};
use crate::feedback::{Feedback, FeedbackEvent};
use crate::stimulus::{Point, StimulusGenerator, Surface};

pub const DEFAULT_ROUND_SECS: u32 = 30;
pub const DEFAULT_TARGET_SIZE: f64 = 48.0;
pub const DEFAULT_MARGIN: f64 = 12.0;
const COUNTDOWN_TICK_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum AimPhase {
    Idle,
    Running,
    Stopped,
}

/// Round length and target geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimSettings {
    pub round_secs: u32,
    pub target_size: f64,
    pub margin: f64,
}

impl Default for AimSettings {
    fn default() -> Self {
        Self {
            round_secs: DEFAULT_ROUND_SECS,
            target_size: DEFAULT_TARGET_SIZE,
            margin: DEFAULT_MARGIN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AimTimer {
    Countdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AimSnapshot {
    pub phase: AimPhase,
    pub score: u32,
    pub misses: u32,
    pub best: u32,
    pub time_left: u32,
    pub target: Option<Point>,
    pub target_size: f64,
}

/// Timed target-acquisition round: hit as many targets as possible before time runs out
#[derive(Debug)]
pub struct AimTrainerGame<C: Clock> {
    phase: AimPhase,
    score: u32,
    misses: u32,
    best: u32,
    time_left: u32,
    target: Option<Point>,
    surface: Surface,
    settings: AimSettings,
    countdown: Option<TimerHandle>,
    timers: Scheduler<AimTimer, C>,
    stimulus: StimulusGenerator,
    feedback: Feedback,
}

impl<C: Clock> AimTrainerGame<C> {
    pub fn new(
        clock: C,
        settings: AimSettings,
        stimulus: StimulusGenerator,
        feedback: Feedback,
    ) -> Self {
        Self {
            phase: AimPhase::Idle,
            score: 0,
            misses: 0,
            best: 0,
            time_left: settings.round_secs,
            target: None,
            surface: Surface::default(),
            settings,
            countdown: None,
            timers: Scheduler::new(clock),
            stimulus,
            feedback,
        }
    }

    pub fn phase(&self) -> AimPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn target(&self) -> Option<Point> {
        self.target
    }

    pub fn settings(&self) -> &AimSettings {
        &self.settings
    }

    /// Share of taps that landed on the target, in percent
    pub fn accuracy(&self) -> Option<f64> {
        let taps = self.score + self.misses;
        if taps == 0 {
            None
        } else {
            Some((self.score as f64 / taps as f64 * 100.0).round())
        }
    }

    pub fn snapshot(&self) -> AimSnapshot {
        AimSnapshot {
            phase: self.phase,
            score: self.score,
            misses: self.misses,
            best: self.best,
            time_left: self.time_left,
            target: self.target,
            target_size: self.settings.target_size,
        }
    }

    /// Latest dimensions reported by the front end; read at every spawn
    pub fn set_surface(&mut self, surface: Surface) {
        self.surface = surface;
    }

    pub fn start(&mut self) {
        self.cancel_countdown();
        self.score = 0;
        self.misses = 0;
        self.time_left = self.settings.round_secs;
        self.transition(AimPhase::Running);
        self.spawn();
        self.countdown = Some(self.timers.every(COUNTDOWN_TICK_MS, AimTimer::Countdown));
    }

    pub fn hit(&mut self) {
        if self.phase != AimPhase::Running {
            return;
        }
        self.score += 1;
        self.best = self.best.max(self.score);
        self.spawn();
        self.feedback.emit(FeedbackEvent::Hit);
    }

    pub fn miss(&mut self) {
        if self.phase != AimPhase::Running {
            return;
        }
        self.misses += 1;
        self.spawn();
        self.feedback.emit(FeedbackEvent::Miss);
    }

    /// Route a raw tap on the surface to exactly one of `hit` or `miss`
    pub fn tap_at(&mut self, point: Point) {
        if self.is_on_target(point) {
            self.hit();
        } else {
            self.miss();
        }
    }

    pub fn is_on_target(&self, point: Point) -> bool {
        let size = self.settings.target_size;
        self.target.is_some_and(|t| {
            point.x >= t.x && point.x <= t.x + size && point.y >= t.y && point.y <= t.y + size
        })
    }

    /// Back to idle with a fresh round. `best` is kept for the life of this game.
    pub fn reset(&mut self) {
        self.cancel_countdown();
        self.score = 0;
        self.misses = 0;
        self.time_left = self.settings.round_secs;
        self.target = None;
        self.transition(AimPhase::Idle);
    }

    pub fn teardown(&mut self) {
        self.timers.cancel_all();
        self.countdown = None;
    }

    pub fn pump(&mut self) {
        while let Some(fired) = self.timers.pop_due() {
            self.on_timer(fired);
        }
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    fn on_timer(&mut self, fired: Fired<AimTimer>) {
        if self.countdown != Some(fired.handle) || self.phase != AimPhase::Running {
            log::trace!("aim: ignoring stale timer {:?}", fired.handle);
            return;
        }
        match fired.payload {
            AimTimer::Countdown => {
                self.time_left = self.time_left.saturating_sub(1);
                if self.time_left == 0 {
                    self.cancel_countdown();
                    self.transition(AimPhase::Stopped);
                    log::debug!(
                        "aim: round over, {} hits / {} misses",
                        self.score,
                        self.misses
                    );
                }
            }
        }
    }

    fn spawn(&mut self) {
        let Surface { width, height } = self.surface;
        let point = self.stimulus.point_in_rect(
            width,
            height,
            self.settings.target_size,
            self.settings.margin,
        );
        self.target = Some(point);
    }

    fn cancel_countdown(&mut self) {
        if let Some(handle) = self.countdown.take() {
            self.timers.cancel(handle);
        }
    }

    fn transition(&mut self, to: AimPhase) {
        if self.phase != to {
            log::debug!("aim: {} -> {}", self.phase, to);
        }
        self.phase = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::feedback::RecordingSink;

    fn game() -> (AimTrainerGame<ManualClock>, ManualClock, RecordingSink) {
        let clock = ManualClock::new();
        let sink = RecordingSink::new();
        let mut game = AimTrainerGame::new(
            clock.clone(),
            AimSettings::default(),
            StimulusGenerator::seeded(21),
            Feedback::new(sink.clone()),
        );
        game.set_surface(Surface::new(640.0, 360.0));
        (game, clock, sink)
    }

    #[test]
    fn infinite_margin_spawns_inside_surface() {
        let mut game = AimTrainerGame::new(
            ManualClock::new(),
            AimSettings {
                margin: f64::INFINITY,
                ..AimSettings::default()
            },
            StimulusGenerator::seeded(4),
            Feedback::silent(),
        );
        game.set_surface(Surface::new(640.0, 360.0));
        game.start();
        let t = game.target().unwrap();
        assert!(t.x.is_finite() && t.y.is_finite());
        assert!(t.x >= 0.0 && t.x <= 640.0 - DEFAULT_TARGET_SIZE);
    }

    #[test]
    fn start_resets_round_and_spawns() {
        let (mut game, _, _) = game();
        game.start();
        let snap = game.snapshot();
        assert_eq!(snap.phase, AimPhase::Running);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.misses, 0);
        assert_eq!(snap.time_left, 30);
        assert!(snap.target.is_some());
        assert_eq!(game.next_deadline(), Some(1000));
    }

    #[test]
    fn thirty_ticks_end_round() {
        let (mut game, clock, _) = game();
        game.start();
        for second in 1..=30u32 {
            if second % 3 == 0 {
                game.hit();
            } else if second % 5 == 0 {
                game.miss();
            }
            clock.advance(1000);
            game.pump();
            assert_eq!(game.time_left(), 30 - second);
        }
        assert_eq!(game.phase(), AimPhase::Stopped);
        assert_eq!(game.time_left(), 0);
        assert_eq!(game.next_deadline(), None);
    }

    #[test]
    fn long_gap_catches_up_and_stops_at_zero() {
        let (mut game, clock, _) = game();
        game.start();
        clock.advance(45_000);
        game.pump();
        assert_eq!(game.phase(), AimPhase::Stopped);
        assert_eq!(game.time_left(), 0);
    }

    #[test]
    fn hit_scores_and_respawns() {
        let (mut game, _, sink) = game();
        game.start();
        game.hit();
        game.hit();
        assert_eq!(game.score(), 2);
        assert_eq!(game.misses(), 0);
        assert_eq!(game.best(), 2);
        assert_eq!(sink.events(), vec![FeedbackEvent::Hit, FeedbackEvent::Hit]);
    }

    #[test]
    fn miss_counts_and_respawns() {
        let (mut game, _, sink) = game();
        game.start();
        game.miss();
        assert_eq!(game.misses(), 1);
        assert_eq!(game.score(), 0);
        assert_eq!(sink.last(), Some(FeedbackEvent::Miss));
        assert_eq!(game.accuracy(), Some(0.0));
    }

    #[test]
    fn tap_at_target_is_hit_only() {
        let (mut game, _, _) = game();
        game.start();
        let target = game.target().unwrap();
        game.tap_at(Point::new(target.x + 1.0, target.y + 1.0));
        assert_eq!(game.score(), 1);
        assert_eq!(game.misses(), 0);

        game.tap_at(Point::new(-100.0, -100.0));
        assert_eq!(game.score(), 1);
        assert_eq!(game.misses(), 1);
        assert_eq!(game.accuracy(), Some(50.0));
    }

    #[test]
    fn input_ignored_unless_running() {
        let (mut game, clock, sink) = game();
        game.hit();
        game.miss();
        assert_eq!(game.score(), 0);
        assert_eq!(game.misses(), 0);

        game.start();
        clock.advance(30_000);
        game.pump();
        game.hit();
        game.miss();
        assert_eq!(game.score(), 0);
        assert_eq!(game.misses(), 0);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn spawns_stay_inside_inset() {
        let (mut game, _, _) = game();
        let sizes = [(104.0, 104.0), (640.0, 360.0), (1920.0, 1080.0), (200.0, 900.0)];
        for (w, h) in sizes {
            game.set_surface(Surface::new(w, h));
            game.start();
            for _ in 0..200 {
                let t = game.target().unwrap();
                assert!(t.x >= DEFAULT_MARGIN && t.x <= w - DEFAULT_TARGET_SIZE - DEFAULT_MARGIN);
                assert!(t.y >= DEFAULT_MARGIN && t.y <= h - DEFAULT_TARGET_SIZE - DEFAULT_MARGIN);
                game.hit();
            }
        }
    }

    #[test]
    fn restart_replaces_countdown() {
        let (mut game, clock, _) = game();
        game.start();
        clock.advance(500);
        game.start();
        assert_eq!(game.timers.pending(), 1);
        clock.advance(1000);
        game.pump();
        assert_eq!(game.time_left(), 29);
    }

    #[test]
    fn reset_stops_countdown_and_is_idempotent() {
        let (mut game, clock, _) = game();
        game.start();
        game.hit();
        game.reset();
        let once = game.snapshot();
        game.reset();
        assert_eq!(game.snapshot(), once);
        assert_eq!(once.phase, AimPhase::Idle);
        assert_eq!(once.score, 0);
        assert_eq!(once.time_left, 30);

        clock.advance(5000);
        game.pump();
        assert_eq!(game.time_left(), 30);
        assert_eq!(game.best(), 1);
    }

    #[test]
    fn custom_round_length() {
        let clock = ManualClock::new();
        let settings = AimSettings {
            round_secs: 5,
            ..AimSettings::default()
        };
        let mut game = AimTrainerGame::new(
            clock.clone(),
            settings,
            StimulusGenerator::seeded(1),
            Feedback::silent(),
        );
        game.start();
        clock.advance(5000);
        game.pump();
        assert_eq!(game.phase(), AimPhase::Stopped);
    }
}
