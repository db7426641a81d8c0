// Behavioural properties of the four games, checked across many seeds.
use assert_matches::assert_matches;

use noorpath::{
    aim::{AimSettings, AimTrainerGame, DEFAULT_MARGIN, DEFAULT_TARGET_SIZE},
    feedback::{Feedback, FeedbackError, FeedbackEvent, FeedbackSink},
    history::REACTION_HISTORY_LEN,
    number_memory::{NumberMemoryGame, NumberPhase},
    reaction::{ReactionGame, ReactionPhase},
    stimulus::{StimulusGenerator, Surface},
    verbal_memory::{VerbalMemoryGame, VerbalPhase, WordPool},
    AimPhase, Clock, ManualClock,
};

const SEEDS: std::ops::Range<u64> = 0..25;

struct FailingSink;

impl FeedbackSink for FailingSink {
    fn play(&self, _event: FeedbackEvent) -> Result<(), FeedbackError> {
        Err(FeedbackError::Unavailable)
    }
}

fn go(game: &mut ReactionGame<ManualClock>, clock: &ManualClock) {
    clock.set(game.next_deadline().unwrap());
    game.pump();
}

#[test]
fn reaction_best_is_running_minimum() {
    for seed in SEEDS {
        let clock = ManualClock::new();
        let mut game = ReactionGame::new(
            clock.clone(),
            StimulusGenerator::seeded(seed),
            Feedback::silent(),
        );
        let mut delays = StimulusGenerator::seeded(seed + 1000);
        let mut recorded = vec![];

        for attempt in 0..12usize {
            game.tap();
            go(&mut game, &clock);
            let wait = delays.uniform_delay(0, 900);
            clock.advance(wait);
            game.tap();
            recorded.push(wait);

            assert_eq!(game.last_time(), Some(wait));
            assert_eq!(game.best_time(), recorded.iter().min().copied());
            assert_eq!(game.history().len(), (attempt + 1).min(REACTION_HISTORY_LEN));
            assert_eq!(game.history().latest(), Some(&wait));
        }
    }
}

#[test]
fn reaction_time_never_negative_under_skew() {
    for seed in SEEDS {
        let clock = ManualClock::starting_at(50_000);
        let mut game = ReactionGame::new(
            clock.clone(),
            StimulusGenerator::seeded(seed),
            Feedback::silent(),
        );
        game.start();
        go(&mut game, &clock);
        clock.set(clock.now_ms().saturating_sub(seed * 37));
        game.tap();
        assert_eq!(game.phase(), ReactionPhase::Result);
        assert_eq!(game.last_time(), Some(0));
    }
}

#[test]
fn reaction_early_tap_never_records() {
    for seed in SEEDS {
        let clock = ManualClock::new();
        let mut game = ReactionGame::new(
            clock.clone(),
            StimulusGenerator::seeded(seed),
            Feedback::silent(),
        );
        game.start();
        let due = game.next_deadline().unwrap();
        clock.set(due - 1 - seed);
        game.tap();
        assert_matches!(game.phase(), ReactionPhase::TooSoon);
        assert_eq!(game.last_time(), None);
        assert_eq!(game.best_time(), None);
        assert!(game.history().is_empty());
    }
}

#[test]
fn aim_targets_stay_inside_any_surface() {
    for seed in SEEDS {
        let mut game = AimTrainerGame::new(
            ManualClock::new(),
            AimSettings::default(),
            StimulusGenerator::seeded(seed),
            Feedback::silent(),
        );
        let min_edge = DEFAULT_TARGET_SIZE + 2.0 * DEFAULT_MARGIN;
        let w = min_edge + (seed as f64) * 53.0;
        let h = min_edge + (seed as f64) * 17.0;
        game.set_surface(Surface::new(w, h));
        game.start();
        for _ in 0..100 {
            let t = game.target().unwrap();
            assert!(t.x >= DEFAULT_MARGIN && t.x <= w - DEFAULT_TARGET_SIZE - DEFAULT_MARGIN);
            assert!(t.y >= DEFAULT_MARGIN && t.y <= h - DEFAULT_TARGET_SIZE - DEFAULT_MARGIN);
            if seed % 2 == 0 {
                game.hit();
            } else {
                game.miss();
            }
        }
    }
}

#[test]
fn aim_thirty_ticks_always_stop() {
    for seed in SEEDS {
        let clock = ManualClock::new();
        let mut game = AimTrainerGame::new(
            clock.clone(),
            AimSettings::default(),
            StimulusGenerator::seeded(seed),
            Feedback::silent(),
        );
        game.set_surface(Surface::new(800.0, 600.0));
        game.start();
        for tick in 0..30u64 {
            for _ in 0..(tick + seed) % 4 {
                game.hit();
            }
            if (tick * seed) % 3 == 0 {
                game.miss();
            }
            clock.advance(1000);
            game.pump();
        }
        assert_eq!(game.phase(), AimPhase::Stopped);
        assert_eq!(game.time_left(), 0);
    }
}

#[test]
fn number_length_grows_by_one() {
    for seed in SEEDS {
        let clock = ManualClock::new();
        let mut game = NumberMemoryGame::new(
            clock.clone(),
            StimulusGenerator::seeded(seed),
            Feedback::silent(),
        );
        game.start();
        for _ in 0..8 {
            while game.phase() == NumberPhase::Show {
                clock.set(game.next_deadline().unwrap());
                game.pump();
            }
            let previous = game.length();
            let answer = game.sequence().to_string();
            game.set_input(&answer);
            game.submit();
            assert_eq!(game.length(), previous + 1);
            assert_eq!(game.sequence().len(), previous + 1);
            assert!(game.best() >= game.length());
        }
    }
}

#[test]
fn number_wrong_answer_always_ends_run() {
    for seed in SEEDS {
        let clock = ManualClock::new();
        let mut game = NumberMemoryGame::new(
            clock.clone(),
            StimulusGenerator::seeded(seed),
            Feedback::silent(),
        );
        game.start();
        while game.phase() == NumberPhase::Show {
            clock.set(game.next_deadline().unwrap());
            game.pump();
        }
        let answer = game.sequence().to_string();
        let last = answer.chars().last().unwrap().to_digit(10).unwrap();
        let wrong = format!("{}{}", &answer[..answer.len() - 1], (last + 1) % 10);
        game.set_input(&wrong);
        game.submit();
        assert_eq!(game.phase(), NumberPhase::Result);
        assert_eq!(game.length(), 1);
    }
}

#[test]
fn verbal_three_misjudgments_end_run() {
    for seed in SEEDS {
        let mut game = VerbalMemoryGame::new(
            WordPool::embedded().unwrap(),
            StimulusGenerator::seeded(seed),
            Feedback::silent(),
        );
        game.start();
        for _ in 0..3 {
            let word = game.current_word().unwrap().to_string();
            let truth = game.has_seen(&word);
            game.mark_seen(!truth);
        }
        assert_eq!(game.phase(), VerbalPhase::Result);
        assert_eq!(game.lives(), 0);
    }
}

#[test]
fn verbal_honest_player_never_loses_lives() {
    for seed in SEEDS {
        let mut game = VerbalMemoryGame::new(
            WordPool::embedded().unwrap(),
            StimulusGenerator::seeded(seed),
            Feedback::silent(),
        );
        game.start();
        for n in 1..=100u32 {
            let word = game.current_word().unwrap().to_string();
            let truth = game.has_seen(&word);
            game.mark_seen(truth);
            assert_eq!(game.score(), n);
            assert_eq!(game.lives(), 3);
        }
    }
}

#[test]
fn double_reset_matches_single_reset() {
    let clock = ManualClock::new();
    let mut reaction = ReactionGame::new(
        clock.clone(),
        StimulusGenerator::seeded(1),
        Feedback::silent(),
    );
    let mut aim = AimTrainerGame::new(
        clock.clone(),
        AimSettings::default(),
        StimulusGenerator::seeded(1),
        Feedback::silent(),
    );
    let mut number = NumberMemoryGame::new(
        clock.clone(),
        StimulusGenerator::seeded(1),
        Feedback::silent(),
    );
    let mut verbal = VerbalMemoryGame::new(
        WordPool::embedded().unwrap(),
        StimulusGenerator::seeded(1),
        Feedback::silent(),
    );

    reaction.start();
    aim.start();
    number.start();
    verbal.start();
    clock.advance(2500);
    reaction.pump();
    aim.pump();
    number.pump();

    reaction.reset();
    aim.reset();
    number.reset();
    verbal.reset();
    let once = (
        reaction.snapshot(),
        aim.snapshot(),
        number.snapshot(),
        verbal.snapshot(),
    );

    reaction.reset();
    aim.reset();
    number.reset();
    verbal.reset();
    assert_eq!(
        (
            reaction.snapshot(),
            aim.snapshot(),
            number.snapshot(),
            verbal.snapshot()
        ),
        once
    );
}

/// Plays a fixed script through every game and returns their snapshots
fn scripted_sessions(
    feedback: impl Fn() -> Feedback,
) -> (
    noorpath::reaction::ReactionSnapshot,
    noorpath::aim::AimSnapshot,
    noorpath::number_memory::NumberSnapshot,
    noorpath::verbal_memory::VerbalSnapshot,
) {
    let clock = ManualClock::new();

    let mut reaction = ReactionGame::new(clock.clone(), StimulusGenerator::seeded(3), feedback());
    reaction.tap();
    reaction.tap();
    reaction.tap();
    go(&mut reaction, &clock);
    clock.advance(240);
    reaction.tap();

    let mut aim = AimTrainerGame::new(
        clock.clone(),
        AimSettings::default(),
        StimulusGenerator::seeded(3),
        feedback(),
    );
    aim.set_surface(Surface::new(640.0, 360.0));
    aim.start();
    aim.hit();
    aim.miss();
    aim.hit();
    clock.advance(3000);
    aim.pump();

    let mut number = NumberMemoryGame::new(clock.clone(), StimulusGenerator::seeded(3), feedback());
    number.start();
    for _ in 0..2 {
        while number.phase() == NumberPhase::Show {
            clock.set(number.next_deadline().unwrap());
            number.pump();
        }
        let answer = number.sequence().to_string();
        number.set_input(&answer);
        number.submit();
    }
    while number.phase() == NumberPhase::Show {
        clock.set(number.next_deadline().unwrap());
        number.pump();
    }
    number.set_input("x");
    number.submit();

    let mut verbal = VerbalMemoryGame::new(
        WordPool::embedded().unwrap(),
        StimulusGenerator::seeded(3),
        feedback(),
    );
    verbal.start();
    for n in 0..10 {
        let word = verbal.current_word().unwrap().to_string();
        let truth = verbal.has_seen(&word);
        verbal.mark_seen(if n % 4 == 3 { !truth } else { truth });
    }

    (
        reaction.snapshot(),
        aim.snapshot(),
        number.snapshot(),
        verbal.snapshot(),
    )
}

#[test]
fn failing_feedback_leaves_sessions_untouched() {
    let silent = scripted_sessions(Feedback::silent);
    let failing = scripted_sessions(|| Feedback::new(FailingSink));
    assert_eq!(failing, silent);
    assert_eq!(silent.0.phase, ReactionPhase::Result);
    assert_eq!(silent.1.score, 2);
    assert_eq!(silent.2.phase, NumberPhase::Result);
    assert_eq!(silent.3.lives, 1);
}
