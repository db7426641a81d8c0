use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// A run of single digits shown by the number memory game
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DigitSequence(Vec<u8>);

impl DigitSequence {
    pub fn new(digits: Vec<u8>) -> Self {
        debug_assert!(digits.iter().all(|d| *d <= 9));
        Self(digits)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn digit(&self, idx: usize) -> Option<u8> {
        self.0.get(idx).copied()
    }

    pub fn digits(&self) -> &[u8] {
        &self.0
    }

    /// Verbatim string comparison against what the player typed
    pub fn matches(&self, entered: &str) -> bool {
        entered.len() == self.0.len()
            && entered
                .bytes()
                .zip(self.0.iter())
                .all(|(c, d)| c == b'0' + d)
    }
}

impl fmt::Display for DigitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.0 {
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Dimensions of the area targets are placed on, as reported by the front end
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Surface {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Random source for every stimulus the games draw
#[derive(Debug, Clone)]
pub struct StimulusGenerator<R: Rng = StdRng> {
    rng: R,
}

impl StimulusGenerator<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<R: Rng> StimulusGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Draw from `[min_ms, max_ms)`. A degenerate range yields `min_ms`.
    pub fn uniform_delay(&mut self, min_ms: u64, max_ms: u64) -> u64 {
        if max_ms <= min_ms {
            return min_ms;
        }
        self.rng.gen_range(min_ms..max_ms)
    }

    pub fn digit_sequence(&mut self, length: usize) -> DigitSequence {
        let digits = (0..length).map(|_| self.rng.gen_range(0..=9u8)).collect();
        DigitSequence::new(digits)
    }

    /// Uniform over `[margin, max(margin, width - size - margin)]` on each
    /// axis, so a target drawn at the point never crosses the inset edge.
    /// Negative or non-finite margins count as 0; an axis whose upper bound is
    /// not finite pins to the margin.
    pub fn point_in_rect(
        &mut self,
        rect_width: f64,
        rect_height: f64,
        target_size: f64,
        margin: f64,
    ) -> Point {
        let margin = if margin.is_finite() { margin.max(0.0) } else { 0.0 };
        let upper = |extent: f64| {
            let hi = extent - target_size - margin;
            if hi.is_finite() {
                hi.max(margin)
            } else {
                margin
            }
        };
        let (max_x, max_y) = (upper(rect_width), upper(rect_height));
        Point {
            x: self.rng.gen_range(margin..=max_x),
            y: self.rng.gen_range(margin..=max_y),
        }
    }

    /// Uniform pick, independent between calls. `None` only for an empty pool.
    pub fn pick_word<'a>(&mut self, pool: &'a [String]) -> Option<&'a str> {
        pool.choose(&mut self.rng).map(String::as_str)
    }
}
