use std::collections::VecDeque;

/// Number of reaction results kept for display
pub const REACTION_HISTORY_LEN: usize = 5;

/// Most-recent-N recorder, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct History<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, value: T) {
        self.entries.push_front(value);
        self.entries.truncate(self.capacity);
    }

    pub fn latest(&self) -> Option<&T> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Clone> History<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

impl History<u64> {
    pub fn average(&self) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }
        let sum: u64 = self.entries.iter().sum();
        Some(sum as f64 / self.entries.len() as f64)
    }

    /// Population spread of the retained results; lower means steadier reactions
    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.average()?;
        let variance = self
            .entries
            .iter()
            .map(|v| {
                let diff = mean - *v as f64;
                diff * diff
            })
            .sum::<f64>()
            / self.entries.len() as f64;
        Some(variance.sqrt())
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::with_capacity(REACTION_HISTORY_LEN)
    }
}
