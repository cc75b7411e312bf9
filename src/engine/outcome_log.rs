//! Outcome log: the append/remove-only record of raw spins.

use serde::{Deserialize, Serialize};

use crate::types::SpinOutcome;

/// Spins in chronological order. Push and pop work at the tail; readers get
/// newest-first copies bounded by the size they ask for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeLog {
    spins: Vec<SpinOutcome>,
}

impl OutcomeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a spin and return the chronological position it took.
    pub fn push(&mut self, outcome: SpinOutcome) -> usize {
        self.spins.push(outcome);
        self.spins.len() - 1
    }

    /// Remove the newest spin. Its chronological position is the new `len()`.
    pub fn pop(&mut self) -> Option<SpinOutcome> {
        self.spins.pop()
    }

    pub fn latest(&self) -> Option<SpinOutcome> {
        self.spins.last().copied()
    }

    /// The most recent `size` spins, newest first.
    pub fn window(&self, size: usize) -> Vec<SpinOutcome> {
        self.spins.iter().rev().take(size).copied().collect()
    }

    /// The whole log, newest first.
    pub fn newest_first(&self) -> Vec<SpinOutcome> {
        self.window(self.spins.len())
    }

    pub fn len(&self) -> usize {
        self.spins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SpinOutcome::*;

    #[test]
    fn test_push_returns_position() {
        let mut log = OutcomeLog::new();
        assert_eq!(log.push(D1), 0);
        assert_eq!(log.push(D3), 1);
        assert_eq!(log.push(Zero), 2);
        assert_eq!(log.newest_first(), vec![Zero, D3, D1]);
        assert_eq!(log.latest(), Some(Zero));
    }

    #[test]
    fn test_pop_restores_previous() {
        let mut log = OutcomeLog::new();
        log.push(D1);
        log.push(D2Half2);
        assert_eq!(log.pop(), Some(D2Half2));
        assert_eq!(log.len(), 1);
        assert_eq!(log.newest_first(), vec![D1]);
        assert_eq!(log.push(D3), 1);
    }

    #[test]
    fn test_pop_empty() {
        let mut log = OutcomeLog::new();
        assert_eq!(log.pop(), None);
        assert!(log.is_empty());
        assert_eq!(log.latest(), None);
    }

    #[test]
    fn test_window_clamps() {
        let mut log = OutcomeLog::new();
        for o in [D2Half1, D1, D3, D1] {
            log.push(o);
        }
        assert_eq!(log.window(2), vec![D1, D3]);
        assert_eq!(log.window(10).len(), 4);
        assert!(log.window(0).is_empty());
    }

    #[test]
    fn test_window_on_long_log() {
        let mut log = OutcomeLog::new();
        for i in 0..10_000 {
            log.push(if i % 2 == 0 { D1 } else { D3 });
        }
        log.push(Zero);
        let window = log.window(5);
        assert_eq!(window.len(), 5);
        assert_eq!(window[0], Zero);
        assert_eq!(window[1], D3);
    }
}
