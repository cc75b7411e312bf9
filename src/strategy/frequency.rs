//! Frequency analysis.
//!
//! Reduces an outcome window to per-dozen counts and hot/cold labels.

use serde::{Deserialize, Serialize};

use crate::types::{Dozen, SpinOutcome};

/// Raw counts per dozen plus zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DozenCounts {
    pub d1: usize,
    pub d2: usize,
    pub d3: usize,
    pub zero: usize,
}

impl DozenCounts {
    pub fn get(&self, dozen: Dozen) -> usize {
        match dozen {
            Dozen::D1 => self.d1,
            Dozen::D2 => self.d2,
            Dozen::D3 => self.d3,
        }
    }

    /// Sum of all buckets, zero included.
    pub fn total(&self) -> usize {
        self.d1 + self.d2 + self.d3 + self.zero
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frequencies {
    pub counts: DozenCounts,
    /// Dozens tied for the highest count; `hot[0]` is the trend target.
    pub hot: Vec<Dozen>,
    /// Dozens tied for the lowest count; `cold[0]` is the correction target.
    pub cold: Vec<Dozen>,
}

impl Frequencies {
    pub fn hottest(&self) -> Dozen {
        self.hot.first().copied().unwrap_or(Dozen::D3)
    }

    pub fn coldest(&self) -> Dozen {
        self.cold.first().copied().unwrap_or(Dozen::D1)
    }
}

/// Count a window (newest first) into dozen buckets.
///
/// Dozens are ranked by a stable ascending sort on count. `cold` lists the
/// minimum ties in that order, `hot` lists the maximum ties from the top of
/// the ranking down, so with every count equal `cold` starts at D1 and `hot`
/// starts at D3.
pub fn analyze(window: &[SpinOutcome]) -> Frequencies {
    let mut counts = DozenCounts::default();
    for outcome in window {
        match outcome.dozen() {
            Some(Dozen::D1) => counts.d1 += 1,
            Some(Dozen::D2) => counts.d2 += 1,
            Some(Dozen::D3) => counts.d3 += 1,
            None => counts.zero += 1,
        }
    }

    let mut ranked = Dozen::ALL;
    ranked.sort_by_key(|d| counts.get(*d));

    let min = counts.get(ranked[0]);
    let max = counts.get(ranked[2]);

    let cold = ranked
        .iter()
        .copied()
        .take_while(|d| counts.get(*d) == min)
        .collect();
    let hot = ranked
        .iter()
        .rev()
        .copied()
        .take_while(|d| counts.get(*d) == max)
        .collect();

    Frequencies { counts, hot, cold }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
