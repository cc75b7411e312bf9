//! Strategy rule engine.
//!
//! Seven fixed heuristics, each mapping an outcome window (newest first)
//! to a recommended play or no signal. Dozen-native strategies can be
//! re-read over halves when advanced halves analysis is on.

use std::collections::BTreeSet;

use super::frequency::{self, Frequencies};
use super::AnalysisResult;
use crate::config::MIN_WINDOW;
use crate::types::{BettingMode, Dozen, DozenStakeMode, Half, Play, Signal, SpinOutcome, Strategy};

/// How many recent spins a dozen (or half) must be absent from to be "sleeping".
pub const SLEEP_THRESHOLD: usize = 7;

/// Evaluate one strategy over a window.
pub fn evaluate(
    window: &[SpinOutcome],
    strategy: Strategy,
    mode: BettingMode,
    advanced_halves: bool,
    dozen_mode: DozenStakeMode,
) -> AnalysisResult {
    let frequencies = frequency::analyze(window);

    if window.len() < MIN_WINDOW {
        return AnalysisResult {
            signal: Signal::AwaitingData,
            rationale: format!("At least {MIN_WINDOW} spins are needed for an initial analysis."),
            frequencies,
            window_size_used: window.len(),
        };
    }

    let (signal, rationale) =
        if mode == BettingMode::Halves && advanced_halves && !strategy.is_half_native() {
            advanced_halves_rule(window, strategy)
        } else {
            native_rule(window, strategy, &frequencies, dozen_mode)
        };

    AnalysisResult {
        signal,
        rationale,
        frequencies,
        window_size_used: window.len(),
    }
}

// ---------------------------------------------------------------------------
// Half counting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct HalfCounts {
    first: usize,
    second: usize,
}

impl HalfCounts {
    /// Every non-zero spin, the middle dozen attributed by sub-variant.
    fn regrouped(window: &[SpinOutcome]) -> Self {
        let mut counts = Self::default();
        for outcome in window {
            match outcome.half() {
                Some(Half::First) => counts.first += 1,
                Some(Half::Second) => counts.second += 1,
                None => {}
            }
        }
        counts
    }

    /// Only the outer dozens; the middle dozen and zero count for neither.
    fn outer_only(window: &[SpinOutcome]) -> Self {
        let mut counts = Self::default();
        for outcome in window {
            match outcome {
                SpinOutcome::D1 => counts.first += 1,
                SpinOutcome::D3 => counts.second += 1,
                _ => {}
            }
        }
        counts
    }

    /// Lower-count half, ties to 1-18.
    fn colder(&self) -> Half {
        if self.first <= self.second {
            Half::First
        } else {
            Half::Second
        }
    }

    /// Higher-count half, ties to 1-18.
    fn hotter(&self) -> Half {
        if self.first >= self.second {
            Half::First
        } else {
            Half::Second
        }
    }
}

fn most_recent_non_zero(window: &[SpinOutcome]) -> Option<SpinOutcome> {
    window.iter().copied().find(|o| !o.is_zero())
}

// ---------------------------------------------------------------------------
// Advanced halves regime
// ---------------------------------------------------------------------------

fn advanced_halves_rule(window: &[SpinOutcome], strategy: Strategy) -> (Signal, String) {
    let counts = HalfCounts::regrouped(window);

    match strategy {
        Strategy::Hybrid | Strategy::ColdCorrection => {
            let half = counts.colder();
            (
                Signal::Opportunity(Play::Half(half)),
                format!(
                    "Half correction (via {strategy}): betting the colder half {half} ({} vs {}).",
                    counts.first, counts.second
                ),
            )
        }
        Strategy::HotTrend => {
            let half = counts.hotter();
            (
                Signal::Opportunity(Play::Half(half)),
                format!(
                    "Half trend (via {strategy}): betting the hotter half {half} ({} vs {}).",
                    counts.first, counts.second
                ),
            )
        }
        Strategy::Follower => match most_recent_non_zero(window).and_then(|o| o.half()) {
            Some(last) => {
                let half = last.opposite();
                (
                    Signal::Opportunity(Play::Half(half)),
                    format!("Half follower: last spin landed in {last}, betting the opposite half {half}."),
                )
            }
            None => (
                Signal::Wait,
                "Half follower: no non-zero spin in the window yet.".to_string(),
            ),
        },
        Strategy::Sleeper => {
            if window.len() < SLEEP_THRESHOLD {
                return (
                    Signal::Wait,
                    format!("Half sleeper needs {SLEEP_THRESHOLD} spins."),
                );
            }
            let recent = &window[..SLEEP_THRESHOLD];
            let saw_first = recent.iter().any(|o| o.half() == Some(Half::First));
            let saw_second = recent.iter().any(|o| o.half() == Some(Half::Second));
            match (saw_first, saw_second) {
                (false, true) => (
                    Signal::Opportunity(Play::Half(Half::First)),
                    format!("Half sleeper: 1-18 has not landed in {SLEEP_THRESHOLD} spins."),
                ),
                (true, false) => (
                    Signal::Opportunity(Play::Half(Half::Second)),
                    format!("Half sleeper: 19-36 has not landed in {SLEEP_THRESHOLD} spins."),
                ),
                _ => (
                    Signal::Wait,
                    "Half sleeper: no single sleeping half.".to_string(),
                ),
            }
        }
        // Half-native strategies never reach this regime.
        Strategy::ColdHalf | Strategy::HotHalf => native_half_rule(window, strategy),
    }
}

// ---------------------------------------------------------------------------
// Native regime
// ---------------------------------------------------------------------------

/// Bet the target itself (single) or the two dozens around it (double).
fn dozen_play(target: Dozen, dozen_mode: DozenStakeMode) -> Play {
    match dozen_mode {
        DozenStakeMode::Single => Play::single(target),
        DozenStakeMode::Double => Play::against(target),
    }
}

fn native_rule(
    window: &[SpinOutcome],
    strategy: Strategy,
    frequencies: &Frequencies,
    dozen_mode: DozenStakeMode,
) -> (Signal, String) {
    match strategy {
        Strategy::Hybrid | Strategy::ColdCorrection => {
            let target = frequencies.coldest();
            let play = dozen_play(target, dozen_mode);
            let label = if strategy == Strategy::Hybrid {
                "Hybrid"
            } else {
                "Correction"
            };
            let rationale = match dozen_mode {
                DozenStakeMode::Single => {
                    format!("{label}: betting the cold dozen {target} to catch up.")
                }
                DozenStakeMode::Double => {
                    format!("{label}: betting against the cold dozen {target} with {play}.")
                }
            };
            (Signal::Opportunity(play), rationale)
        }
        Strategy::HotTrend => {
            let target = frequencies.hottest();
            let play = dozen_play(target, dozen_mode);
            let rationale = match dozen_mode {
                DozenStakeMode::Single => format!("Trend: following the hot dozen {target}."),
                DozenStakeMode::Double => {
                    format!("Trend: fading the hot dozen {target} with {play}.")
                }
            };
            (Signal::Opportunity(play), rationale)
        }
        Strategy::Sleeper => {
            if window.len() < SLEEP_THRESHOLD {
                return (Signal::Wait, format!("Sleeper needs {SLEEP_THRESHOLD} spins."));
            }
            let seen: BTreeSet<Dozen> = window[..SLEEP_THRESHOLD]
                .iter()
                .filter_map(|o| o.dozen())
                .collect();
            let sleeping: Vec<Dozen> = Dozen::ALL.into_iter().filter(|d| !seen.contains(d)).collect();
            match sleeping.as_slice() {
                [target] => {
                    let play = dozen_play(*target, dozen_mode);
                    (
                        Signal::Opportunity(play.clone()),
                        format!(
                            "Sleeper: {target} has not landed in {SLEEP_THRESHOLD} spins, betting {play}."
                        ),
                    )
                }
                _ => (
                    Signal::Wait,
                    format!("Sleeper: {} sleeping dozens, need exactly one.", sleeping.len()),
                ),
            }
        }
        Strategy::Follower => match most_recent_non_zero(window).and_then(|o| o.dozen()) {
            Some(target) => {
                let play = dozen_play(target, dozen_mode);
                (
                    Signal::Opportunity(play.clone()),
                    format!("Follower: last dozen was {target}, betting {play}."),
                )
            }
            None => (
                Signal::Wait,
                "Follower: no dozen has landed in the window yet.".to_string(),
            ),
        },
        Strategy::ColdHalf | Strategy::HotHalf => native_half_rule(window, strategy),
    }
}

fn native_half_rule(window: &[SpinOutcome], strategy: Strategy) -> (Signal, String) {
    let counts = HalfCounts::outer_only(window);
    let (half, label) = if strategy == Strategy::HotHalf {
        (counts.hotter(), "Half trend: betting the hotter half")
    } else {
        (counts.colder(), "Half correction: betting the colder half")
    };
    (
        Signal::Opportunity(Play::Half(half)),
        format!("{label} {half} (D1 {} vs D3 {}).", counts.first, counts.second),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
