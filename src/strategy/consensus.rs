//! Consensus voting.
//!
//! Runs every active strategy over the same window and reduces their
//! recommendations to a single play by plurality vote.

use tracing::debug;

use super::{frequency, rules, AnalysisResult};
use crate::config::{Configuration, MIN_WINDOW};
use crate::types::{BettingMode, Play, Signal, SpinOutcome, Strategy};

/// Votes collected for one distinct play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteBucket {
    pub play: Play,
    pub strategies: Vec<Strategy>,
}

impl VoteBucket {
    pub fn votes(&self) -> usize {
        self.strategies.len()
    }
}

/// Group opportunistic results by play and order the buckets by vote count.
///
/// Buckets with equal counts keep the order in which their play was first
/// proposed.
pub fn tally(suggestions: &[(Strategy, Play)]) -> Vec<VoteBucket> {
    let mut buckets: Vec<VoteBucket> = Vec::new();
    for (strategy, play) in suggestions {
        match buckets.iter_mut().find(|b| &b.play == play) {
            Some(bucket) => bucket.strategies.push(*strategy),
            None => buckets.push(VoteBucket {
                play: play.clone(),
                strategies: vec![*strategy],
            }),
        }
    }
    buckets.sort_by(|a, b| b.votes().cmp(&a.votes()));
    buckets
}

/// Combine all active strategies over the most recent analysis window.
///
/// `history` is the full outcome log, newest first.
pub fn run(history: &[SpinOutcome], config: &Configuration, mode: BettingMode) -> AnalysisResult {
    let window = &history[..history.len().min(config.analysis_window_size)];
    let frequencies = frequency::analyze(window);
    let window_size_used = window.len();

    let sentinel = |signal: Signal, rationale: String| AnalysisResult {
        signal,
        rationale,
        frequencies: frequencies.clone(),
        window_size_used,
    };

    if window.len() < MIN_WINDOW {
        return sentinel(
            Signal::AwaitingData,
            format!(
                "At least {MIN_WINDOW} spins (of a {}-spin window) are needed for an analysis.",
                config.analysis_window_size
            ),
        );
    }

    if config.active_strategies.is_empty() {
        return sentinel(
            Signal::NoActiveStrategies,
            "Activate at least one strategy in the settings.".to_string(),
        );
    }

    let suggestions: Vec<(Strategy, Play)> = config
        .active_strategies
        .iter()
        .filter_map(|strategy| {
            let result = rules::evaluate(
                window,
                *strategy,
                mode,
                config.advanced_halves_enabled,
                config.dozen_stake_mode,
            );
            result.play().cloned().map(|play| (*strategy, play))
        })
        .collect();

    if suggestions.is_empty() {
        return sentinel(
            Signal::Wait,
            "No active strategy found a clear opportunity.".to_string(),
        );
    }

    let buckets = tally(&suggestions);
    debug!(
        strategies = config.active_strategies.len(),
        suggestions = suggestions.len(),
        buckets = buckets.len(),
        "Votes tallied"
    );

    if let [first, second, ..] = buckets.as_slice() {
        if first.votes() == second.votes() {
            return sentinel(
                Signal::Conflict,
                format!(
                    "{} plays tied at {} vote(s); no clear consensus.",
                    buckets.iter().filter(|b| b.votes() == first.votes()).count(),
                    first.votes()
                ),
            );
        }
    }

    let winner = &buckets[0];
    let names: Vec<String> = winner.strategies.iter().map(|s| s.to_string()).collect();
    sentinel(
        Signal::Opportunity(winner.play.clone()),
        format!(
            "Consensus of {} strategy(ies) ({}): suggest {}.",
            winner.votes(),
            names.join(", "),
            winner.play
        ),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
