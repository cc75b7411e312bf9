//! Shared types for the SPINWISE engine.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that the strategy, engine and
//! backtest modules can depend on them without circular references.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// A single recorded spin.
///
/// The middle dozen is split in two so it can be attributed to either half
/// of the layout (13-18 belongs to 1-18, 19-24 to 19-36).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpinOutcome {
    D1,
    D2Half1,
    D2Half2,
    D3,
    Zero,
}

impl SpinOutcome {
    pub const ALL: &'static [SpinOutcome] = &[
        SpinOutcome::D1,
        SpinOutcome::D2Half1,
        SpinOutcome::D2Half2,
        SpinOutcome::D3,
        SpinOutcome::Zero,
    ];

    /// The dozen this outcome falls in, collapsing both D2 sub-variants.
    pub fn dozen(&self) -> Option<Dozen> {
        match self {
            SpinOutcome::D1 => Some(Dozen::D1),
            SpinOutcome::D2Half1 | SpinOutcome::D2Half2 => Some(Dozen::D2),
            SpinOutcome::D3 => Some(Dozen::D3),
            SpinOutcome::Zero => None,
        }
    }

    /// The half this outcome falls in. Zero belongs to neither.
    pub fn half(&self) -> Option<Half> {
        match self {
            SpinOutcome::D1 | SpinOutcome::D2Half1 => Some(Half::First),
            SpinOutcome::D3 | SpinOutcome::D2Half2 => Some(Half::Second),
            SpinOutcome::Zero => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, SpinOutcome::Zero)
    }
}

impl fmt::Display for SpinOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpinOutcome::D1 => write!(f, "D1"),
            SpinOutcome::D2Half1 => write!(f, "D2 (13-18)"),
            SpinOutcome::D2Half2 => write!(f, "D2 (19-24)"),
            SpinOutcome::D3 => write!(f, "D3"),
            SpinOutcome::Zero => write!(f, "0"),
        }
    }
}

/// Parse a spin from its short command form (case-insensitive).
impl std::str::FromStr for SpinOutcome {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "d1" | "1" => Ok(SpinOutcome::D1),
            "d2a" | "d2h1" | "2a" => Ok(SpinOutcome::D2Half1),
            "d2b" | "d2h2" | "2b" => Ok(SpinOutcome::D2Half2),
            "d3" | "3" => Ok(SpinOutcome::D3),
            "0" | "zero" | "z" => Ok(SpinOutcome::Zero),
            _ => Err(EngineError::UnknownOutcome(s.to_string())),
        }
    }
}

/// One of the three 12-number groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dozen {
    D1,
    D2,
    D3,
}

impl Dozen {
    pub const ALL: [Dozen; 3] = [Dozen::D1, Dozen::D2, Dozen::D3];

    /// The two dozens other than this one.
    pub fn others(&self) -> BTreeSet<Dozen> {
        Dozen::ALL.into_iter().filter(|d| d != self).collect()
    }
}

impl fmt::Display for Dozen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dozen::D1 => write!(f, "D1"),
            Dozen::D2 => write!(f, "D2"),
            Dozen::D3 => write!(f, "D3"),
        }
    }
}

/// One of the two 18-number groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Half {
    /// 1-18
    First,
    /// 19-36
    Second,
}

impl Half {
    pub fn opposite(&self) -> Self {
        match self {
            Half::First => Half::Second,
            Half::Second => Half::First,
        }
    }
}

impl fmt::Display for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Half::First => write!(f, "1-18"),
            Half::Second => write!(f, "19-36"),
        }
    }
}

// ---------------------------------------------------------------------------
// Strategies & modes
// ---------------------------------------------------------------------------

/// The fixed set of heuristics the rule engine knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strategy {
    Hybrid,
    ColdCorrection,
    HotTrend,
    Sleeper,
    Follower,
    ColdHalf,
    HotHalf,
}

impl Strategy {
    /// All known strategies (useful for iteration).
    pub const ALL: [Strategy; 7] = [
        Strategy::Hybrid,
        Strategy::ColdCorrection,
        Strategy::HotTrend,
        Strategy::Sleeper,
        Strategy::Follower,
        Strategy::ColdHalf,
        Strategy::HotHalf,
    ];

    /// Whether the strategy is only defined over halves.
    pub fn is_half_native(&self) -> bool {
        matches!(self, Strategy::ColdHalf | Strategy::HotHalf)
    }

    /// Position in [`Strategy::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Hybrid => write!(f, "hybrid"),
            Strategy::ColdCorrection => write!(f, "cold-correction"),
            Strategy::HotTrend => write!(f, "hot-trend"),
            Strategy::Sleeper => write!(f, "sleeper"),
            Strategy::Follower => write!(f, "follower"),
            Strategy::ColdHalf => write!(f, "cold-half"),
            Strategy::HotHalf => write!(f, "hot-half"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hybrid" => Ok(Strategy::Hybrid),
            "cold-correction" | "cold" => Ok(Strategy::ColdCorrection),
            "hot-trend" | "hot" => Ok(Strategy::HotTrend),
            "sleeper" => Ok(Strategy::Sleeper),
            "follower" => Ok(Strategy::Follower),
            "cold-half" => Ok(Strategy::ColdHalf),
            "hot-half" => Ok(Strategy::HotHalf),
            _ => Err(EngineError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Granularity a recommendation is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BettingMode {
    #[default]
    Dozens,
    Halves,
}

impl fmt::Display for BettingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BettingMode::Dozens => write!(f, "dozens"),
            BettingMode::Halves => write!(f, "halves"),
        }
    }
}

/// In dozens mode, whether a wager covers one dozen or two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DozenStakeMode {
    Single,
    #[default]
    Double,
}

impl DozenStakeMode {
    /// Number of table positions one wager is split across.
    pub fn unit_count(&self) -> u32 {
        match self {
            DozenStakeMode::Single => 1,
            DozenStakeMode::Double => 2,
        }
    }
}

impl fmt::Display for DozenStakeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DozenStakeMode::Single => write!(f, "single"),
            DozenStakeMode::Double => write!(f, "double"),
        }
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

/// One simulated staking configuration of a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScenarioKind {
    DozensSingle,
    DozensDouble,
    HalvesStandard,
    HalvesAdvanced,
}

impl ScenarioKind {
    /// The scenarios a strategy owns a ledger for.
    pub fn for_strategy(strategy: Strategy) -> &'static [ScenarioKind] {
        if strategy.is_half_native() {
            &[ScenarioKind::HalvesStandard]
        } else {
            &[
                ScenarioKind::DozensSingle,
                ScenarioKind::DozensDouble,
                ScenarioKind::HalvesAdvanced,
            ]
        }
    }

    /// The scenario shown for a strategy under the given display settings.
    pub fn select(strategy: Strategy, mode: BettingMode, dozen_mode: DozenStakeMode) -> Self {
        if strategy.is_half_native() {
            return ScenarioKind::HalvesStandard;
        }
        match (mode, dozen_mode) {
            (BettingMode::Halves, _) => ScenarioKind::HalvesAdvanced,
            (BettingMode::Dozens, DozenStakeMode::Single) => ScenarioKind::DozensSingle,
            (BettingMode::Dozens, DozenStakeMode::Double) => ScenarioKind::DozensDouble,
        }
    }

    pub fn betting_mode(&self) -> BettingMode {
        match self {
            ScenarioKind::DozensSingle | ScenarioKind::DozensDouble => BettingMode::Dozens,
            ScenarioKind::HalvesStandard | ScenarioKind::HalvesAdvanced => BettingMode::Halves,
        }
    }

    /// Dozen submode, only meaningful for the dozens scenarios.
    pub fn dozen_stake_mode(&self) -> Option<DozenStakeMode> {
        match self {
            ScenarioKind::DozensSingle => Some(DozenStakeMode::Single),
            ScenarioKind::DozensDouble => Some(DozenStakeMode::Double),
            _ => None,
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioKind::DozensSingle => write!(f, "dozens/single"),
            ScenarioKind::DozensDouble => write!(f, "dozens/double"),
            ScenarioKind::HalvesStandard => write!(f, "halves/standard"),
            ScenarioKind::HalvesAdvanced => write!(f, "halves/advanced"),
        }
    }
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// A concrete recommended wager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Play {
    Dozens(BTreeSet<Dozen>),
    Half(Half),
}

impl Play {
    pub fn single(dozen: Dozen) -> Self {
        Play::Dozens(BTreeSet::from([dozen]))
    }

    pub fn against(dozen: Dozen) -> Self {
        Play::Dozens(dozen.others())
    }

    /// Whether a non-zero outcome wins this play.
    pub fn covers(&self, outcome: SpinOutcome) -> bool {
        match self {
            Play::Dozens(dozens) => outcome.dozen().is_some_and(|d| dozens.contains(&d)),
            Play::Half(half) => outcome.half() == Some(*half),
        }
    }
}

impl fmt::Display for Play {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Play::Dozens(dozens) => {
                let names: Vec<String> = dozens.iter().map(|d| d.to_string()).collect();
                write!(f, "{}", names.join(" and "))
            }
            Play::Half(half) => write!(f, "{half}"),
        }
    }
}

/// What an analysis concluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    /// Fewer than the minimum number of outcomes in the window.
    AwaitingData,
    /// Enough data, but no rule fired (or none of the active strategies did).
    Wait,
    Opportunity(Play),
    NoActiveStrategies,
    /// Two or more plays tied for the most votes.
    Conflict,
}

impl Signal {
    pub fn is_opportunity(&self) -> bool {
        matches!(self, Signal::Opportunity(_))
    }

    pub fn play(&self) -> Option<&Play> {
        match self {
            Signal::Opportunity(play) => Some(play),
            _ => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::AwaitingData => write!(f, "Awaiting more data..."),
            Signal::Wait => write!(f, "Wait"),
            Signal::Opportunity(play) => write!(f, "{play}"),
            Signal::NoActiveStrategies => write!(f, "No active strategies"),
            Signal::Conflict => write!(f, "Strategy conflict"),
        }
    }
}

/// Settled result of a simulated bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetResult {
    Win,
    Loss,
}

impl fmt::Display for BetResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetResult::Win => write!(f, "WIN"),
            BetResult::Loss => write!(f, "LOSS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for SPINWISE.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Configuration error: {field} {reason}")]
    Config { field: &'static str, reason: &'static str },

    #[error("Unknown outcome: {0}")]
    UnknownOutcome(String),

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
