use std::str::FromStr;
use std::time::Duration;

use futures::future::BoxFuture;

use crate::core::definitions::Square;
use crate::core::engine::Piece;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    AttackerWins,
    DefenderWins,
}

/// Snapshot of both sides of a contested capture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombatRequest {
    pub attacker: Piece,
    pub defender: Piece,
}

impl CombatRequest {
    pub fn winner(&self, verdict: Verdict) -> &Piece {
        match verdict {
            Verdict::AttackerWins => &self.attacker,
            Verdict::DefenderWins => &self.defender,
        }
    }

    pub fn loser(&self, verdict: Verdict) -> &Piece {
        match verdict {
            Verdict::AttackerWins => &self.defender,
            Verdict::DefenderWins => &self.attacker,
        }
    }
}

/// Anything but `Idle` means player input is locked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResolverState {
    #[default]
    Idle,
    AwaitingVerdict,
    Narrating,
}

impl ResolverState {
    pub fn is_locked(&self) -> bool {
        !matches!(self, ResolverState::Idle)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdjudicationError {
    #[error("decision source failed: {0}")]
    Source(String),
    #[error("decision source did not answer within {0:?}")]
    Timeout(Duration),
    #[error("another combat is already being adjudicated")]
    Busy,
    #[error("decision source is disconnected")]
    Disconnected,
}

/// The language model, or whatever stands in for it.
pub trait DecisionSource: Send + Sync {
    fn prompt(&self, text: String) -> BoxFuture<'_, Result<String, AdjudicationError>>;
}

/// Chat bubble that reveals text progressively.
pub trait NarrationSink: Send + Sync {
    fn show_dialogue(&self, text: &str, anchor: Square);
    fn close_dialogue(&self);
    fn is_writing(&self) -> bool;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VictoryPolicy {
    /// Ask the decision source who wins.
    #[default]
    Adjudicated,
    /// Fair coin, the source is only used for narration.
    CoinFlip,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Report the error; the capture is abandoned.
    #[default]
    Abort,
    /// Log the error and settle the fight with a coin flip.
    CoinFlip,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CombatConfig {
    pub victory: VictoryPolicy,
    pub on_failure: FailurePolicy,
    pub verdict_timeout: Duration,
    pub narrative_timeout: Duration,
    pub narration_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for CombatConfig {
    fn default() -> Self {
        CombatConfig {
            victory: VictoryPolicy::Adjudicated,
            on_failure: FailurePolicy::Abort,
            verdict_timeout: Duration::from_secs(30),
            narrative_timeout: Duration::from_secs(30),
            narration_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(2000),
        }
    }
}

impl CombatConfig {
    pub fn with_victory(mut self, victory: VictoryPolicy) -> Self {
        self.victory = victory;
        self
    }

    pub fn with_failure_policy(mut self, on_failure: FailurePolicy) -> Self {
        self.on_failure = on_failure;
        self
    }

    pub fn with_verdict_timeout(mut self, timeout: Duration) -> Self {
        self.verdict_timeout = timeout;
        self
    }

    pub fn with_narrative_timeout(mut self, timeout: Duration) -> Self {
        self.narrative_timeout = timeout;
        self
    }

    pub fn with_narration_timeout(mut self, timeout: Duration) -> Self {
        self.narration_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("unknown policy '{0}', expected `adjudicated`, `abort` or `coinflip`")]
pub struct ParsePolicyError(pub String);

impl FromStr for VictoryPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adjudicated" | "model" => Ok(VictoryPolicy::Adjudicated),
            "coinflip" | "random" => Ok(VictoryPolicy::CoinFlip),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "coinflip" | "random" => Ok(FailurePolicy::CoinFlip),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}
