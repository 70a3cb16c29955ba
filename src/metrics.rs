//! Optional per-stage observability hook.
use std::fmt;
use std::time::Duration;

/// Pipeline stage captured in metrics observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Normalize,
    Embed,
    Persist,
    Retrieve,
    Match,
    Rank,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Normalize => "normalize",
            Stage::Embed => "embed",
            Stage::Persist => "persist",
            Stage::Retrieve => "retrieve",
            Stage::Match => "match",
            Stage::Rank => "rank",
        };
        f.write_str(name)
    }
}

/// Observer for stage latency and outcome.
///
/// Installed per [`crate::Core`] at construction; there is no global
/// recorder. Implementations are called synchronously on the query path and
/// should be cheap.
pub trait QueryMetrics: Send + Sync {
    fn record_stage(&self, stage: Stage, latency: Duration, ok: bool);
}
