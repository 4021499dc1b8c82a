//! Structured errors the core returns to its caller (§7).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Malformed input: bad interval, `sleep_time <= plan_start`, unknown
    /// energy level, `anchor.end > sleep_time` (§9 Open Question).
    #[error("invalid input: {detail}")]
    InvalidInput { detail: String },

    /// An invariant the assembler could not satisfy: overlap, missing
    /// exit-gate, an unresolved envelope conflict. The core never attempts
    /// to repair these; no partial plan is emitted.
    #[error("invariant violated at {location}: {detail}")]
    InvariantViolated { location: String, detail: String },
}
