//! Chain Integrity Evaluator (C8): pure, on-demand classification of a
//! chain's outcome from its steps' statuses. Timing does not factor in.

use serde::{Deserialize, Serialize};

use crate::chain::{ChainStep, StepStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainIntegrity {
    Intact,
    Broken,
}

/// `intact` iff every required step completed; optional steps may be
/// skipped. Late-but-complete is still `intact` (§4.8).
pub fn evaluate_chain_integrity(steps: &[ChainStep]) -> ChainIntegrity {
    let all_required_completed = steps
        .iter()
        .filter(|s| s.is_required)
        .all(|s| s.status == StepStatus::Completed);

    if all_required_completed {
        ChainIntegrity::Intact
    } else {
        ChainIntegrity::Broken
    }
}
