//! Chain Step Composer + Reverse Reflow Engine (C3 + C4).
//!
//! Builds, per anchor, the ordered list of preparatory steps reverse-planned
//! from the chain completion deadline, followed by the envelope's
//! travel/anchor/recovery slots surfaced as chain steps.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::anchor::{Anchor, AnchorType};
use crate::config::PlannerConfig;
use crate::envelope::{build_envelope, CommitmentEnvelope, EnvelopeSlot};

/// One entry in a per-anchor-type step template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTemplateEntry {
    pub name: String,
    pub duration: i32,
    pub is_required: bool,
    pub can_skip_when_late: bool,
    pub is_exit_gate: bool,
}

impl StepTemplateEntry {
    pub fn required(name: impl Into<String>, duration: i32) -> Self {
        Self {
            name: name.into(),
            duration,
            is_required: true,
            can_skip_when_late: false,
            is_exit_gate: false,
        }
    }

    pub fn optional_skippable_when_late(name: impl Into<String>, duration: i32) -> Self {
        Self {
            name: name.into(),
            duration,
            is_required: false,
            can_skip_when_late: true,
            is_exit_gate: false,
        }
    }

    pub fn exit_gate(name: impl Into<String>, duration: i32) -> Self {
        Self {
            name: name.into(),
            duration,
            is_required: true,
            can_skip_when_late: false,
            is_exit_gate: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    ChainStep,
    ExitGate,
    Anchor,
    Recovery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Skipped,
}

/// A concrete action inside a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStep {
    pub id: String,
    pub chain_id: String,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration: i32,
    pub is_required: bool,
    pub can_skip_when_late: bool,
    pub status: StepStatus,
    pub skip_reason: Option<String>,
    pub role: Role,
}

impl ChainStep {
    fn from_slot(chain_id: &str, id_suffix: &str, name: &str, slot: &EnvelopeSlot, role: Role) -> Self {
        Self {
            id: format!("{chain_id}-{id_suffix}"),
            chain_id: chain_id.to_string(),
            name: name.to_string(),
            start: slot.start,
            end: slot.end,
            duration: slot.duration,
            is_required: true,
            can_skip_when_late: false,
            status: StepStatus::Pending,
            skip_reason: None,
            role,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainStatus {
    Pending,
    InProgress,
    Completed,
    Broken,
}

/// One per anchor: the envelope plus the concrete, timed step sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionChain {
    pub chain_id: String,
    pub anchor: Anchor,
    pub envelope: CommitmentEnvelope,
    pub steps: Vec<ChainStep>,
    pub chain_completion_deadline: DateTime<Utc>,
    pub status: ChainStatus,
    pub overrun_before_plan_start: bool,
    pub envelope_conflict: bool,
}

impl ExecutionChain {
    /// `[travel_there.start, recovery.end)` — the span two chains' envelopes
    /// must not overlap on (§4.3: overlap is permitted for prep only).
    pub fn envelope_span(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.envelope.travel_there.start, self.envelope.recovery.end)
    }
}

fn template_for<'a>(anchor_type: AnchorType, config: &'a PlannerConfig) -> &'a [StepTemplateEntry] {
    config
        .step_templates_by_anchor_type
        .get(&anchor_type)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Build one chain for one anchor. Does not resolve cross-chain conflicts or
/// the plan-start overrun rule — see [`build_chains`] for the full pipeline.
fn build_chain(anchor: &Anchor, travel_minutes: i32, config: &PlannerConfig) -> ExecutionChain {
    let chain_id = format!("chain-{}", anchor.id);
    let envelope = build_envelope(anchor, travel_minutes, config);
    let deadline = envelope.travel_there.start
        - Duration::minutes(config.chain_deadline_cushion_minutes as i64);

    let template = template_for(anchor.anchor_type, config);

    // Walk the template backwards from the deadline: the last template entry
    // (chronologically closest to leaving the house) is assigned first.
    let mut reversed_steps = Vec::with_capacity(template.len());
    let mut cursor = deadline;
    for (idx, entry) in template.iter().enumerate().rev() {
        let end = cursor;
        let start = end - Duration::minutes(entry.duration as i64);
        cursor = start;

        let role = if entry.is_exit_gate { Role::ExitGate } else { Role::ChainStep };
        reversed_steps.push(ChainStep {
            id: format!("{chain_id}-step-{idx}"),
            chain_id: chain_id.clone(),
            name: entry.name.clone(),
            start,
            end,
            duration: entry.duration,
            is_required: entry.is_required,
            can_skip_when_late: entry.can_skip_when_late,
            status: StepStatus::Pending,
            skip_reason: None,
            role,
        });
    }
    reversed_steps.reverse();

    let mut steps = reversed_steps;
    steps.push(ChainStep::from_slot(&chain_id, "travel-there", "Travel there", &envelope.travel_there, Role::ChainStep));
    steps.push(ChainStep::from_slot(&chain_id, "anchor", &anchor.title, &envelope.anchor_block, Role::Anchor));
    steps.push(ChainStep::from_slot(&chain_id, "travel-back", "Travel back", &envelope.travel_back, Role::ChainStep));
    steps.push(ChainStep::from_slot(&chain_id, "recovery", "Recovery", &envelope.recovery, Role::Recovery));

    ExecutionChain {
        chain_id,
        anchor: anchor.clone(),
        envelope,
        steps,
        chain_completion_deadline: deadline,
        status: ChainStatus::Pending,
        overrun_before_plan_start: false,
        envelope_conflict: false,
    }
}

/// Mark steps that occurred before `plan_start` as skipped, and flag the
/// chain as having overrun (§4.3 edge case). No replanning — later steps are
/// never shifted.
fn apply_plan_start_overrun(chain: &mut ExecutionChain, plan_start: DateTime<Utc>) {
    let Some(earliest_start) = chain.steps.first().map(|s| s.start) else { return };
    if earliest_start >= plan_start {
        return;
    }

    chain.overrun_before_plan_start = true;
    for step in chain.steps.iter_mut() {
        if step.end <= plan_start {
            step.status = StepStatus::Skipped;
            step.skip_reason = Some("Occurred before plan start".to_string());
        } else {
            break;
        }
    }
}

fn intervals_overlap(a: (DateTime<Utc>, DateTime<Utc>), b: (DateTime<Utc>, DateTime<Utc>)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

/// Build all chains for a day: classify order, construct envelopes/steps,
/// flag envelope conflicts, and apply the plan-start overrun rule.
///
/// `travel_minutes_for` resolves travel time per anchor (already defaulted
/// by the caller per §4.2 — the core does not know about collaborator
/// errors).
pub fn build_chains(
    anchors: &[Anchor],
    travel_minutes_for: impl Fn(&Anchor) -> i32,
    plan_start: DateTime<Utc>,
    config: &PlannerConfig,
) -> Vec<ExecutionChain> {
    let mut ordered: Vec<&Anchor> = anchors.iter().collect();
    ordered.sort_by(|a, b| {
        a.start.cmp(&b.start).then_with(|| a.end.cmp(&b.end)).then_with(|| a.id.cmp(&b.id))
    });

    let mut chains: Vec<ExecutionChain> = ordered
        .into_iter()
        .map(|anchor| build_chain(anchor, travel_minutes_for(anchor), config))
        .collect();

    for i in 0..chains.len() {
        let span_i = chains[i].envelope_span();
        let conflict = chains[..i].iter().any(|other| intervals_overlap(span_i, other.envelope_span()));
        if conflict {
            chains[i].envelope_conflict = true;
        }
    }

    for chain in chains.iter_mut() {
        apply_plan_start_overrun(chain, plan_start);
    }

    chains
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::AnchorType;
    use chrono::TimeZone;

    fn anchor(id: &str, start_hms: (u32, u32, u32), end_hms: (u32, u32, u32)) -> Anchor {
        let start = Utc.with_ymd_and_hms(2026, 7, 28, start_hms.0, start_hms.1, start_hms.2).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 7, 28, end_hms.0, end_hms.1, end_hms.2).unwrap();
        Anchor {
            id: id.to_string(),
            title: "Class".to_string(),
            start,
            end,
            location: Some("Room 101".to_string()),
            anchor_type: AnchorType::Class,
            must_attend: true,
            external_calendar_id: id.to_string(),
        }
    }

    #[test]
    fn deadline_identity_matches_spec_s1() {
        let config = PlannerConfig::default();
        let plan_start = Utc.with_ymd_and_hms(2026, 7, 28, 7, 0, 0).unwrap();
        let a = anchor("a1", (10, 0, 0), (11, 0, 0));
        let chains = build_chains(&[a], |_| 30, plan_start, &config);

        let chain = &chains[0];
        let expected_deadline = Utc.with_ymd_and_hms(2026, 7, 28, 8, 45, 0).unwrap();
        assert_eq!(chain.chain_completion_deadline, expected_deadline);

        let exit_gate = chain.steps.iter().find(|s| s.role == Role::ExitGate).unwrap();
        assert_eq!(exit_gate.end, expected_deadline);
    }

    #[test]
    fn exactly_one_exit_gate_and_one_anchor_step() {
        let config = PlannerConfig::default();
        let plan_start = Utc.with_ymd_and_hms(2026, 7, 28, 7, 0, 0).unwrap();
        let a = anchor("a1", (10, 0, 0), (11, 0, 0));
        let chains = build_chains(&[a], |_| 30, plan_start, &config);

        let chain = &chains[0];
        assert_eq!(chain.steps.iter().filter(|s| s.role == Role::ExitGate).count(), 1);
        assert_eq!(chain.steps.iter().filter(|s| s.role == Role::Anchor).count(), 1);
    }

    #[test]
    fn template_steps_are_contiguous_through_exit_gate() {
        let config = PlannerConfig::default();
        let plan_start = Utc.with_ymd_and_hms(2026, 7, 28, 7, 0, 0).unwrap();
        let a = anchor("a1", (10, 0, 0), (11, 0, 0));
        let chains = build_chains(&[a], |_| 30, plan_start, &config);

        // The 7 template-derived steps (Feed cat .. Exit Readiness Check) touch end-to-end.
        for w in chains[0].steps[..7].windows(2) {
            assert_eq!(w[0].end, w[1].start);
        }
        // The 4 envelope-derived steps also touch end-to-end.
        for w in chains[0].steps[7..].windows(2) {
            assert_eq!(w[0].end, w[1].start);
        }
    }

    #[test]
    fn ordering_is_by_anchor_start_then_end_then_id() {
        let config = PlannerConfig::default();
        let plan_start = Utc.with_ymd_and_hms(2026, 7, 28, 6, 0, 0).unwrap();
        let a2 = anchor("a2", (13, 0, 0), (14, 0, 0));
        let a1 = anchor("a1", (9, 0, 0), (10, 0, 0));
        let chains = build_chains(&[a2, a1], |_| 30, plan_start, &config);
        assert_eq!(chains[0].anchor.id, "a1");
        assert_eq!(chains[1].anchor.id, "a2");
    }

    #[test]
    fn overlapping_envelopes_flag_later_chain() {
        let config = PlannerConfig::default();
        let plan_start = Utc.with_ymd_and_hms(2026, 7, 28, 6, 0, 0).unwrap();
        // Anchors 30 minutes apart with 60 min travel on both sides collide.
        let a1 = anchor("a1", (9, 0, 0), (9, 30, 0));
        let a2 = anchor("a2", (9, 45, 0), (10, 15, 0));
        let chains = build_chains(&[a1, a2], |_| 60, plan_start, &config);
        assert!(!chains[0].envelope_conflict);
        assert!(chains[1].envelope_conflict);
    }

    #[test]
    fn overrun_before_plan_start_skips_earliest_steps() {
        let config = PlannerConfig::default();
        // plan_start well after the earliest prep steps would have begun.
        let plan_start = Utc.with_ymd_and_hms(2026, 7, 28, 8, 30, 0).unwrap();
        let a = anchor("a1", (10, 0, 0), (11, 0, 0));
        let chains = build_chains(&[a], |_| 30, plan_start, &config);

        let chain = &chains[0];
        assert!(chain.overrun_before_plan_start);
        assert!(chain.steps[0].status == StepStatus::Skipped);
        assert_eq!(chain.steps[0].skip_reason.as_deref(), Some("Occurred before plan start"));
        // A step that ends after plan_start must not be skipped.
        assert!(chain.steps.iter().any(|s| s.status != StepStatus::Skipped));
    }
}
