//! Commitment Envelope Builder (C2).
//!
//! For each anchor, lays out the fixed five-role frame
//! prep -> travel_there -> anchor_block -> travel_back -> recovery.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::anchor::Anchor;
use crate::config::PlannerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvelopeRole {
    Prep,
    TravelThere,
    AnchorBlock,
    TravelBack,
    Recovery,
}

/// One slot of a commitment envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration: i32,
    pub role: EnvelopeRole,
}

impl EnvelopeSlot {
    fn new(start: DateTime<Utc>, end: DateTime<Utc>, role: EnvelopeRole) -> Self {
        let duration = (end - start).num_minutes() as i32;
        Self { start, end, duration, role }
    }
}

/// The fixed five-slot frame around one anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentEnvelope {
    pub prep: EnvelopeSlot,
    pub travel_there: EnvelopeSlot,
    pub anchor_block: EnvelopeSlot,
    pub travel_back: EnvelopeSlot,
    pub recovery: EnvelopeSlot,
}

impl CommitmentEnvelope {
    /// Start of the first slot (`prep.start`).
    pub fn start(&self) -> DateTime<Utc> {
        self.prep.start
    }

    /// End of the last slot (`recovery.end`).
    pub fn end(&self) -> DateTime<Utc> {
        self.recovery.end
    }
}

/// Build the envelope for one anchor given a resolved travel duration in minutes.
pub fn build_envelope(anchor: &Anchor, travel_minutes: i32, config: &PlannerConfig) -> CommitmentEnvelope {
    let travel = Duration::minutes(travel_minutes as i64);
    let prep_minutes = Duration::minutes(config.prep_default_minutes as i64);
    let recovery_minutes = Duration::minutes(config.recovery_default_minutes as i64);

    let travel_there_start = anchor.start - travel;
    let prep_start = travel_there_start - prep_minutes;
    let travel_back_end = anchor.end + travel;
    let recovery_end = travel_back_end + recovery_minutes;

    CommitmentEnvelope {
        prep: EnvelopeSlot::new(prep_start, travel_there_start, EnvelopeRole::Prep),
        travel_there: EnvelopeSlot::new(travel_there_start, anchor.start, EnvelopeRole::TravelThere),
        anchor_block: EnvelopeSlot::new(anchor.start, anchor.end, EnvelopeRole::AnchorBlock),
        travel_back: EnvelopeSlot::new(anchor.end, travel_back_end, EnvelopeRole::TravelBack),
        recovery: EnvelopeSlot::new(travel_back_end, recovery_end, EnvelopeRole::Recovery),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::AnchorType;
    use chrono::TimeZone;

    fn anchor(start_hms: (u32, u32, u32), end_hms: (u32, u32, u32)) -> Anchor {
        let day = Utc.with_ymd_and_hms(2026, 7, 28, start_hms.0, start_hms.1, start_hms.2).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 7, 28, end_hms.0, end_hms.1, end_hms.2).unwrap();
        Anchor {
            id: "a1".to_string(),
            title: "Class".to_string(),
            start: day,
            end,
            location: Some("Room 101".to_string()),
            anchor_type: AnchorType::Class,
            must_attend: true,
            external_calendar_id: "a1".to_string(),
        }
    }

    #[test]
    fn envelope_is_contiguous_and_matches_anchor() {
        let config = PlannerConfig::default();
        let a = anchor((10, 0, 0), (11, 0, 0));
        let env = build_envelope(&a, 30, &config);

        assert_eq!(env.prep.end, env.travel_there.start);
        assert_eq!(env.travel_there.end, env.anchor_block.start);
        assert_eq!(env.anchor_block.end, env.travel_back.start);
        assert_eq!(env.travel_back.end, env.recovery.start);

        assert_eq!(env.anchor_block.start, a.start);
        assert_eq!(env.anchor_block.end, a.end);

        assert_eq!(env.prep.duration, 15);
        assert_eq!(env.travel_there.duration, 30);
        assert_eq!(env.travel_back.duration, 30);
        assert_eq!(env.recovery.duration, 10);
    }
}
