//! Wake-Ramp Generator (C5): the energy-conditioned morning block, skippable
//! when planning starts too far past wake time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Energy {
    Low,
    Medium,
    High,
}

impl Energy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Energy::Low => "low",
            Energy::Medium => "medium",
            Energy::High => "high",
        }
    }
}

impl std::str::FromStr for Energy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Energy::Low),
            "medium" => Ok(Energy::Medium),
            "high" => Ok(Energy::High),
            other => Err(format!("unknown energy level '{other}'")),
        }
    }
}

/// Fixed per-energy minute breakdown of the wake-ramp. Component order is
/// always toilet -> hygiene -> shower -> dress -> buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WakeRampComponents {
    pub toilet: i32,
    pub hygiene: i32,
    pub shower: i32,
    pub dress: i32,
    pub buffer: i32,
}

impl WakeRampComponents {
    pub fn total(&self) -> i32 {
        self.toilet + self.hygiene + self.shower + self.dress + self.buffer
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WakeRampComponentKind {
    Toilet,
    Hygiene,
    Shower,
    Dress,
    Buffer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WakeRampStep {
    pub kind: WakeRampComponentKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration: i32,
}

/// The generated wake-ramp: either a full sequence or `skipped` when
/// `plan_start` is more than two hours past `wake_time` (§4.5).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WakeRamp {
    pub steps: Vec<WakeRampStep>,
    pub skipped: bool,
    pub skip_reason: Option<String>,
}

impl WakeRamp {
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.steps.first().map(|s| s.start)
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.steps.last().map(|s| s.end)
    }
}

/// Build the wake-ramp for this invocation.
///
/// Skipped iff `plan_start - wake_time > skip_threshold_minutes` (default
/// 2h, §4.5); otherwise it starts at `max(wake_time, plan_start)` and runs
/// forward through the fixed component order for `energy`.
pub fn build_wake_ramp(
    plan_start: DateTime<Utc>,
    wake_time: DateTime<Utc>,
    energy: Energy,
    components: &WakeRampComponents,
    skip_threshold_minutes: i32,
) -> WakeRamp {
    if plan_start - wake_time > Duration::minutes(skip_threshold_minutes as i64) {
        return WakeRamp {
            steps: Vec::new(),
            skipped: true,
            skip_reason: Some(format!(
                "plan start {plan_start} is more than {skip_threshold_minutes} minutes after wake time {wake_time}"
            )),
        };
    }

    let start_anchor = wake_time.max(plan_start);
    let ordered = [
        (WakeRampComponentKind::Toilet, components.toilet),
        (WakeRampComponentKind::Hygiene, components.hygiene),
        (WakeRampComponentKind::Shower, components.shower),
        (WakeRampComponentKind::Dress, components.dress),
        (WakeRampComponentKind::Buffer, components.buffer),
    ];

    let mut cursor = start_anchor;
    let mut steps = Vec::with_capacity(ordered.len());
    for (kind, duration) in ordered {
        let start = cursor;
        let end = start + Duration::minutes(duration as i64);
        cursor = end;
        steps.push(WakeRampStep { kind, start, end, duration });
    }

    let _ = energy; // component totals already reflect the selected energy level
    WakeRamp { steps, skipped: false, skip_reason: None }
}
