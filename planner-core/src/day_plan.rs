//! Plan Assembler entry point: wires C1 through C9 into the single
//! `plan_day` invocation described in §2's control flow.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::anchor::{classify_events, Anchor, SkippedEvent};
use crate::chain::{build_chains, ExecutionChain};
use crate::collaborators::{CalendarSource, Clock, TravelEstimator};
use crate::config::PlannerConfig;
use crate::error::PlanError;
use crate::location::{derive_location_timeline, home_intervals, HomeInterval, LocationPeriod};
use crate::meal::{place_meals, Meal, MealKind};
use crate::plan::{assemble_day_plan, Block};
use crate::wake_ramp::{build_wake_ramp, Energy, WakeRamp};

/// Caller-provided inputs for a single planning invocation (§6).
#[derive(Debug, Clone)]
pub struct PlanInputs {
    pub user_id: String,
    pub date: NaiveDate,
    pub wake_time: DateTime<Utc>,
    pub sleep_time: DateTime<Utc>,
    pub plan_start: DateTime<Utc>,
    pub energy: String,
    pub current_location: Option<String>,
}

/// Non-fatal diagnostics surfaced alongside a successful plan (§6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    EnvelopeConflict { chain_id: String },
    OverrunBeforePlanStart { chain_id: String },
    MealSkipped { kind: MealKind, reason: String },
    WakeRampSkipped { reason: String },
    CalendarUnavailable { detail: String },
}

/// The full output of one planning invocation (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPlan {
    pub blocks: Vec<Block>,
    pub chains: Vec<ExecutionChain>,
    pub location_timeline: Vec<LocationPeriod>,
    pub home_intervals: Vec<HomeInterval>,
    pub wake_ramp: WakeRamp,
    pub meals: Vec<Meal>,
    pub warnings: Vec<PlanWarning>,
    pub skipped_events: Vec<SkippedEvent>,
}

/// Run the full pipeline: classify anchors, build chains, derive the
/// location timeline, place meals, generate the wake-ramp, and assemble the
/// final gap-free day. All-or-nothing (§4.9, §7): any input or invariant
/// error returns `Err` and no plan is produced.
pub fn plan_day(
    inputs: &PlanInputs,
    calendar: &dyn CalendarSource,
    travel: &dyn TravelEstimator,
    clock: &dyn Clock,
    config: &PlannerConfig,
) -> Result<DayPlan, PlanError> {
    if inputs.sleep_time <= inputs.plan_start {
        return Err(PlanError::InvalidInput {
            detail: format!(
                "sleep_time ({}) must be after plan_start ({})",
                inputs.sleep_time, inputs.plan_start
            ),
        });
    }

    let energy = Energy::from_str(&inputs.energy)
        .map_err(|detail| PlanError::InvalidInput { detail })?;

    let now = clock.now();

    let mut warnings = Vec::new();

    let events = match calendar.fetch(&inputs.user_id, inputs.date) {
        Ok(events) => events,
        Err(err) => {
            warnings.push(PlanWarning::CalendarUnavailable { detail: err.to_string() });
            Vec::new()
        }
    };

    let (anchors, skipped_events) = classify_events(&events, config);

    for anchor in &anchors {
        if anchor.end > inputs.sleep_time {
            return Err(PlanError::InvalidInput {
                detail: format!(
                    "anchor '{}' ends ({}) after sleep_time ({})",
                    anchor.id, anchor.end, inputs.sleep_time
                ),
            });
        }
    }

    let travel_minutes_for = |anchor: &Anchor| -> i32 {
        travel
            .minutes(inputs.current_location.as_deref(), anchor.location.as_deref())
            .map(|m| m as i32)
            .unwrap_or(config.default_travel_minutes)
    };

    let chains = build_chains(&anchors, travel_minutes_for, inputs.plan_start, config);

    for chain in &chains {
        if chain.envelope_conflict {
            warnings.push(PlanWarning::EnvelopeConflict { chain_id: chain.chain_id.clone() });
        }
        if chain.overrun_before_plan_start {
            warnings.push(PlanWarning::OverrunBeforePlanStart { chain_id: chain.chain_id.clone() });
        }
    }

    let location_timeline = derive_location_timeline(&chains, inputs.plan_start, inputs.sleep_time);
    let home = home_intervals(&location_timeline, config.home_interval_min_minutes);

    let day_start = day_midnight_utc(inputs.date);
    let meals = place_meals(&home, day_start, now, config);
    for meal in &meals {
        if meal.skipped {
            warnings.push(PlanWarning::MealSkipped {
                kind: meal.kind,
                reason: meal.skip_reason.clone().unwrap_or_default(),
            });
        }
    }

    let components = config
        .wake_ramp_components_by_energy
        .get(&energy)
        .copied()
        .ok_or_else(|| PlanError::InvalidInput {
            detail: format!("no wake-ramp components configured for energy level {energy:?}"),
        })?;
    let wake_ramp = build_wake_ramp(
        inputs.plan_start,
        inputs.wake_time,
        energy,
        &components,
        config.wake_ramp_skip_threshold_minutes,
    );
    if wake_ramp.skipped {
        warnings.push(PlanWarning::WakeRampSkipped {
            reason: wake_ramp.skip_reason.clone().unwrap_or_default(),
        });
    }

    let blocks = assemble_day_plan(&wake_ramp, &chains, &meals, inputs.plan_start, inputs.sleep_time)?;

    Ok(DayPlan {
        blocks,
        chains,
        location_timeline,
        home_intervals: home,
        wake_ramp,
        meals,
        warnings,
        skipped_events,
    })
}

fn day_midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight is always valid"))
}
