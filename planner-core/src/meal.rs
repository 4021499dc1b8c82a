//! Meal Placer (C7): slots breakfast/lunch/dinner into home intervals
//! subject to window and spacing rules.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{MinuteWindow, PlannerConfig};
use crate::location::HomeInterval;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealKind {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealKind {
    /// Fixed placement order (§4.7).
    pub fn placement_order() -> [MealKind; 3] {
        [MealKind::Breakfast, MealKind::Lunch, MealKind::Dinner]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub kind: MealKind,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub duration: i32,
    pub skipped: bool,
    pub skip_reason: Option<String>,
}

fn minute_to_time(day_start: DateTime<Utc>, minute_of_day: i32) -> DateTime<Utc> {
    day_start + Duration::minutes(minute_of_day as i64)
}

fn fits_inside_a_home_interval(
    intervals: &[HomeInterval],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> bool {
    intervals.iter().any(|h| h.contains_span(start, end))
}

fn overlaps_any(placed: &[Meal], start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    placed.iter().filter_map(|m| Some((m.start?, m.end?))).any(|(s, e)| start < e && s < end)
}

fn spacing_ok(placed: &[Meal], candidate_start: DateTime<Utc>, min_spacing_minutes: i32) -> bool {
    match placed.last().and_then(|m| m.start) {
        Some(prev_start) => {
            (candidate_start - prev_start).num_minutes().abs() >= min_spacing_minutes as i64
        }
        None => true,
    }
}

/// Search offsets: 0, +/-5 ... +/-30, matching §4.7 step 3.
fn stepped_offsets() -> Vec<i32> {
    let mut offsets = vec![0];
    for step in (5..=30).step_by(5) {
        offsets.push(step);
        offsets.push(-step);
    }
    offsets
}

fn diagnose_skip(
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    duration_minutes: i32,
    intervals: &[HomeInterval],
    now: DateTime<Utc>,
) -> &'static str {
    if window_end <= now {
        return "Window in past";
    }
    let duration = Duration::minutes(duration_minutes as i64);
    let any_home_fit = intervals.iter().any(|h| {
        let lo = window_start.max(h.start);
        let hi = window_end.min(h.end) - duration;
        lo <= hi
    });
    if !any_home_fit {
        "No home interval"
    } else {
        "No fit due to spacing"
    }
}

/// Place the three meals, in fixed order, inside the day's home intervals.
///
/// `day_start` is local midnight for the date being planned — the reference
/// point `meal_windows`/`meal_default_times` minute offsets are measured
/// from. `now` is the cached `Clock::now()` value (§6): meals whose entire
/// candidate window has already passed are skipped.
pub fn place_meals(
    intervals: &[HomeInterval],
    day_start: DateTime<Utc>,
    now: DateTime<Utc>,
    config: &PlannerConfig,
) -> Vec<Meal> {
    let mut placed = Vec::with_capacity(3);

    for kind in MealKind::placement_order() {
        let window: MinuteWindow = config.meal_windows[&kind];
        let duration = config.meal_durations[&kind];
        let default_center = config.meal_default_times[&kind].clamp(window.start_minute, window.end_minute - duration);

        let window_start_dt = minute_to_time(day_start, window.start_minute);
        let window_end_dt = minute_to_time(day_start, window.end_minute);

        let mut candidate_minutes: Vec<i32> =
            stepped_offsets().into_iter().map(|o| default_center + o).collect();
        // Fallback: the full window at 1-minute resolution.
        candidate_minutes.extend(window.start_minute..=(window.end_minute - duration));

        let mut placed_meal = None;
        for minute in candidate_minutes {
            if minute < window.start_minute || minute + duration > window.end_minute {
                continue;
            }
            let start = minute_to_time(day_start, minute);
            let end = start + Duration::minutes(duration as i64);

            if start <= now {
                continue;
            }
            if !fits_inside_a_home_interval(intervals, start, end) {
                continue;
            }
            if overlaps_any(&placed, start, end) {
                continue;
            }
            if !spacing_ok(&placed, start, config.meal_min_spacing_minutes) {
                continue;
            }

            placed_meal = Some(Meal {
                kind,
                start: Some(start),
                end: Some(end),
                duration,
                skipped: false,
                skip_reason: None,
            });
            break;
        }

        let meal = placed_meal.unwrap_or_else(|| Meal {
            kind,
            start: None,
            end: None,
            duration,
            skipped: true,
            skip_reason: Some(
                diagnose_skip(window_start_dt, window_end_dt, duration, intervals, now).to_string(),
            ),
        });
        placed.push(meal);
    }

    placed
}
