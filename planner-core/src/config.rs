//! Planner configuration: every tunable constant the engine needs,
//! collected into one value instead of scattered optional fields.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::anchor::AnchorType;
use crate::chain::StepTemplateEntry;
use crate::meal::MealKind;
use crate::wake_ramp::{Energy, WakeRampComponents};

/// A `[start, end)` window expressed as minutes since local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteWindow {
    pub start_minute: i32,
    pub end_minute: i32,
}

impl MinuteWindow {
    pub fn new(start_minute: i32, end_minute: i32) -> Self {
        Self { start_minute, end_minute }
    }

    pub fn contains(&self, minute_of_day: i32) -> bool {
        minute_of_day >= self.start_minute && minute_of_day < self.end_minute
    }
}

/// All configurable knobs for a planning invocation.
///
/// Mirrors the teacher's `ReminderPolicy`/`Config` pattern: one `Default`
/// impl, plain data, no hidden globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Case-insensitive keyword sets checked in fixed order: workshop, class,
    /// seminar, appointment. Order of this map's iteration does not matter —
    /// classification always checks in the fixed order defined by `AnchorType::classification_order`.
    pub classification_keywords: HashMap<AnchorType, Vec<String>>,

    /// Whether `must_attend` requires a non-empty location (spec default: on).
    pub require_location_for_must_attend: bool,
    /// Fallback `must_attend` value when the flag above is off.
    pub default_must_attend: bool,

    pub step_templates_by_anchor_type: HashMap<AnchorType, Vec<StepTemplateEntry>>,

    pub meal_windows: HashMap<MealKind, MinuteWindow>,
    pub meal_default_times: HashMap<MealKind, i32>,
    pub meal_durations: HashMap<MealKind, i32>,
    pub meal_min_spacing_minutes: i32,

    pub home_interval_min_minutes: i32,
    pub chain_deadline_cushion_minutes: i32,
    pub default_travel_minutes: i32,

    pub prep_default_minutes: i32,
    pub recovery_default_minutes: i32,

    pub wake_ramp_components_by_energy: HashMap<Energy, WakeRampComponents>,
    pub wake_ramp_skip_threshold_minutes: i32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        let mut classification_keywords = HashMap::new();
        classification_keywords.insert(
            AnchorType::Workshop,
            vec!["workshop".to_string(), "training".to_string(), "bootcamp".to_string()],
        );
        classification_keywords.insert(
            AnchorType::Class,
            vec![
                "lecture".to_string(),
                "class".to_string(),
                "tutorial".to_string(),
                "lab".to_string(),
                "practical".to_string(),
            ],
        );
        classification_keywords.insert(
            AnchorType::Seminar,
            vec!["seminar".to_string(), "session".to_string()],
        );
        classification_keywords.insert(
            AnchorType::Appointment,
            vec![
                "appointment".to_string(),
                "meeting".to_string(),
                "consultation".to_string(),
                "interview".to_string(),
            ],
        );

        let mut step_templates_by_anchor_type = HashMap::new();
        step_templates_by_anchor_type.insert(AnchorType::Class, default_class_template());
        // Other anchor types fall back to the class template (spec §4.3:
        // "Templates may be configured per anchor type"; it only specifies
        // a concrete template for class).
        for t in [
            AnchorType::Seminar,
            AnchorType::Workshop,
            AnchorType::Appointment,
            AnchorType::Other,
        ] {
            step_templates_by_anchor_type.insert(t, default_class_template());
        }

        let mut meal_windows = HashMap::new();
        meal_windows.insert(MealKind::Breakfast, MinuteWindow::new(6 * 60 + 30, 11 * 60 + 30));
        meal_windows.insert(MealKind::Lunch, MinuteWindow::new(11 * 60 + 30, 15 * 60 + 30));
        meal_windows.insert(MealKind::Dinner, MinuteWindow::new(17 * 60, 21 * 60 + 30));

        let mut meal_default_times = HashMap::new();
        meal_default_times.insert(MealKind::Breakfast, 9 * 60 + 30);
        meal_default_times.insert(MealKind::Lunch, 13 * 60);
        meal_default_times.insert(MealKind::Dinner, 19 * 60);

        let mut meal_durations = HashMap::new();
        meal_durations.insert(MealKind::Breakfast, 15);
        meal_durations.insert(MealKind::Lunch, 30);
        meal_durations.insert(MealKind::Dinner, 45);

        let mut wake_ramp_components_by_energy = HashMap::new();
        wake_ramp_components_by_energy.insert(
            Energy::Low,
            WakeRampComponents { toilet: 10, hygiene: 15, shower: 25, dress: 15, buffer: 55 },
        );
        wake_ramp_components_by_energy.insert(
            Energy::Medium,
            WakeRampComponents { toilet: 8, hygiene: 10, shower: 20, dress: 12, buffer: 40 },
        );
        wake_ramp_components_by_energy.insert(
            Energy::High,
            WakeRampComponents { toilet: 5, hygiene: 8, shower: 15, dress: 10, buffer: 37 },
        );

        Self {
            classification_keywords,
            require_location_for_must_attend: true,
            default_must_attend: false,
            step_templates_by_anchor_type,
            meal_windows,
            meal_default_times,
            meal_durations,
            meal_min_spacing_minutes: 180,
            home_interval_min_minutes: 30,
            chain_deadline_cushion_minutes: 45,
            default_travel_minutes: 30,
            prep_default_minutes: 15,
            recovery_default_minutes: 10,
            wake_ramp_components_by_energy,
            wake_ramp_skip_threshold_minutes: 120,
        }
    }
}

/// Every template must end with the `exit_gate` step immediately before
/// `travel_there` (§4.3 core requirement). "Leave house" is the act of
/// walking out the door the instant the exit gate closes — it has no
/// duration of its own and is not materialized as a separate step.
fn default_class_template() -> Vec<StepTemplateEntry> {
    vec![
        StepTemplateEntry::required("Feed cat", 5),
        StepTemplateEntry::required("Bathroom", 10),
        StepTemplateEntry::required("Hygiene", 5),
        StepTemplateEntry::optional_skippable_when_late("Shower", 15),
        StepTemplateEntry::required("Get dressed", 10),
        StepTemplateEntry::required("Pack bag", 10),
        StepTemplateEntry::exit_gate("Exit Readiness Check", 2),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_wake_ramp_totals_match_spec() {
        let cfg = PlannerConfig::default();
        assert_eq!(cfg.wake_ramp_components_by_energy[&Energy::Low].total(), 120);
        assert_eq!(cfg.wake_ramp_components_by_energy[&Energy::Medium].total(), 90);
        assert_eq!(cfg.wake_ramp_components_by_energy[&Energy::High].total(), 75);
    }

    #[test]
    fn default_class_template_ends_with_exit_gate() {
        let tmpl = default_class_template();
        assert_eq!(tmpl.iter().filter(|s| s.is_exit_gate).count(), 1);
        assert!(tmpl.last().unwrap().is_exit_gate);
    }
}
