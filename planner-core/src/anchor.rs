//! Anchor Classifier (C1): calendar event -> typed anchor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;

/// Raw calendar event as fetched from a `CalendarSource`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorType {
    Class,
    Seminar,
    Workshop,
    Appointment,
    Other,
}

impl AnchorType {
    /// Fixed classification check order (§4.1): workshop, class, seminar,
    /// appointment. `Other` is never matched by keyword and is the fallback.
    pub fn classification_order() -> [AnchorType; 4] {
        [AnchorType::Workshop, AnchorType::Class, AnchorType::Seminar, AnchorType::Appointment]
    }
}

/// A fixed external commitment the day is planned around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: Option<String>,
    pub anchor_type: AnchorType,
    pub must_attend: bool,
    pub external_calendar_id: String,
}

/// Why a calendar event was not turned into an anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEvent {
    pub event_id: String,
    pub reason: String,
}

/// Classify every event, skipping malformed ones (never fatal, §4.1).
pub fn classify_events(
    events: &[CalendarEvent],
    config: &PlannerConfig,
) -> (Vec<Anchor>, Vec<SkippedEvent>) {
    let mut anchors = Vec::with_capacity(events.len());
    let mut skipped = Vec::new();

    for event in events {
        match classify_event(event, config) {
            Ok(anchor) => anchors.push(anchor),
            Err(reason) => skipped.push(SkippedEvent { event_id: event.id.clone(), reason }),
        }
    }

    (anchors, skipped)
}

/// Classify a single event, or return the reason it was discarded.
pub fn classify_event(event: &CalendarEvent, config: &PlannerConfig) -> Result<Anchor, String> {
    if event.end <= event.start {
        return Err(format!(
            "event '{}' has end ({}) <= start ({})",
            event.id, event.end, event.start
        ));
    }

    let haystack = format!(
        "{} {}",
        event.title.to_lowercase(),
        event.description.as_deref().unwrap_or("").to_lowercase()
    );

    let anchor_type = AnchorType::classification_order()
        .into_iter()
        .find(|t| {
            config
                .classification_keywords
                .get(t)
                .is_some_and(|keywords| keywords.iter().any(|kw| haystack.contains(kw.as_str())))
        })
        .unwrap_or(AnchorType::Other);

    let has_location = event.location.as_deref().is_some_and(|l| !l.trim().is_empty());
    let must_attend = if config.require_location_for_must_attend {
        has_location
    } else {
        config.default_must_attend
    };

    Ok(Anchor {
        id: event.id.clone(),
        title: event.title.clone(),
        start: event.start,
        end: event.end,
        location: event.location.clone(),
        anchor_type,
        must_attend,
        external_calendar_id: event.id.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn event(title: &str, has_location: bool) -> CalendarEvent {
        let start = Utc::now();
        CalendarEvent {
            id: "evt-1".to_string(),
            title: title.to_string(),
            description: None,
            start,
            end: start + Duration::hours(1),
            location: has_location.then(|| "Room 101".to_string()),
        }
    }

    #[test]
    fn classifies_by_fixed_keyword_priority() {
        let config = PlannerConfig::default();
        assert_eq!(
            classify_event(&event("Intro Workshop Training", true), &config).unwrap().anchor_type,
            AnchorType::Workshop
        );
        assert_eq!(
            classify_event(&event("CS101 Lecture", true), &config).unwrap().anchor_type,
            AnchorType::Class
        );
        assert_eq!(
            classify_event(&event("Weekly Seminar", true), &config).unwrap().anchor_type,
            AnchorType::Seminar
        );
        assert_eq!(
            classify_event(&event("Doctor Appointment", true), &config).unwrap().anchor_type,
            AnchorType::Appointment
        );
        assert_eq!(
            classify_event(&event("Team Sync", true), &config).unwrap().anchor_type,
            AnchorType::Other
        );
    }

    #[test]
    fn workshop_keyword_wins_over_class_keyword_when_both_present() {
        let config = PlannerConfig::default();
        let anchor = classify_event(&event("Training Lab Session", true), &config).unwrap();
        assert_eq!(anchor.anchor_type, AnchorType::Workshop);
    }

    #[test]
    fn must_attend_requires_location_by_default() {
        let config = PlannerConfig::default();
        assert!(classify_event(&event("Lecture", true), &config).unwrap().must_attend);
        assert!(!classify_event(&event("Lecture", false), &config).unwrap().must_attend);
    }

    #[test]
    fn malformed_interval_is_skipped_not_fatal() {
        let config = PlannerConfig::default();
        let mut bad = event("Lecture", true);
        bad.end = bad.start;
        let (anchors, skipped) = classify_events(&[bad], &config);
        assert!(anchors.is_empty());
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].reason.contains("end"));
    }
}
