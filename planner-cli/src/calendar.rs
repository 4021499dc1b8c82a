//! ICS export: renders a `DayPlan`'s blocks as a minimal calendar, following
//! the same `events_to_ics`/`escape_ics` shape the teacher used for tasks.

use chrono::{DateTime, Utc};
use planner_core::{Block, BlockKind, DayPlan};

pub struct CalendarEvent {
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub summary: String,
    pub description: String,
}

fn block_label(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Routine => "Routine",
        BlockKind::ChainStep => "Prep",
        BlockKind::Anchor => "Anchor",
        BlockKind::Travel => "Travel",
        BlockKind::Meal => "Meal",
        BlockKind::Buffer => "Buffer",
        BlockKind::Task => "Task",
    }
}

/// Convert a plan's blocks into calendar events, skipping blocks that are
/// purely historical (entirely before `plan_start`, emitted by the assembler
/// with `status = skipped`).
pub fn plan_to_events(plan: &DayPlan, prefix: &str) -> Vec<CalendarEvent> {
    plan.blocks
        .iter()
        .map(|b| CalendarEvent {
            start_utc: b.start,
            end_utc: b.end,
            summary: format!("{}{}", prefix, b.label),
            description: format!("Kind: {}\nDuration: {}m\n", block_label(b.kind), b.duration),
        })
        .collect()
}

/// Emit a minimal ICS calendar containing VEVENT blocks.
///
/// DTSTART/DTEND are UTC; UIDs are positional rather than content-stable
/// (matching the teacher's v0 approach — stable UIDs are a later addition).
pub fn events_to_ics(events: &[CalendarEvent]) -> String {
    let mut s = String::new();
    s.push_str("BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:-//Planner//EN\n");

    for (i, e) in events.iter().enumerate() {
        let dtstart = e.start_utc.format("%Y%m%dT%H%M%SZ");
        let dtend = e.end_utc.format("%Y%m%dT%H%M%SZ");

        s.push_str("BEGIN:VEVENT\n");
        s.push_str(&format!("UID:planner-{}@planner\n", i));
        s.push_str(&format!("DTSTART:{}\n", dtstart));
        s.push_str(&format!("DTEND:{}\n", dtend));
        s.push_str(&format!("SUMMARY:{}\n", escape_ics(&e.summary)));
        s.push_str(&format!("DESCRIPTION:{}\n", escape_ics(&e.description)));
        s.push_str("END:VEVENT\n");
    }

    s.push_str("END:VCALENDAR\n");
    s
}

fn escape_ics(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_ics_handles_reserved_characters() {
        assert_eq!(escape_ics("a, b; c\\d\ne"), "a\\, b\\; c\\\\d\\ne");
    }

    #[test]
    fn ics_wraps_events_between_calendar_markers() {
        let events = vec![CalendarEvent {
            start_utc: "2026-07-28T10:00:00Z".parse().unwrap(),
            end_utc: "2026-07-28T11:00:00Z".parse().unwrap(),
            summary: "Class".to_string(),
            description: "Kind: Anchor\n".to_string(),
        }];
        let ics = events_to_ics(&events);
        assert!(ics.starts_with("BEGIN:VCALENDAR"));
        assert!(ics.trim_end().ends_with("END:VCALENDAR"));
        assert!(ics.contains("SUMMARY:Class"));
        assert!(ics.contains("DTSTART:20260728T100000Z"));
    }
}
