//! External collaborator contracts (§6). The core never performs I/O itself;
//! a caller hands in implementations of these traits and `plan_day` awaits
//! nothing — by the time the core runs, every collaborator result is already
//! in hand.

use chrono::{DateTime, NaiveDate, Utc};

use crate::anchor::CalendarEvent;

/// Fetches the raw calendar events for a user/date. Errors are absorbed by
/// the core into an empty event list (§4.1, §7) — callers should still
/// propagate real fetch errors through the `Result` so the core can record
/// the `calendar_unavailable` warning.
pub trait CalendarSource {
    fn fetch(&self, user_id: &str, date: NaiveDate) -> anyhow::Result<Vec<CalendarEvent>>;
}

/// Estimates one-way travel time in minutes between an origin and a
/// destination. Either side may be absent (e.g. no `current_location`
/// configured). Errors fall back to `PlannerConfig::default_travel_minutes`.
pub trait TravelEstimator {
    fn minutes(&self, origin: Option<&str>, destination: Option<&str>) -> anyhow::Result<u32>;
}

/// Read exactly once per invocation (§6). All "in the past" comparisons use
/// the cached value, never a fresh read.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// A `TravelEstimator` that always returns a fixed minute count, useful when
/// no real routing service is wired up.
pub struct FixedTravelEstimator(pub u32);

impl TravelEstimator for FixedTravelEstimator {
    fn minutes(&self, _origin: Option<&str>, _destination: Option<&str>) -> anyhow::Result<u32> {
        Ok(self.0)
    }
}

/// A `CalendarSource` backed by an in-memory list, ignoring `user_id`/`date`.
/// Useful for tests and for callers that have already fetched events.
pub struct StaticCalendarSource(pub Vec<CalendarEvent>);

impl CalendarSource for StaticCalendarSource {
    fn fetch(&self, _user_id: &str, _date: NaiveDate) -> anyhow::Result<Vec<CalendarEvent>> {
        Ok(self.0.clone())
    }
}

/// A `Clock` that always returns a fixed instant. The production CLI uses a
/// real-time clock instead; this one exists for deterministic tests.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
