//! File-backed `CalendarSource`: reads a day's raw calendar events from a
//! JSON file on disk. Real calendar-fetching (Google Calendar, CalDAV, ...)
//! is out of scope for this crate (spec §1 non-goals) — a caller who wants
//! that wires their own `CalendarSource` impl against the same trait.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use planner_core::{CalendarEvent, CalendarSource};
use std::fs;
use std::path::{Path, PathBuf};

pub struct FileCalendarSource {
    path: PathBuf,
}

impl FileCalendarSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CalendarSource for FileCalendarSource {
    fn fetch(&self, _user_id: &str, _date: NaiveDate) -> Result<Vec<CalendarEvent>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        let events: Vec<CalendarEvent> =
            serde_json::from_str(&raw).with_context(|| format!("parse {}", self.path.display()))?;
        Ok(events)
    }
}

/// An empty source used when no `--events` file is given: the engine still
/// produces a Wake-Ramp-and-meals day (§4.1 graceful degradation).
pub struct EmptyCalendarSource;

impl CalendarSource for EmptyCalendarSource {
    fn fetch(&self, _user_id: &str, _date: NaiveDate) -> Result<Vec<CalendarEvent>> {
        Ok(Vec::new())
    }
}

pub fn source_for(path: Option<&Path>) -> Box<dyn CalendarSource> {
    match path {
        Some(p) => Box::new(FileCalendarSource::new(p)),
        None => Box::new(EmptyCalendarSource),
    }
}
