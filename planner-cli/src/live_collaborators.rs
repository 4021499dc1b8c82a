//! Real-time collaborator implementations wired into the binary. Kept
//! separate from `planner-core` because reading the wall clock is I/O the
//! core is never allowed to perform itself (spec §5/§9).

use chrono::{DateTime, Utc};
use planner_core::Clock;

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
