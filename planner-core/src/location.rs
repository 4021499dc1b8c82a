//! Location-State Tracker (C6): derives the `at_home`/`not_home` timeline
//! implied by a day's chains, and the home intervals eligible for meals.

use chrono::DateTime;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::chain::ExecutionChain;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationState {
    AtHome,
    NotHome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub state: LocationState,
}

impl LocationPeriod {
    pub fn duration_minutes(&self) -> i32 {
        (self.end - self.start).num_minutes() as i32
    }
}

/// An `at_home` period with duration >= the configured minimum; eligible as
/// a meal container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl HomeInterval {
    pub fn contains_span(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start >= self.start && end <= self.end
    }
}

/// Push `[start, end)` onto `periods`, merging into the last period instead
/// of appending when it's a zero-gap continuation of the same state. Two
/// chains whose envelopes abut exactly (one's `recovery.end` equal to the
/// next's `travel_there.start`) would otherwise emit two consecutive
/// `not_home` periods with no `at_home` between them, breaking the §4.6
/// strictly-alternating invariant.
fn push_or_extend(periods: &mut Vec<LocationPeriod>, start: DateTime<Utc>, end: DateTime<Utc>, state: LocationState) {
    if end <= start {
        return;
    }
    if let Some(last) = periods.last_mut() {
        if last.state == state && last.end == start {
            last.end = end;
            return;
        }
    }
    periods.push(LocationPeriod { start, end, state });
}

/// Derive the location timeline from `planStart` to `sleepTime` given the
/// day's chains (already built, §4.2/§4.3). Chains are consumed in envelope
/// start order regardless of the order they're passed in.
pub fn derive_location_timeline(
    chains: &[ExecutionChain],
    plan_start: DateTime<Utc>,
    sleep_time: DateTime<Utc>,
) -> Vec<LocationPeriod> {
    let mut ordered: Vec<&ExecutionChain> = chains.iter().collect();
    ordered.sort_by_key(|c| c.envelope.travel_there.start);

    let mut periods = Vec::new();
    let mut cursor = plan_start;

    for chain in ordered {
        let away_start = chain.envelope.travel_there.start;
        let away_end = chain.envelope.recovery.end;

        if away_start > cursor {
            push_or_extend(&mut periods, cursor, away_start, LocationState::AtHome);
        }
        if away_end > away_start {
            let not_home_start = away_start.max(cursor);
            push_or_extend(&mut periods, not_home_start, away_end, LocationState::NotHome);
        }
        cursor = cursor.max(away_end);
    }

    if sleep_time > cursor {
        push_or_extend(&mut periods, cursor, sleep_time, LocationState::AtHome);
    }

    periods
}

/// Filter to `at_home` periods of at least `min_minutes` duration (§4.6).
pub fn home_intervals(periods: &[LocationPeriod], min_minutes: i32) -> Vec<HomeInterval> {
    periods
        .iter()
        .filter(|p| p.state == LocationState::AtHome && p.duration_minutes() >= min_minutes)
        .map(|p| HomeInterval { start: p.start, end: p.end })
        .collect()
}

/// O(log n) point query: the state of the unique enclosing period.
pub fn state_at(periods: &[LocationPeriod], t: DateTime<Utc>) -> Option<LocationState> {
    periods
        .binary_search_by(|p| {
            if t < p.start {
                std::cmp::Ordering::Greater
            } else if t >= p.end {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .ok()
        .map(|idx| periods[idx].state)
}

/// O(log n) point query: whether `t` falls inside any home interval.
pub fn is_home_interval(intervals: &[HomeInterval], t: DateTime<Utc>) -> bool {
    intervals
        .binary_search_by(|h| {
            if t < h.start {
                std::cmp::Ordering::Greater
            } else if t >= h.end {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{Anchor, AnchorType};
    use crate::chain::build_chains;
    use crate::config::PlannerConfig;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 28, h, m, 0).unwrap()
    }

    fn anchor(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Anchor {
        Anchor {
            id: id.to_string(),
            title: "Class".to_string(),
            start,
            end,
            location: Some("Room 101".to_string()),
            anchor_type: AnchorType::Class,
            must_attend: true,
            external_calendar_id: id.to_string(),
        }
    }

    #[test]
    fn single_anchor_timeline_matches_s1() {
        let config = PlannerConfig::default();
        let plan_start = at(7, 0);
        let sleep_time = at(23, 0);
        let a = anchor("a1", at(10, 0), at(11, 0));
        let chains = build_chains(&[a], |_| 30, plan_start, &config);

        let periods = derive_location_timeline(&chains, plan_start, sleep_time);
        assert_eq!(periods[0].state, LocationState::AtHome);
        assert_eq!(periods[0].start, at(7, 0));
        assert_eq!(periods[0].end, at(9, 30));

        assert_eq!(periods[1].state, LocationState::NotHome);
        assert_eq!(periods[1].start, at(9, 30));
        assert_eq!(periods[1].end, at(11, 40));

        assert_eq!(periods[2].state, LocationState::AtHome);
        assert_eq!(periods[2].start, at(11, 40));
        assert_eq!(periods[2].end, at(23, 0));
    }

    #[test]
    fn abutting_envelopes_coalesce_into_one_not_home_period() {
        let config = PlannerConfig::default();
        let plan_start = at(7, 0);
        let sleep_time = at(23, 0);
        // a1 ends 10:00, travel 30 -> recovery.end = 10:40.
        // a2 starts 11:10, travel 30 -> travel_there.start = 10:40.
        let a1 = anchor("a1", at(9, 0), at(10, 0));
        let a2 = anchor("a2", at(11, 10), at(12, 10));
        let chains = build_chains(&[a1, a2], |_| 30, plan_start, &config);
        let periods = derive_location_timeline(&chains, plan_start, sleep_time);

        for w in periods.windows(2) {
            assert_eq!(w[0].end, w[1].start);
            assert_ne!(w[0].state, w[1].state, "states must strictly alternate, got {:?}", periods);
        }
        assert_eq!(
            periods.iter().filter(|p| p.state == LocationState::NotHome).count(),
            1
        );
    }

    #[test]
    fn timeline_is_contiguous_and_alternating() {
        let config = PlannerConfig::default();
        let plan_start = at(7, 0);
        let sleep_time = at(23, 0);
        let a1 = anchor("a1", at(9, 0), at(10, 0));
        let a2 = anchor("a2", at(13, 0), at(14, 0));
        let chains = build_chains(&[a1, a2], |_| 30, plan_start, &config);
        let periods = derive_location_timeline(&chains, plan_start, sleep_time);

        assert_eq!(periods.first().unwrap().start, plan_start);
        assert_eq!(periods.last().unwrap().end, sleep_time);
        for w in periods.windows(2) {
            assert_eq!(w[0].end, w[1].start);
            assert_ne!(w[0].state, w[1].state);
        }
    }

    #[test]
    fn home_intervals_respect_minimum_duration() {
        let periods = vec![
            LocationPeriod { start: at(7, 0), end: at(7, 20), state: LocationState::AtHome },
            LocationPeriod { start: at(7, 20), end: at(9, 0), state: LocationState::NotHome },
            LocationPeriod { start: at(9, 0), end: at(10, 0), state: LocationState::AtHome },
        ];
        let intervals = home_intervals(&periods, 30);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].start, at(9, 0));
    }

    #[test]
    fn state_at_and_is_home_interval_point_queries() {
        let periods = vec![
            LocationPeriod { start: at(7, 0), end: at(9, 0), state: LocationState::AtHome },
            LocationPeriod { start: at(9, 0), end: at(11, 0), state: LocationState::NotHome },
        ];
        assert_eq!(state_at(&periods, at(8, 0)), Some(LocationState::AtHome));
        assert_eq!(state_at(&periods, at(10, 0)), Some(LocationState::NotHome));

        let intervals = home_intervals(&periods, 30);
        assert!(is_home_interval(&intervals, at(8, 0)));
        assert!(!is_home_interval(&intervals, at(10, 0)));
    }
}
