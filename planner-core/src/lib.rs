//! planner-core: a deterministic daily execution planner.
//!
//! Given a day's immovable calendar commitments, a wake/sleep/plan-start
//! timestamp, and a coarse energy level, [`plan_day`] produces a gap-free
//! sequence of time blocks, a set of per-anchor preparatory chains, a
//! home/away location timeline, and a meal schedule. The engine is pure and
//! synchronous: all I/O (calendar fetch, travel estimation, the wall clock)
//! is delegated to the collaborator traits in [`collaborators`] and resolved
//! by the caller before entering the core.

pub mod anchor;
pub mod chain;
pub mod collaborators;
pub mod config;
pub mod day_plan;
pub mod envelope;
pub mod error;
pub mod integrity;
pub mod location;
pub mod meal;
pub mod plan;
pub mod time;
pub mod wake_ramp;

pub use anchor::{classify_event, classify_events, Anchor, AnchorType, CalendarEvent, SkippedEvent};
pub use chain::{
    build_chains, ChainStatus, ChainStep, ExecutionChain, Role, StepStatus, StepTemplateEntry,
};
pub use collaborators::{CalendarSource, Clock, FixedClock, FixedTravelEstimator, StaticCalendarSource, TravelEstimator};
pub use config::{MinuteWindow, PlannerConfig};
pub use day_plan::{plan_day, DayPlan, PlanInputs, PlanWarning};
pub use envelope::{build_envelope, CommitmentEnvelope, EnvelopeRole, EnvelopeSlot};
pub use error::PlanError;
pub use integrity::{evaluate_chain_integrity, ChainIntegrity};
pub use location::{derive_location_timeline, home_intervals, is_home_interval, state_at, HomeInterval, LocationPeriod, LocationState};
pub use meal::{place_meals, Meal, MealKind};
pub use plan::{assemble_day_plan, Block, BlockKind, BlockStatus};
pub use wake_ramp::{build_wake_ramp, Energy, WakeRamp, WakeRampComponentKind, WakeRampComponents, WakeRampStep};
