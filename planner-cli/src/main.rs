use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use planner_core::{plan_day, DayPlan, FixedTravelEstimator, PlanInputs, PlanWarning};
use std::path::PathBuf;

mod calendar;
mod config;
mod events_source;
mod live_collaborators;
mod state;

use live_collaborators::SystemClock;

#[derive(Parser, Debug)]
#[command(name = "planner", version, about = "Deterministic daily execution planner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create ~/.planner/config.toml with defaults
    ConfigInit,

    /// Save the IANA timezone used to resolve --wake/--sleep/--plan-start
    /// clock times, so later `plan`/`export-ics` calls can omit --tz
    SetTimezone {
        /// IANA timezone, e.g. America/Chicago
        tz: String,
    },

    /// Plan a day and print the resulting schedule, chains, and warnings
    Plan(PlanArgs),

    /// Plan a day and print it as an ICS calendar
    ExportIcs(PlanArgs),
}

#[derive(Parser, Debug, Clone)]
struct PlanArgs {
    /// User id to plan for (only matters to a real CalendarSource)
    #[arg(long, default_value = "default-user")]
    user: String,

    /// Date to plan, YYYY-MM-DD (default: today in the profile's timezone)
    #[arg(long)]
    date: Option<String>,

    /// IANA timezone wake/sleep/plan-start clock times are given in
    /// (default: the timezone saved in ~/.planner/profile.json)
    #[arg(long)]
    tz: Option<String>,

    /// Wake time, HH:MM
    #[arg(long, default_value = "07:00")]
    wake: String,

    /// Sleep time, HH:MM
    #[arg(long, default_value = "23:00")]
    sleep: String,

    /// Plan-start time, HH:MM (default: wake time)
    #[arg(long)]
    plan_start: Option<String>,

    /// Energy level: low, medium, or high
    #[arg(long, default_value = "medium")]
    energy: String,

    /// Current location, used as the travel estimator's origin
    #[arg(long)]
    location: Option<String>,

    /// JSON file of raw calendar events for the day (array of
    /// {id,title,description?,start,end,location?} with RFC3339 timestamps).
    /// Omit to plan a day with no anchors.
    #[arg(long)]
    events: Option<PathBuf>,

    /// Fixed one-way travel minutes used for every anchor (stand-in for a
    /// real routing service)
    #[arg(long, default_value_t = 30)]
    travel_minutes: u32,

    /// Event title prefix (export-ics only)
    #[arg(long, default_value = "")]
    prefix: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::ConfigInit => config::init_config()?,
        Command::SetTimezone { tz } => run_set_timezone(&tz)?,
        Command::Plan(args) => run_plan(&args)?,
        Command::ExportIcs(args) => run_export_ics(&args)?,
    }

    Ok(())
}

fn run_set_timezone(tz: &str) -> Result<()> {
    let _: chrono_tz::Tz = tz.parse().map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
    let profile = state::Profile { timezone: tz.to_string() };
    state::write_profile(&profile)?;
    println!("Saved timezone {tz} to {}", state::profile_path()?.display());
    Ok(())
}

fn resolve_tz(args: &PlanArgs) -> Result<String> {
    if let Some(tz) = &args.tz {
        return Ok(tz.clone());
    }
    Ok(state::read_profile()?.timezone)
}

fn resolve_date(args: &PlanArgs, tz: &str) -> Result<NaiveDate> {
    if let Some(d) = &args.date {
        return NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .with_context(|| format!("invalid --date '{d}', expected YYYY-MM-DD"));
    }
    let parsed: chrono_tz::Tz = tz.parse().map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
    Ok(Utc::now().with_timezone(&parsed).date_naive())
}

fn build_inputs(args: &PlanArgs) -> Result<PlanInputs> {
    let tz = resolve_tz(args)?;
    let date = resolve_date(args, &tz)?;
    let date_str = date.format("%Y-%m-%d").to_string();

    let wake_time =
        planner_core::time::parse_local_deadline_to_utc(&format!("{date_str} {}", args.wake), &tz)?;
    let sleep_time =
        planner_core::time::parse_local_deadline_to_utc(&format!("{date_str} {}", args.sleep), &tz)?;
    let plan_start_clock = args.plan_start.clone().unwrap_or_else(|| args.wake.clone());
    let plan_start = planner_core::time::parse_local_deadline_to_utc(
        &format!("{date_str} {plan_start_clock}"),
        &tz,
    )?;

    Ok(PlanInputs {
        user_id: args.user.clone(),
        date,
        wake_time,
        sleep_time,
        plan_start,
        energy: args.energy.clone(),
        current_location: args.location.clone(),
    })
}

fn build_plan(args: &PlanArgs) -> Result<DayPlan> {
    let inputs = build_inputs(args)?;
    let config = config::load_config()?;
    let calendar = events_source::source_for(args.events.as_deref());
    let travel = FixedTravelEstimator(args.travel_minutes);
    let clock = SystemClock;

    plan_day(&inputs, calendar.as_ref(), &travel, &clock, &config).map_err(|e| anyhow::anyhow!("{e}"))
}

fn run_plan(args: &PlanArgs) -> Result<()> {
    let plan = build_plan(args)?;

    println!("# Day plan\n");
    for block in &plan.blocks {
        println!(
            "{} - {}  [{:?}] {}  ({:?})",
            block.start.format("%H:%M"),
            block.end.format("%H:%M"),
            block.kind,
            block.label,
            block.status
        );
    }

    println!("\n# Chains\n");
    for chain in &plan.chains {
        println!(
            "{}  anchor={}  deadline={}  status={:?}",
            chain.chain_id,
            chain.anchor.title,
            chain.chain_completion_deadline.format("%H:%M"),
            chain.status
        );
    }

    println!("\n# Meals\n");
    for meal in &plan.meals {
        match (meal.start, meal.end) {
            (Some(s), Some(e)) => {
                println!("{:?}: {} - {}", meal.kind, s.format("%H:%M"), e.format("%H:%M"))
            }
            _ => println!(
                "{:?}: skipped ({})",
                meal.kind,
                meal.skip_reason.as_deref().unwrap_or("unknown")
            ),
        }
    }

    if !plan.warnings.is_empty() {
        eprintln!("\n# Warnings\n");
        for warning in &plan.warnings {
            eprintln!("{}", describe_warning(warning));
        }
    }

    Ok(())
}

fn describe_warning(warning: &PlanWarning) -> String {
    match warning {
        PlanWarning::EnvelopeConflict { chain_id } => {
            format!("envelope_conflict: {chain_id} overlaps an earlier chain's envelope")
        }
        PlanWarning::OverrunBeforePlanStart { chain_id } => {
            format!("overrun_before_plan_start: {chain_id} had steps scheduled before plan_start")
        }
        PlanWarning::MealSkipped { kind, reason } => format!("meal_skipped: {kind:?} — {reason}"),
        PlanWarning::WakeRampSkipped { reason } => format!("wake_ramp_skipped: {reason}"),
        PlanWarning::CalendarUnavailable { detail } => format!("calendar_unavailable: {detail}"),
    }
}

fn run_export_ics(args: &PlanArgs) -> Result<()> {
    let plan = build_plan(args)?;
    let events = calendar::plan_to_events(&plan, &args.prefix);
    print!("{}", calendar::events_to_ics(&events));
    Ok(())
}
