use anyhow::{Context, Result};
use planner_core::PlannerConfig;
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_planner_home;

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_planner_home()?.join("config.toml"))
}

/// Load `~/.planner/config.toml`, falling back to `PlannerConfig::default()`
/// when absent. `planner-core` itself takes the config as a plain argument
/// and performs no file I/O; this dotfile layer lives entirely in the CLI.
pub fn load_config() -> Result<PlannerConfig> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(PlannerConfig::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &PlannerConfig) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = PlannerConfig::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}
