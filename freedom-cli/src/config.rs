use anyhow::{Context, Result};
use chrono_tz::Tz;
use freedom_achievements::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_freedom_home;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub notify: NotifySection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub cache_ttl_secs: i64,
    /// IANA zone that decides which calendar day a check-in counts for.
    pub timezone: String,
    pub high_energy_threshold: u8,
    pub high_energy_window_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifySection {
    /// "log" or "resend"
    pub provider: String,
    pub from: String,
    /// Recipient for celebration emails (provider = "resend").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub base_url: String,
}

impl Default for EngineSection {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            cache_ttl_secs: engine.cache_ttl_secs,
            timezone: "America/Chicago".to_string(),
            high_energy_threshold: engine.high_energy_threshold,
            high_energy_window_days: engine.high_energy_window_days,
        }
    }
}

impl Default for NotifySection {
    fn default() -> Self {
        Self {
            provider: "log".to_string(),
            from: "Freedom <wins@example.com>".to_string(),
            to: None,
            base_url: "https://api.resend.com".to_string(),
        }
    }
}

impl EngineSection {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            cache_ttl_secs: self.cache_ttl_secs,
            high_energy_threshold: self.high_energy_threshold,
            high_energy_window_days: self.high_energy_window_days,
        }
    }

    pub fn tz(&self) -> Result<Tz> {
        freedom_core::parse_timezone(&self.timezone)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_freedom_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(p: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
