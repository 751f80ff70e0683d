use anyhow::{ensure, Context, Result};
use genexpr_core::HardwareConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How a batch run is driven.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    /// Independent organisms run side by side.
    pub organisms: usize,
    pub cycles: u64,
    /// Base seed; each organism derives its own from it.
    pub seed: u64,
    /// Cycles between metric log lines.
    pub log_interval: u64,
    /// Stop an organism after this many offspring; 0 means never.
    pub max_offspring: usize,
    /// Inputs each organism cycles through.
    pub input_count: usize,
    /// Resource levels visible to `sense` instructions.
    pub resources: Vec<f64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            organisms: 16,
            cycles: 1000,
            seed: 42,
            log_interval: 100,
            max_offspring: 0,
            input_count: 3,
            resources: vec![1.0, 1.0, 1.0],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub hardware: HardwareConfig,
    pub run: RunConfig,
}

impl AppConfig {
    /// Reads `path`, falling back to defaults when it does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "Config not found, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("in config {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.hardware.validate()?;
        ensure!(self.run.organisms > 0, "run.organisms must be at least 1");
        ensure!(self.run.input_count > 0, "run.input_count must be at least 1");
        ensure!(
            self.run.resources.iter().all(|r| r.is_finite() && *r >= 0.0),
            "run.resources must be finite and non-negative"
        );
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }
}
