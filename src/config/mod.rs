use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod layout;
pub mod planner;
pub mod traffic;
pub mod vehicle;

pub use layout::*;
pub use planner::*;
pub use traffic::*;
pub use vehicle::*;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub simulation: SimulationParams,
    pub random: RandomConfig,
    pub vehicle: VehicleConfig,
    pub planner: PlannerConfig,
    pub traffic: TrafficConfig,
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationParams {
    // ticks per simulated second
    pub tick_rate: u32,
    // seconds
    pub duration: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            duration: 600.0,
        }
    }
}

impl SimulationParams {
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RandomConfig {
    pub seed: Option<u64>,
}

impl SimulationConfig {
    // Headless runs have no key to cycle the spawn level, so they start busy.
    pub fn headless() -> Self {
        let mut config = Self::default();
        config.traffic.initial_spawn_level = HEADLESS_SPAWN_LEVEL;
        config
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("loading config {}", path.display()))?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl Validate for SimulationParams {
    fn validate(&self) -> Result<()> {
        if self.tick_rate == 0 {
            return Err(anyhow!("Tick rate must be greater than zero"));
        }
        if self.duration < 0.0 {
            return Err(anyhow!("Simulation duration must be non-negative"));
        }
        Ok(())
    }
}

impl Validate for SimulationConfig {
    fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        self.vehicle.validate()?;
        self.planner.validate()?;
        self.traffic.validate()?;
        self.layout.validate()?;
        Ok(())
    }
}
