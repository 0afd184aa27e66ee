use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::Validate;

// Level 0 disables auto-spawn.
pub const SPAWN_LEVELS: usize = 6;
pub const HEADLESS_SPAWN_LEVEL: usize = 3;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrafficConfig {
    // m/s
    pub spawn_speed: f32,
    pub spawn_intervals: Vec<f32>,
    pub initial_spawn_level: usize,
    pub electric_share: f32,
    pub price_priority_share: f32,
    pub parking_min_time: f32,
    pub parking_max_time: f32,
    pub battery: BatteryConfig,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            spawn_speed: 15.0,
            spawn_intervals: vec![0.0, 5.0, 4.0, 3.0, 2.0, 1.0],
            initial_spawn_level: 0,
            electric_share: 0.5,
            price_priority_share: 0.5,
            parking_min_time: 120.0,
            parking_max_time: 300.0,
            battery: BatteryConfig::default(),
        }
    }
}

impl TrafficConfig {
    pub fn spawn_interval(&self, level: usize) -> Option<f32> {
        self.spawn_intervals.get(level).copied().filter(|&i| i > 0.0)
    }
}

// Thresholds in percent.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatteryConfig {
    pub low_threshold: f32,
    pub high_threshold: f32,
    pub exit_threshold: f32,
    pub force_exit_threshold: f32,
    // percent per second
    pub charging_rate: f32,
    pub initial_mean: f32,
    pub initial_std_dev: f32,
    pub exit_probability_scale: f32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            low_threshold: 30.0,
            high_threshold: 70.0,
            exit_threshold: 80.0,
            force_exit_threshold: 95.0,
            charging_rate: 0.25,
            initial_mean: 50.0,
            initial_std_dev: 25.0,
            exit_probability_scale: 0.5,
        }
    }
}

impl Validate for TrafficConfig {
    fn validate(&self) -> Result<()> {
        if self.spawn_speed <= 0.0 {
            return Err(anyhow!("Spawn speed must be positive"));
        }

        if self.spawn_intervals.len() != SPAWN_LEVELS {
            return Err(anyhow!(
                "Exactly {} spawn intervals are required, got {}",
                SPAWN_LEVELS,
                self.spawn_intervals.len()
            ));
        }

        if self.spawn_intervals[0] != 0.0 {
            return Err(anyhow!("Spawn level 0 must be disabled (interval 0)"));
        }

        if self.spawn_intervals[1..].iter().any(|&i| i <= 0.0) {
            return Err(anyhow!("Spawn intervals for levels 1..5 must be positive"));
        }

        if self.initial_spawn_level >= SPAWN_LEVELS {
            return Err(anyhow!("Initial spawn level must be below {}", SPAWN_LEVELS));
        }

        for (name, p) in [
            ("Electric share", self.electric_share),
            ("Price priority share", self.price_priority_share),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(anyhow!("{} must be in range [0, 1]", name));
            }
        }

        if self.parking_min_time < 0.0 || self.parking_min_time > self.parking_max_time {
            return Err(anyhow!(
                "Parking time range is invalid: [{}, {}]",
                self.parking_min_time,
                self.parking_max_time
            ));
        }

        self.battery.validate()
    }
}

impl Validate for BatteryConfig {
    fn validate(&self) -> Result<()> {
        let ordered = 0.0 <= self.low_threshold
            && self.low_threshold < self.high_threshold
            && self.high_threshold <= self.exit_threshold
            && self.exit_threshold < self.force_exit_threshold
            && self.force_exit_threshold <= 100.0;
        if !ordered {
            return Err(anyhow!(
                "Battery thresholds must satisfy 0 <= low < high <= exit < force_exit <= 100"
            ));
        }

        if self.charging_rate <= 0.0 {
            return Err(anyhow!("Charging rate must be positive"));
        }

        if self.initial_std_dev < 0.0 {
            return Err(anyhow!("Initial battery standard deviation must be non-negative"));
        }

        if self.exit_probability_scale < 0.0 {
            return Err(anyhow!("Exit probability scale must be non-negative"));
        }

        Ok(())
    }
}
