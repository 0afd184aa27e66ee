use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::vehicle::{Priority, Propulsion};
use crate::config::{BatteryConfig, TrafficConfig};

#[derive(Debug, Clone)]
pub struct BehaviorEngine {
    battery: BatteryConfig,
    electric_share: f32,
    price_priority_share: f32,
    parking_min_time: f32,
    parking_max_time: f32,
}

impl BehaviorEngine {
    pub fn new(config: &TrafficConfig) -> Self {
        Self {
            battery: config.battery.clone(),
            electric_share: config.electric_share,
            price_priority_share: config.price_priority_share,
            parking_min_time: config.parking_min_time,
            parking_max_time: config.parking_max_time,
        }
    }

    pub fn roll_propulsion<R: Rng + ?Sized>(&self, rng: &mut R) -> Propulsion {
        if rng.gen_bool(self.electric_share as f64) {
            Propulsion::Electric
        } else {
            Propulsion::Combustion
        }
    }

    pub fn roll_priority<R: Rng + ?Sized>(&self, rng: &mut R) -> Priority {
        if rng.gen_bool(self.price_priority_share as f64) {
            Priority::Price
        } else {
            Priority::Distance
        }
    }

    pub fn roll_battery<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let level = Normal::new(self.battery.initial_mean, self.battery.initial_std_dev)
            .map(|normal| normal.sample(rng))
            .unwrap_or(self.battery.initial_mean);
        level.clamp(0.0, 100.0)
    }

    pub fn roll_parking_duration<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.parking_max_time > self.parking_min_time {
            rng.gen_range(self.parking_min_time..=self.parking_max_time)
        } else {
            self.parking_min_time
        }
    }

    pub fn charge_seeking_probability(&self, battery: f32) -> f32 {
        let low = self.battery.low_threshold;
        let high = self.battery.high_threshold;
        if battery < low {
            1.0
        } else if battery > high {
            0.0
        } else {
            1.0 - (battery - low) / (high - low)
        }
    }

    pub fn seeks_charging<R: Rng + ?Sized>(&self, battery: f32, rng: &mut R) -> bool {
        match self.charge_seeking_probability(battery) {
            p if p >= 1.0 => true,
            p if p <= 0.0 => false,
            p => rng.gen::<f32>() < p,
        }
    }

    pub fn charge_gain(&self, dt: f32) -> f32 {
        self.battery.charging_rate * dt
    }

    // Per-second probability, scaled by dt.
    pub fn charger_exit_probability(&self, battery: f32, dt: f32) -> f32 {
        let exit = self.battery.exit_threshold;
        let force = self.battery.force_exit_threshold;
        if battery > force {
            1.0
        } else if battery > exit {
            self.battery.exit_probability_scale * ((battery - exit) / (force - exit)) * dt
        } else {
            0.0
        }
    }

    pub fn leaves_charger<R: Rng + ?Sized>(&self, battery: f32, dt: f32, rng: &mut R) -> bool {
        match self.charger_exit_probability(battery, dt) {
            p if p >= 1.0 => true,
            p if p <= 0.0 => false,
            p => rng.gen::<f32>() < p,
        }
    }
}
