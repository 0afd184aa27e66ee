use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::Validate;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VehicleConfig {
    // m/s
    pub max_speed: f32,
    pub max_force: f32,
    // 1/s
    pub steering_gain: f32,
    // drag force is -drag * velocity
    pub drag: f32,
    pub idle_decay: f32,
    pub rest_speed: f32,
    // 1/s
    pub heading_smoothing: f32,
    // rad/s
    pub align_rate: f32,
    pub align_epsilon: f32,
    pub turn_slowdown_distance: f32,
    // rad
    pub turn_slowdown_angle: f32,
    pub turn_min_speed_factor: f32,
    pub stop_radius: f32,
    // m/s
    pub arrival_min_speed: f32,
    pub avoidance: AvoidanceConfig,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            max_speed: 15.0,
            max_force: 40.0,
            steering_gain: 4.0,
            drag: 0.05,
            idle_decay: 0.95,
            rest_speed: 0.05,
            heading_smoothing: 8.0,
            align_rate: 2.5,
            align_epsilon: 0.02,
            turn_slowdown_distance: 30.0,
            turn_slowdown_angle: 0.2,
            turn_min_speed_factor: 0.2,
            stop_radius: 5.0,
            arrival_min_speed: 0.4,
            avoidance: AvoidanceConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AvoidanceConfig {
    // look-ahead = base + per_speed * speed
    pub look_ahead_base: f32,
    pub look_ahead_per_speed: f32,
    pub corridor_half_width: f32,
    pub oncoming_alignment: f32,
    pub oncoming_lateral_offset: f32,
    pub braking_strength: f32,
    pub critical_distance: f32,
    pub critical_penalty: f32,
    pub critical_damping: f32,
    pub stopped_speed: f32,
    pub deadlock_nudge: f32,
    pub separation_radius: f32,
    pub separation_strength: f32,
}

impl Default for AvoidanceConfig {
    fn default() -> Self {
        Self {
            look_ahead_base: 6.0,
            look_ahead_per_speed: 0.8,
            corridor_half_width: 1.5,
            oncoming_alignment: -0.5,
            oncoming_lateral_offset: 1.0,
            braking_strength: 60.0,
            critical_distance: 3.0,
            critical_penalty: 30.0,
            critical_damping: 0.9,
            stopped_speed: 0.5,
            deadlock_nudge: 8.0,
            separation_radius: 2.5,
            separation_strength: 25.0,
        }
    }
}

impl Validate for VehicleConfig {
    fn validate(&self) -> Result<()> {
        if self.max_speed <= 0.0 || self.max_force <= 0.0 {
            return Err(anyhow!("Vehicle max speed and max force must be positive"));
        }

        if self.steering_gain <= 0.0 {
            return Err(anyhow!("Steering gain must be positive"));
        }

        if self.drag < 0.0 {
            return Err(anyhow!("Drag must be non-negative"));
        }

        if !(0.0..=1.0).contains(&self.idle_decay) {
            return Err(anyhow!("Idle decay must be in range [0, 1]"));
        }

        if self.align_rate <= 0.0 || self.align_epsilon <= 0.0 {
            return Err(anyhow!("Alignment rate and epsilon must be positive"));
        }

        if !(0.0..=1.0).contains(&self.turn_min_speed_factor) {
            return Err(anyhow!("Turn minimum speed factor must be in range [0, 1]"));
        }

        if self.turn_slowdown_distance <= 0.0 || self.stop_radius <= 0.0 {
            return Err(anyhow!("Slowdown distances must be positive"));
        }

        if self.arrival_min_speed <= 0.0 || self.arrival_min_speed > self.max_speed {
            return Err(anyhow!(
                "Arrival minimum speed must be in (0, max_speed], got {}",
                self.arrival_min_speed
            ));
        }

        self.avoidance.validate()
    }
}

impl Validate for AvoidanceConfig {
    fn validate(&self) -> Result<()> {
        if self.look_ahead_base <= 0.0 || self.corridor_half_width <= 0.0 {
            return Err(anyhow!("Avoidance corridor must have positive extent"));
        }

        if self.critical_distance <= 0.0 || self.separation_radius <= 0.0 {
            return Err(anyhow!("Avoidance radii must be positive"));
        }

        if self.critical_distance > self.look_ahead_base {
            return Err(anyhow!("Critical distance must not exceed the base look-ahead"));
        }

        if !(0.0..=1.0).contains(&self.critical_damping) {
            return Err(anyhow!("Critical damping must be in range [0, 1]"));
        }

        Ok(())
    }
}
