use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::Validate;
use crate::world::FacilityKind;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PhaseProfile {
    // fraction of max speed, [0, 1]
    pub speed_factor: f32,
    pub tolerance: f32,
    // meters
    pub correction_step: f32,
}

impl PhaseProfile {
    pub const fn new(speed_factor: f32, tolerance: f32, correction_step: f32) -> Self {
        Self {
            speed_factor,
            tolerance,
            correction_step,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PhaseTable {
    pub highway: PhaseProfile,
    pub approach: PhaseProfile,
    pub access: PhaseProfile,
    pub maneuver: PhaseProfile,
    pub parking: PhaseProfile,
}

impl Default for PhaseTable {
    fn default() -> Self {
        Self {
            highway: PhaseProfile::new(1.0, 10.0, 20.0),
            approach: PhaseProfile::new(1.0, 3.5, 5.0),
            access: PhaseProfile::new(0.4, 2.0, 3.0),
            maneuver: PhaseProfile::new(0.2, 2.0, 2.0),
            parking: PhaseProfile::new(0.1, 0.3, 3.0),
        }
    }
}

impl PhaseTable {
    fn iter(&self) -> impl Iterator<Item = (&'static str, &PhaseProfile)> {
        [
            ("highway", &self.highway),
            ("approach", &self.approach),
            ("access", &self.access),
            ("maneuver", &self.maneuver),
            ("parking", &self.parking),
        ]
        .into_iter()
    }
}

// meters past the gate
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GateDepths {
    pub small_parking: f32,
    pub large_parking: f32,
    pub small_charging: f32,
    pub large_charging: f32,
}

impl Default for GateDepths {
    fn default() -> Self {
        Self {
            small_parking: 12.0,
            large_parking: 12.0,
            small_charging: 5.0,
            large_charging: 12.0,
        }
    }
}

impl GateDepths {
    pub fn for_kind(&self, kind: FacilityKind) -> f32 {
        match kind {
            FacilityKind::SmallParking => self.small_parking,
            FacilityKind::LargeParking => self.large_parking,
            FacilityKind::SmallCharging => self.small_charging,
            FacilityKind::LargeCharging => self.large_charging,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub phases: PhaseTable,
    pub gate_depth: GateDepths,
    pub alignment_standoff: f32,
    pub spot_tolerance: f32,
    pub pre_approach_distance: f32,
    pub exit_overshoot: f32,
    pub exit_tolerance: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            phases: PhaseTable::default(),
            gate_depth: GateDepths::default(),
            alignment_standoff: 8.0,
            spot_tolerance: 0.2,
            pre_approach_distance: 40.0,
            exit_overshoot: 2.0,
            exit_tolerance: 1.0,
        }
    }
}

impl Validate for PlannerConfig {
    fn validate(&self) -> Result<()> {
        for (name, phase) in self.phases.iter() {
            if !(0.0..=1.0).contains(&phase.speed_factor) {
                return Err(anyhow!("Phase '{}' speed factor must be in range [0, 1]", name));
            }
            if phase.tolerance <= 0.0 {
                return Err(anyhow!("Phase '{}' tolerance must be positive", name));
            }
            if phase.correction_step <= 0.0 {
                return Err(anyhow!("Phase '{}' correction step must be positive", name));
            }
        }

        for kind in FacilityKind::ALL {
            if self.gate_depth.for_kind(kind) < 0.0 {
                return Err(anyhow!("Gate depth for {:?} must be non-negative", kind));
            }
        }

        if self.alignment_standoff <= 0.0 {
            return Err(anyhow!("Alignment standoff must be positive"));
        }

        if self.spot_tolerance <= 0.0 || self.exit_tolerance <= 0.0 {
            return Err(anyhow!("Spot and exit tolerances must be positive"));
        }

        if self.pre_approach_distance <= 0.0 || self.exit_overshoot < 0.0 {
            return Err(anyhow!("Pre-approach distance must be positive and exit overshoot non-negative"));
        }

        Ok(())
    }
}
