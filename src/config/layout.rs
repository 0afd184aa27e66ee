use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::Validate;
use crate::world::{FacilityKind, RoadKind, Side};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LayoutUnit {
    pub road: RoadKind,
    #[serde(default)]
    pub above: Option<FacilityKind>,
    #[serde(default)]
    pub below: Option<FacilityKind>,
}

impl LayoutUnit {
    pub fn facilities(&self) -> impl Iterator<Item = (Side, FacilityKind)> {
        [(Side::Above, self.above), (Side::Below, self.below)]
            .into_iter()
            .filter_map(|(side, kind)| kind.map(|k| (side, k)))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PriceMultipliers {
    pub small_parking: f32,
    pub large_parking: f32,
    pub small_charging: f32,
    pub large_charging: f32,
}

impl Default for PriceMultipliers {
    fn default() -> Self {
        Self {
            small_parking: 1.0,
            large_parking: 0.8,
            small_charging: 1.5,
            large_charging: 1.2,
        }
    }
}

impl PriceMultipliers {
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
pub struct LayoutConfig {
    // top edge of the main road, meters
    pub road_y: f32,
    pub base_spot_price: f32,
    pub price_variance: f32,
    pub price_multipliers: PriceMultipliers,
    pub units: Vec<LayoutUnit>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        use FacilityKind::*;
        let unit = |road, above, below| LayoutUnit { road, above, below };

        Self {
            road_y: 60.0,
            base_spot_price: 2.0,
            price_variance: 0.5,
            price_multipliers: PriceMultipliers::default(),
            units: vec![
                unit(RoadKind::DoubleEntrance, Some(LargeParking), Some(SmallCharging)),
                unit(RoadKind::UpEntrance, Some(SmallCharging), None),
                unit(RoadKind::DownEntrance, None, Some(SmallParking)),
                unit(RoadKind::DoubleEntrance, Some(SmallParking), Some(LargeCharging)),
            ],
        }
    }
}

impl Validate for LayoutConfig {
    fn validate(&self) -> Result<()> {
        if self.base_spot_price < 0.0 || self.price_variance < 0.0 {
            return Err(anyhow!("Spot price and variance must be non-negative"));
        }

        for kind in FacilityKind::ALL {
            if self.price_multipliers.for_kind(kind) < 0.0 {
                return Err(anyhow!("Price multiplier for {:?} must be non-negative", kind));
            }
        }

        for (i, unit) in self.units.iter().enumerate() {
            for (side, kind) in unit.facilities() {
                if !unit.road.has_access(side) {
                    return Err(anyhow!(
                        "Layout unit {} places {:?} {:?} of a {:?} road without access there",
                        i,
                        kind,
                        side,
                        unit.road
                    ));
                }
            }
        }

        Ok(())
    }
}
