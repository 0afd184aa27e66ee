use log::{debug, info};
use rand::Rng;

use super::geometry::{FacilityKind, RoadKind, Side};
use super::{Road, World};
use crate::config::LayoutConfig;
use crate::error::WorldResult;
use crate::simulation::Point;

// meters
const FACILITY_GAP: f32 = 1.0;

#[derive(Debug)]
struct SideFrontier {
    above: f32,
    below: f32,
}

impl SideFrontier {
    fn get(&self, side: Side) -> f32 {
        match side {
            Side::Above => self.above,
            Side::Below => self.below,
        }
    }

    fn push(&mut self, side: Side, right_edge: f32) {
        let slot = match side {
            Side::Above => &mut self.above,
            Side::Below => &mut self.below,
        };
        *slot = slot.max(right_edge + FACILITY_GAP);
    }

    fn furthest(&self) -> f32 {
        self.above.max(self.below)
    }
}

impl World {
    pub fn from_layout<R: Rng + ?Sized>(config: &LayoutConfig, rng: &mut R) -> WorldResult<Self> {
        let mut world = World::new();
        let mut cursor = 0.0_f32;
        let mut frontier = SideFrontier {
            above: f32::MIN,
            below: f32::MIN,
        };

        let place_road = |world: &mut World, kind: RoadKind, cursor: &mut f32| {
            let id = world.add_road(Road::new(kind, Point::new(*cursor, config.road_y)));
            *cursor += kind.size().x;
            id
        };

        place_road(&mut world, RoadKind::Straight, &mut cursor);

        for unit in &config.units {
            while unit
                .facilities()
                .any(|(side, kind)| facility_left(unit.road, kind, side, cursor) < frontier.get(side))
            {
                place_road(&mut world, RoadKind::Straight, &mut cursor);
            }

            let road = place_road(&mut world, unit.road, &mut cursor);
            for (side, kind) in unit.facilities() {
                let id = world.attach_facility(road, kind, side)?;
                if let Some(facility) = world.facility_mut(id) {
                    facility.price_multiplier = config.price_multipliers.for_kind(kind);
                    frontier.push(side, facility.position.x + facility.size().x);
                }
                debug!("Attached {:?} {:?} of road {:?}", kind, side, road);
            }
        }

        while cursor < frontier.furthest() {
            place_road(&mut world, RoadKind::Straight, &mut cursor);
        }
        place_road(&mut world, RoadKind::Straight, &mut cursor);

        for facility in &mut world.facilities {
            facility.assign_random_prices(config.base_spot_price, config.price_variance, rng);
        }

        let spots = world.occupancy_summary().total().total();
        info!(
            "Built layout: {} roads, {} facilities, {} spots, x in {:?}",
            world.roads.len(),
            world.facilities.len(),
            spots,
            world.road_extent()
        );

        Ok(world)
    }
}

fn facility_left(road: RoadKind, kind: FacilityKind, side: Side, cursor: f32) -> f32 {
    let junction_x = road.access_attachment(side).map(|p| p.x).unwrap_or(0.0);
    cursor + junction_x - kind.attachment(side).x
}
