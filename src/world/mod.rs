pub mod facility;
pub mod geometry;
pub mod layout;
pub mod road;
pub mod spot;

pub use facility::*;
pub use geometry::*;
pub use road::*;
pub use spot::*;

use crate::error::{WorldError, WorldResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoadId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FacilityId(pub usize);

const DEFAULT_ROAD_EXTENT: (f32, f32) = (0.0, 100.0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OccupancySummary {
    pub parking: SpotCounts,
    pub charging: SpotCounts,
}

impl OccupancySummary {
    pub fn total(&self) -> SpotCounts {
        let mut total = self.parking;
        total.merge(self.charging);
        total
    }
}

#[derive(Debug, Clone, Default)]
pub struct World {
    roads: Vec<Road>,
    facilities: Vec<Facility>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_road(&mut self, road: Road) -> RoadId {
        self.roads.push(road);
        RoadId(self.roads.len() - 1)
    }

    pub fn add_facility(&mut self, facility: Facility) -> FacilityId {
        self.facilities.push(facility);
        FacilityId(self.facilities.len() - 1)
    }

    pub fn attach_facility(
        &mut self,
        road: RoadId,
        kind: FacilityKind,
        side: Side,
    ) -> WorldResult<FacilityId> {
        let parent = self.road(road).ok_or(WorldError::UnknownRoad(road))?;
        let access = parent
            .access_point(side)
            .ok_or(WorldError::NoAccessPoint { road, side })?;

        let position = access - kind.attachment(side).coords;
        let facility = Facility::new(kind, side, position).with_parent(road);
        Ok(self.add_facility(facility))
    }

    pub fn road(&self, id: RoadId) -> Option<&Road> {
        self.roads.get(id.0)
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn facility(&self, id: FacilityId) -> Option<&Facility> {
        self.facilities.get(id.0)
    }

    pub fn facility_mut(&mut self, id: FacilityId) -> Option<&mut Facility> {
        self.facilities.get_mut(id.0)
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn facility_ids(&self) -> impl Iterator<Item = FacilityId> + '_ {
        (0..self.facilities.len()).map(FacilityId)
    }

    pub fn parent_road(&self, facility: &Facility) -> Option<&Road> {
        facility.parent.and_then(|id| self.road(id))
    }

    pub fn set_spot_state(
        &mut self,
        facility: FacilityId,
        index: usize,
        state: SpotState,
    ) -> WorldResult<()> {
        self.facility_mut(facility)
            .ok_or(WorldError::UnknownFacility(facility))?
            .set_spot_state(index, state)
    }

    pub fn road_extent(&self) -> (f32, f32) {
        if self.roads.is_empty() {
            return DEFAULT_ROAD_EXTENT;
        }
        self.roads.iter().fold((f32::MAX, f32::MIN), |(min, max), road| {
            (min.min(road.position.x), max.max(road.right_edge()))
        })
    }

    pub fn boundary_roads(&self) -> Option<(RoadId, RoadId)> {
        let mut ids = (0..self.roads.len()).map(RoadId);
        let first = ids.next()?;
        let mut left = first;
        let mut right = first;
        for id in ids {
            let road = &self.roads[id.0];
            if road.position.x < self.roads[left.0].position.x {
                left = id;
            }
            if road.right_edge() > self.roads[right.0].right_edge() {
                right = id;
            }
        }
        Some((left, right))
    }

    pub fn occupancy_summary(&self) -> OccupancySummary {
        let mut summary = OccupancySummary::default();
        for facility in &self.facilities {
            let counts = facility.spot_counts();
            if facility.is_charging() {
                summary.charging.merge(counts);
            } else {
                summary.parking.merge(counts);
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::Point;

    #[test]
    fn empty_world_has_default_extent() {
        let world = World::new();
        assert_eq!(world.road_extent(), (0.0, 100.0));
        assert!(world.boundary_roads().is_none());
    }

    #[test]
    fn attached_facility_gate_meets_junction() {
        let mut world = World::new();
        let road = world.add_road(Road::new(RoadKind::DoubleEntrance, Point::new(10.0, 50.0)));
        let id = world
            .attach_facility(road, FacilityKind::SmallParking, Side::Above)
            .unwrap();

        let facility = world.facility(id).unwrap();
        let gate = facility.position + FacilityKind::SmallParking.attachment(Side::Above).coords;
        let junction = world.road(road).unwrap().access_point(Side::Above).unwrap();
        assert!((gate - junction).norm() < 1e-4);
        assert_eq!(facility.parent, Some(road));
    }

    #[test]
    fn attaching_to_missing_access_fails() {
        let mut world = World::new();
        let road = world.add_road(Road::new(RoadKind::Straight, Point::origin()));
        let err = world
            .attach_facility(road, FacilityKind::SmallCharging, Side::Below)
            .unwrap_err();
        assert_eq!(err, WorldError::NoAccessPoint { road, side: Side::Below });
    }
}
