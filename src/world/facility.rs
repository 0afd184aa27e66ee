use rand::Rng;

use super::geometry::{FacilityKind, Side};
use super::spot::{Spot, SpotCounts, SpotState};
use super::RoadId;
use crate::error::{WorldError, WorldResult};
use crate::simulation::{Point, Vec2};

#[derive(Debug, Clone)]
pub struct Facility {
    pub kind: FacilityKind,
    pub side: Side,
    // top-left corner, meters
    pub position: Point,
    pub parent: Option<RoadId>,
    pub price_multiplier: f32,
    spots: Vec<Spot>,
}

impl Facility {
    pub fn new(kind: FacilityKind, side: Side, position: Point) -> Self {
        let spots = kind
            .spot_layout(side)
            .into_iter()
            .enumerate()
            .map(|(id, (local, heading))| Spot::new(local, heading, id))
            .collect();

        Self {
            kind,
            side,
            position,
            parent: None,
            price_multiplier: 1.0,
            spots,
        }
    }

    pub fn with_spots(mut self, spots: Vec<Spot>) -> Self {
        self.spots = spots;
        self
    }

    pub fn with_parent(mut self, road: RoadId) -> Self {
        self.parent = Some(road);
        self
    }

    pub fn with_price_multiplier(mut self, multiplier: f32) -> Self {
        self.price_multiplier = multiplier;
        self
    }

    pub fn size(&self) -> Vec2 {
        self.kind.size()
    }

    pub fn is_charging(&self) -> bool {
        self.kind.is_charging()
    }

    pub fn spots(&self) -> &[Spot] {
        &self.spots
    }

    pub fn spot(&self, index: usize) -> Option<&Spot> {
        self.spots.get(index)
    }

    pub fn spot_count(&self) -> usize {
        self.spots.len()
    }

    pub fn set_spot_state(&mut self, index: usize, state: SpotState) -> WorldResult<()> {
        let count = self.spots.len();
        let spot = self
            .spots
            .get_mut(index)
            .ok_or(WorldError::SpotOutOfRange { index, count })?;
        spot.state = state;
        Ok(())
    }

    pub fn spot_counts(&self) -> SpotCounts {
        let mut counts = SpotCounts::default();
        for spot in &self.spots {
            counts.record(spot.state);
        }
        counts
    }

    pub fn has_free_spot(&self) -> bool {
        self.spots.iter().any(Spot::is_free)
    }

    pub fn occupancy(&self) -> f32 {
        if self.spots.is_empty() {
            return 0.0;
        }
        self.spot_counts().occupied as f32 / self.spots.len() as f32
    }

    pub fn random_free_spot<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        let free: Vec<usize> = self
            .spots
            .iter()
            .enumerate()
            .filter(|(_, spot)| spot.is_free())
            .map(|(index, _)| index)
            .collect();

        if free.is_empty() {
            return None;
        }
        Some(free[rng.gen_range(0..free.len())])
    }

    pub fn spot_world_position(&self, spot: &Spot) -> Point {
        self.position + spot.local_position.coords
    }

    pub fn entry_waypoint(&self) -> Point {
        self.position + self.kind.entry_waypoint(self.side).coords
    }

    pub fn assign_random_prices<R: Rng + ?Sized>(&mut self, base: f32, variance: f32, rng: &mut R) {
        let center = base * self.price_multiplier;
        for spot in &mut self.spots {
            let jitter = if variance > 0.0 {
                rng.gen_range(-variance..=variance)
            } else {
                0.0
            };
            spot.price = (center + jitter).max(0.0);
        }
    }
}
