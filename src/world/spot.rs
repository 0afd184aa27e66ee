use crate::simulation::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpotState {
    Free,
    Reserved,
    Occupied,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spot {
    // relative to the facility's top-left corner
    pub local_position: Point,
    // radians
    pub orientation: f32,
    pub id: usize,
    pub state: SpotState,
    pub price: f32,
}

impl Spot {
    pub fn new(local_position: Point, orientation: f32, id: usize) -> Self {
        Self {
            local_position,
            orientation,
            id,
            state: SpotState::Free,
            price: 0.0,
        }
    }

    pub fn is_free(&self) -> bool {
        self.state == SpotState::Free
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpotCounts {
    pub free: usize,
    pub reserved: usize,
    pub occupied: usize,
}

impl SpotCounts {
    pub fn total(&self) -> usize {
        self.free + self.reserved + self.occupied
    }

    pub fn record(&mut self, state: SpotState) {
        match state {
            SpotState::Free => self.free += 1,
            SpotState::Reserved => self.reserved += 1,
            SpotState::Occupied => self.occupied += 1,
        }
    }

    pub fn merge(&mut self, other: SpotCounts) {
        self.free += other.free;
        self.reserved += other.reserved;
        self.occupied += other.occupied;
    }
}
