use super::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub position: Point,
    // meters
    pub tolerance: f32,
    pub id: usize,
    // radians
    pub required_heading: f32,
    pub stop_at_end: bool,
    // fraction of max speed
    pub speed_limit_factor: f32,
}

impl Waypoint {
    pub fn new(position: Point, tolerance: f32) -> Self {
        Self {
            position,
            tolerance,
            id: 0,
            required_heading: 0.0,
            stop_at_end: false,
            speed_limit_factor: 1.0,
        }
    }

    pub fn with_heading(mut self, heading: f32) -> Self {
        self.required_heading = heading;
        self
    }

    pub fn with_speed_limit(mut self, factor: f32) -> Self {
        self.speed_limit_factor = factor.clamp(0.0, 1.0);
        self
    }

    pub fn stopping(mut self) -> Self {
        self.stop_at_end = true;
        self
    }

    pub fn distance_from(&self, point: &Point) -> f32 {
        (self.position - *point).magnitude()
    }

    pub fn is_reached_from(&self, point: &Point) -> bool {
        self.distance_from(point) <= self.tolerance
    }
}
