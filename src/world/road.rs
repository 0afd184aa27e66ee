use super::geometry::{RoadKind, Side};
use crate::simulation::Point;

#[derive(Debug, Clone)]
pub struct Road {
    pub kind: RoadKind,
    // top-left corner, meters
    pub position: Point,
}

impl Road {
    pub fn new(kind: RoadKind, position: Point) -> Self {
        Self { kind, position }
    }

    pub fn width(&self) -> f32 {
        self.kind.size().x
    }

    pub fn right_edge(&self) -> f32 {
        self.position.x + self.width()
    }

    pub fn access_point(&self, side: Side) -> Option<Point> {
        self.kind
            .access_attachment(side)
            .map(|local| self.position + local.coords)
    }
}
