// Measurements are artwork pixels; px() converts to meters.

use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

use crate::simulation::{Point, Vec2};

pub const ART_PIXELS_PER_METER: f32 = 7.0;

pub const JUNCTION_CENTER_X_PX: f32 = 142.0;
pub const ACCESS_LANE_OFFSET_PX: f32 = 18.0;

const ROAD_HEIGHT_PX: f32 = 155.0;
const ROAD_CENTER_Y_PX: f32 = 78.0;
const NEAR_LANE_Y_PX: f32 = 61.0;
const FAR_LANE_Y_PX: f32 = 94.0;

const FACING_LEFT: f32 = PI;
const FACING_RIGHT: f32 = 0.0;
const FACING_UP: f32 = 3.0 * FRAC_PI_2;
const FACING_DOWN: f32 = FRAC_PI_2;

pub fn px(art_pixels: f32) -> f32 {
    art_pixels / ART_PIXELS_PER_METER
}

// Above is towards negative y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Above,
    Below,
}

impl Side {
    pub fn inward(self) -> Vec2 {
        match self {
            Side::Above => Vec2::new(0.0, -1.0),
            Side::Below => Vec2::new(0.0, 1.0),
        }
    }
}

// Rightward traffic uses the far lane, leftward traffic the near one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Near,
    Far,
}

impl Lane {
    pub fn for_direction(moving_right: bool) -> Self {
        if moving_right {
            Lane::Far
        } else {
            Lane::Near
        }
    }

    // meters below the top edge of the road
    pub fn offset(self) -> f32 {
        match self {
            Lane::Near => px(NEAR_LANE_Y_PX),
            Lane::Far => px(FAR_LANE_Y_PX),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadKind {
    Straight,
    UpEntrance,
    DownEntrance,
    DoubleEntrance,
}

impl RoadKind {
    pub fn size(self) -> Vec2 {
        let width_px = match self {
            RoadKind::Straight => 283.0,
            _ => 284.0,
        };
        Vec2::new(px(width_px), px(ROAD_HEIGHT_PX))
    }

    pub fn has_access(self, side: Side) -> bool {
        matches!(
            (self, side),
            (RoadKind::UpEntrance, Side::Above)
                | (RoadKind::DownEntrance, Side::Below)
                | (RoadKind::DoubleEntrance, _)
        )
    }

    pub fn left_attachment(self) -> Point {
        Point::new(0.0, px(ROAD_CENTER_Y_PX))
    }

    pub fn right_attachment(self) -> Point {
        Point::new(self.size().x, px(ROAD_CENTER_Y_PX))
    }

    pub fn access_attachment(self, side: Side) -> Option<Point> {
        if !self.has_access(side) {
            return None;
        }
        let y = match side {
            Side::Above => 0.0,
            Side::Below => self.size().y,
        };
        Some(Point::new(px(JUNCTION_CENTER_X_PX), y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityKind {
    SmallParking,
    LargeParking,
    SmallCharging,
    LargeCharging,
}

pub type SpotSlot = (Point, f32);

impl FacilityKind {
    pub const ALL: [FacilityKind; 4] = [
        FacilityKind::SmallParking,
        FacilityKind::LargeParking,
        FacilityKind::SmallCharging,
        FacilityKind::LargeCharging,
    ];

    pub fn is_charging(self) -> bool {
        matches!(self, FacilityKind::SmallCharging | FacilityKind::LargeCharging)
    }

    pub fn size(self) -> Vec2 {
        let (w, h) = match self {
            FacilityKind::SmallParking | FacilityKind::LargeCharging => (274.0, 330.0),
            FacilityKind::LargeParking => (436.0, 363.0),
            FacilityKind::SmallCharging => (219.0, 168.0),
        };
        Vec2::new(px(w), px(h))
    }

    fn gate_x(self) -> f32 {
        match self {
            FacilityKind::SmallCharging => px(163.0),
            _ => px(218.0),
        }
    }

    pub fn attachment(self, side: Side) -> Point {
        let y = match side {
            Side::Above => self.size().y,
            Side::Below => 0.0,
        };
        Point::new(self.gate_x(), y)
    }

    pub fn entry_waypoint(self, side: Side) -> Point {
        let height = self.size().y;
        let y = match (self, side) {
            (FacilityKind::SmallCharging, Side::Above) => height * 0.85,
            (FacilityKind::SmallCharging, Side::Below) => height * 0.15,
            _ => height / 2.0,
        };
        Point::new(self.gate_x(), y)
    }

    pub fn spot_layout(self, side: Side) -> Vec<SpotSlot> {
        let column = |x: f32, ys: &[f32], heading: f32| -> Vec<SpotSlot> {
            ys.iter().map(|&y| (Point::new(px(x), px(y)), heading)).collect()
        };
        let row = |y: f32, xs: &[f32], heading: f32| -> Vec<SpotSlot> {
            xs.iter().map(|&x| (Point::new(px(x), px(y)), heading)).collect()
        };

        const TEN_BAY_ROW: [f32; 5] = [90.0, 126.0, 162.0, 198.0, 234.0];
        const LARGE_ROW: [f32; 8] = [92.0, 128.0, 164.0, 200.0, 236.0, 272.0, 308.0, 344.0];
        const CHARGER_ROW: [f32; 5] = [38.0, 73.0, 109.0, 145.0, 181.0];

        match (self, side) {
            (FacilityKind::SmallParking | FacilityKind::LargeCharging, Side::Above) => {
                let mut spots = column(37.0, &[236.0, 199.0, 163.0, 127.0, 91.0], FACING_LEFT);
                spots.extend(row(38.0, &TEN_BAY_ROW, FACING_UP));
                spots
            }
            (FacilityKind::SmallParking | FacilityKind::LargeCharging, Side::Below) => {
                let mut spots = column(37.0, &[94.0, 131.0, 167.0, 203.0, 239.0], FACING_LEFT);
                spots.extend(row(292.0, &TEN_BAY_ROW, FACING_DOWN));
                spots
            }
            (FacilityKind::LargeParking, Side::Above) => {
                let ys = [269.0, 233.0, 197.0, 161.0, 125.0, 89.0];
                let mut spots = column(38.0, &ys, FACING_LEFT);
                spots.extend(column(389.0, &ys, FACING_RIGHT));
                spots.extend(row(38.0, &LARGE_ROW, FACING_UP));
                spots
            }
            (FacilityKind::LargeParking, Side::Below) => {
                let ys = [94.0, 130.0, 166.0, 202.0, 238.0, 274.0];
                let mut spots = column(38.0, &ys, FACING_LEFT);
                spots.extend(column(389.0, &ys, FACING_RIGHT));
                spots.extend(row(325.0, &LARGE_ROW, FACING_DOWN));
                spots
            }
            (FacilityKind::SmallCharging, Side::Above) => row(38.0, &CHARGER_ROW, FACING_UP),
            (FacilityKind::SmallCharging, Side::Below) => row(130.0, &CHARGER_ROW, FACING_DOWN),
        }
    }
}
