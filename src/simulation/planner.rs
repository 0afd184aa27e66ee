use log::warn;
use std::f32::consts::PI;

use super::vehicle::VehicleKinematics;
use super::{Point, Vec2, Waypoint};
use crate::config::{PhaseProfile, PlannerConfig};
use crate::world::{px, Facility, Lane, Road, Side, Spot, ACCESS_LANE_OFFSET_PX, JUNCTION_CENTER_X_PX};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPhase {
    Highway,
    Approach,
    Access,
    Maneuver,
    Parking,
}

impl PathPhase {
    pub fn profile(self, config: &PlannerConfig) -> PhaseProfile {
        let phases = &config.phases;
        match self {
            PathPhase::Highway => phases.highway,
            PathPhase::Approach => phases.approach,
            PathPhase::Access => phases.access,
            PathPhase::Maneuver => phases.maneuver,
            PathPhase::Parking => phases.parking,
        }
    }
}

struct PathBuilder<'a> {
    config: &'a PlannerConfig,
    cursor: Point,
    waypoints: Vec<Waypoint>,
}

impl<'a> PathBuilder<'a> {
    fn new(config: &'a PlannerConfig, start: Point) -> Self {
        Self {
            config,
            cursor: start,
            waypoints: Vec::new(),
        }
    }

    // re-aims the previous anchor along the new segment
    fn segment(&mut self, target: Point, phase: PathPhase) {
        let profile = phase.profile(self.config);
        let delta = target - self.cursor;
        let distance = delta.magnitude();

        let heading = if distance > f32::EPSILON {
            let heading = delta.y.atan2(delta.x);
            if let Some(previous) = self.waypoints.last_mut() {
                previous.required_heading = heading;
            }
            heading
        } else {
            self.waypoints.last().map_or(0.0, |w| w.required_heading)
        };

        let make = |position: Point| {
            Waypoint::new(position, profile.tolerance)
                .with_heading(heading)
                .with_speed_limit(profile.speed_factor)
        };

        let steps = (distance / profile.correction_step).floor() as usize;
        for i in 1..steps {
            let t = i as f32 / steps as f32;
            self.waypoints.push(make(self.cursor + delta * t));
        }
        self.waypoints.push(make(target));
        self.cursor = target;
    }

    fn stop_at(&mut self, target: Point, phase: PathPhase, tolerance: f32, heading: f32) {
        self.segment(target, phase);
        if let Some(last) = self.waypoints.last_mut() {
            last.tolerance = tolerance;
            last.required_heading = heading;
            last.stop_at_end = true;
        }
    }

    fn finish(self) -> Vec<Waypoint> {
        self.waypoints
            .into_iter()
            .enumerate()
            .map(|(id, mut waypoint)| {
                waypoint.id = id;
                waypoint
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct PathPlanner {
    config: PlannerConfig,
}

impl PathPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn generate_path(
        &self,
        vehicle: &VehicleKinematics,
        facility: &Facility,
        road: Option<&Road>,
        spot: &Spot,
    ) -> Vec<Waypoint> {
        let lane = Lane::for_direction(vehicle.is_moving_right());
        let right_entry = uses_right_entry(facility.side);
        let mut path = PathBuilder::new(&self.config, vehicle.position);

        match road {
            Some(road) => {
                let road_entry = road_anchor(road, lane, right_entry);
                let to_entry = road_entry - vehicle.position;
                let distance = to_entry.magnitude();
                if distance > self.config.pre_approach_distance {
                    let pre_approach =
                        road_entry - to_entry * (self.config.pre_approach_distance / distance);
                    path.segment(pre_approach, PathPhase::Highway);
                }
                path.segment(road_entry, PathPhase::Approach);
            }
            None => warn!(
                "Facility {:?} has no parent road, routing straight to its gate",
                facility.kind
            ),
        }

        path.segment(self.gate_anchor(facility, right_entry), PathPhase::Access);
        path.segment(self.alignment_anchor(facility, spot), PathPhase::Maneuver);
        path.stop_at(
            facility.spot_world_position(spot),
            PathPhase::Parking,
            self.config.spot_tolerance,
            spot.orientation,
        );

        path.finish()
    }

    pub fn generate_exit_path(
        &self,
        vehicle: &VehicleKinematics,
        facility: &Facility,
        road: Option<&Road>,
        spot: &Spot,
        exit_right: bool,
        exit_x: f32,
    ) -> Vec<Waypoint> {
        let right_lane = !uses_right_entry(facility.side);
        let mut path = PathBuilder::new(&self.config, vehicle.position);

        path.segment(self.alignment_anchor(facility, spot), PathPhase::Maneuver);
        let gate = self.gate_anchor(facility, right_lane);
        path.segment(gate, PathPhase::Maneuver);

        let lane_y = match road {
            Some(road) => {
                let lane = Lane::for_direction(exit_right);
                path.segment(road_anchor(road, lane, right_lane), PathPhase::Access);
                road.position.y + lane.offset()
            }
            None => gate.y,
        };

        path.stop_at(
            Point::new(exit_x, lane_y),
            PathPhase::Highway,
            self.config.exit_tolerance,
            exit_heading(exit_right),
        );

        path.finish()
    }

    pub fn generate_through_path(&self, vehicle: &VehicleKinematics, exit_x: f32) -> Vec<Waypoint> {
        let exit_right = exit_x > vehicle.position.x;
        let profile = PathPhase::Highway.profile(&self.config);
        vec![Waypoint::new(
            Point::new(exit_x, vehicle.position.y),
            self.config.exit_tolerance,
        )
        .with_heading(exit_heading(exit_right))
        .with_speed_limit(profile.speed_factor)
        .stopping()]
    }

    pub fn exit_x(&self, extent: (f32, f32), exit_right: bool) -> f32 {
        if exit_right {
            extent.1 + self.config.exit_overshoot
        } else {
            extent.0 - self.config.exit_overshoot
        }
    }

    fn gate_anchor(&self, facility: &Facility, right_lane: bool) -> Point {
        let depth = self.config.gate_depth.for_kind(facility.kind);
        facility.entry_waypoint()
            + Vec2::new(lane_shift(right_lane), 0.0)
            + facility.side.inward() * depth
    }

    fn alignment_anchor(&self, facility: &Facility, spot: &Spot) -> Point {
        let back = spot.orientation + PI;
        facility.spot_world_position(spot)
            + Vec2::new(back.cos(), back.sin()) * self.config.alignment_standoff
    }
}

fn uses_right_entry(side: Side) -> bool {
    side == Side::Above
}

fn lane_shift(right_lane: bool) -> f32 {
    if right_lane {
        px(ACCESS_LANE_OFFSET_PX)
    } else {
        -px(ACCESS_LANE_OFFSET_PX)
    }
}

fn road_anchor(road: &Road, lane: Lane, right_lane: bool) -> Point {
    road.position + Vec2::new(px(JUNCTION_CENTER_X_PX) + lane_shift(right_lane), lane.offset())
}

fn exit_heading(exit_right: bool) -> f32 {
    if exit_right {
        0.0
    } else {
        PI
    }
}
