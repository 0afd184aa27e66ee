use nalgebra::Vector2;
use std::collections::VecDeque;

use super::avoidance::{compute_avoidance, AvoidanceResponse, NeighborSnapshot};
use super::{wrap_angle, Point, Vec2, VehicleId, Waypoint};
use crate::config::VehicleConfig;
use crate::world::{FacilityId, Spot};

// Ordered: a vehicle never moves back up this list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VehicleState {
    Driving,
    Aligning,
    Parked,
    Exiting,
}

impl VehicleState {
    pub const ALL: [VehicleState; 4] = [
        VehicleState::Driving,
        VehicleState::Aligning,
        VehicleState::Parked,
        VehicleState::Exiting,
    ];

    pub fn is_moving(self) -> bool {
        matches!(self, VehicleState::Driving | VehicleState::Exiting)
    }

    pub fn holds_spot(self) -> bool {
        matches!(self, VehicleState::Aligning | VehicleState::Parked)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Propulsion {
    Combustion,
    Electric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    Price,
    Distance,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleKinematics {
    pub position: Point,
    pub velocity: Vec2,
    pub heading: f32,
}

impl VehicleKinematics {
    pub fn is_moving_right(&self) -> bool {
        if self.velocity.x.abs() > f32::EPSILON {
            self.velocity.x > 0.0
        } else {
            self.heading.cos() > 0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParkedContext {
    pub facility: FacilityId,
    pub spot: Spot,
    pub spot_index: usize,
}

const FULL_BATTERY: f32 = 100.0;

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: VehicleId,
    pub position: Point,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    // radians
    pub heading: f32,
    target_heading: f32,
    propulsion: Propulsion,
    battery: f32,
    priority: Priority,
    state: VehicleState,
    waypoints: VecDeque<Waypoint>,
    parking_timer: f32,
    parking_duration: f32,
    parked: Option<ParkedContext>,
    entered_from_left: bool,
    params: VehicleConfig,
    commanded_speed: f32,
    last_avoidance: AvoidanceResponse,
}

impl Vehicle {
    pub fn new(
        id: VehicleId,
        position: Point,
        velocity: Vec2,
        propulsion: Propulsion,
        priority: Priority,
        params: VehicleConfig,
    ) -> Self {
        let heading = if velocity.magnitude() > 0.0 {
            velocity.y.atan2(velocity.x)
        } else {
            0.0
        };

        Self {
            id,
            position,
            velocity,
            acceleration: Vector2::zeros(),
            heading,
            target_heading: heading,
            propulsion,
            battery: FULL_BATTERY,
            priority,
            state: VehicleState::Driving,
            waypoints: VecDeque::new(),
            parking_timer: 0.0,
            parking_duration: 0.0,
            parked: None,
            entered_from_left: velocity.x >= 0.0,
            params,
            commanded_speed: 0.0,
            last_avoidance: AvoidanceResponse::none(),
        }
    }

    pub fn with_battery(mut self, level: f32) -> Self {
        if self.propulsion == Propulsion::Electric {
            self.battery = level.clamp(0.0, FULL_BATTERY);
        }
        self
    }

    pub fn propulsion(&self) -> Propulsion {
        self.propulsion
    }

    pub fn is_electric(&self) -> bool {
        self.propulsion == Propulsion::Electric
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn state(&self) -> VehicleState {
        self.state
    }

    pub fn set_state(&mut self, state: VehicleState) {
        self.state = state;
    }

    // Combustion vehicles always report a full battery.
    pub fn battery_level(&self) -> f32 {
        match self.propulsion {
            Propulsion::Combustion => FULL_BATTERY,
            Propulsion::Electric => self.battery,
        }
    }

    pub fn charge(&mut self, amount: f32) {
        if self.propulsion == Propulsion::Electric {
            self.battery = (self.battery + amount).clamp(0.0, FULL_BATTERY);
        }
    }

    pub fn entered_from_left(&self) -> bool {
        self.entered_from_left
    }

    pub fn set_entered_from_left(&mut self, left: bool) {
        self.entered_from_left = left;
    }

    pub fn parking_timer(&self) -> f32 {
        self.parking_timer
    }

    pub fn parking_duration(&self) -> f32 {
        self.parking_duration
    }

    pub fn set_parking_duration(&mut self, duration: f32) {
        self.parking_duration = duration.max(0.0);
    }

    pub fn parked_context(&self) -> Option<&ParkedContext> {
        self.parked.as_ref()
    }

    pub fn set_parking_context(&mut self, facility: FacilityId, spot: Spot, spot_index: usize) {
        self.parked = Some(ParkedContext {
            facility,
            spot,
            spot_index,
        });
    }

    pub fn take_parked_context(&mut self) -> Option<ParkedContext> {
        self.parked.take()
    }

    pub fn kinematics(&self) -> VehicleKinematics {
        VehicleKinematics {
            position: self.position,
            velocity: self.velocity,
            heading: self.heading,
        }
    }

    pub fn snapshot(&self) -> NeighborSnapshot {
        NeighborSnapshot {
            id: self.id,
            position: self.position,
            velocity: self.velocity,
            heading: self.heading,
            state: self.state,
        }
    }

    pub fn waypoints(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }

    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }

    pub fn assign_path(&mut self, path: Vec<Waypoint>) {
        self.waypoints = path.into();
    }

    pub fn add_waypoint(&mut self, waypoint: Waypoint) {
        self.waypoints.push_back(waypoint);
    }

    pub fn clear_waypoints(&mut self) {
        self.waypoints.clear();
    }

    pub fn has_arrived(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn is_ready_to_leave(&self) -> bool {
        self.state == VehicleState::Parked && self.parking_timer <= 0.0
    }

    // m/s
    pub fn commanded_speed(&self) -> f32 {
        self.commanded_speed
    }

    pub fn last_avoidance(&self) -> &AvoidanceResponse {
        &self.last_avoidance
    }

    pub fn speed(&self) -> f32 {
        self.velocity.magnitude()
    }

    // Neighbours must be snapshotted before any vehicle moved this tick.
    pub fn update(&mut self, dt: f32, neighbors: Option<&[NeighborSnapshot]>) {
        if self.state == VehicleState::Parked {
            self.parking_timer -= dt;
            return;
        }

        if let Some(target) = self.waypoints.front().copied() {
            self.seek(&target);
            if target.is_reached_from(&self.position) {
                if self.waypoints.len() == 1 && target.stop_at_end && self.state == VehicleState::Driving {
                    self.begin_alignment(target.required_heading);
                }
                self.waypoints.pop_front();
            }
        } else if self.state == VehicleState::Aligning {
            self.align(dt);
        } else if self.state == VehicleState::Driving {
            self.velocity *= self.params.idle_decay;
        }

        self.last_avoidance = AvoidanceResponse::none();
        if let Some(neighbors) = neighbors {
            if self.state.is_moving() {
                let response = compute_avoidance(&self.snapshot(), neighbors, &self.params.avoidance);
                self.acceleration += response.force();
                self.velocity *= response.damping;
                self.last_avoidance = response;
            }
        }

        if self.state.is_moving() {
            self.integrate(dt);
        }

        self.acceleration = Vector2::zeros();
    }

    pub fn target_speed_for(&self, waypoint: &Waypoint, distance: f32) -> f32 {
        let params = &self.params;
        let base = params.max_speed * waypoint.speed_limit_factor;
        let mut target = base;

        let turn = wrap_angle(self.heading - waypoint.required_heading).abs();
        if distance < params.turn_slowdown_distance && turn > params.turn_slowdown_angle {
            let floor = params.max_speed * params.turn_min_speed_factor;
            let t = distance / params.turn_slowdown_distance;
            target = (floor + (base - floor) * t).max(floor).min(base);
        }

        if waypoint.stop_at_end && distance < params.stop_radius {
            target = (target * distance / params.stop_radius)
                .max(params.arrival_min_speed)
                .min(target);
        }

        target
    }

    fn seek(&mut self, waypoint: &Waypoint) {
        let to_target = waypoint.position - self.position;
        let distance = to_target.magnitude();
        if distance <= f32::EPSILON {
            self.commanded_speed = 0.0;
            return;
        }

        let target_speed = self.target_speed_for(waypoint, distance);
        let desired = to_target / distance * target_speed;
        let mut steer = (desired - self.velocity) * self.params.steering_gain;
        let magnitude = steer.magnitude();
        if magnitude > self.params.max_force {
            steer *= self.params.max_force / magnitude;
        }

        self.acceleration += steer;
        self.commanded_speed = target_speed;
    }

    fn begin_alignment(&mut self, heading: f32) {
        self.velocity = Vector2::zeros();
        self.acceleration = Vector2::zeros();
        self.target_heading = heading;
        self.state = VehicleState::Aligning;
    }

    fn align(&mut self, dt: f32) {
        let error = wrap_angle(self.target_heading - self.heading);
        let step = self.params.align_rate * dt;
        if error.abs() <= step {
            self.heading = self.target_heading;
        } else {
            self.heading = wrap_angle(self.heading + step * error.signum());
        }

        if wrap_angle(self.target_heading - self.heading).abs() < self.params.align_epsilon {
            self.heading = self.target_heading;
            self.state = VehicleState::Parked;
            self.parking_timer = self.parking_duration;
        }
    }

    fn integrate(&mut self, dt: f32) {
        let params = &self.params;

        self.acceleration -= self.velocity * params.drag;
        self.velocity += self.acceleration * dt;

        let speed = self.velocity.magnitude();
        if speed > params.max_speed {
            self.velocity *= params.max_speed / speed;
        }
        if speed < params.rest_speed && self.acceleration.magnitude() < params.rest_speed {
            self.velocity = Vector2::zeros();
        }

        self.position += self.velocity * dt;

        if self.velocity.magnitude() > params.rest_speed {
            let desired = self.velocity.y.atan2(self.velocity.x);
            let blend = (params.heading_smoothing * dt).min(1.0);
            self.heading = wrap_angle(self.heading + wrap_angle(desired - self.heading) * blend);
        }
    }
}
