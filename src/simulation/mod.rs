use nalgebra::{Point2, Vector2};
use std::collections::HashMap;
use std::f32::consts::{PI, TAU};

pub mod avoidance;
pub mod behavior;
pub mod engine;
pub mod events;
pub mod planner;
pub mod traffic;
pub mod vehicle;
pub mod waypoint;

pub use avoidance::*;
pub use behavior::*;
pub use engine::*;
pub use events::*;
pub use planner::*;
pub use traffic::*;
pub use vehicle::*;
pub use waypoint::*;

pub type Vec2 = Vector2<f32>;
pub type Point = Point2<f32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub usize);

// Into (-PI, PI].
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

#[derive(Debug, Clone)]
pub struct SimulationState {
    pub vehicles: Vec<Vehicle>,
    pub time: f32,
    pub dt: f32,
    pub total_spawned: u32,
    pub active_vehicles: u32,
}

impl SimulationState {
    pub fn new(dt: f32) -> Self {
        Self {
            vehicles: Vec::new(),
            time: 0.0,
            dt,
            total_spawned: 0,
            active_vehicles: 0,
        }
    }

    pub fn add_vehicle(&mut self, vehicle: Vehicle) {
        self.vehicles.push(vehicle);
        self.total_spawned += 1;
        self.active_vehicles += 1;
    }

    pub fn remove_vehicle(&mut self, id: VehicleId) -> Option<Vehicle> {
        let pos = self.vehicles.iter().position(|v| v.id == id)?;
        self.active_vehicles = self.active_vehicles.saturating_sub(1);
        Some(self.vehicles.remove(pos))
    }

    pub fn get_vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn get_vehicle_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| v.id == id)
    }

    pub fn snapshots(&self) -> Vec<NeighborSnapshot> {
        self.vehicles.iter().map(Vehicle::snapshot).collect()
    }

    // Every vehicle sees the same pre-tick snapshot of its neighbours.
    pub fn integrate(&mut self) {
        let dt = self.dt;
        let neighbors = self.snapshots();

        for vehicle in &mut self.vehicles {
            vehicle.update(dt, Some(&neighbors));
        }

        self.time += dt;
    }

    pub fn state_counts(&self) -> HashMap<VehicleState, usize> {
        let mut counts = HashMap::new();
        for vehicle in &self.vehicles {
            *counts.entry(vehicle.state()).or_insert(0) += 1;
        }
        counts
    }
}
