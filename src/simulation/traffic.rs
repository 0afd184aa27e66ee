use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::behavior::BehaviorEngine;
use super::events::TrafficEvent;
use super::planner::PathPlanner;
use super::vehicle::{Priority, Vehicle, VehicleState};
use super::{Point, SimulationState, Vec2, VehicleId};
use crate::config::{SimulationConfig, TrafficConfig, VehicleConfig, SPAWN_LEVELS};
use crate::world::{FacilityId, Lane, SpotState, World};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrafficStats {
    pub spawned: u64,
    pub reservations: u64,
    pub through_traffic: u64,
    pub exits: u64,
    pub despawned: u64,
}

pub struct TrafficCoordinator {
    config: TrafficConfig,
    vehicle_config: VehicleConfig,
    planner: PathPlanner,
    behavior: BehaviorEngine,
    rng: StdRng,
    spawn_level: usize,
    spawn_timer: f32,
    pending_spawns: usize,
    next_vehicle_id: usize,
    events: Vec<TrafficEvent>,
    stats: TrafficStats,
}

impl TrafficCoordinator {
    pub fn new(config: &SimulationConfig) -> Self {
        let rng = match config.random.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            config: config.traffic.clone(),
            vehicle_config: config.vehicle.clone(),
            planner: PathPlanner::new(config.planner.clone()),
            behavior: BehaviorEngine::new(&config.traffic),
            rng,
            spawn_level: config.traffic.initial_spawn_level.min(SPAWN_LEVELS - 1),
            spawn_timer: 0.0,
            pending_spawns: 0,
            next_vehicle_id: 0,
            events: Vec::new(),
            stats: TrafficStats::default(),
        }
    }

    pub fn planner(&self) -> &PathPlanner {
        &self.planner
    }

    pub fn stats(&self) -> TrafficStats {
        self.stats
    }

    pub fn spawn_level(&self) -> usize {
        self.spawn_level
    }

    pub fn pending_spawns(&self) -> usize {
        self.pending_spawns
    }

    pub fn request_spawn(&mut self) {
        self.pending_spawns += 1;
    }

    pub fn set_spawn_level(&mut self, level: usize) {
        self.spawn_level = level.min(SPAWN_LEVELS - 1);
        self.spawn_timer = 0.0;
        info!("Auto-spawn level set to {}", self.spawn_level);
        self.events.push(TrafficEvent::AutoSpawnLevelChanged {
            level: self.spawn_level,
        });
    }

    // Wraps from the highest level back to 0 (disabled).
    pub fn cycle_auto_spawn_level(&mut self) -> usize {
        self.set_spawn_level((self.spawn_level + 1) % SPAWN_LEVELS);
        self.spawn_level
    }

    pub fn advance_spawn_timer(&mut self, dt: f32) {
        let Some(interval) = self.config.spawn_interval(self.spawn_level) else {
            return;
        };

        self.spawn_timer += dt;
        if self.spawn_timer >= interval {
            self.spawn_timer = 0.0;
            self.pending_spawns += 1;
        }
    }

    pub fn process_spawn_requests(&mut self, world: &mut World, state: &mut SimulationState) {
        while self.pending_spawns > 0 {
            let Some(mut vehicle) = self.spawn_vehicle(world) else {
                warn!("No roads to spawn on, dropping {} spawn request(s)", self.pending_spawns);
                self.pending_spawns = 0;
                return;
            };
            self.pending_spawns -= 1;

            self.on_vehicle_spawned(world, &mut vehicle);
            state.add_vehicle(vehicle);
        }
    }

    fn spawn_vehicle(&mut self, world: &World) -> Option<Vehicle> {
        let (left, right) = world.boundary_roads()?;
        let spawn_left = self.rng.gen_bool(0.5);
        let speed = self.config.spawn_speed;

        let (position, velocity) = if spawn_left {
            let road = world.road(left)?;
            let lane = Lane::for_direction(true);
            (
                Point::new(road.position.x, road.position.y + lane.offset()),
                Vec2::new(speed, 0.0),
            )
        } else {
            let road = world.road(right)?;
            let lane = Lane::for_direction(false);
            (
                Point::new(road.right_edge(), road.position.y + lane.offset()),
                Vec2::new(-speed, 0.0),
            )
        };

        let propulsion = self.behavior.roll_propulsion(&mut self.rng);
        let priority = self.behavior.roll_priority(&mut self.rng);
        let id = VehicleId(self.next_vehicle_id);
        self.next_vehicle_id += 1;

        let mut vehicle = Vehicle::new(
            id,
            position,
            velocity,
            propulsion,
            priority,
            self.vehicle_config.clone(),
        );
        if vehicle.is_electric() {
            let battery = self.behavior.roll_battery(&mut self.rng);
            vehicle = vehicle.with_battery(battery);
        }
        vehicle.set_entered_from_left(spawn_left);
        vehicle.set_parking_duration(self.behavior.roll_parking_duration(&mut self.rng));

        self.stats.spawned += 1;
        self.events.push(TrafficEvent::VehicleSpawned {
            vehicle: id,
            position,
            propulsion,
            priority,
        });
        debug!(
            "Spawned vehicle {:?} ({:?}, {:?}, battery {:.0}) at ({:.1}, {:.1})",
            id,
            propulsion,
            priority,
            vehicle.battery_level(),
            position.x,
            position.y
        );

        Some(vehicle)
    }

    pub fn on_vehicle_spawned(&mut self, world: &mut World, vehicle: &mut Vehicle) {
        let candidates = self.candidate_facilities(world, vehicle);
        let choice = match vehicle.priority() {
            Priority::Distance => self.nearest_facility(world, &candidates, vehicle.position),
            Priority::Price => self.cheapest_facility(world, &candidates),
        };

        let Some((facility_id, spot_index)) = choice else {
            self.send_through(world, vehicle);
            return;
        };

        let Some(facility) = world.facility(facility_id) else {
            self.send_through(world, vehicle);
            return;
        };
        let Some(spot) = facility.spot(spot_index).cloned() else {
            self.send_through(world, vehicle);
            return;
        };
        let path = self.planner.generate_path(
            &vehicle.kinematics(),
            facility,
            world.parent_road(facility),
            &spot,
        );
        let kind = facility.kind;

        // Nothing below may bail out once the spot is reserved.
        if let Err(err) = world.set_spot_state(facility_id, spot_index, SpotState::Reserved) {
            warn!("Could not reserve spot for vehicle {:?}: {}", vehicle.id, err);
            self.send_through(world, vehicle);
            return;
        }
        self.stats.reservations += 1;
        self.events.push(TrafficEvent::SpotReserved {
            vehicle: vehicle.id,
            facility: facility_id,
            spot_index,
        });

        if let Some(counts) = world.facility(facility_id).map(|f| f.spot_counts()) {
            debug!(
                "Vehicle {:?} reserved spot {} of {:?} {:?} [free {}, reserved {}, occupied {}]",
                vehicle.id,
                spot_index,
                kind,
                facility_id,
                counts.free,
                counts.reserved,
                counts.occupied
            );
        }

        vehicle.set_parking_context(facility_id, spot, spot_index);
        vehicle.assign_path(path.clone());
        self.events.push(TrafficEvent::PathAssigned {
            vehicle: vehicle.id,
            path,
        });
    }

    fn candidate_facilities(&mut self, world: &World, vehicle: &Vehicle) -> Vec<FacilityId> {
        let of_kind = |charging: bool| -> Vec<FacilityId> {
            world
                .facility_ids()
                .filter(|&id| world.facility(id).map_or(false, |f| f.is_charging() == charging))
                .collect()
        };

        let wants_charging =
            vehicle.is_electric() && self.behavior.seeks_charging(vehicle.battery_level(), &mut self.rng);

        if wants_charging {
            let chargers = of_kind(true);
            let any_free = chargers
                .iter()
                .any(|&id| world.facility(id).map_or(false, |f| f.has_free_spot()));
            if any_free {
                return chargers;
            }
            warn!(
                "No charging station has room for vehicle {:?} (battery {:.0}), trying parking",
                vehicle.id,
                vehicle.battery_level()
            );
        }

        of_kind(false)
    }

    fn nearest_facility(
        &mut self,
        world: &World,
        candidates: &[FacilityId],
        from: Point,
    ) -> Option<(FacilityId, usize)> {
        let mut best: Option<(f32, FacilityId, usize)> = None;

        for &id in candidates {
            let Some(facility) = world.facility(id) else {
                continue;
            };
            if !facility.has_free_spot() {
                continue;
            }

            let distance = (facility.position - from).magnitude();
            if best.map_or(true, |(closest, _, _)| distance < closest) {
                if let Some(index) = facility.random_free_spot(&mut self.rng) {
                    best = Some((distance, id, index));
                }
            }
        }

        best.map(|(_, id, index)| (id, index))
    }

    fn cheapest_facility(&mut self, world: &World, candidates: &[FacilityId]) -> Option<(FacilityId, usize)> {
        let mut best: Option<(f32, FacilityId, usize)> = None;

        for &id in candidates {
            let Some(facility) = world.facility(id) else {
                continue;
            };
            let Some(index) = facility.random_free_spot(&mut self.rng) else {
                continue;
            };
            let Some(spot) = facility.spot(index) else {
                continue;
            };

            if best.map_or(true, |(cheapest, _, _)| spot.price < cheapest) {
                best = Some((spot.price, id, index));
            }
        }

        best.map(|(_, id, index)| (id, index))
    }

    fn send_through(&mut self, world: &World, vehicle: &mut Vehicle) {
        let kinematics = vehicle.kinematics();
        let exit_x = self
            .planner
            .exit_x(world.road_extent(), kinematics.is_moving_right());
        let path = self.planner.generate_through_path(&kinematics, exit_x);

        warn!("No free spot for vehicle {:?}, passing through", vehicle.id);
        vehicle.assign_path(path.clone());
        vehicle.set_state(VehicleState::Exiting);

        self.stats.through_traffic += 1;
        self.events.push(TrafficEvent::ThroughTraffic { vehicle: vehicle.id });
        self.events.push(TrafficEvent::PathAssigned {
            vehicle: vehicle.id,
            path,
        });
    }

    pub fn tick(&mut self, world: &mut World, state: &mut SimulationState, dt: f32) {
        let extent = world.road_extent();
        let mut departed = Vec::new();

        for vehicle in &mut state.vehicles {
            if vehicle.state().holds_spot() {
                self.confirm_arrival(world, vehicle);
            }

            if vehicle.state() == VehicleState::Parked && self.should_exit(world, vehicle, dt) {
                self.start_exit(world, vehicle, extent);
            }

            if vehicle.state() == VehicleState::Exiting && vehicle.has_arrived() {
                departed.push(vehicle.id);
            }
        }

        for id in departed {
            if state.remove_vehicle(id).is_some() {
                self.stats.despawned += 1;
                self.events.push(TrafficEvent::VehicleDespawned { vehicle: id });
                debug!("Vehicle {:?} left the map", id);
            }
        }
    }

    fn confirm_arrival(&mut self, world: &mut World, vehicle: &Vehicle) {
        let Some(context) = vehicle.parked_context() else {
            return;
        };
        let (facility, spot_index) = (context.facility, context.spot_index);

        let reserved = world
            .facility(facility)
            .and_then(|f| f.spot(spot_index))
            .map_or(false, |spot| spot.state == SpotState::Reserved);
        if !reserved {
            return;
        }

        match world.set_spot_state(facility, spot_index, SpotState::Occupied) {
            Ok(()) => {
                debug!("Vehicle {:?} occupied spot {} of {:?}", vehicle.id, spot_index, facility);
                self.events.push(TrafficEvent::SpotOccupied {
                    vehicle: vehicle.id,
                    facility,
                    spot_index,
                });
            }
            Err(err) => warn!("Could not mark spot occupied for vehicle {:?}: {}", vehicle.id, err),
        }
    }

    fn should_exit(&mut self, world: &World, vehicle: &mut Vehicle, dt: f32) -> bool {
        let at_charger = vehicle
            .parked_context()
            .and_then(|context| world.facility(context.facility))
            .map_or(false, |facility| facility.is_charging());

        if at_charger && vehicle.is_electric() {
            vehicle.charge(self.behavior.charge_gain(dt));
            self.behavior
                .leaves_charger(vehicle.battery_level(), dt, &mut self.rng)
        } else {
            vehicle.is_ready_to_leave()
        }
    }

    fn start_exit(&mut self, world: &mut World, vehicle: &mut Vehicle, extent: (f32, f32)) {
        let Some(context) = vehicle.take_parked_context() else {
            warn!("Vehicle {:?} is parked without a spot, resuming driving", vehicle.id);
            vehicle.set_state(VehicleState::Driving);
            return;
        };

        match world.set_spot_state(context.facility, context.spot_index, SpotState::Free) {
            Ok(()) => self.events.push(TrafficEvent::SpotReleased {
                vehicle: vehicle.id,
                facility: context.facility,
                spot_index: context.spot_index,
            }),
            Err(err) => warn!("Could not release spot of vehicle {:?}: {}", vehicle.id, err),
        }

        let exit_right = match vehicle.priority() {
            Priority::Distance => !vehicle.entered_from_left(),
            Priority::Price => self.rng.gen_bool(0.5),
        };
        let exit_x = self.planner.exit_x(extent, exit_right);
        let kinematics = vehicle.kinematics();

        let path = match world.facility(context.facility) {
            Some(facility) => self.planner.generate_exit_path(
                &kinematics,
                facility,
                world.parent_road(facility),
                &context.spot,
                exit_right,
                exit_x,
            ),
            None => self.planner.generate_through_path(&kinematics, exit_x),
        };

        debug!(
            "Vehicle {:?} leaving spot {} of {:?} towards the {} edge (battery {:.0})",
            vehicle.id,
            context.spot_index,
            context.facility,
            if exit_right { "right" } else { "left" },
            vehicle.battery_level()
        );

        vehicle.assign_path(path.clone());
        vehicle.set_state(VehicleState::Exiting);
        self.stats.exits += 1;
        self.events.push(TrafficEvent::PathAssigned {
            vehicle: vehicle.id,
            path,
        });
    }

    pub fn drain_events(&mut self) -> Vec<TrafficEvent> {
        std::mem::take(&mut self.events)
    }
}
