use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::events::TrafficEvent;
use super::traffic::TrafficCoordinator;
use super::SimulationState;
use crate::config::SimulationConfig;
use crate::error::WorldResult;
use crate::world::World;

pub struct Simulation {
    pub world: World,
    pub state: SimulationState,
    pub traffic: TrafficCoordinator,
}

impl Simulation {
    pub fn new(config: &SimulationConfig) -> WorldResult<Self> {
        let mut layout_rng = match config.random.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let world = World::from_layout(&config.layout, &mut layout_rng)?;
        Ok(Self::with_world(config, world))
    }

    pub fn with_world(config: &SimulationConfig, world: World) -> Self {
        Self {
            world,
            state: SimulationState::new(config.simulation.dt()),
            traffic: TrafficCoordinator::new(config),
        }
    }

    pub fn time(&self) -> f32 {
        self.state.time
    }

    pub fn request_spawn(&mut self) {
        self.traffic.request_spawn();
    }

    pub fn cycle_auto_spawn_level(&mut self) -> usize {
        self.traffic.cycle_auto_spawn_level()
    }

    pub fn step(&mut self) {
        let dt = self.state.dt;
        self.traffic.advance_spawn_timer(dt);
        self.traffic
            .process_spawn_requests(&mut self.world, &mut self.state);
        self.state.integrate();
        self.traffic.tick(&mut self.world, &mut self.state, dt);
    }

    pub fn run_for(&mut self, seconds: f32) {
        let ticks = (seconds / self.state.dt).round().max(0.0) as usize;
        for _ in 0..ticks {
            self.step();
        }
    }

    pub fn drain_events(&mut self) -> Vec<TrafficEvent> {
        self.traffic.drain_events()
    }

    pub fn log_status(&self) {
        let occupancy = self.world.occupancy_summary();
        let stats = self.traffic.stats();
        info!(
            "t={:.0}s vehicles={} spawned={} through={} exits={} | parking free/res/occ {}/{}/{} | charging {}/{}/{}",
            self.state.time,
            self.state.active_vehicles,
            stats.spawned,
            stats.through_traffic,
            stats.exits,
            occupancy.parking.free,
            occupancy.parking.reserved,
            occupancy.parking.occupied,
            occupancy.charging.free,
            occupancy.charging.reserved,
            occupancy.charging.occupied
        );
    }
}
