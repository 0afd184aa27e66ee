use anyhow::{anyhow, Result};
use parklogic::config::SimulationConfig;
use parklogic::simulation::{
    Point, Priority, Propulsion, Simulation, SimulationState, TrafficCoordinator, TrafficEvent,
    Vec2, Vehicle, VehicleId, VehicleState,
};
use parklogic::world::{FacilityId, FacilityKind, Lane, Road, RoadKind, Side, SpotState, World};

const ROAD_Y: f32 = 60.0;
const DT: f32 = 1.0 / 60.0;

fn seeded_config(seed: u64) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.random.seed = Some(seed);
    config
}

/// Straight road, then a double entrance with a small lot above and a small
/// charging station below, then another straight road.
fn lot_and_charger() -> Result<(World, FacilityId, FacilityId)> {
    let mut world = World::new();
    let mut x = 0.0;
    for kind in [RoadKind::Straight, RoadKind::DoubleEntrance, RoadKind::Straight] {
        let road = Road::new(kind, Point::new(x, ROAD_Y));
        x = road.right_edge();
        world.add_road(road);
    }
    let entrance = parklogic::world::RoadId(1);
    let lot = world.attach_facility(entrance, FacilityKind::SmallParking, Side::Above)?;
    let charger = world.attach_facility(entrance, FacilityKind::SmallCharging, Side::Below)?;
    Ok((world, lot, charger))
}

fn fill(world: &mut World, facility: FacilityId, state: SpotState) -> Result<()> {
    let count = world
        .facility(facility)
        .ok_or_else(|| anyhow!("unknown facility"))?
        .spot_count();
    for index in 0..count {
        world.set_spot_state(facility, index, state)?;
    }
    Ok(())
}

fn arriving(id: usize, propulsion: Propulsion, priority: Priority) -> Vehicle {
    Vehicle::new(
        VehicleId(id),
        Point::new(0.0, ROAD_Y + Lane::Far.offset()),
        Vec2::new(15.0, 0.0),
        propulsion,
        priority,
        Default::default(),
    )
}

#[test]
fn test_low_battery_prefers_charging() -> Result<()> {
    let (mut world, _, charger) = lot_and_charger()?;
    let mut coordinator = TrafficCoordinator::new(&seeded_config(1));

    for (id, priority) in [(0, Priority::Distance), (1, Priority::Price)] {
        let mut vehicle = arriving(id, Propulsion::Electric, priority).with_battery(20.0);
        coordinator.on_vehicle_spawned(&mut world, &mut vehicle);

        let context = vehicle
            .parked_context()
            .ok_or_else(|| anyhow!("vehicle {} got no spot", id))?;
        assert_eq!(context.facility, charger);
        assert_eq!(vehicle.state(), VehicleState::Driving);
    }
    Ok(())
}

#[test]
fn test_full_chargers_fall_back_to_parking() -> Result<()> {
    let (mut world, lot, charger) = lot_and_charger()?;
    fill(&mut world, charger, SpotState::Occupied)?;
    let mut coordinator = TrafficCoordinator::new(&seeded_config(2));

    let mut vehicle = arriving(0, Propulsion::Electric, Priority::Distance).with_battery(20.0);
    coordinator.on_vehicle_spawned(&mut world, &mut vehicle);

    let context = vehicle
        .parked_context()
        .ok_or_else(|| anyhow!("vehicle got no spot"))?;
    assert_eq!(context.facility, lot);
    Ok(())
}

#[test]
fn test_no_free_spot_means_through_traffic() -> Result<()> {
    let (mut world, lot, charger) = lot_and_charger()?;
    fill(&mut world, lot, SpotState::Occupied)?;
    fill(&mut world, charger, SpotState::Occupied)?;
    let mut rng = rand::thread_rng();
    for id in [lot, charger] {
        let facility = world.facility(id).ok_or_else(|| anyhow!("unknown facility"))?;
        assert_eq!(facility.random_free_spot(&mut rng), None);
    }

    let mut coordinator = TrafficCoordinator::new(&seeded_config(3));
    let mut vehicle = arriving(0, Propulsion::Combustion, Priority::Distance);
    coordinator.on_vehicle_spawned(&mut world, &mut vehicle);

    assert_eq!(vehicle.state(), VehicleState::Exiting);
    assert_eq!(vehicle.waypoint_count(), 1);
    assert!(vehicle.parked_context().is_none());
    assert_eq!(coordinator.stats().through_traffic, 1);
    assert_eq!(coordinator.stats().reservations, 0);

    let events = coordinator.drain_events();
    assert!(matches!(events[0], TrafficEvent::ThroughTraffic { vehicle } if vehicle == VehicleId(0)));
    assert!(matches!(events[1], TrafficEvent::PathAssigned { .. }));

    let exit = vehicle.waypoints().next().ok_or_else(|| anyhow!("no exit waypoint"))?;
    assert!((exit.position.x - (world.road_extent().1 + 2.0)).abs() < 1e-4);
    Ok(())
}

#[test]
fn test_spot_is_reserved_before_path_is_published() -> Result<()> {
    let (mut world, lot, _) = lot_and_charger()?;
    let mut coordinator = TrafficCoordinator::new(&seeded_config(4));
    let mut vehicle = arriving(7, Propulsion::Combustion, Priority::Distance);

    coordinator.on_vehicle_spawned(&mut world, &mut vehicle);

    let events = coordinator.drain_events();
    assert_eq!(events.len(), 2);
    let reserved_index = match &events[0] {
        TrafficEvent::SpotReserved {
            vehicle,
            facility,
            spot_index,
        } => {
            assert_eq!(*vehicle, VehicleId(7));
            assert_eq!(*facility, lot);
            *spot_index
        }
        other => return Err(anyhow!("expected a reservation first, got {:?}", other)),
    };
    match &events[1] {
        TrafficEvent::PathAssigned { vehicle: id, path } => {
            assert_eq!(*id, VehicleId(7));
            assert_eq!(path.len(), vehicle.waypoint_count());
        }
        other => return Err(anyhow!("expected a path second, got {:?}", other)),
    }

    let facility = world.facility(lot).ok_or_else(|| anyhow!("unknown facility"))?;
    assert_eq!(facility.spots()[reserved_index].state, SpotState::Reserved);
    assert_eq!(facility.spot_counts().reserved, 1);
    assert_eq!(coordinator.stats().reservations, 1);
    Ok(())
}

#[test]
fn test_price_priority_takes_the_cheaper_facility() -> Result<()> {
    let mut world = World::new();
    let straight = Road::new(RoadKind::Straight, Point::new(0.0, ROAD_Y));
    let entrance_x = straight.right_edge();
    world.add_road(straight);
    let entrance = world.add_road(Road::new(RoadKind::DoubleEntrance, Point::new(entrance_x, ROAD_Y)));
    let pricey = world.attach_facility(entrance, FacilityKind::SmallParking, Side::Above)?;
    let cheap = world.attach_facility(entrance, FacilityKind::LargeParking, Side::Below)?;

    let mut rng = rand::thread_rng();
    for (id, multiplier) in [(pricey, 3.0), (cheap, 0.5)] {
        let facility = world.facility_mut(id).ok_or_else(|| anyhow!("unknown facility"))?;
        facility.price_multiplier = multiplier;
        facility.assign_random_prices(2.0, 0.0, &mut rng);
    }

    let mut coordinator = TrafficCoordinator::new(&seeded_config(5));
    for id in 0..5 {
        let mut vehicle = arriving(id, Propulsion::Combustion, Priority::Price);
        coordinator.on_vehicle_spawned(&mut world, &mut vehicle);
        let context = vehicle
            .parked_context()
            .ok_or_else(|| anyhow!("vehicle got no spot"))?;
        assert_eq!(context.facility, cheap);
        assert_eq!(context.spot.price, 1.0);
    }
    Ok(())
}

#[test]
fn test_distance_priority_takes_the_nearer_facility() -> Result<()> {
    let mut world = World::new();
    let mut x = 0.0;
    let mut entrances = Vec::new();
    for kind in [
        RoadKind::Straight,
        RoadKind::UpEntrance,
        RoadKind::Straight,
        RoadKind::Straight,
        RoadKind::UpEntrance,
        RoadKind::Straight,
    ] {
        let road = Road::new(kind, Point::new(x, ROAD_Y));
        x = road.right_edge();
        let id = world.add_road(road);
        if kind == RoadKind::UpEntrance {
            entrances.push(id);
        }
    }
    let west = world.attach_facility(entrances[0], FacilityKind::SmallParking, Side::Above)?;
    let east = world.attach_facility(entrances[1], FacilityKind::SmallParking, Side::Above)?;

    let mut coordinator = TrafficCoordinator::new(&seeded_config(6));

    let mut from_left = arriving(0, Propulsion::Combustion, Priority::Distance);
    coordinator.on_vehicle_spawned(&mut world, &mut from_left);
    assert_eq!(from_left.parked_context().map(|c| c.facility), Some(west));

    let mut from_right = Vehicle::new(
        VehicleId(1),
        Point::new(x, ROAD_Y + Lane::Near.offset()),
        Vec2::new(-15.0, 0.0),
        Propulsion::Combustion,
        Priority::Distance,
        Default::default(),
    );
    coordinator.on_vehicle_spawned(&mut world, &mut from_right);
    assert_eq!(from_right.parked_context().map(|c| c.facility), Some(east));
    Ok(())
}

#[test]
fn test_ready_vehicle_frees_spot_and_exits() -> Result<()> {
    let (mut world, lot, _) = lot_and_charger()?;
    let mut coordinator = TrafficCoordinator::new(&seeded_config(8));
    let mut vehicle = arriving(0, Propulsion::Combustion, Priority::Distance);
    coordinator.on_vehicle_spawned(&mut world, &mut vehicle);
    let spot_index = vehicle
        .parked_context()
        .map(|c| c.spot_index)
        .ok_or_else(|| anyhow!("vehicle got no spot"))?;

    // Park it in place with an expired timer.
    let spot_position = {
        let facility = world.facility(lot).ok_or_else(|| anyhow!("unknown facility"))?;
        facility.spot_world_position(&facility.spots()[spot_index])
    };
    vehicle.position = spot_position;
    vehicle.velocity = Vec2::zeros();
    vehicle.clear_waypoints();
    vehicle.set_state(VehicleState::Parked);
    assert!(vehicle.is_ready_to_leave());

    let mut state = SimulationState::new(DT);
    state.add_vehicle(vehicle);
    coordinator.drain_events();
    coordinator.tick(&mut world, &mut state, DT);

    let vehicle = state
        .get_vehicle(VehicleId(0))
        .ok_or_else(|| anyhow!("vehicle was despawned"))?;
    assert_eq!(vehicle.state(), VehicleState::Exiting);
    assert!(vehicle.waypoint_count() > 0);
    assert!(vehicle.parked_context().is_none());

    let facility = world.facility(lot).ok_or_else(|| anyhow!("unknown facility"))?;
    assert_eq!(facility.spots()[spot_index].state, SpotState::Free);
    assert_eq!(coordinator.stats().exits, 1);

    // Entered from the left with distance priority: leaves on the left.
    let last = vehicle.waypoints().last().ok_or_else(|| anyhow!("empty exit path"))?;
    assert!((last.position.x - (world.road_extent().0 - 2.0)).abs() < 1e-4);

    let events = coordinator.drain_events();
    let kinds: Vec<&str> = events
        .iter()
        .map(|event| match event {
            TrafficEvent::SpotOccupied { .. } => "occupied",
            TrafficEvent::SpotReleased { .. } => "released",
            TrafficEvent::PathAssigned { .. } => "path",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["occupied", "released", "path"]);
    Ok(())
}

#[test]
fn test_charger_keeps_vehicle_until_charged() -> Result<()> {
    let (mut world, _, charger) = lot_and_charger()?;
    let mut coordinator = TrafficCoordinator::new(&seeded_config(9));
    let mut state = SimulationState::new(DT);

    for (id, battery) in [(0, 20.0), (1, 20.0)] {
        let mut vehicle = arriving(id, Propulsion::Electric, Priority::Distance).with_battery(battery);
        coordinator.on_vehicle_spawned(&mut world, &mut vehicle);
        assert_eq!(vehicle.parked_context().map(|c| c.facility), Some(charger));
        vehicle.clear_waypoints();
        vehicle.set_state(VehicleState::Parked);
        state.add_vehicle(vehicle);
    }
    // Vehicle 1 is nearly full and must unplug on the next tick.
    if let Some(vehicle) = state.get_vehicle_mut(VehicleId(1)) {
        vehicle.charge(76.0);
    }

    coordinator.tick(&mut world, &mut state, DT);

    let charging = state
        .get_vehicle(VehicleId(0))
        .ok_or_else(|| anyhow!("vehicle 0 missing"))?;
    assert_eq!(charging.state(), VehicleState::Parked);
    assert!(charging.battery_level() > 20.0);

    let charged = state
        .get_vehicle(VehicleId(1))
        .ok_or_else(|| anyhow!("vehicle 1 missing"))?;
    assert_eq!(charged.state(), VehicleState::Exiting);
    Ok(())
}

#[test]
fn test_spawn_levels_cycle_and_wrap() -> Result<()> {
    let mut coordinator = TrafficCoordinator::new(&seeded_config(10));
    assert_eq!(coordinator.spawn_level(), 0);

    let levels: Vec<usize> = (0..6).map(|_| coordinator.cycle_auto_spawn_level()).collect();
    assert_eq!(levels, vec![1, 2, 3, 4, 5, 0]);

    let announced: Vec<usize> = coordinator
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            TrafficEvent::AutoSpawnLevelChanged { level } => Some(level),
            _ => None,
        })
        .collect();
    assert_eq!(announced, levels);
    Ok(())
}

#[test]
fn test_spawn_timer_follows_level_interval() -> Result<()> {
    let mut coordinator = TrafficCoordinator::new(&seeded_config(11));
    for _ in 0..1000 {
        coordinator.advance_spawn_timer(DT);
    }
    assert_eq!(coordinator.pending_spawns(), 0);

    coordinator.set_spawn_level(5);
    for _ in 0..59 {
        coordinator.advance_spawn_timer(DT);
    }
    assert_eq!(coordinator.pending_spawns(), 0);
    coordinator.advance_spawn_timer(DT);
    coordinator.advance_spawn_timer(DT);
    assert_eq!(coordinator.pending_spawns(), 1);

    coordinator.request_spawn();
    assert_eq!(coordinator.pending_spawns(), 2);
    Ok(())
}

#[test]
fn test_spawned_vehicle_enters_from_a_boundary_lane() -> Result<()> {
    let mut sim = Simulation::new(&seeded_config(12))?;
    let (left, right) = sim
        .world
        .boundary_roads()
        .ok_or_else(|| anyhow!("layout has no roads"))?;
    let left = sim.world.road(left).cloned().ok_or_else(|| anyhow!("missing road"))?;
    let right = sim.world.road(right).cloned().ok_or_else(|| anyhow!("missing road"))?;

    for _ in 0..8 {
        sim.request_spawn();
    }
    sim.traffic.process_spawn_requests(&mut sim.world, &mut sim.state);
    assert_eq!(sim.state.vehicles.len(), 8);
    assert_eq!(sim.state.total_spawned, 8);
    assert_eq!(sim.traffic.pending_spawns(), 0);

    for vehicle in &sim.state.vehicles {
        if vehicle.velocity.x > 0.0 {
            assert!(vehicle.entered_from_left());
            assert_eq!(vehicle.position.x, left.position.x);
            assert!((vehicle.position.y - (left.position.y + Lane::Far.offset())).abs() < 1e-4);
        } else {
            assert!(!vehicle.entered_from_left());
            assert_eq!(vehicle.position.x, right.right_edge());
            assert!((vehicle.position.y - (right.position.y + Lane::Near.offset())).abs() < 1e-4);
        }
        assert_eq!(vehicle.speed(), 15.0);
    }

    let events = sim.drain_events();
    assert!(matches!(events[0], TrafficEvent::VehicleSpawned { .. }));
    let spawned = events
        .iter()
        .filter(|event| matches!(event, TrafficEvent::VehicleSpawned { .. }))
        .count();
    assert_eq!(spawned, 8);
    Ok(())
}

#[test]
fn test_parked_vehicle_without_spot_resumes_driving() -> Result<()> {
    let (mut world, _, _) = lot_and_charger()?;
    let mut coordinator = TrafficCoordinator::new(&seeded_config(13));
    let mut state = SimulationState::new(DT);

    let mut vehicle = arriving(0, Propulsion::Combustion, Priority::Distance);
    vehicle.set_state(VehicleState::Parked);
    assert!(vehicle.parked_context().is_none());
    state.add_vehicle(vehicle);

    coordinator.tick(&mut world, &mut state, DT);

    let vehicle = state
        .get_vehicle(VehicleId(0))
        .ok_or_else(|| anyhow!("vehicle 0 missing"))?;
    assert_eq!(vehicle.state(), VehicleState::Driving);

    let held = world.occupancy_summary().total();
    assert_eq!(held.reserved, 0);
    assert_eq!(held.occupied, 0);
    assert_eq!(coordinator.stats().exits, 0);
    assert!(!coordinator.drain_events().iter().any(|event| matches!(
        event,
        TrafficEvent::SpotReleased { .. } | TrafficEvent::SpotOccupied { .. }
    )));
    Ok(())
}

#[test]
fn test_spawn_requests_dropped_without_roads() -> Result<()> {
    let mut sim = Simulation::with_world(&seeded_config(14), World::new());
    sim.request_spawn();
    sim.request_spawn();
    assert_eq!(sim.traffic.pending_spawns(), 2);

    sim.step();

    assert!(sim.state.vehicles.is_empty());
    assert_eq!(sim.traffic.pending_spawns(), 0);
    assert_eq!(sim.traffic.stats().spawned, 0);
    Ok(())
}

#[test]
fn test_every_reserved_spot_has_a_holder() -> Result<()> {
    let (mut world, _, _) = lot_and_charger()?;
    let capacity = world.occupancy_summary().total().free;
    let mut coordinator = TrafficCoordinator::new(&seeded_config(15));

    let mut vehicles = Vec::new();
    for id in 0..capacity + 4 {
        let priority = if id % 2 == 0 { Priority::Price } else { Priority::Distance };
        // Low charge fills the chargers first, then the lot.
        let mut vehicle = arriving(id, Propulsion::Electric, priority).with_battery(20.0);
        coordinator.on_vehicle_spawned(&mut world, &mut vehicle);
        vehicles.push(vehicle);
    }

    let mut held = std::collections::HashSet::new();
    for vehicle in &vehicles {
        match vehicle.parked_context() {
            Some(context) => {
                assert!(held.insert((context.facility, context.spot_index)));
                let spot = world
                    .facility(context.facility)
                    .and_then(|f| f.spot(context.spot_index))
                    .ok_or_else(|| anyhow!("vehicle {:?} holds a missing spot", vehicle.id))?;
                assert_eq!(spot.state, SpotState::Reserved);
                assert!(vehicle.waypoint_count() > 0);
            }
            None => assert_eq!(vehicle.state(), VehicleState::Exiting),
        }
    }

    let summary = world.occupancy_summary().total();
    assert_eq!(summary.reserved, held.len());
    assert_eq!(summary.reserved, capacity);
    assert_eq!(coordinator.stats().reservations as usize, held.len());
    assert_eq!(coordinator.stats().through_traffic, 4);
    Ok(())
}
