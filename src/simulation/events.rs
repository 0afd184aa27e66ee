use super::vehicle::{Priority, Propulsion};
use super::{Point, VehicleId, Waypoint};
use crate::world::FacilityId;

#[derive(Debug, Clone, PartialEq)]
pub enum TrafficEvent {
    VehicleSpawned {
        vehicle: VehicleId,
        position: Point,
        propulsion: Propulsion,
        priority: Priority,
    },
    PathAssigned {
        vehicle: VehicleId,
        path: Vec<Waypoint>,
    },
    AutoSpawnLevelChanged {
        level: usize,
    },
    SpotReserved {
        vehicle: VehicleId,
        facility: FacilityId,
        spot_index: usize,
    },
    SpotOccupied {
        vehicle: VehicleId,
        facility: FacilityId,
        spot_index: usize,
    },
    SpotReleased {
        vehicle: VehicleId,
        facility: FacilityId,
        spot_index: usize,
    },
    ThroughTraffic {
        vehicle: VehicleId,
    },
    VehicleDespawned {
        vehicle: VehicleId,
    },
}

impl TrafficEvent {
    pub fn vehicle(&self) -> Option<VehicleId> {
        match self {
            TrafficEvent::VehicleSpawned { vehicle, .. }
            | TrafficEvent::PathAssigned { vehicle, .. }
            | TrafficEvent::SpotReserved { vehicle, .. }
            | TrafficEvent::SpotOccupied { vehicle, .. }
            | TrafficEvent::SpotReleased { vehicle, .. }
            | TrafficEvent::ThroughTraffic { vehicle }
            | TrafficEvent::VehicleDespawned { vehicle } => Some(*vehicle),
            TrafficEvent::AutoSpawnLevelChanged { .. } => None,
        }
    }
}
