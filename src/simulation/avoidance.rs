use super::vehicle::VehicleState;
use super::{Point, Vec2, VehicleId};
use crate::config::AvoidanceConfig;

const VELOCITY_HEADING_MIN_SPEED: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborSnapshot {
    pub id: VehicleId,
    pub position: Point,
    pub velocity: Vec2,
    pub heading: f32,
    pub state: VehicleState,
}

impl NeighborSnapshot {
    pub fn direction(&self) -> Vec2 {
        if self.velocity.magnitude() > VELOCITY_HEADING_MIN_SPEED {
            self.velocity.normalize()
        } else {
            Vec2::new(self.heading.cos(), self.heading.sin())
        }
    }
}

// Braking acts along the heading, separation and nudges along the lateral axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvoidanceResponse {
    pub braking: Vec2,
    pub lateral: Vec2,
    // 1.0 when nothing is critically close
    pub damping: f32,
}

impl AvoidanceResponse {
    pub fn none() -> Self {
        Self {
            braking: Vec2::zeros(),
            lateral: Vec2::zeros(),
            damping: 1.0,
        }
    }

    pub fn force(&self) -> Vec2 {
        self.braking + self.lateral
    }

    pub fn is_idle(&self) -> bool {
        self.force() == Vec2::zeros() && self.damping >= 1.0
    }
}

pub fn compute_avoidance(
    own: &NeighborSnapshot,
    neighbors: &[NeighborSnapshot],
    config: &AvoidanceConfig,
) -> AvoidanceResponse {
    let mut response = AvoidanceResponse::none();

    let speed = own.velocity.magnitude();
    let forward = own.direction();
    let lateral_axis = Vec2::new(-forward.y, forward.x);
    let look_ahead = config.look_ahead_base + speed * config.look_ahead_per_speed;

    // Lateral offset of the closest vehicle in the corridor.
    let mut closest: Option<(f32, f32)> = None;

    for other in neighbors {
        if other.id == own.id || !other.state.is_moving() {
            continue;
        }

        let offset = other.position - own.position;
        let distance = offset.magnitude();
        let ahead = offset.dot(&forward);
        let lateral = offset.dot(&lateral_axis);

        if distance < config.separation_radius && distance > f32::EPSILON {
            let push = config.separation_strength * (1.0 - distance / config.separation_radius);
            response.lateral += away_from(lateral, lateral_axis) * push;
        }

        if ahead <= 0.0 || ahead > look_ahead || lateral.abs() > config.corridor_half_width {
            continue;
        }

        let oncoming = forward.dot(&other.direction()) < config.oncoming_alignment;
        if oncoming && lateral.abs() > config.oncoming_lateral_offset {
            continue;
        }

        if closest.map_or(true, |(best, _)| ahead < best) {
            closest = Some((ahead, lateral));
        }

        if speed > config.stopped_speed {
            let proximity = 1.0 - ahead / look_ahead;
            response.braking -= forward * (config.braking_strength * proximity * proximity);
            if ahead < config.critical_distance {
                response.braking -= forward * config.critical_penalty;
                response.damping = response.damping.min(config.critical_damping);
            }
        }
    }

    if let Some((_, lateral)) = closest {
        if speed < config.stopped_speed {
            response.lateral += away_from(lateral, lateral_axis) * config.deadlock_nudge;
        }
    }

    response
}

fn away_from(lateral: f32, lateral_axis: Vec2) -> Vec2 {
    if lateral > 0.0 {
        -lateral_axis
    } else {
        lateral_axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn snapshot(id: usize, x: f32, y: f32, vx: f32, heading: f32) -> NeighborSnapshot {
        NeighborSnapshot {
            id: VehicleId(id),
            position: Point::new(x, y),
            velocity: Vec2::new(vx, 0.0),
            heading,
            state: VehicleState::Driving,
        }
    }

    #[test]
    fn brakes_for_vehicle_ahead_in_lane() {
        let own = snapshot(0, 0.0, 0.0, 10.0, 0.0);
        let ahead = snapshot(1, 5.0, 0.0, 2.0, 0.0);
        let response = compute_avoidance(&own, &[own, ahead], &AvoidanceConfig::default());
        assert!(response.braking.x < 0.0);
        assert_eq!(response.lateral, Vec2::zeros());
    }

    #[test]
    fn ignores_oncoming_vehicle_in_other_lane() {
        let own = snapshot(0, 0.0, 0.0, 10.0, 0.0);
        let oncoming = snapshot(1, 5.0, 1.3, -10.0, PI);
        let response = compute_avoidance(&own, &[oncoming], &AvoidanceConfig::default());
        assert!(response.is_idle());
    }

    #[test]
    fn ignores_parked_neighbours() {
        let own = snapshot(0, 0.0, 0.0, 10.0, 0.0);
        let mut parked = snapshot(1, 1.0, 0.0, 0.0, 0.0);
        parked.state = VehicleState::Parked;
        let response = compute_avoidance(&own, &[parked], &AvoidanceConfig::default());
        assert!(response.is_idle());
    }

    #[test]
    fn separation_pushes_sideways_only() {
        let own = snapshot(0, 0.0, 0.0, 0.0, 0.0);
        let beside = snapshot(1, 0.0, 1.0, 0.0, 0.0);
        let response = compute_avoidance(&own, &[beside], &AvoidanceConfig::default());
        assert_eq!(response.braking, Vec2::zeros());
        assert!(response.lateral.y < 0.0);
        assert!(response.lateral.x.abs() < 1e-6);
    }
}
