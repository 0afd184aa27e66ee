use thiserror::Error;

use crate::world::{FacilityId, RoadId, Side};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorldError {
    #[error("road {0:?} does not exist")]
    UnknownRoad(RoadId),

    #[error("facility {0:?} does not exist")]
    UnknownFacility(FacilityId),

    #[error("spot index {index} out of range (facility has {count} spots)")]
    SpotOutOfRange { index: usize, count: usize },

    #[error("road {road:?} has no access point on the {side:?} side")]
    NoAccessPoint { road: RoadId, side: Side },
}

pub type WorldResult<T> = std::result::Result<T, WorldError>;
