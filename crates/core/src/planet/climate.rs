use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Coarse climate band of a polygon
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClimateZone {
    Tropical,
    Temperate,
    Polar,
}
