//! Owned, serializable copies of vehicles for whoever sits on the other side of
//! a channel or a file.

use crate::{
    geometry::Point,
    network::Perceptron,
    vehicle::{ControlSource, Identity, Vehicle},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub identity: Identity,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub velocity: f64,
    pub damaged: bool,
    pub score: u32,
    pub polygon: Vec<Point>,
    pub control: ControlSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brain: Option<Perceptron>,
}

impl From<&Vehicle> for VehicleSnapshot {
    fn from(v: &Vehicle) -> Self {
        Self {
            identity: v.identity(),
            x: v.x(),
            y: v.y(),
            angle: v.angle(),
            velocity: v.velocity(),
            damaged: v.damaged(),
            score: v.score(),
            polygon: v.polygon().to_vec(),
            control: v.control_source(),
            brain: v.brain().cloned(),
        }
    }
}
