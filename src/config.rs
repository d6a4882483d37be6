//! Run configuration. Every field falls back to its `AUTOPILOT_` default, so a
//! config file only needs the values it changes.

use crate::{
    constants::*,
    error::Result,
    population::TrafficPlan,
    road::RoadLayout,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// How a vehicle moves, and how big it is
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Kinematics {
    pub acceleration: f64,
    pub friction: f64,
    pub max_velocity: f64,
    /// Radians per tick
    pub steering: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Kinematics {
    fn default() -> Self {
        Self {
            acceleration: AUTOPILOT_ACCELERATION,
            friction: AUTOPILOT_FRICTION,
            max_velocity: AUTOPILOT_TRAINEE_MAX_VELOCITY,
            steering: AUTOPILOT_STEERING,
            width: AUTOPILOT_VEHICLE_WIDTH,
            height: AUTOPILOT_VEHICLE_HEIGHT,
        }
    }
}

impl Kinematics {
    /// The slower profile of scripted traffic
    pub fn traffic() -> Self {
        Self {
            max_velocity: AUTOPILOT_TRAFFIC_MAX_VELOCITY,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub ray_count: usize,
    pub ray_length: f64,
    pub ray_spread: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            ray_count: AUTOPILOT_RAY_COUNT,
            ray_length: AUTOPILOT_RAY_LENGTH,
            ray_spread: AUTOPILOT_RAY_SPREAD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub population: usize,
    pub hidden_layers: Vec<usize>,
    pub mutation_rate: f64,
    pub damage_stall_ticks: u64,
    pub score_stall_ticks: u64,
    /// Only an unchanged score above zero counts toward the score stall
    pub require_nonzero_score: bool,
    /// Hard cap on ticks per generation, on top of the stall rules
    pub max_ticks: Option<u64>,
    pub credit_capacity: usize,
    pub start_lane: usize,
    pub start_y: f64,
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            population: AUTOPILOT_POPULATION,
            hidden_layers: AUTOPILOT_HIDDEN_LAYERS.to_vec(),
            mutation_rate: AUTOPILOT_MUTATION_RATE,
            damage_stall_ticks: AUTOPILOT_DAMAGE_STALL_TICKS,
            score_stall_ticks: AUTOPILOT_SCORE_STALL_TICKS,
            require_nonzero_score: true,
            max_ticks: None,
            credit_capacity: AUTOPILOT_CREDIT_CAPACITY,
            start_lane: AUTOPILOT_START_LANE,
            start_y: AUTOPILOT_START_Y,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub road: RoadLayout,
    pub trainee: Kinematics,
    pub traffic: Kinematics,
    pub traffic_plan: TrafficPlan,
    pub sensor: SensorConfig,
    pub training: TrainingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            road: RoadLayout::default(),
            trainee: Kinematics::default(),
            traffic: Kinematics::traffic(),
            traffic_plan: TrafficPlan::default(),
            sensor: SensorConfig::default(),
            training: TrainingConfig::default(),
        }
    }
}

impl Config {
    /// Layer widths of every brain: one input per ray, the hidden layers, then
    /// forward, left, right, reverse
    pub fn topology(&self, ray_count: usize) -> Vec<usize> {
        let mut topology = Vec::with_capacity(self.training.hidden_layers.len() + 2);
        topology.push(ray_count);
        topology.extend_from_slice(&self.training.hidden_layers);
        topology.push(AUTOPILOT_CONTROL_OUTPUTS);
        topology
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
