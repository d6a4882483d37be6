pub mod config;
pub mod constants;
pub mod error;
pub mod fitness;
pub mod geometry;
pub mod macros;
pub mod network;
pub mod population;
pub mod random;
pub mod road;
pub mod sensor;
pub mod serialize;
pub mod snapshot;
pub mod trainer;
pub mod vehicle;
pub mod worker;

pub use config::{Config, Kinematics};
pub use error::{Error, Result};
pub use network::{activate, Network, Perceptron};
pub use population::TrafficPlan;
pub use road::{Road, RoadLayout};
pub use sensor::{Blind, RaySensor, Sensing};
pub use snapshot::VehicleSnapshot;
pub use trainer::{EvolutionTarget, Stats, Trainer, Training};
pub use vehicle::{ControlSource, Controls, Identity, Vehicle};
pub use worker::{Command, Event, WorkerHandle};
