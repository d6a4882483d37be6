//! Centralized defaults for the simulation and the trainer.
//!
//! All tunable parameters are defined here with the `AUTOPILOT_` prefix and are
//! picked up by the `Default` impls in [crate::config].

use core::f64::consts::FRAC_PI_2;

// ============================================================================
// Vehicle Kinematics
// ============================================================================

/// Velocity gained per tick while the forward control is held
pub const AUTOPILOT_ACCELERATION: f64 = 0.2;

/// Velocity lost per tick to friction, also the snap-to-zero threshold
pub const AUTOPILOT_FRICTION: f64 = 0.05;

/// Heading change per tick while steering, in radians
pub const AUTOPILOT_STEERING: f64 = 0.03;

/// Velocity cap of trainee vehicles
pub const AUTOPILOT_TRAINEE_MAX_VELOCITY: f64 = 3.0;

/// Velocity cap of scripted traffic
pub const AUTOPILOT_TRAFFIC_MAX_VELOCITY: f64 = 2.0;

/// Vehicle hull width
pub const AUTOPILOT_VEHICLE_WIDTH: f64 = 30.0;

/// Vehicle hull height
pub const AUTOPILOT_VEHICLE_HEIGHT: f64 = 50.0;

/// Number of overtaken vehicles remembered before the oldest is evicted
pub const AUTOPILOT_CREDIT_CAPACITY: usize = 25;

// ============================================================================
// Road
// ============================================================================

/// Horizontal center of the road
pub const AUTOPILOT_ROAD_X: f64 = 105.0;

/// Total road width, borders included
pub const AUTOPILOT_ROAD_WIDTH: f64 = 189.0;

/// Number of lanes
pub const AUTOPILOT_LANE_COUNT: usize = 3;

/// Borders extend this far up and down the travel axis
pub const AUTOPILOT_ROAD_EXTENT: f64 = 1_000_000.0;

// ============================================================================
// Sensor
// ============================================================================

/// Rays cast per vehicle, also the network's input width
pub const AUTOPILOT_RAY_COUNT: usize = 5;

/// Ray reach
pub const AUTOPILOT_RAY_LENGTH: f64 = 150.0;

/// Angle covered by the ray fan, centered on the heading
pub const AUTOPILOT_RAY_SPREAD: f64 = FRAC_PI_2;

// ============================================================================
// Network
// ============================================================================

/// Hidden layer widths between the sensor inputs and the control outputs
pub const AUTOPILOT_HIDDEN_LAYERS: [usize; 2] = [6, 6];

/// Control outputs: forward, left, right, reverse
pub const AUTOPILOT_CONTROL_OUTPUTS: usize = 4;

// ============================================================================
// Training
// ============================================================================

/// Trainees per generation
pub const AUTOPILOT_POPULATION: usize = 1000;

/// Blend factor between a seeded weight and a fresh random one
pub const AUTOPILOT_MUTATION_RATE: f64 = 0.12;

/// Ticks the best vehicle may stay damaged before the generation ends
pub const AUTOPILOT_DAMAGE_STALL_TICKS: u64 = 300;

/// Ticks the best score may stay unchanged before the generation ends
pub const AUTOPILOT_SCORE_STALL_TICKS: u64 = 700;

/// Lane trainees spawn in
pub const AUTOPILOT_START_LANE: usize = 1;

/// Travel-axis coordinate trainees spawn at
pub const AUTOPILOT_START_Y: f64 = 100.0;

/// Training stops on the next generation index divisible by this
pub const AUTOPILOT_GENERATION_BLOCK: usize = 25;

// ============================================================================
// Traffic
// ============================================================================

/// Vehicles placed by the random traffic plan
pub const AUTOPILOT_RANDOM_TRAFFIC_COUNT: usize = 25;

/// Travel-axis gap between consecutive random traffic vehicles
pub const AUTOPILOT_RANDOM_TRAFFIC_SPACING: f64 = 100.0;

/// (lane, y) of the fixed traffic layout
pub const AUTOPILOT_FIXED_TRAFFIC: [(usize, f64); 7] = [
    (0, -300.),
    (1, -100.),
    (2, -300.),
    (0, -500.),
    (1, -500.),
    (1, -700.),
    (2, -700.),
];
