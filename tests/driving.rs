use approx::assert_abs_diff_eq;
use autopilot::{
    constants::AUTOPILOT_START_Y, Blind, Identity, Kinematics, Network, Perceptron, Road, RoadLayout,
    Vehicle,
};
use serde_json::json;

/// A brain whose forward neuron fires without any sensor signal and whose
/// other neurons never do
fn forward_only(inputs: usize) -> Perceptron {
    let brain = json!({
        "layers": [{
            "biases": [-0.5, 0.0, 0.0, 0.0],
            "weights": vec![vec![0.5; 4]; inputs],
        }]
    });
    Perceptron::from_str(&brain.to_string()).unwrap()
}

#[test]
fn test_agent_accelerates_to_cap_and_drives_straight() {
    let road = Road::new(RoadLayout::default());
    let sensor = Blind::default();
    let start_x = road.lane_center(1);
    let mut v = Vehicle::agent(
        Identity::Trainee {
            generation: 0,
            index: 0,
        },
        start_x,
        AUTOPILOT_START_Y,
        Kinematics::default(),
        forward_only(5),
    );

    let mut last_y = v.y();
    for tick in 0..200 {
        v.tick(road.borders(), &[], &sensor).unwrap();
        assert!(!v.damaged(), "damaged on tick {tick}");
        assert_eq!(0., v.angle());
        assert_abs_diff_eq!(v.x(), start_x, epsilon = 1e-9);
        assert!(v.y() <= last_y);
        last_y = v.y();
    }

    let k = Kinematics::default();
    assert_abs_diff_eq!(v.velocity(), k.max_velocity - k.friction, epsilon = 1e-9);
    assert!(v.y() < AUTOPILOT_START_Y - 400.);
}

#[test]
fn test_agent_stops_at_traffic() {
    let road = Road::new(RoadLayout::default());
    let mut v = Vehicle::agent(
        Identity::Trainee {
            generation: 0,
            index: 0,
        },
        road.lane_center(1),
        AUTOPILOT_START_Y,
        Kinematics::default(),
        forward_only(5),
    );
    // parked in the same lane, well inside a few hundred ticks
    let parked = Vehicle::scripted(
        Identity::Traffic { index: 0 },
        road.lane_center(1),
        -100.,
        Kinematics {
            max_velocity: 0.,
            ..Kinematics::traffic()
        },
    );
    let traffic = [parked];

    for _ in 0..500 {
        v.tick(road.borders(), &traffic, &Blind::default()).unwrap();
    }
    assert!(v.damaged());
    let frozen = v.y();
    v.tick(road.borders(), &traffic, &Blind::default()).unwrap();
    assert_eq!(frozen, v.y());
    assert!(frozen > -100.);
}

#[test]
fn test_overtaking_scores() {
    let road = Road::new(RoadLayout::default());
    let mut v = Vehicle::agent(
        Identity::Trainee {
            generation: 0,
            index: 0,
        },
        road.lane_center(0),
        AUTOPILOT_START_Y,
        Kinematics::default(),
        forward_only(5),
    );
    let mut traffic = vec![Vehicle::scripted(
        Identity::Traffic { index: 0 },
        road.lane_center(2),
        0.,
        Kinematics::traffic(),
    )];

    for _ in 0..1_000 {
        for t in traffic.iter_mut() {
            t.tick(road.borders(), &[], &Blind::default()).unwrap();
        }
        v.tick(road.borders(), &traffic, &Blind::default()).unwrap();
        v.credit_overtake(&traffic[0]);
    }
    assert!(!v.damaged());
    assert_eq!(1, v.score());
}
