//! Building the vehicles of a generation: trainees seeded from the lineage's
//! best brain, and the traffic they learn to overtake.

use crate::{
    config::Kinematics,
    constants::{AUTOPILOT_FIXED_TRAFFIC, AUTOPILOT_RANDOM_TRAFFIC_COUNT, AUTOPILOT_RANDOM_TRAFFIC_SPACING},
    error::Result,
    network::{Network, Perceptron},
    road::Road,
    vehicle::{Identity, Vehicle},
};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Where traffic is placed at the start of every generation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrafficPlan {
    /// The same seven vehicles every time
    #[default]
    Fixed,
    /// Vehicle `i` in a random lane, `spacing * i` up the road
    Random { count: usize, spacing: f64 },
}

impl TrafficPlan {
    pub fn random() -> Self {
        Self::Random {
            count: AUTOPILOT_RANDOM_TRAFFIC_COUNT,
            spacing: AUTOPILOT_RANDOM_TRAFFIC_SPACING,
        }
    }
}

/// Where and how trainees start
#[derive(Debug, Clone, Copy)]
pub struct Spawn {
    pub generation: usize,
    pub size: usize,
    pub x: f64,
    pub y: f64,
    pub kinematics: Kinematics,
    pub credit_capacity: usize,
    pub mutation_rate: f64,
}

/// `spawn.size` agents with identities `(generation, i)`. Given a seed brain,
/// index 0 drives an exact copy and every other index a mutated copy; without
/// one every brain is random. No two vehicles share a brain.
pub fn spawn_trainees(
    spawn: &Spawn,
    topology: &[usize],
    seed: Option<&Perceptron>,
    rng: &mut impl RngCore,
) -> Result<Vec<Vehicle>> {
    (0..spawn.size)
        .map(|index| {
            let brain = match seed {
                Some(seed) if index == 0 => seed.clone(),
                Some(seed) => {
                    let mut brain = seed.clone();
                    brain.mutate(spawn.mutation_rate, rng);
                    brain
                }
                None => Perceptron::random(topology, rng)?,
            };
            let identity = Identity::Trainee {
                generation: spawn.generation,
                index,
            };
            Ok(Vehicle::agent(identity, spawn.x, spawn.y, spawn.kinematics, brain)
                .with_credit_capacity(spawn.credit_capacity))
        })
        .collect()
}

pub fn spawn_traffic(
    plan: TrafficPlan,
    road: &Road,
    kinematics: Kinematics,
    rng: &mut impl RngCore,
) -> Vec<Vehicle> {
    let at = |index: usize, lane: usize, y: f64| {
        Vehicle::scripted(Identity::Traffic { index }, road.lane_center(lane), y, kinematics)
    };

    match plan {
        TrafficPlan::Fixed => AUTOPILOT_FIXED_TRAFFIC
            .iter()
            .enumerate()
            .map(|(index, &(lane, y))| at(index, lane, y))
            .collect(),
        TrafficPlan::Random { count, spacing } => (0..count)
            .map(|index| {
                let lane = rng.random_range(0..road.lane_count().max(1));
                at(index, lane, -spacing * index as f64)
            })
            .collect(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{assert_f64_approx, random::WyRng, road::RoadLayout};

    const TOPOLOGY: [usize; 4] = [5, 6, 6, 4];

    fn spawn(size: usize) -> Spawn {
        Spawn {
            generation: 3,
            size,
            x: 105.,
            y: 100.,
            kinematics: Kinematics::default(),
            credit_capacity: 25,
            mutation_rate: 0.12,
        }
    }

    #[test]
    fn test_random_trainees() {
        let trainees = spawn_trainees(&spawn(4), &TOPOLOGY, None, &mut WyRng::seeded(1)).unwrap();
        assert_eq!(4, trainees.len());
        for (i, v) in trainees.iter().enumerate() {
            assert_eq!(
                Identity::Trainee {
                    generation: 3,
                    index: i
                },
                v.identity()
            );
            assert_eq!(TOPOLOGY.to_vec(), v.brain().unwrap().topology());
            assert_eq!((105., 100.), (v.x(), v.y()));
        }
        assert_ne!(trainees[0].brain(), trainees[1].brain());
    }

    #[test]
    fn test_seeded_trainees_keep_elite() {
        let mut rng = WyRng::seeded(2);
        let seed = Perceptron::random(&TOPOLOGY, &mut rng).unwrap();
        let trainees = spawn_trainees(&spawn(5), &TOPOLOGY, Some(&seed), &mut rng).unwrap();

        assert_eq!(Some(&seed), trainees[0].brain());
        for v in &trainees[1..] {
            assert_ne!(Some(&seed), v.brain());
            assert_eq!(TOPOLOGY.to_vec(), v.brain().unwrap().topology());
        }
        assert_ne!(trainees[1].brain(), trainees[2].brain());
    }

    #[test]
    fn test_bad_topology_fails() {
        assert!(spawn_trainees(&spawn(2), &[5], None, &mut WyRng::seeded(1)).is_err());
    }

    #[test]
    fn test_fixed_traffic() {
        let road = Road::new(RoadLayout::default());
        let traffic = spawn_traffic(TrafficPlan::Fixed, &road, Kinematics::traffic(), &mut WyRng::seeded(1));
        assert_eq!(AUTOPILOT_FIXED_TRAFFIC.len(), traffic.len());
        for (v, &(lane, y)) in traffic.iter().zip(AUTOPILOT_FIXED_TRAFFIC.iter()) {
            assert_f64_approx!(v.x(), road.lane_center(lane));
            assert_f64_approx!(v.y(), y);
            assert!(v.brain().is_none());
            assert_eq!(2., v.kinematics().max_velocity);
        }
    }

    #[test]
    fn test_random_traffic() {
        let road = Road::new(RoadLayout::default());
        let traffic = spawn_traffic(TrafficPlan::random(), &road, Kinematics::traffic(), &mut WyRng::seeded(7));
        assert_eq!(25, traffic.len());
        for (i, v) in traffic.iter().enumerate() {
            assert_f64_approx!(v.y(), -100. * i as f64);
            assert!((0..3).any(|lane| (v.x() - road.lane_center(lane)).abs() < 1e-9));
            assert_eq!(Identity::Traffic { index: i }, v.identity());
        }
    }

    #[test]
    fn test_plan_serde() {
        let plan: TrafficPlan = serde_json::from_str(r#"{"kind":"random","count":3,"spacing":50.0}"#).unwrap();
        assert_eq!(TrafficPlan::Random { count: 3, spacing: 50. }, plan);
        assert_eq!(
            TrafficPlan::Fixed,
            serde_json::from_str(r#"{"kind":"fixed"}"#).unwrap()
        );
    }
}
