//! Vehicles: kinematics, hull, damage and overtake credit.

pub mod credit;

pub use credit::CreditWindow;

use crate::{
    config::Kinematics,
    constants::AUTOPILOT_CREDIT_CAPACITY,
    error::Result,
    geometry::{polygons_intersect, Point, Segment},
    network::{Network, Perceptron},
    sensor::{Pose, Reading, Sensing},
};
use core::{f64::consts::PI, fmt};
use serde::{Deserialize, Serialize};

/// Who a vehicle is. Credit windows remember overtaken vehicles by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    Trainee { generation: usize, index: usize },
    Traffic { index: usize },
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trainee { generation, index } => write!(f, "{generation}.{index}"),
            Self::Traffic { index } => write!(f, "traffic.{index}"),
        }
    }
}

/// Decides who holds the controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlSource {
    /// The brain's outputs overwrite the controls every tick
    Agent,
    /// Always forward. No brain, no sensing.
    Scripted,
    /// Carries a brain and senses, but the host drives through [Vehicle::set_controls]
    External,
}

impl ControlSource {
    fn initial_controls(self) -> Controls {
        Controls {
            forward: self == Self::Scripted,
            ..Controls::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Controls {
    pub forward: bool,
    pub left: bool,
    pub right: bool,
    pub reverse: bool,
}

impl Controls {
    /// Read forward, left, right, reverse from binary network outputs, in that order
    fn from_outputs(outputs: &[f64]) -> Self {
        let on = |idx: usize| outputs.get(idx).is_some_and(|v| *v > 0.);
        Self {
            forward: on(0),
            left: on(1),
            right: on(2),
            reverse: on(3),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    x: f64,
    y: f64,
    /// 0 faces decreasing y
    angle: f64,
    velocity: f64,
    kinematics: Kinematics,
    damaged: bool,
    polygon: [Point; 4],
    identity: Identity,
    score: u32,
    credits: CreditWindow,
    brain: Option<Perceptron>,
    control: ControlSource,
    controls: Controls,
    readings: Vec<Option<Reading>>,
}

impl Vehicle {
    fn new(
        identity: Identity,
        x: f64,
        y: f64,
        kinematics: Kinematics,
        control: ControlSource,
        brain: Option<Perceptron>,
    ) -> Self {
        let mut vehicle = Self {
            x,
            y,
            angle: 0.,
            velocity: 0.,
            kinematics,
            damaged: false,
            polygon: [Point::default(); 4],
            identity,
            score: 0,
            credits: CreditWindow::new(AUTOPILOT_CREDIT_CAPACITY),
            brain,
            control,
            controls: control.initial_controls(),
            readings: vec![],
        };
        vehicle.polygon = vehicle.hull();
        vehicle
    }

    /// A vehicle driven by `brain`
    pub fn agent(identity: Identity, x: f64, y: f64, kinematics: Kinematics, brain: Perceptron) -> Self {
        Self::new(identity, x, y, kinematics, ControlSource::Agent, Some(brain))
    }

    /// A brainless vehicle holding the forward control forever
    pub fn scripted(identity: Identity, x: f64, y: f64, kinematics: Kinematics) -> Self {
        Self::new(identity, x, y, kinematics, ControlSource::Scripted, None)
    }

    /// A vehicle whose brain runs but whose controls belong to the host
    pub fn external(identity: Identity, x: f64, y: f64, kinematics: Kinematics, brain: Perceptron) -> Self {
        Self::new(identity, x, y, kinematics, ControlSource::External, Some(brain))
    }

    pub fn with_credit_capacity(mut self, capacity: usize) -> Self {
        self.credits = CreditWindow::new(capacity);
        self
    }

    /// Advance one tick: move, rebuild the hull, check for damage, then let the
    /// brain (if any) read the sensor and pick next tick's controls.
    /// A damaged vehicle does nothing at all.
    pub fn tick<S: Sensing>(&mut self, borders: &[Segment], others: &[Vehicle], sensor: &S) -> Result<()> {
        if self.damaged {
            return Ok(());
        }

        self.step();
        self.polygon = self.hull();
        self.damaged = self.collides(borders, others);

        if self.control == ControlSource::Scripted || self.brain.is_none() {
            return Ok(());
        }

        self.readings = sensor.sense(self.pose(), borders, others);
        let inputs = self
            .readings
            .iter()
            .map(|r| r.map_or(0., |r| 1. - r.offset))
            .collect::<Vec<_>>();

        if let Some(brain) = self.brain.as_mut() {
            let outputs = brain.feed_forward(&inputs)?;
            if self.control == ControlSource::Agent {
                self.controls = Controls::from_outputs(outputs);
            }
        }

        Ok(())
    }

    fn step(&mut self) {
        let k = &self.kinematics;

        if self.controls.forward {
            self.velocity += k.acceleration;
        }
        if self.controls.reverse {
            self.velocity -= k.acceleration;
        }
        self.velocity = self.velocity.clamp(-k.max_velocity / 2., k.max_velocity);

        if self.velocity > 0. {
            self.velocity -= k.friction;
        } else if self.velocity < 0. {
            self.velocity += k.friction;
        }
        if self.velocity.abs() < k.friction {
            self.velocity = 0.;
        }

        if self.velocity != 0. {
            let flip = self.velocity.signum();
            if self.controls.left {
                self.angle += k.steering * flip;
            }
            if self.controls.right {
                self.angle -= k.steering * flip;
            }
        }

        self.x -= self.velocity * self.angle.sin();
        self.y -= self.velocity * self.angle.cos();
    }

    /// Corners of the oriented rectangle: front right, front left, back left, back right
    fn hull(&self) -> [Point; 4] {
        let rad = self.kinematics.width.hypot(self.kinematics.height) / 2.;
        let alpha = self.kinematics.width.atan2(self.kinematics.height);
        [
            self.angle - alpha,
            self.angle + alpha,
            PI + self.angle - alpha,
            PI + self.angle + alpha,
        ]
        .map(|a| Point::new(self.x - rad * a.sin(), self.y - rad * a.cos()))
    }

    fn collides(&self, borders: &[Segment], others: &[Vehicle]) -> bool {
        borders
            .iter()
            .any(|b| polygons_intersect(&self.polygon, &b.points()))
            || others
                .iter()
                .any(|v| polygons_intersect(&self.polygon, &v.polygon))
    }

    /// Score `other` once if this vehicle is ahead of it and hasn't been
    /// credited for it recently
    pub fn credit_overtake(&mut self, other: &Vehicle) {
        if self.y < other.y && !self.credits.contains(&other.identity) {
            self.score += 1;
            self.credits.push(other.identity);
        }
    }

    /// Put the vehicle back at `(x, y)` as if freshly built, keeping its identity and brain
    pub fn reset(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
        self.velocity = 0.;
        self.angle = 0.;
        self.damaged = false;
        self.score = 0;
        self.credits.clear();
        self.controls = self.control.initial_controls();
        self.readings.clear();
        self.polygon = self.hull();
    }

    /// Only has an effect on [ControlSource::External] vehicles
    pub fn set_controls(&mut self, controls: Controls) {
        if self.control == ControlSource::External {
            self.controls = controls;
        }
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        Pose {
            x: self.x,
            y: self.y,
            angle: self.angle,
        }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[inline]
    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    #[inline]
    pub fn damaged(&self) -> bool {
        self.damaged
    }

    #[inline]
    pub fn polygon(&self) -> &[Point; 4] {
        &self.polygon
    }

    #[inline]
    pub fn identity(&self) -> Identity {
        self.identity
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[inline]
    pub fn credits(&self) -> &CreditWindow {
        &self.credits
    }

    #[inline]
    pub fn brain(&self) -> Option<&Perceptron> {
        self.brain.as_ref()
    }

    #[inline]
    pub fn control_source(&self) -> ControlSource {
        self.control
    }

    #[inline]
    pub fn controls(&self) -> Controls {
        self.controls
    }

    /// Most recent sensor readings, empty until the first tick
    #[inline]
    pub fn readings(&self) -> &[Option<Reading>] {
        &self.readings
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        assert_f64_approx, assert_points_approx,
        random::WyRng,
        sensor::{Blind, RaySensor},
    };

    fn trainee(index: usize) -> Identity {
        Identity::Trainee {
            generation: 0,
            index,
        }
    }

    fn traffic_at(index: usize, x: f64, y: f64) -> Vehicle {
        Vehicle::scripted(Identity::Traffic { index }, x, y, Kinematics::traffic())
    }

    fn external_at(x: f64, y: f64) -> Vehicle {
        let brain = Perceptron::random(&[5, 6, 6, 4], &mut WyRng::seeded(1)).unwrap();
        Vehicle::external(trainee(0), x, y, Kinematics::default(), brain)
    }

    fn drive(v: &mut Vehicle, controls: Controls, ticks: usize) {
        v.set_controls(controls);
        for _ in 0..ticks {
            v.tick(&[], &[], &Blind::default()).unwrap();
        }
    }

    const FORWARD: Controls = Controls {
        forward: true,
        left: false,
        right: false,
        reverse: false,
    };

    #[test]
    fn test_hull_axis_aligned() {
        let v = traffic_at(0, 100., 200.);
        assert_points_approx!(
            v.polygon(),
            [
                Point::new(115., 175.),
                Point::new(85., 175.),
                Point::new(85., 225.),
                Point::new(115., 225.),
            ]
        );
    }

    #[test]
    fn test_forward_accelerates_and_moves_up() {
        let mut v = external_at(0., 0.);
        drive(&mut v, FORWARD, 1);
        assert_f64_approx!(v.velocity(), 0.15);
        assert_f64_approx!(v.y(), -0.15);
        assert_f64_approx!(v.x(), 0.);
    }

    #[test]
    fn test_velocity_caps() {
        let mut v = external_at(0., 0.);
        drive(&mut v, FORWARD, 100);
        assert_f64_approx!(v.velocity(), 3. - 0.05);

        let mut v = external_at(0., 0.);
        drive(
            &mut v,
            Controls {
                reverse: true,
                ..Controls::default()
            },
            100,
        );
        assert_f64_approx!(v.velocity(), -1.5 + 0.05);
        assert!(v.y() > 0.);
    }

    #[test]
    fn test_friction_snaps_to_rest() {
        let mut v = external_at(0., 0.);
        drive(&mut v, FORWARD, 3);
        drive(&mut v, Controls::default(), 100);
        assert_eq!(0., v.velocity());
    }

    #[test]
    fn test_no_steering_at_rest() {
        let mut v = external_at(0., 0.);
        drive(
            &mut v,
            Controls {
                left: true,
                ..Controls::default()
            },
            10,
        );
        assert_eq!(0., v.angle());
    }

    #[test]
    fn test_steering_flips_in_reverse() {
        let mut fwd = external_at(0., 0.);
        drive(
            &mut fwd,
            Controls {
                forward: true,
                left: true,
                ..Controls::default()
            },
            1,
        );
        assert_f64_approx!(fwd.angle(), 0.03);

        let mut rev = external_at(0., 0.);
        drive(
            &mut rev,
            Controls {
                reverse: true,
                left: true,
                ..Controls::default()
            },
            1,
        );
        assert_f64_approx!(rev.angle(), -0.03);
    }

    #[test]
    fn test_border_damage_freezes() {
        let border = Segment(Point::new(10., -1000.), Point::new(10., 1000.));
        // hull spans x in [-15, 15], already across the border
        let mut v = external_at(0., 0.);
        v.set_controls(FORWARD);
        v.tick(&[border], &[], &Blind::default()).unwrap();
        assert!(v.damaged());

        let (pose, polygon) = (v.pose(), *v.polygon());
        v.tick(&[border], &[], &Blind::default()).unwrap();
        assert_eq!(pose, v.pose());
        assert_eq!(polygon, *v.polygon());
    }

    #[test]
    fn test_damaged_vehicle_stops_sensing() {
        let border = Segment(Point::new(10., -1000.), Point::new(10., 1000.));
        let mut v = external_at(0., 0.);
        v.tick(&[border], &[], &RaySensor::default()).unwrap();
        assert!(v.damaged());
        // a mismatched sensor would fail the forward pass if it ran
        assert!(v.tick(&[border], &[], &Blind::new(3)).is_ok());
    }

    #[test]
    fn test_collision_with_vehicle() {
        let mut v = external_at(0., 0.);
        let other = traffic_at(0, 10., 10.);
        v.tick(&[], &[other], &Blind::default()).unwrap();
        assert!(v.damaged());
    }

    #[test]
    fn test_scripted_drives_forward_without_sensing() {
        let mut v = traffic_at(0, 0., 0.);
        for _ in 0..50 {
            v.tick(&[], &[], &RaySensor::default()).unwrap();
        }
        assert_f64_approx!(v.velocity(), 2. - 0.05);
        assert!(v.readings().is_empty());
        assert!(v.brain().is_none());
    }

    #[test]
    fn test_agent_follows_brain() {
        // one layer, forward fires on any input, others never
        let brain: Perceptron = Network::from_str(
            r#"{"layers":[{"biases":[-0.5,1,1,1],"weights":[[0,0,0,0],[0,0,0,0]]}]}"#,
        )
        .unwrap();
        let mut v = Vehicle::agent(trainee(0), 0., 0., Kinematics::default(), brain);
        v.tick(&[], &[], &Blind::new(2)).unwrap();
        assert_eq!(FORWARD, v.controls());
        assert_eq!(2, v.readings().len());
        assert!(v.readings().iter().all(Option::is_none));
        v.tick(&[], &[], &Blind::new(2)).unwrap();
        assert!(v.velocity() > 0.);
    }

    #[test]
    fn test_sensor_width_mismatch_propagates() {
        let mut v = external_at(0., 0.);
        assert!(v.tick(&[], &[], &Blind::new(3)).is_err());
    }

    #[test]
    fn test_external_ignores_brain() {
        let brain: Perceptron = Network::from_str(
            r#"{"layers":[{"biases":[-0.5,-0.5,-0.5,-0.5],"weights":[[0,0,0,0]]}]}"#,
        )
        .unwrap();
        let mut v = Vehicle::external(trainee(0), 0., 0., Kinematics::default(), brain);
        v.tick(&[], &[], &Blind::new(1)).unwrap();
        assert_eq!(Controls::default(), v.controls());
        assert_eq!(
            &[1., 1., 1., 1.][..],
            v.brain().unwrap().layers()[0].outputs()
        );
    }

    #[test]
    fn test_set_controls_only_for_external() {
        let mut v = traffic_at(0, 0., 0.);
        v.set_controls(Controls::default());
        assert_eq!(FORWARD, v.controls());
    }

    #[test]
    fn test_credit_once_while_ahead() {
        let mut v = external_at(0., 0.);
        let behind = traffic_at(0, 0., 100.);
        let ahead = traffic_at(1, 0., -100.);

        v.credit_overtake(&behind);
        v.credit_overtake(&behind);
        v.credit_overtake(&ahead);
        assert_eq!(1, v.score());
        assert_eq!(1, v.credits().len());
    }

    #[test]
    fn test_credit_again_after_eviction() {
        let mut v = external_at(0., 0.).with_credit_capacity(2);
        let behind = (0..3).map(|i| traffic_at(i, 0., 100.)).collect::<Vec<_>>();
        for other in &behind {
            v.credit_overtake(other);
        }
        assert_eq!(3, v.score());
        v.credit_overtake(&behind[0]);
        assert_eq!(4, v.score());
    }

    #[test]
    fn test_reset_restores_start() {
        let mut v = external_at(0., 0.);
        drive(&mut v, FORWARD, 10);
        v.credit_overtake(&traffic_at(0, 0., 100.));
        let brain = v.brain().cloned();

        v.reset(50., 60.);
        assert_eq!(Pose { x: 50., y: 60., angle: 0. }, v.pose());
        assert_eq!(0., v.velocity());
        assert_eq!(0, v.score());
        assert!(v.credits().is_empty());
        assert!(!v.damaged());
        assert_eq!(Controls::default(), v.controls());
        assert_eq!(brain.as_ref(), v.brain());
        let fresh = external_at(50., 60.);
        assert_points_approx!(v.polygon(), fresh.polygon());
    }

    #[test]
    fn test_identity_display() {
        assert_eq!(
            "3.14",
            Identity::Trainee {
                generation: 3,
                index: 14
            }
            .to_string()
        );
        assert_eq!("traffic.2", Identity::Traffic { index: 2 }.to_string());
    }
}
