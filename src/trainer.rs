//! The generation loop: spawn trainees from the best brain so far, drive them
//! against traffic until the lead vehicle stalls, keep the lead brain, repeat.

use crate::{
    config::{Config, TrainingConfig},
    error::{Error, Result},
    fitness::{credit_overtakes, select_best},
    network::{Network, Perceptron},
    population::{spawn_traffic, spawn_trainees, Spawn},
    random::{rng_for, WyRng},
    road::Road,
    sensor::{RaySensor, Sensing},
    snapshot::VehicleSnapshot,
    vehicle::Vehicle,
};
use core::ops::ControlFlow;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// When training stops, checked after every generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EvolutionTarget {
    /// After this many generations of the current run
    Generations(usize),
    /// On the first generation index divisible by this
    NextMultipleOf(usize),
    /// Once the lead vehicle reaches this score
    Score(u32),
}

impl Default for EvolutionTarget {
    fn default() -> Self {
        Self::NextMultipleOf(crate::constants::AUTOPILOT_GENERATION_BLOCK)
    }
}

impl EvolutionTarget {
    /// Reject targets that no generation can meet
    fn ensure_reachable(&self) -> Result<()> {
        match *self {
            Self::Generations(0) | Self::NextMultipleOf(0) => Err(Error::Target(*self)),
            _ => Ok(()),
        }
    }

    fn satisfied(&self, stats: &Stats, started: usize) -> bool {
        match *self {
            Self::Generations(n) => stats.generation - started >= n,
            Self::NextMultipleOf(k) => stats.generation % k == 0,
            Self::Score(s) => stats.best.score >= s,
        }
    }
}

/// Bookkeeping that survives across ticks and generations
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerState {
    pub generation: usize,
    /// Ticks simulated in the current generation
    pub ticks: u64,
    /// Consecutive ticks the lead vehicle has been damaged or stuck on one score
    pub stall: u64,
    pub last_score: u32,
    /// Smallest y any lead vehicle has reached in the current generation
    pub frontier: f64,
}

impl Default for TrainerState {
    fn default() -> Self {
        Self {
            generation: 0,
            ticks: 0,
            stall: 0,
            last_score: 0,
            frontier: f64::INFINITY,
        }
    }
}

impl TrainerState {
    fn begin_generation(&mut self) {
        self.ticks = 0;
        self.stall = 0;
        self.last_score = 0;
        self.frontier = f64::INFINITY;
    }

    /// Record one tick's lead vehicle at `y`. True once the generation has
    /// stalled.
    ///
    /// A score stuck at zero only counts as stuck once the lead stops pushing
    /// the frontier forward, unless `require_nonzero_score` is off.
    pub fn observe(&mut self, damaged: bool, score: u32, y: f64, limits: &TrainingConfig) -> bool {
        self.ticks += 1;
        let advanced = y < self.frontier;
        self.frontier = self.frontier.min(y);

        let stalled = if damaged {
            self.stall += 1;
            self.stall > limits.damage_stall_ticks
        } else if score == self.last_score
            && (score != 0 || !advanced || !limits.require_nonzero_score)
        {
            self.stall += 1;
            self.stall > limits.score_stall_ticks
        } else {
            self.stall = 0;
            self.last_score = score;
            false
        };

        stalled || limits.max_ticks.is_some_and(|max| self.ticks >= max)
    }
}

/// Handed to the training hook after every generation
#[derive(Debug, Clone)]
pub struct Stats {
    /// Index of the generation about to be spawned
    pub generation: usize,
    pub ticks: u64,
    pub best: VehicleSnapshot,
}

/// What a training run leaves behind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Training {
    pub generation: usize,
    pub population: Vec<VehicleSnapshot>,
    pub best: VehicleSnapshot,
}

pub struct Trainer<S: Sensing = RaySensor> {
    config: Config,
    road: Road,
    sensor: S,
    topology: Vec<usize>,
    rng: WyRng,
    state: TrainerState,
    best_brain: Option<Perceptron>,
    trainees: Vec<Vehicle>,
    traffic: Vec<Vehicle>,
}

impl Trainer<RaySensor> {
    pub fn new(config: Config) -> Result<Self> {
        let sensor = RaySensor::from(config.sensor);
        Self::with_sensor(config, sensor)
    }
}

impl<S: Sensing> Trainer<S> {
    pub fn with_sensor(config: Config, sensor: S) -> Result<Self> {
        let topology = config.topology(sensor.ray_count());
        if topology.contains(&0) {
            return Err(Error::Topology {
                topology,
                reason: "widths must be nonzero",
            });
        }

        Ok(Self {
            road: Road::new(config.road),
            rng: rng_for(config.training.seed),
            config,
            sensor,
            topology,
            state: TrainerState::default(),
            best_brain: None,
            trainees: vec![],
            traffic: vec![],
        })
    }

    /// Continue a lineage from `brain`, which must have this trainer's topology
    pub fn with_seed_brain(mut self, brain: Perceptron) -> Result<Self> {
        brain.ensure_topology(&self.topology)?;
        self.best_brain = Some(brain);
        Ok(self)
    }

    pub fn starting_at(mut self, generation: usize) -> Self {
        self.state.generation = generation;
        self
    }

    fn start(&self) -> (f64, f64) {
        (
            self.road.lane_center(self.config.training.start_lane),
            self.config.training.start_y,
        )
    }

    /// Replace the trainees with a fresh generation built from the best brain
    pub fn spawn(&mut self) -> Result<()> {
        let (x, y) = self.start();
        let t = &self.config.training;
        let spawn = Spawn {
            generation: self.state.generation,
            size: t.population,
            x,
            y,
            kinematics: self.config.trainee,
            credit_capacity: t.credit_capacity,
            mutation_rate: t.mutation_rate,
        };
        self.trainees = spawn_trainees(&spawn, &self.topology, self.best_brain.as_ref(), &mut self.rng)?;
        Ok(())
    }

    /// One step of the whole road: traffic first, then trainees against traffic,
    /// then crediting. Returns the current lead trainee.
    pub fn tick(&mut self) -> Result<usize> {
        let borders = self.road.borders();
        for v in self.traffic.iter_mut() {
            v.tick(borders, &[], &self.sensor)?;
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            let (traffic, sensor) = (&self.traffic, &self.sensor);
            self.trainees
                .par_iter_mut()
                .try_for_each(|v| v.tick(borders, traffic, sensor))?;
        }
        #[cfg(not(feature = "parallel"))]
        for v in self.trainees.iter_mut() {
            v.tick(borders, &self.traffic, &self.sensor)?;
        }

        credit_overtakes(&mut self.trainees, &self.traffic);
        select_best(&self.trainees).ok_or(Error::EmptyPopulation)
    }

    /// Regenerate traffic, put every trainee back at the start and tick until
    /// the lead vehicle stalls. Returns the lead trainee.
    pub fn simulate(&mut self) -> Result<usize> {
        if self.trainees.is_empty() {
            return Err(Error::EmptyPopulation);
        }

        self.traffic = spawn_traffic(
            self.config.traffic_plan,
            &self.road,
            self.config.traffic,
            &mut self.rng,
        );
        let (x, y) = self.start();
        for v in self.trainees.iter_mut() {
            v.reset(x, y);
        }
        self.state.begin_generation();
        debug!(
            generation = self.state.generation,
            trainees = self.trainees.len(),
            traffic = self.traffic.len(),
            "simulating"
        );

        loop {
            let best = self.tick()?;
            let lead = &self.trainees[best];
            if self
                .state
                .observe(lead.damaged(), lead.score(), lead.y(), &self.config.training)
            {
                debug!(
                    generation = self.state.generation,
                    ticks = self.state.ticks,
                    best = %lead.identity(),
                    score = lead.score(),
                    damaged = lead.damaged(),
                    "stalled"
                );
                return Ok(best);
            }
        }
    }

    fn harvest(&mut self, best: usize) {
        self.best_brain = self.trainees[best].brain().cloned();
    }

    /// Run generations until `target` is met or `hook` breaks, which it may do
    /// to stop training from outside. Errors abort the run; the best brain so
    /// far stays available through [Trainer::best_brain].
    pub fn train(
        &mut self,
        target: EvolutionTarget,
        mut hook: impl FnMut(&Stats) -> ControlFlow<()>,
    ) -> Result<Training> {
        target.ensure_reachable()?;
        let started = self.state.generation;
        info!(generation = started, ?target, "training");

        loop {
            self.spawn()?;
            let best = self.simulate()?;
            self.harvest(best);
            self.state.generation += 1;

            let stats = Stats {
                generation: self.state.generation,
                ticks: self.state.ticks,
                best: VehicleSnapshot::from(&self.trainees[best]),
            };
            info!(
                generation = stats.generation,
                ticks = stats.ticks,
                best = %stats.best.identity,
                score = stats.best.score,
                "harvested"
            );

            let done = target.satisfied(&stats, started);
            if hook(&stats).is_break() || done {
                info!(generation = stats.generation, "training complete");
                return Ok(Training {
                    generation: stats.generation,
                    population: self.trainees.iter().map(VehicleSnapshot::from).collect(),
                    best: stats.best,
                });
            }
        }
    }

    /// Drive an already trained population against fresh traffic, without
    /// touching the lineage
    pub fn replay(&mut self, population: Vec<Vehicle>) -> Result<VehicleSnapshot> {
        self.trainees = population;
        let best = self.simulate()?;
        Ok(VehicleSnapshot::from(&self.trainees[best]))
    }

    #[inline]
    pub fn state(&self) -> &TrainerState {
        &self.state
    }

    #[inline]
    pub fn generation(&self) -> usize {
        self.state.generation
    }

    #[inline]
    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    #[inline]
    pub fn best_brain(&self) -> Option<&Perceptron> {
        self.best_brain.as_ref()
    }

    #[inline]
    pub fn trainees(&self) -> &[Vehicle] {
        &self.trainees
    }

    #[inline]
    pub fn traffic(&self) -> &[Vehicle] {
        &self.traffic
    }

    #[inline]
    pub fn road(&self) -> &Road {
        &self.road
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
