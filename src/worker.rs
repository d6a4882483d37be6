//! Training on a background thread, driven by JSON messages.
//!
//! The host sends raw JSON [Command]s and receives typed [Event]s. Anything
//! that does not parse as a command is answered with [Event::Rejected] and the
//! worker keeps serving.

use crate::{
    config::Config,
    error::{Error, Result},
    network::Perceptron,
    road::RoadLayout,
    snapshot::VehicleSnapshot,
    trainer::{EvolutionTarget, Trainer, Training},
};
use core::ops::ControlFlow;
use serde::{Deserialize, Serialize};
use std::{
    sync::mpsc::{self, Receiver, Sender, TryRecvError},
    thread::{self, JoinHandle},
    time::Duration,
};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Train from `generation`, continuing `best_brain`'s lineage if given
    Start {
        generation: usize,
        #[serde(default)]
        best_brain: Option<Perceptron>,
        #[serde(default)]
        road: RoadLayout,
        population_size: usize,
        #[serde(default)]
        target: Option<EvolutionTarget>,
    },
    /// Stop at the next generation boundary
    Stop,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Progress {
        generation: usize,
        best: VehicleSnapshot,
    },
    Complete {
        generation: usize,
        population: Vec<VehicleSnapshot>,
        best: VehicleSnapshot,
    },
    Failed {
        message: String,
    },
    Rejected {
        message: String,
    },
}

impl From<Training> for Event {
    fn from(t: Training) -> Self {
        Self::Complete {
            generation: t.generation,
            population: t.population,
            best: t.best,
        }
    }
}

/// Owner of the worker thread. Dropping it stops training at the next
/// generation boundary and joins the thread.
pub struct WorkerHandle {
    thread: Option<JoinHandle<()>>,
    command_tx: Option<Sender<String>>,
    event_rx: Receiver<Event>,
}

impl WorkerHandle {
    /// Spawn a worker. `config` supplies everything a [Command::Start] leaves out.
    pub fn spawn(config: Config) -> Self {
        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let thread = thread::spawn(move || serve(config, command_rx, event_tx));

        Self {
            thread: Some(thread),
            command_tx: Some(command_tx),
            event_rx,
        }
    }

    /// Send a raw message, as a host on the far side of a JSON boundary would
    pub fn send_raw(&self, message: impl Into<String>) {
        if let Some(tx) = &self.command_tx {
            if tx.send(message.into()).is_err() {
                warn!("worker is gone, message dropped");
            }
        }
    }

    pub fn send(&self, command: &Command) -> Result<()> {
        self.send_raw(serde_json::to_string(command)?);
        Ok(())
    }

    /// Block for the next event. `None` once the worker has exited.
    pub fn recv(&self) -> Option<Event> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Event> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    pub fn try_recv(&self) -> Option<Event> {
        self.event_rx.try_recv().ok()
    }

    pub fn shutdown(&mut self) {
        self.command_tx.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("worker thread panicked");
            }
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn parse(raw: &str) -> core::result::Result<Command, String> {
    serde_json::from_str(raw).map_err(|err| format!("{err}: {raw}"))
}

fn reject(events: &Sender<Event>, message: String) {
    warn!(%message, "rejected message");
    let _ = events.send(Event::Rejected { message });
}

fn serve(config: Config, commands: Receiver<String>, events: Sender<Event>) {
    while let Ok(raw) = commands.recv() {
        match parse(&raw) {
            Ok(Command::Start {
                generation,
                best_brain,
                road,
                population_size,
                target,
            }) => {
                let mut config = config.clone();
                config.road = road;
                config.training.population = population_size;
                let target = target.unwrap_or_default();

                let event = match run(config, generation, best_brain, target, &commands, &events) {
                    Ok(training) => training.into(),
                    Err(err @ (Error::Validation(_) | Error::Target(_))) => Event::Rejected {
                        message: err.to_string(),
                    },
                    Err(err) => Event::Failed {
                        message: err.to_string(),
                    },
                };
                if let Event::Rejected { message } | Event::Failed { message } = &event {
                    warn!(%message, "training did not complete");
                }
                if events.send(event).is_err() {
                    break;
                }
            }
            Ok(Command::Stop) => debug!("stop received while idle"),
            Err(message) => reject(&events, message),
        }
    }
    debug!("worker exiting");
}

fn run(
    config: Config,
    generation: usize,
    best_brain: Option<Perceptron>,
    target: EvolutionTarget,
    commands: &Receiver<String>,
    events: &Sender<Event>,
) -> Result<Training> {
    let mut trainer = Trainer::new(config)?.starting_at(generation);
    if let Some(brain) = best_brain {
        trainer = trainer.with_seed_brain(brain)?;
    }
    info!(generation, "worker training started");

    trainer.train(target, |stats| {
        if events
            .send(Event::Progress {
                generation: stats.generation,
                best: stats.best.clone(),
            })
            .is_err()
        {
            return ControlFlow::Break(());
        }

        loop {
            match commands.try_recv() {
                Ok(raw) => match parse(&raw) {
                    Ok(Command::Stop) => {
                        info!(generation = stats.generation, "stop requested");
                        return ControlFlow::Break(());
                    }
                    Ok(Command::Start { .. }) => {
                        reject(events, "training already running".to_string())
                    }
                    Err(message) => reject(events, message),
                },
                Err(TryRecvError::Empty) => return ControlFlow::Continue(()),
                Err(TryRecvError::Disconnected) => return ControlFlow::Break(()),
            }
        }
    })
}
