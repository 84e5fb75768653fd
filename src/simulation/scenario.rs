//! Scenario events and a minimal driver
//!
//! A scenario is a time-ordered list of hall calls, car calls and
//! cancellations. `SimulationRun` feeds due events into an engine before
//! each tick and records where the car was afterwards.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

use super::car_state::MechanicalStatus;
use super::config::EngineConfig;
use super::engine::{SimEngine, TickOutcome};
use super::types::{Direction, Floor, RequestId, Tick};

/// Chance that a generated call is later cancelled
const CANCEL_PROBABILITY: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioEventKind {
    HallCall { floor: Floor, direction: Direction },
    CarCall { floor: Floor },
    Cancel { request_id: RequestId },
}

/// Something that happens to the building at a given tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioEvent {
    pub tick: Tick,
    pub kind: ScenarioEventKind,
}

impl ScenarioEvent {
    pub fn hall_call(tick: Tick, floor: Floor, direction: Direction) -> Self {
        Self {
            tick,
            kind: ScenarioEventKind::HallCall { floor, direction },
        }
    }

    pub fn car_call(tick: Tick, floor: Floor) -> Self {
        Self {
            tick,
            kind: ScenarioEventKind::CarCall { floor },
        }
    }

    pub fn cancel(tick: Tick, request_id: RequestId) -> Self {
        Self {
            tick,
            kind: ScenarioEventKind::Cancel { request_id },
        }
    }

    /// Inject the event into `engine`. Returns whether it was accepted.
    pub fn apply(&self, engine: &mut SimEngine) -> bool {
        match self.kind {
            ScenarioEventKind::HallCall { floor, direction } => {
                engine.add_hall_call(floor, direction).is_some()
            }
            ScenarioEventKind::CarCall { floor } => engine.add_car_call(floor).is_some(),
            ScenarioEventKind::Cancel { request_id } => engine.cancel_request(request_id),
        }
    }
}

/// Build a reproducible scenario of `calls` random calls spread over
/// `duration` ticks. Some calls are cancelled a few ticks after being placed;
/// cancellations assume every earlier call was admitted and got the next id.
pub fn random_scenario(
    seed: u64,
    config: &EngineConfig,
    calls: usize,
    duration: Tick,
) -> Vec<ScenarioEvent> {
    let mut rng = StdRng::seed_from_u64(seed);
    let duration = duration.max(1);

    let mut ticks: Vec<Tick> = (0..calls).map(|_| rng.random_range(0..duration)).collect();
    ticks.sort_unstable();

    let mut events = Vec::with_capacity(calls);
    for (index, tick) in ticks.into_iter().enumerate() {
        let floor = rng.random_range(config.min_floor..=config.max_floor);
        let event = if rng.random_bool(0.5) {
            ScenarioEvent::car_call(tick, floor)
        } else {
            let direction = if floor == config.max_floor {
                Direction::Down
            } else if floor == config.min_floor || rng.random_bool(0.5) {
                Direction::Up
            } else {
                Direction::Down
            };
            ScenarioEvent::hall_call(tick, floor, direction)
        };
        events.push(event);

        if rng.random_bool(CANCEL_PROBABILITY) {
            let delay = rng.random_range(1..=10);
            events.push(ScenarioEvent::cancel(tick + delay, RequestId(index as u64 + 1)));
        }
    }
    events.sort_by_key(|e| e.tick);
    events
}

/// Where the car was at the end of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSnapshot {
    pub tick: Tick,
    pub floor: Floor,
    pub status: MechanicalStatus,
    pub outcome: TickOutcome,
}

/// Drives an engine through a scenario one tick at a time
#[derive(Debug, Clone)]
pub struct SimulationRun {
    engine: SimEngine,
    pending: VecDeque<ScenarioEvent>,
    snapshots: Vec<TickSnapshot>,
}

impl SimulationRun {
    pub fn new(engine: SimEngine, mut events: Vec<ScenarioEvent>) -> Self {
        events.sort_by_key(|e| e.tick);
        Self {
            engine,
            pending: events.into(),
            snapshots: Vec::new(),
        }
    }

    pub fn engine(&self) -> &SimEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SimEngine {
        &mut self.engine
    }

    pub fn snapshots(&self) -> &[TickSnapshot] {
        &self.snapshots
    }

    /// Events not yet applied
    pub fn remaining_events(&self) -> usize {
        self.pending.len()
    }

    /// Apply every event due by now, then simulate one tick
    pub fn step(&mut self) -> TickOutcome {
        let now = self.engine.current_tick();
        while self.pending.front().is_some_and(|e| e.tick <= now) {
            if let Some(event) = self.pending.pop_front() {
                let accepted = event.apply(&mut self.engine);
                debug!("tick {}: {:?} accepted={}", now, event.kind, accepted);
            }
        }

        let outcome = self.engine.tick();
        let state = self.engine.state();
        self.snapshots.push(TickSnapshot {
            tick: now,
            floor: state.floor(),
            status: state.status(),
            outcome,
        });
        outcome
    }

    /// Simulate `ticks` ticks
    pub fn run(&mut self, ticks: Tick) {
        for _ in 0..ticks {
            self.step();
        }
    }
}
