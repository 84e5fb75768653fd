//! Simulation engine for a single car
//!
//! Each call to `tick` advances logical time by one. Moves and door
//! operations take several ticks and cannot be interrupted once started,
//! apart from reopening doors early in a closing sequence. Every state
//! change goes through the transition table in `transition`.

use log::{debug, info, warn};

use super::car_state::{CarState, MechanicalStatus};
use super::clock::Clock;
use super::config::EngineConfig;
use super::controller::Controller;
use super::error::{ConfigError, EngineError};
use super::request::Request;
use super::stats::MechanicalCounters;
use super::transition::{can_transition, resolve_action, RejectReason, TransitionOutcome};
use super::types::{Action, Direction, Floor, RequestId, Tick};

/// What happened to the controller's action during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The action was accepted; `Action::Idle` or a repeat of the current
    /// status leaves the car as it was
    Applied(Action),
    /// A move or door operation was still in flight, so the action waited
    Deferred(Action),
    /// Closing doors were reopened within the reopen window
    Reopened,
    /// The action would have broken the state machine; nothing changed
    Rejected { action: Action, reason: RejectReason },
    /// An out-of-service shutdown owns the car this tick
    ShutdownInProgress,
}

/// Bookkeeping for a graceful out-of-service shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingShutdown {
    target_floor: Floor,
    /// The doors have opened (or were already cycling) since the call
    doors_cycled: bool,
}

/// Drives one car through time on behalf of a controller
#[derive(Debug, Clone)]
pub struct SimEngine {
    config: EngineConfig,
    controller: Controller,
    clock: Clock,
    state: CarState,

    /// Ticks left in the current move between floors
    movement_ticks: u32,
    /// Ticks left in the current door opening or closing
    door_ticks: u32,
    /// Ticks left before open doors start closing
    dwell_ticks: u32,
    /// Ticks since the current closing sequence began
    closing_elapsed: u32,

    shutdown: Option<PendingShutdown>,
    counters: MechanicalCounters,
}

impl SimEngine {
    /// Create an engine with the car idle at the controller's home floor
    pub fn new(config: EngineConfig, controller: Controller) -> Result<Self, ConfigError> {
        let home = controller.config().home_floor;
        Self::with_start_floor(config, controller, home)
    }

    /// Create an engine with the car idle at `start_floor`
    pub fn with_start_floor(
        config: EngineConfig,
        controller: Controller,
        start_floor: Floor,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        controller.config().validate_against(&config)?;
        if !config.contains(start_floor) {
            return Err(ConfigError::StartFloorOutOfRange {
                floor: start_floor,
                min: config.min_floor,
                max: config.max_floor,
            });
        }

        Ok(Self {
            config,
            controller,
            clock: Clock::new(),
            state: CarState::idle_at(start_floor),
            movement_ticks: 0,
            door_ticks: 0,
            dwell_ticks: 0,
            closing_elapsed: 0,
            shutdown: None,
            counters: MechanicalCounters::default(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// The car as of the last completed tick
    pub fn state(&self) -> CarState {
        self.state
    }

    /// Number of ticks simulated so far
    pub fn current_tick(&self) -> Tick {
        self.clock.now()
    }

    pub fn counters(&self) -> MechanicalCounters {
        self.counters
    }

    pub fn is_shutdown_pending(&self) -> bool {
        self.shutdown.is_some()
    }

    /// Requests still being worked on, in id order
    pub fn requests(&self) -> impl Iterator<Item = &Request> {
        self.controller.requests().active()
    }

    /// Completed and cancelled requests
    pub fn retired_requests(&self) -> &[Request] {
        self.controller.requests().retired()
    }

    /// Look up a request by id, active or retired
    pub fn request(&self, id: RequestId) -> Option<&Request> {
        self.controller.requests().get(id)
    }

    pub fn add_hall_call(&mut self, floor: Floor, direction: Direction) -> Option<RequestId> {
        if direction == Direction::Idle {
            warn!("Refusing hall call at floor {}: no direction given", floor);
            return None;
        }
        if !self.admits(floor) {
            return None;
        }
        self.controller
            .add_hall_call(floor, direction, self.clock.now())
    }

    pub fn add_car_call(&mut self, floor: Floor) -> Option<RequestId> {
        if !self.admits(floor) {
            return None;
        }
        self.controller.add_car_call(floor, self.clock.now())
    }

    /// Admit a request built by the caller. It must still be `Created`.
    pub fn add_request(&mut self, request: Request) -> Option<RequestId> {
        if request.direction() == Some(Direction::Idle) {
            warn!("Refusing request {}: hall call without direction", request.id());
            return None;
        }
        if !self.admits(request.floor()) {
            return None;
        }
        self.controller.add_request(request, self.clock.now())
    }

    /// Cancel a request; false if it is unknown or already finished
    pub fn cancel_request(&mut self, id: RequestId) -> bool {
        self.controller.cancel_request(id, self.clock.now())
    }

    fn admits(&self, floor: Floor) -> bool {
        if !self.config.contains(floor) {
            warn!(
                "Refusing call for floor {}: outside {}..={}",
                floor, self.config.min_floor, self.config.max_floor
            );
            return false;
        }
        if self.controller.is_out_of_service() {
            warn!("Refusing call for floor {}: car out of service", floor);
            return false;
        }
        true
    }

    /// Begin a graceful shutdown: finish the current move, cycle the doors
    /// once at the stopping floor, then park out of service
    pub fn set_out_of_service(&mut self) -> Result<(), EngineError> {
        if self.state.status() == MechanicalStatus::OutOfService {
            return Err(EngineError::AlreadyOutOfService);
        }
        if self.shutdown.is_some() {
            return Err(EngineError::ShutdownPending);
        }

        let floor = self.state.floor();
        let target_floor = match self.state.status() {
            MechanicalStatus::MovingUp => self.config.clamp(floor + 1),
            MechanicalStatus::MovingDown => self.config.clamp(floor - 1),
            _ => floor,
        };
        self.controller.take_out_of_service(self.clock.now());
        self.shutdown = Some(PendingShutdown {
            target_floor,
            doors_cycled: !self.state.status().doors_closed(),
        });
        info!(
            "Out-of-service requested at tick {} ({}), stopping at floor {}",
            self.clock.now(),
            self.state,
            target_floor
        );
        Ok(())
    }

    pub fn return_to_service(&mut self) -> Result<(), EngineError> {
        if self.state.status() != MechanicalStatus::OutOfService {
            return Err(EngineError::NotOutOfService);
        }
        if self
            .commit(self.state.with_status(MechanicalStatus::Idle))
            .is_err()
        {
            return Err(EngineError::NotOutOfService);
        }
        self.controller.return_to_service();
        info!("Returned to service at floor {}", self.state.floor());
        Ok(())
    }

    /// Simulate one tick
    pub fn tick(&mut self) -> TickOutcome {
        let now = self.clock.now();
        let outcome = if self.shutdown.is_some() {
            self.advance_shutdown();
            TickOutcome::ShutdownInProgress
        } else {
            self.step(now)
        };
        debug!("tick {}: {} after {:?}", now, self.state, outcome);
        self.clock.advance();
        outcome
    }

    fn step(&mut self, now: Tick) -> TickOutcome {
        let busy = self.advance_in_flight();
        let action = self.controller.decide(self.state, now);

        if busy {
            if self.may_reopen(action) {
                return self.reopen();
            }
            return TickOutcome::Deferred(action);
        }
        self.start(action)
    }

    /// Count down whatever operation is in flight, resolving it when it
    /// runs out. Returns true while an operation is still running.
    fn advance_in_flight(&mut self) -> bool {
        if self.movement_ticks > 0 {
            self.movement_ticks -= 1;
            if self.movement_ticks > 0 {
                return true;
            }
            let step = match self.state.status() {
                MechanicalStatus::MovingUp => 1,
                MechanicalStatus::MovingDown => -1,
                _ => 0,
            };
            let floor = self.config.clamp(self.state.floor() + step);
            if self.commit(CarState::idle_at(floor)).is_ok() {
                self.counters.floors_travelled += 1;
            }
            return false;
        }

        if self.door_ticks > 0 {
            self.door_ticks -= 1;
            if self.state.status() == MechanicalStatus::DoorsClosing {
                self.closing_elapsed += 1;
            }
            if self.door_ticks > 0 {
                return true;
            }
            return match self.state.status() {
                MechanicalStatus::DoorsOpening => {
                    if self
                        .commit(self.state.with_status(MechanicalStatus::DoorsOpen))
                        .is_ok()
                    {
                        self.counters.door_cycles += 1;
                        self.dwell_ticks = self.config.door_dwell_ticks;
                    }
                    self.dwell_ticks > 0
                }
                _ => {
                    if self
                        .commit(self.state.with_status(MechanicalStatus::Idle))
                        .is_ok()
                    {
                        debug!("Doors closed at floor {}", self.state.floor());
                    }
                    false
                }
            };
        }

        if self.dwell_ticks > 0 {
            self.dwell_ticks -= 1;
            if self.dwell_ticks == 0 {
                if self
                    .commit(self.state.with_status(MechanicalStatus::DoorsClosing))
                    .is_err()
                {
                    return false;
                }
                self.begin_closing();
            }
            return true;
        }

        false
    }

    fn may_reopen(&self, action: Action) -> bool {
        action == Action::OpenDoor
            && self.state.status() == MechanicalStatus::DoorsClosing
            && (1..=self.config.door_reopen_window_ticks).contains(&self.closing_elapsed)
    }

    fn reopen(&mut self) -> TickOutcome {
        if let Err(reason) = self.commit(self.state.with_status(MechanicalStatus::DoorsOpening)) {
            return self.reject(Action::OpenDoor, reason);
        }
        debug!(
            "Reopening doors at floor {} after {} closing tick(s)",
            self.state.floor(),
            self.closing_elapsed
        );
        self.door_ticks = self.config.door_transition_ticks;
        self.closing_elapsed = 0;
        self.counters.reopens += 1;
        TickOutcome::Reopened
    }

    fn begin_closing(&mut self) {
        self.door_ticks = self.config.door_transition_ticks;
        self.dwell_ticks = 0;
        self.closing_elapsed = 0;
    }

    /// Start `action` with nothing in flight
    fn start(&mut self, action: Action) -> TickOutcome {
        let status = self.state.status();
        let next = match resolve_action(status, action) {
            TransitionOutcome::Accepted(next) => next,
            TransitionOutcome::Rejected(reason) => return self.reject(action, reason),
        };
        if next == status {
            return TickOutcome::Applied(action);
        }

        if next.is_moving() {
            let step = if next == MechanicalStatus::MovingUp { 1 } else { -1 };
            let destination = self.state.floor() + step;
            if !self.config.contains(destination) {
                return self.reject(action, RejectReason::FloorOutOfRange(destination));
            }
        }
        if let Err(reason) = self.commit(self.state.with_status(next)) {
            return self.reject(action, reason);
        }

        match next {
            MechanicalStatus::MovingUp | MechanicalStatus::MovingDown => {
                self.movement_ticks = self.config.travel_ticks_per_floor;
            }
            MechanicalStatus::DoorsOpening => {
                self.door_ticks = self.config.door_transition_ticks;
            }
            MechanicalStatus::DoorsClosing => self.begin_closing(),
            MechanicalStatus::Idle
            | MechanicalStatus::DoorsOpen
            | MechanicalStatus::OutOfService => {}
        }
        TickOutcome::Applied(action)
    }

    fn reject(&mut self, action: Action, reason: RejectReason) -> TickOutcome {
        warn!(
            "Rejected {:?} at tick {} ({}): {}",
            action,
            self.clock.now(),
            self.state,
            reason
        );
        self.counters.rejected_actions += 1;
        TickOutcome::Rejected { action, reason }
    }

    /// Replace the car state if the transition table allows it
    fn commit(&mut self, next: CarState) -> Result<(), RejectReason> {
        let from = self.state.status();
        if !self.config.contains(next.floor()) {
            warn!("Refusing to place car at floor {}", next.floor());
            return Err(RejectReason::FloorOutOfRange(next.floor()));
        }
        if !can_transition(from, next.status()) {
            warn!("Refusing transition {} -> {}", from, next.status());
            return Err(RejectReason::IllegalTransition {
                from,
                to: next.status(),
            });
        }
        self.state = next;
        Ok(())
    }

    /// One tick of the out-of-service protocol; the controller is not asked
    fn advance_shutdown(&mut self) {
        if self.advance_in_flight() {
            return;
        }
        let Some(mut pending) = self.shutdown else {
            return;
        };

        let floor = self.state.floor();
        if floor != pending.target_floor {
            let action = Direction::toward(floor, pending.target_floor).move_action();
            self.start(action);
            return;
        }

        if !pending.doors_cycled {
            pending.doors_cycled = true;
            self.shutdown = Some(pending);
            self.start(Action::OpenDoor);
            return;
        }

        if self
            .commit(self.state.with_status(MechanicalStatus::OutOfService))
            .is_ok()
        {
            self.shutdown = None;
            info!(
                "Out of service at floor {} from tick {}",
                floor,
                self.clock.now()
            );
        }
    }
}
