//! Directional-scan dispatch
//!
//! The elevator analogue of disk-arm SCAN: keep travelling in the current
//! direction, stopping for every request eligible for that direction, and
//! only reverse once nothing is left ahead. When the car has nothing to do
//! for long enough it can park itself at the home floor.

use log::{debug, info};

use super::car_state::{CarState, MechanicalStatus};
use super::config::ControllerConfig;
use super::request::{Request, RequestBook, RequestState};
use super::types::{Action, Direction, Floor, IdleParkingMode, RequestId, Tick};

#[derive(Debug, Clone)]
pub struct DirectionalScanController {
    config: ControllerConfig,
    book: RequestBook,
    /// Current sweep direction
    direction: Direction,
    /// Consecutive ticks spent at rest with no requests
    idle_ticks: u32,
    /// Travelling to the home floor on our own initiative
    parking: bool,
    out_of_service: bool,
}

impl DirectionalScanController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            book: RequestBook::new(),
            direction: Direction::Idle,
            idle_ticks: 0,
            parking: false,
            out_of_service: false,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn requests(&self) -> &RequestBook {
        &self.book
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_parking(&self) -> bool {
        self.parking
    }

    pub fn is_out_of_service(&self) -> bool {
        self.out_of_service
    }

    pub fn add_hall_call(&mut self, floor: Floor, direction: Direction, tick: Tick) -> Option<RequestId> {
        if self.out_of_service {
            return None;
        }
        let id = self.book.allocate_id();
        self.book.admit(Request::hall_call(id, floor, direction, tick), tick)
    }

    pub fn add_car_call(&mut self, floor: Floor, tick: Tick) -> Option<RequestId> {
        if self.out_of_service {
            return None;
        }
        let id = self.book.allocate_id();
        self.book.admit(Request::car_call(id, floor, tick), tick)
    }

    pub fn add_request(&mut self, request: Request, tick: Tick) -> Option<RequestId> {
        if self.out_of_service {
            return None;
        }
        self.book.admit(request, tick)
    }

    pub fn cancel_request(&mut self, id: RequestId, tick: Tick) -> bool {
        self.book.cancel(id, tick)
    }

    /// Cancel everything and refuse new requests until `return_to_service`
    pub fn take_out_of_service(&mut self, tick: Tick) {
        let cancelled = self.book.cancel_all(tick);
        self.out_of_service = true;
        self.direction = Direction::Idle;
        self.parking = false;
        self.idle_ticks = 0;
        info!("Scan controller out of service, {} request(s) cancelled", cancelled);
    }

    pub fn return_to_service(&mut self) {
        self.out_of_service = false;
        self.direction = Direction::Idle;
    }

    /// Decide the next action for the car
    pub fn decide(&mut self, state: CarState, tick: Tick) -> Action {
        if self.out_of_service {
            return Action::Idle;
        }
        if self.book.is_empty() {
            return self.idle_without_requests(state);
        }

        if self.parking {
            debug!("Parking abandoned, {} request(s) pending", self.book.len());
            self.parking = false;
        }
        self.idle_ticks = 0;

        let floor = state.floor();
        let direction = self.direction;
        match state.status() {
            MechanicalStatus::DoorsOpening => {
                self.book.advance_matching(RequestState::Serving, tick, |r| {
                    r.is_served_by(floor, direction)
                });
                Action::Idle
            }
            MechanicalStatus::MovingUp
            | MechanicalStatus::MovingDown
            | MechanicalStatus::OutOfService => Action::Idle,
            MechanicalStatus::DoorsOpen => {
                let done = self.book.complete_matching(tick, |r| {
                    r.floor() == floor
                        && (r.state() == RequestState::Serving || r.is_served_by(floor, direction))
                });
                if !done.is_empty() {
                    debug!("Completed {:?} at floor {} heading {:?}", done, floor, direction);
                }
                Action::Idle
            }
            MechanicalStatus::DoorsClosing => {
                if self.book.active().any(|r| r.is_served_by(floor, direction)) {
                    Action::OpenDoor
                } else {
                    Action::Idle
                }
            }
            MechanicalStatus::Idle => self.dispatch(floor, tick),
        }
    }

    /// Car at rest with doors closed and requests pending
    fn dispatch(&mut self, floor: Floor, tick: Tick) -> Action {
        if self.direction == Direction::Idle {
            self.direction = self.initial_direction(floor);
        }

        if !self.has_request_ahead(floor, self.direction)
            && self.has_request_here_for(floor, self.direction.opposite())
        {
            debug!("Reversing at floor {} from {:?}", floor, self.direction);
            self.direction = self.direction.opposite();
        }

        let direction = self.direction;
        let here = self
            .book
            .advance_matching(RequestState::Serving, tick, |r| r.is_served_by(floor, direction));
        if !here.is_empty() {
            return Action::OpenDoor;
        }

        if let Some(action) = self.head_for_next_stop(floor, tick) {
            return action;
        }
        self.direction = self.direction.opposite();
        if let Some(action) = self.head_for_next_stop(floor, tick) {
            return action;
        }

        self.direction = Direction::Idle;
        Action::Idle
    }

    /// Direction toward the nearest request; a hall call at this floor picks
    /// its own direction
    fn initial_direction(&self, floor: Floor) -> Direction {
        let nearest = self
            .book
            .active()
            .min_by_key(|r| ((r.floor() - floor).abs(), r.floor()));
        match nearest {
            None => Direction::Idle,
            Some(r) if r.floor() == floor => r.direction().unwrap_or(Direction::Idle),
            Some(r) => Direction::toward(floor, r.floor()),
        }
    }

    fn has_request_ahead(&self, floor: Floor, direction: Direction) -> bool {
        self.book
            .active()
            .any(|r| direction.is_ahead(floor, r.floor()))
    }

    fn has_request_here_for(&self, floor: Floor, direction: Direction) -> bool {
        self.book
            .active()
            .any(|r| r.floor() == floor && r.direction() == Some(direction))
    }

    /// Pick the next stop ahead and move one floor toward it. Prefers the
    /// nearest request eligible for the sweep, falling back to the turnaround
    /// floor so trailing calls are not stranded.
    fn head_for_next_stop(&mut self, floor: Floor, tick: Tick) -> Option<Action> {
        let direction = self.direction;
        let ahead: Vec<&Request> = self
            .book
            .active()
            .filter(|r| direction.is_ahead(floor, r.floor()))
            .collect();

        let next_stop = ahead
            .iter()
            .filter(|r| r.is_served_by(r.floor(), direction))
            .map(|r| r.floor())
            .min_by_key(|target| (target - floor).abs());

        let (target, eligible_only) = match next_stop {
            Some(target) => (target, true),
            None => {
                let turnaround = ahead
                    .iter()
                    .map(|r| r.floor())
                    .max_by_key(|target| (target - floor).abs())?;
                (turnaround, false)
            }
        };

        self.book.advance_matching(RequestState::Assigned, tick, |r| {
            r.floor() == target && (!eligible_only || r.is_served_by(target, direction))
        });
        Some(direction.move_action())
    }

    fn idle_without_requests(&mut self, state: CarState) -> Action {
        self.direction = Direction::Idle;
        if state.status() != MechanicalStatus::Idle {
            self.idle_ticks = 0;
            return Action::Idle;
        }

        let floor = state.floor();
        let home = self.config.home_floor;
        if self.parking {
            if floor == home {
                info!("Parked at home floor {}", home);
                self.parking = false;
                self.idle_ticks = 0;
                return Action::Idle;
            }
            return Direction::toward(floor, home).move_action();
        }

        if self.idle_ticks < self.config.idle_timeout_ticks {
            self.idle_ticks += 1;
            return Action::Idle;
        }
        if self.config.idle_parking_mode == IdleParkingMode::ParkToHomeFloor && floor != home {
            info!(
                "Idle for {} ticks at floor {}, parking at {}",
                self.idle_ticks, floor, home
            );
            self.parking = true;
            return Direction::toward(floor, home).move_action();
        }
        Action::Idle
    }
}
