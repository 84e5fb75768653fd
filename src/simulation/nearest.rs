//! Nearest-request dispatch
//!
//! Baseline strategy: always head for the closest outstanding request,
//! ignoring hall-call direction and arrival order.

use log::{debug, info};

use super::car_state::{CarState, MechanicalStatus};
use super::config::ControllerConfig;
use super::request::{Request, RequestBook, RequestState};
use super::types::{Action, Direction, Floor, RequestId, Tick};

#[derive(Debug, Clone)]
pub struct NearestRequestController {
    config: ControllerConfig,
    book: RequestBook,
    out_of_service: bool,
}

impl NearestRequestController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            book: RequestBook::new(),
            out_of_service: false,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn requests(&self) -> &RequestBook {
        &self.book
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

    pub fn take_out_of_service(&mut self, tick: Tick) {
        let cancelled = self.book.cancel_all(tick);
        self.out_of_service = true;
        info!("Nearest-request controller out of service, {} request(s) cancelled", cancelled);
    }

    pub fn return_to_service(&mut self) {
        self.out_of_service = false;
    }

    /// Decide the next action for the car
    pub fn decide(&mut self, state: CarState, tick: Tick) -> Action {
        if self.out_of_service {
            return Action::Idle;
        }
        let floor = state.floor();

        match state.status() {
            MechanicalStatus::DoorsOpen => {
                let done = self.book.complete_matching(tick, |r| r.floor() == floor);
                if !done.is_empty() {
                    debug!("Completed {:?} at floor {}", done, floor);
                }
                Action::Idle
            }
            MechanicalStatus::DoorsOpening => {
                self.book
                    .advance_matching(RequestState::Serving, tick, |r| r.floor() == floor);
                Action::Idle
            }
            MechanicalStatus::MovingUp
            | MechanicalStatus::MovingDown
            | MechanicalStatus::OutOfService => Action::Idle,
            // a reopen only if the engine still allows one; otherwise it waits
            MechanicalStatus::DoorsClosing if self.book.active().any(|r| r.floor() == floor) => {
                Action::OpenDoor
            }
            MechanicalStatus::Idle | MechanicalStatus::DoorsClosing => {
                let here = self
                    .book
                    .advance_matching(RequestState::Serving, tick, |r| r.floor() == floor);
                if !here.is_empty() {
                    return Action::OpenDoor;
                }

                let Some(target) = self.nearest_floor(floor) else {
                    return Action::Idle;
                };
                self.book
                    .advance_matching(RequestState::Assigned, tick, |r| r.floor() == target);
                Direction::toward(floor, target).move_action()
            }
        }
    }

    /// Closest requested floor, lower floor winning ties
    fn nearest_floor(&self, floor: Floor) -> Option<Floor> {
        self.book
            .active()
            .map(Request::floor)
            .min_by_key(|target| ((target - floor).abs(), *target))
    }
}
