//! Dispatch strategies
//!
//! The engine talks to whichever strategy drives the car through the closed
//! `Controller` enum. `build_controller` maps a strategy selector to a fresh
//! instance.

use super::car_state::CarState;
use super::config::ControllerConfig;
use super::nearest::NearestRequestController;
use super::request::{Request, RequestBook};
use super::scan::DirectionalScanController;
use super::types::{Action, ControllerStrategy, Direction, Floor, RequestId, Tick};

/// A dispatch strategy together with the requests it owns
#[derive(Debug, Clone)]
pub enum Controller {
    NearestRequest(NearestRequestController),
    DirectionalScan(DirectionalScanController),
}

/// Construct a controller for `strategy`
pub fn build_controller(strategy: ControllerStrategy, config: ControllerConfig) -> Controller {
    match strategy {
        ControllerStrategy::NearestRequestRouting => {
            Controller::NearestRequest(NearestRequestController::new(config))
        }
        ControllerStrategy::DirectionalScan => {
            Controller::DirectionalScan(DirectionalScanController::new(config))
        }
    }
}

impl Controller {
    pub fn strategy(&self) -> ControllerStrategy {
        match self {
            Controller::NearestRequest(_) => ControllerStrategy::NearestRequestRouting,
            Controller::DirectionalScan(_) => ControllerStrategy::DirectionalScan,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        match self {
            Controller::NearestRequest(c) => c.config(),
            Controller::DirectionalScan(c) => c.config(),
        }
    }

    pub fn requests(&self) -> &RequestBook {
        match self {
            Controller::NearestRequest(c) => c.requests(),
            Controller::DirectionalScan(c) => c.requests(),
        }
    }

    pub fn decide(&mut self, state: CarState, tick: Tick) -> Action {
        match self {
            Controller::NearestRequest(c) => c.decide(state, tick),
            Controller::DirectionalScan(c) => c.decide(state, tick),
        }
    }

    pub fn add_hall_call(&mut self, floor: Floor, direction: Direction, tick: Tick) -> Option<RequestId> {
        match self {
            Controller::NearestRequest(c) => c.add_hall_call(floor, direction, tick),
            Controller::DirectionalScan(c) => c.add_hall_call(floor, direction, tick),
        }
    }

    pub fn add_car_call(&mut self, floor: Floor, tick: Tick) -> Option<RequestId> {
        match self {
            Controller::NearestRequest(c) => c.add_car_call(floor, tick),
            Controller::DirectionalScan(c) => c.add_car_call(floor, tick),
        }
    }

    pub fn add_request(&mut self, request: Request, tick: Tick) -> Option<RequestId> {
        match self {
            Controller::NearestRequest(c) => c.add_request(request, tick),
            Controller::DirectionalScan(c) => c.add_request(request, tick),
        }
    }

    pub fn cancel_request(&mut self, id: RequestId, tick: Tick) -> bool {
        match self {
            Controller::NearestRequest(c) => c.cancel_request(id, tick),
            Controller::DirectionalScan(c) => c.cancel_request(id, tick),
        }
    }

    pub fn take_out_of_service(&mut self, tick: Tick) {
        match self {
            Controller::NearestRequest(c) => c.take_out_of_service(tick),
            Controller::DirectionalScan(c) => c.take_out_of_service(tick),
        }
    }

    pub fn return_to_service(&mut self) {
        match self {
            Controller::NearestRequest(c) => c.return_to_service(),
            Controller::DirectionalScan(c) => c.return_to_service(),
        }
    }

    pub fn is_out_of_service(&self) -> bool {
        match self {
            Controller::NearestRequest(c) => c.is_out_of_service(),
            Controller::DirectionalScan(c) => c.is_out_of_service(),
        }
    }
}
