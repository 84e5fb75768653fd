//! Single-car lift simulation
//!
//! The engine owns simulated time and the car's mechanical state; a
//! controller owns the passenger requests and decides what the car does
//! next. Nothing here blocks, sleeps or reads wall time.

mod car_state;
mod clock;
mod config;
mod controller;
mod engine;
mod error;
mod nearest;
mod request;
mod scan;
mod scenario;
mod stats;
mod transition;
mod types;

pub use car_state::{CarState, MechanicalStatus};
pub use clock::Clock;
pub use config::{ControllerConfig, EngineConfig};
pub use controller::{build_controller, Controller};
pub use engine::{SimEngine, TickOutcome};
pub use error::{ConfigError, EngineError, RequestError};
pub use nearest::NearestRequestController;
pub use request::{Request, RequestBook, RequestKind, RequestState};
pub use scan::DirectionalScanController;
pub use scenario::{random_scenario, ScenarioEvent, ScenarioEventKind, SimulationRun, TickSnapshot};
pub use stats::{MechanicalCounters, RunStats};
pub use transition::{allowed_targets, can_transition, resolve_action, RejectReason, TransitionOutcome};
pub use types::{
    Action, ControllerStrategy, Direction, Floor, IdleParkingMode, RequestId, Tick,
};
