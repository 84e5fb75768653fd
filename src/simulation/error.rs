//! Error types for the lift simulation.

use thiserror::Error;

use super::request::RequestState;
use super::types::{Floor, RequestId};

/// Invalid engine or controller configuration, detected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("min floor {min} must be below max floor {max}")]
    EmptyFloorRange { min: Floor, max: Floor },

    #[error("{name} must be at least 1")]
    NonPositiveTicks { name: &'static str },

    #[error("reopen window of {window} ticks exceeds door transition of {transition} ticks")]
    ReopenWindowTooLong { window: u32, transition: u32 },

    #[error("home floor {home} is outside {min}..={max}")]
    HomeFloorOutOfRange { home: Floor, min: Floor, max: Floor },

    #[error("start floor {floor} is outside {min}..={max}")]
    StartFloorOutOfRange { floor: Floor, min: Floor, max: Floor },
}

/// Caller misuse of an engine-level operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("car is already out of service")]
    AlreadyOutOfService,

    #[error("an out-of-service shutdown is already pending")]
    ShutdownPending,

    #[error("car is not out of service")]
    NotOutOfService,
}

/// A request lifecycle step that would move backwards or skip a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("request {id} cannot go from {from:?} to {to:?}")]
pub struct RequestError {
    pub id: RequestId,
    pub from: RequestState,
    pub to: RequestState,
}
