//! Car state snapshot
//!
//! A `CarState` is never mutated in place: every accepted transition
//! produces a fresh value.

use std::fmt;

use super::types::Floor;

/// Mechanical status of the car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MechanicalStatus {
    Idle,
    MovingUp,
    MovingDown,
    DoorsOpening,
    DoorsOpen,
    DoorsClosing,
    OutOfService,
}

impl MechanicalStatus {
    pub fn is_moving(self) -> bool {
        matches!(self, MechanicalStatus::MovingUp | MechanicalStatus::MovingDown)
    }

    /// True unless the doors are opening, open or closing
    pub fn doors_closed(self) -> bool {
        !matches!(
            self,
            MechanicalStatus::DoorsOpening
                | MechanicalStatus::DoorsOpen
                | MechanicalStatus::DoorsClosing
        )
    }
}

impl fmt::Display for MechanicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MechanicalStatus::Idle => "IDLE",
            MechanicalStatus::MovingUp => "MOVING_UP",
            MechanicalStatus::MovingDown => "MOVING_DOWN",
            MechanicalStatus::DoorsOpening => "DOORS_OPENING",
            MechanicalStatus::DoorsOpen => "DOORS_OPEN",
            MechanicalStatus::DoorsClosing => "DOORS_CLOSING",
            MechanicalStatus::OutOfService => "OUT_OF_SERVICE",
        };
        f.write_str(name)
    }
}

/// Immutable snapshot of the car's floor and status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarState {
    floor: Floor,
    status: MechanicalStatus,
}

impl CarState {
    pub fn new(floor: Floor, status: MechanicalStatus) -> Self {
        Self { floor, status }
    }

    /// An idle car with closed doors at `floor`
    pub fn idle_at(floor: Floor) -> Self {
        Self::new(floor, MechanicalStatus::Idle)
    }

    pub fn floor(&self) -> Floor {
        self.floor
    }

    pub fn status(&self) -> MechanicalStatus {
        self.status
    }

    pub fn with_status(&self, status: MechanicalStatus) -> Self {
        Self::new(self.floor, status)
    }
}

impl fmt::Display for CarState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "floor {} ({})", self.floor, self.status)
    }
}
