//! Mechanical state machine of the car
//!
//! Two views of the same table: which status may follow which
//! (`can_transition`), and what status an action would lead to from a given
//! status (`resolve_action`). Both are exhaustive matches, so adding a status
//! or an action fails to compile until the table is updated.

use thiserror::Error;

use super::car_state::MechanicalStatus;
use super::types::{Action, Floor};

use MechanicalStatus::*;

/// Why the engine refused to start an action or commit a state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("cannot move while doors are {0}")]
    DoorsNotClosed(MechanicalStatus),
    #[error("car is out of service")]
    OutOfService,
    #[error("car must come to rest before opening doors")]
    MustStopFirst,
    #[error("cannot reverse while moving")]
    ReversalWhileMoving,
    #[error("doors are already {0}")]
    DoorsAlreadyOpen(MechanicalStatus),
    #[error("doors are already closed")]
    DoorsAlreadyClosed,
    #[error("floor {0} is outside the served range")]
    FloorOutOfRange(Floor),
    #[error("illegal transition {from} -> {to}")]
    IllegalTransition {
        from: MechanicalStatus,
        to: MechanicalStatus,
    },
}

/// Result of asking what an action would do from a given status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Accepted(MechanicalStatus),
    Rejected(RejectReason),
}

/// Every status reachable from `from` in one step, including `from` itself
pub fn allowed_targets(from: MechanicalStatus) -> &'static [MechanicalStatus] {
    match from {
        Idle => &[Idle, MovingUp, MovingDown, DoorsOpening, OutOfService],
        MovingUp => &[MovingUp, Idle, OutOfService],
        MovingDown => &[MovingDown, Idle, OutOfService],
        DoorsOpening => &[DoorsOpening, DoorsOpen, DoorsClosing, OutOfService],
        DoorsOpen => &[DoorsOpen, DoorsClosing, OutOfService],
        DoorsClosing => &[DoorsClosing, Idle, DoorsOpening, OutOfService],
        OutOfService => &[OutOfService, Idle],
    }
}

pub fn can_transition(from: MechanicalStatus, to: MechanicalStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// The status the car would enter if `action` were accepted in `status`
pub fn resolve_action(status: MechanicalStatus, action: Action) -> TransitionOutcome {
    use TransitionOutcome::{Accepted, Rejected};

    match (status, action) {
        (OutOfService, Action::Idle) => Accepted(OutOfService),
        (OutOfService, _) => Rejected(RejectReason::OutOfService),

        (Idle, Action::Idle) => Accepted(Idle),
        (Idle, Action::MoveUp) => Accepted(MovingUp),
        (Idle, Action::MoveDown) => Accepted(MovingDown),
        (Idle, Action::OpenDoor) => Accepted(DoorsOpening),
        (Idle, Action::CloseDoor) => Rejected(RejectReason::DoorsAlreadyClosed),

        (MovingUp, Action::Idle | Action::MoveUp) => Accepted(MovingUp),
        (MovingDown, Action::Idle | Action::MoveDown) => Accepted(MovingDown),
        (MovingUp, Action::MoveDown) | (MovingDown, Action::MoveUp) => {
            Rejected(RejectReason::ReversalWhileMoving)
        }
        (MovingUp | MovingDown, Action::OpenDoor) => Rejected(RejectReason::MustStopFirst),
        (MovingUp | MovingDown, Action::CloseDoor) => Rejected(RejectReason::DoorsAlreadyClosed),

        (DoorsOpening | DoorsOpen | DoorsClosing, Action::MoveUp | Action::MoveDown) => {
            Rejected(RejectReason::DoorsNotClosed(status))
        }
        (DoorsOpening | DoorsOpen, Action::OpenDoor) => {
            Rejected(RejectReason::DoorsAlreadyOpen(status))
        }
        (DoorsOpening | DoorsOpen, Action::CloseDoor) => Accepted(DoorsClosing),
        (DoorsOpening | DoorsOpen | DoorsClosing, Action::Idle) => Accepted(status),
        (DoorsClosing, Action::OpenDoor) => Accepted(DoorsOpening),
        (DoorsClosing, Action::CloseDoor) => Accepted(DoorsClosing),
    }
}
