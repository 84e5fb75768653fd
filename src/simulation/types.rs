//! Core types for the lift simulation
//!
//! Plain value types shared by the engine, the controllers and the driver.

use std::fmt;

/// A floor number. Negative values are basements.
pub type Floor = i32;

/// A logical tick number
pub type Tick = u64;

/// A unique identifier for a passenger request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Travel direction, used for hall calls and for the scan sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Idle,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Idle => Direction::Idle,
        }
    }

    /// Direction that leads from `from` to `to`
    pub fn toward(from: Floor, to: Floor) -> Direction {
        match to.cmp(&from) {
            std::cmp::Ordering::Greater => Direction::Up,
            std::cmp::Ordering::Less => Direction::Down,
            std::cmp::Ordering::Equal => Direction::Idle,
        }
    }

    /// The move action for this direction, `Action::Idle` for `Direction::Idle`
    pub fn move_action(self) -> Action {
        match self {
            Direction::Up => Action::MoveUp,
            Direction::Down => Action::MoveDown,
            Direction::Idle => Action::Idle,
        }
    }

    /// Whether `floor` lies strictly ahead of `from` when travelling this way
    pub fn is_ahead(self, from: Floor, floor: Floor) -> bool {
        match self {
            Direction::Up => floor > from,
            Direction::Down => floor < from,
            Direction::Idle => false,
        }
    }
}

/// The only vocabulary a controller may emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveUp,
    MoveDown,
    OpenDoor,
    CloseDoor,
    Idle,
}

/// What the car does after the idle timeout expires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum IdleParkingMode {
    /// Travel back to the home floor
    ParkToHomeFloor,
    /// Stay at the last served floor
    #[default]
    StayPut,
}

/// Selects which dispatch strategy drives the car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ControllerStrategy {
    /// Always head for the closest outstanding request
    NearestRequestRouting,
    /// Sweep in one direction before reversing
    #[default]
    DirectionalScan,
}
