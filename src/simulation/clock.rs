//! Logical simulation clock
//!
//! Ticks are logical units; nothing in the simulation reads wall time.

use super::types::Tick;

/// A monotonically increasing tick counter starting at 0
#[derive(Debug, Clone, Default)]
pub struct Clock {
    now: Tick,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current tick
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Move forward by exactly one tick
    pub fn advance(&mut self) {
        self.now += 1;
    }
}
