//! Engine and controller configuration
//!
//! Both are fixed at construction and validated once.

use super::error::ConfigError;
use super::types::{Floor, IdleParkingMode};

/// Building and timing parameters for one engine instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub min_floor: Floor,
    pub max_floor: Floor,
    pub travel_ticks_per_floor: u32,
    pub door_transition_ticks: u32,
    pub door_dwell_ticks: u32,
    /// How long into a closing sequence the doors may still reopen
    pub door_reopen_window_ticks: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_floor: 0,
            max_floor: 9,
            travel_ticks_per_floor: 1,
            door_transition_ticks: 2,
            door_dwell_ticks: 3,
            door_reopen_window_ticks: 2,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_floor >= self.max_floor {
            return Err(ConfigError::EmptyFloorRange {
                min: self.min_floor,
                max: self.max_floor,
            });
        }
        for (name, value) in [
            ("travel_ticks_per_floor", self.travel_ticks_per_floor),
            ("door_transition_ticks", self.door_transition_ticks),
            ("door_dwell_ticks", self.door_dwell_ticks),
        ] {
            if value == 0 {
                return Err(ConfigError::NonPositiveTicks { name });
            }
        }
        if self.door_reopen_window_ticks > self.door_transition_ticks {
            return Err(ConfigError::ReopenWindowTooLong {
                window: self.door_reopen_window_ticks,
                transition: self.door_transition_ticks,
            });
        }
        Ok(())
    }

    pub fn contains(&self, floor: Floor) -> bool {
        (self.min_floor..=self.max_floor).contains(&floor)
    }

    pub fn clamp(&self, floor: Floor) -> Floor {
        floor.clamp(self.min_floor, self.max_floor)
    }
}

/// Tuning parameters shared by both dispatch strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerConfig {
    pub home_floor: Floor,
    pub idle_timeout_ticks: u32,
    pub idle_parking_mode: IdleParkingMode,
}

impl ControllerConfig {
    /// Check the controller settings against the building served
    pub fn validate_against(&self, engine: &EngineConfig) -> Result<(), ConfigError> {
        if !engine.contains(self.home_floor) {
            return Err(ConfigError::HomeFloorOutOfRange {
                home: self.home_floor,
                min: engine.min_floor,
                max: engine.max_floor,
            });
        }
        Ok(())
    }
}
