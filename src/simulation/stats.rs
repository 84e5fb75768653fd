//! Run statistics
//!
//! Mechanical counters are kept by the engine as it runs; request figures are
//! derived from the controller's retired requests when a summary is taken.

use log::info;

use super::engine::SimEngine;
use super::request::RequestState;
use super::types::Tick;

/// Counters the engine bumps while simulating
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MechanicalCounters {
    pub floors_travelled: u64,
    pub door_cycles: u64,
    pub rejected_actions: u64,
    pub reopens: u64,
}

/// Summary of a simulation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub ticks: Tick,
    pub requests_completed: usize,
    pub requests_cancelled: usize,
    pub requests_pending: usize,
    pub mean_wait_ticks: f64,
    pub max_wait_ticks: Tick,
    pub mechanical: MechanicalCounters,
}

impl RunStats {
    pub fn collect(engine: &SimEngine) -> Self {
        let retired = engine.retired_requests();
        let waits: Vec<Tick> = retired.iter().filter_map(|r| r.wait_ticks()).collect();
        let mean_wait_ticks = if waits.is_empty() {
            0.0
        } else {
            waits.iter().sum::<Tick>() as f64 / waits.len() as f64
        };

        Self {
            ticks: engine.current_tick(),
            requests_completed: waits.len(),
            requests_cancelled: retired
                .iter()
                .filter(|r| r.state() == RequestState::Cancelled)
                .count(),
            requests_pending: engine.requests().count(),
            mean_wait_ticks,
            max_wait_ticks: waits.iter().copied().max().unwrap_or(0),
            mechanical: engine.counters(),
        }
    }

    /// Share of finished requests that were completed rather than cancelled
    pub fn completion_rate(&self) -> f64 {
        let finished = self.requests_completed + self.requests_cancelled;
        if finished == 0 {
            return 100.0;
        }
        self.requests_completed as f64 / finished as f64 * 100.0
    }

    pub fn log_summary(&self) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Ticks simulated: {}", self.ticks);
        info!("Requests completed: {}", self.requests_completed);
        info!("Requests cancelled: {}", self.requests_cancelled);
        info!("Requests pending: {}", self.requests_pending);
        info!("Mean wait: {:.1} ticks", self.mean_wait_ticks);
        info!("Max wait: {} ticks", self.max_wait_ticks);
        info!("Floors travelled: {}", self.mechanical.floors_travelled);
        info!("Door cycles: {}", self.mechanical.door_cycles);
        info!("Door reopens: {}", self.mechanical.reopens);
        info!("Rejected actions: {}", self.mechanical.rejected_actions);
        info!("Completion rate: {:.1}%", self.completion_rate());
    }
}
