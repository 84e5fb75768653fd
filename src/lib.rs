//! Lift Simulation Library
//!
//! A discrete-tick simulation of one lift car and its dispatch strategies.

pub mod simulation;
