//! Configuration-driven experiment runs.
//!
//! An [`ExperimentConfig`] describes a register, a gate sequence, optional
//! noise and a list of measurement settings. [`run_experiment`] executes the
//! pipeline initialize → gates → noise → sample → aggregate and returns a
//! frozen [`ExperimentResult`].

mod config;
mod result;
mod runner;

pub use config::{ExperimentConfig, GateStep, NoiseStep, Setting};
pub use result::{
    ExperimentResult, OutcomeCount, ResultAggregator, SettingStatistics, Statistics, Trial,
};
pub use runner::{measurement_for, prepare_state, run_experiment};
