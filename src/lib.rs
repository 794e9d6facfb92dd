//! Small-register quantum state simulation: gates, noise channels, Born-rule
//! sampling and Bell/CHSH statistics.
//!
//! ```no_run
//! use qplayground::experiment::{ExperimentConfig, run_experiment};
//! use qplayground::statistics::ChshSettings;
//!
//! let config = ExperimentConfig::chsh(ChshSettings::canonical())
//!     .with_trials(10_000)
//!     .with_seed(42);
//! let result = run_experiment(&config)?;
//! println!("S = {:?}", result.chsh());
//! # Ok::<(), qplayground::errors::ExperimentError>(())
//! ```

mod core;
pub mod experiment;
pub mod protocols;
pub mod sampler;
pub mod statistics;

pub use crate::core::{
    ChannelKind, Gate, INSTABILITY_THRESHOLD, MAX_QUBITS, MAX_REGISTER_QUBITS, Measurement,
    MeasurementResult, NORM_TOLERANCE, OutcomeLabel, QuantumChannel, QuantumState, StateRepr,
    channels, errors, utils,
};
pub use crate::experiment::{ExperimentConfig, ExperimentResult, run_experiment};
pub use crate::sampler::Sampler;
