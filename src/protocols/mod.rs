//! Experiment drivers built on the engine.
//!
//! Each driver returns plain data (probabilities, correlations, fidelities,
//! Bloch vectors) ready for plotting.

pub mod bell;
pub mod chsh;
pub mod decoherence;
pub mod teleportation;
