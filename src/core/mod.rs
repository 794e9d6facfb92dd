pub mod channels;
pub mod errors;
mod gates;
mod measurements;
mod state;
pub mod utils;

pub use channels::{ChannelKind, QuantumChannel};
pub use gates::Gate;
pub use measurements::{Measurement, MeasurementResult, OutcomeLabel};
pub use state::{
    INSTABILITY_THRESHOLD, MAX_QUBITS, MAX_REGISTER_QUBITS, NORM_TOLERANCE, QuantumState,
    StateRepr,
};
