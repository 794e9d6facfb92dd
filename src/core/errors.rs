use num_complex::Complex64;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    #[error("Dimension mismatch in {op}: {left:?} vs {right:?}")]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("Matrix must be square, got {0:?}")]
    NotSquare((usize, usize)),

    #[error("Index {index} out of range for {len} qubit(s)")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GateError {
    #[error("Matrix is not Unitary (U†U != I)")]
    NonUnitary,

    #[error("Matrix must be square")]
    NotSquareMatrix,

    #[error("Invalid Dimensions")]
    InvalidDimensions,

    #[error("Qubit {0} cannot be both control and target")]
    ControlTargetOverlap(usize),

    #[error("Duplicate qubit index found: {0}")]
    DuplicateQubit(usize),

    #[error("Gate acts on {expected} qubit(s) but {got} target(s) were given")]
    ArityMismatch { expected: usize, got: usize },

    #[error("Qubit {index} is outside a {num_qubits}-qubit register")]
    QubitOutOfRange { index: usize, num_qubits: usize },

    #[error("Unknown gate: {0}")]
    UnknownGate(String),

    #[error("Gate '{gate}' expects {expected} parameter(s), got {got}")]
    InvalidParameter {
        gate: String,
        expected: usize,
        got: usize,
    },

    #[error("Gate '{gate}' parameter must be finite, got {value}")]
    NonFiniteParameter { gate: String, value: f64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    #[error("Number of operators ({ops}) does not match number of labels ({labels})")]
    CountMismatch { ops: usize, labels: usize },

    #[error("Measurement operators do not sum to Identity (Completeness relation failed)")]
    NotComplete,

    #[error("Invalid operator dimensions")]
    InvalidDimensions,

    #[error("Outcome probabilities sum to {0}, expected 1")]
    NormalizationError(f64),

    #[error("Operator expansion failed: {0}")]
    ExpansionError(#[from] GateError),

    #[error("Duplicate qubit index found: {0}")]
    DuplicateQubit(usize),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    #[error("Channel must have at least one Kraus operator")]
    Empty,

    #[error("Kraus operators do not sum to Identity (Trace preserving relation failed)")]
    NotComplete,

    #[error("Invalid operator dimensions: Matrices must be square and 2^n")]
    InvalidDimensions,

    #[error("Dimension mismatch: All Kraus operators must have the same size")]
    OperatorSizeMismatch,

    #[error("Invalid parameter: {0}. Must be between 0.0 and 1.0")]
    InvalidParameter(f64),

    #[error("Duplicate qubit index found: {0}")]
    DuplicateQubit(usize),

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    #[error("Matrix error: {0}")]
    MatrixError(#[from] MatrixError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("Qubit count {0} is not supported (expected 1 or 2)")]
    InvalidQubitCount(usize),

    #[error("Basis label '{label}' is not a bitstring over {num_qubits} qubit(s)")]
    InvalidBasisLabel { label: String, num_qubits: usize },

    #[error("Gate acts on {expected} qubit(s) but {got} target(s) were given")]
    GateArityMismatch { expected: usize, got: usize },

    #[error("Trace is not unity: {0}")]
    InvalidTrace(Complex64),

    #[error("Vector is not normalized. Norm squared: {0}")]
    NotNormalized(f64),

    #[error("Invalid dimensions")]
    InvalidDimensions,

    #[error("Density matrix is not Hermitian")]
    NotHermitian,

    #[error("Density matrix is not positive semidefinite, smallest eigenvalue {0}")]
    NotPositiveSemidefinite(f64),

    #[error("Dimension mismatch")]
    DimensionMismatch {
        expected: usize,
        got_rows: usize,
        got_cols: usize,
    },

    #[error("Qubit index out of bounds")]
    IndexOutOfBounds { index: usize, num_qubits: usize },

    #[error("Numerical instability: norm drifted by {drift:e}")]
    NumericalInstability { drift: f64 },

    #[error("Measurement error: {0}")]
    MeasurementError(#[from] MeasurementError),

    #[error("Gate error: {0}")]
    GateError(#[from] GateError),

    #[error("Channel error: {0}")]
    ChannelError(#[from] ChannelError),

    #[error("Matrix error: {0}")]
    MatrixError(#[from] MatrixError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResultError {
    #[error("Result already finalized, no more trials can be added")]
    ResultAlreadyFinalized,

    #[error("Trial has {got} outcome label(s), result expects {expected}")]
    OutcomeArityMismatch { expected: usize, got: usize },

    #[error("Setting index {index} is out of range for {len} setting(s)")]
    SettingIndexOutOfRange { index: usize, len: usize },

    #[error("Trial setting does not match setting {index}")]
    SettingMismatch { index: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExperimentError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("State error: {0}")]
    StateError(#[from] StateError),

    #[error("Gate error: {0}")]
    GateError(#[from] GateError),

    #[error("Channel error: {0}")]
    ChannelError(#[from] ChannelError),

    #[error("Measurement error: {0}")]
    MeasurementError(#[from] MeasurementError),

    #[error("Result error: {0}")]
    ResultError(#[from] ResultError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
