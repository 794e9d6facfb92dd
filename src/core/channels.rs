use crate::core::errors::{ChannelError, MatrixError};
use crate::core::utils;
use ndarray::{Array2, array};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Noise models selectable by name in an experiment configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Depolarizing,
    Dephasing,
    AmplitudeDamping,
    BitFlip,
    PhaseFlip,
    BitPhaseFlip,
}

impl ChannelKind {
    /// Accepts the canonical snake_case names plus the short verbs
    /// (`depolarize`, `dephase`, `amplitude_damp`).
    pub fn from_name(name: &str) -> Result<Self, ChannelError> {
        let kind = match name.to_ascii_lowercase().replace('-', "_").as_str() {
            "depolarizing" | "depolarize" => Self::Depolarizing,
            "dephasing" | "dephase" | "phase_damping" | "phase" => Self::Dephasing,
            "amplitude_damping" | "amplitude_damp" | "amplitude" => Self::AmplitudeDamping,
            "bit_flip" => Self::BitFlip,
            "phase_flip" => Self::PhaseFlip,
            "bit_phase_flip" => Self::BitPhaseFlip,
            _ => return Err(ChannelError::UnknownChannel(name.to_string())),
        };
        Ok(kind)
    }

    /// Builds the single-qubit channel of this kind at the given rate.
    pub fn channel(self, rate: f64) -> Result<QuantumChannel, ChannelError> {
        match self {
            Self::Depolarizing => QuantumChannel::depolarizing(rate),
            Self::Dephasing => QuantumChannel::phase_damping(rate),
            Self::AmplitudeDamping => QuantumChannel::amplitude_damping(rate),
            Self::BitFlip => QuantumChannel::bit_flip(rate),
            Self::PhaseFlip => QuantumChannel::phase_flip(rate),
            Self::BitPhaseFlip => QuantumChannel::bit_phase_flip(rate),
        }
    }
}

#[derive(Clone, Debug)]
pub struct QuantumChannel {
    pub kraus_ops: Vec<Array2<Complex64>>,
    pub num_qubits: usize,
}

impl QuantumChannel {
    pub fn new(kraus_ops: Vec<Array2<Complex64>>) -> Result<Self, ChannelError> {
        let Some(first) = kraus_ops.first() else {
            return Err(ChannelError::Empty);
        };

        let (rows, cols) = first.dim();

        if rows != cols || !rows.is_power_of_two() || rows < 2 {
            return Err(ChannelError::InvalidDimensions);
        }

        // log_2
        let num_qubits = rows.trailing_zeros() as usize;

        if kraus_ops.iter().any(|op| op.dim() != (rows, cols)) {
            return Err(ChannelError::OperatorSizeMismatch);
        }

        if !utils::check_completeness(&kraus_ops, rows) {
            return Err(ChannelError::NotComplete);
        }

        Ok(Self {
            kraus_ops,
            num_qubits,
        })
    }

    /// Composes the current QuantumChannel with another one.
    ///
    /// The result applies `self` first, then `other`.
    pub fn compose(&self, other: &QuantumChannel) -> Result<QuantumChannel, ChannelError> {
        if self.num_qubits != other.num_qubits {
            return Err(ChannelError::OperatorSizeMismatch);
        }

        let new_ops: Vec<_> = other
            .kraus_ops
            .iter()
            .flat_map(|op_b| self.kraus_ops.iter().map(move |op_a| op_b.dot(op_a)))
            .collect();

        Ok(QuantumChannel {
            kraus_ops: new_ops,
            num_qubits: self.num_qubits,
        })
    }

    /// Mixes the current QuantumChannel with another one with weight `p` (convex combination)
    pub fn mix(&self, other: &QuantumChannel, p: f64) -> Result<QuantumChannel, ChannelError> {
        if self.num_qubits != other.num_qubits {
            return Err(ChannelError::OperatorSizeMismatch);
        }

        validate_rate(p)?;

        let scale_self = Complex64::new((1.0 - p).sqrt(), 0.0);
        let scale_other = Complex64::new(p.sqrt(), 0.0);

        let kraus_ops = self
            .kraus_ops
            .iter()
            .map(|op| op * scale_self)
            .chain(other.kraus_ops.iter().map(|op| op * scale_other))
            .collect();

        Ok(QuantumChannel {
            kraus_ops,
            num_qubits: self.num_qubits,
        })
    }

    /// Applies the channel to a density matrix of matching size, $\sum_k K_k \rho K_k^\dagger$.
    pub fn apply_to(&self, rho: &Array2<Complex64>) -> Result<Array2<Complex64>, ChannelError> {
        let dim = 1 << self.num_qubits;
        if rho.dim() != (dim, dim) {
            return Err(MatrixError::DimensionMismatch {
                op: "apply_channel",
                left: (dim, dim),
                right: rho.dim(),
            }
            .into());
        }
        Ok(sum_kraus(&self.kraus_ops, rho))
    }

    /// Expands Kraus operators to a larger system
    pub fn get_expanded_operators(
        &self,
        num_total_qubits: usize,
        targets: &[usize],
    ) -> Result<Vec<Array2<Complex64>>, ChannelError> {
        if targets.len() != self.num_qubits {
            return Err(ChannelError::InvalidDimensions);
        }

        if let Some(dup) = utils::find_duplicate(targets) {
            return Err(ChannelError::DuplicateQubit(dup));
        }

        Ok(self
            .kraus_ops
            .iter()
            .map(|op| utils::expand_operator(num_total_qubits, op, targets, &[]))
            .collect())
    }

    /// Bit Flip Channel -> X
    pub fn bit_flip(p: f64) -> Result<QuantumChannel, ChannelError> {
        validate_rate(p)?;
        let (stay, flip) = ((1.0 - p).sqrt(), p.sqrt());
        QuantumChannel::new(vec![
            mat2([stay, 0.0, 0.0, stay]),
            mat2([0.0, flip, flip, 0.0]),
        ])
    }

    /// Phase Flip Channel -> Z
    pub fn phase_flip(p: f64) -> Result<QuantumChannel, ChannelError> {
        validate_rate(p)?;
        let (stay, flip) = ((1.0 - p).sqrt(), p.sqrt());
        QuantumChannel::new(vec![
            mat2([stay, 0.0, 0.0, stay]),
            mat2([flip, 0.0, 0.0, -flip]),
        ])
    }

    /// Bit-Phase Flip Channel -> Y
    pub fn bit_phase_flip(p: f64) -> Result<QuantumChannel, ChannelError> {
        validate_rate(p)?;
        let (stay, flip) = ((1.0 - p).sqrt(), p.sqrt());
        let k1 = array![
            [Complex64::new(0.0, 0.0), Complex64::new(0.0, -flip)],
            [Complex64::new(0.0, flip), Complex64::new(0.0, 0.0)]
        ];
        QuantumChannel::new(vec![mat2([stay, 0.0, 0.0, stay]), k1])
    }

    /// Depolarizing Channel
    ///
    /// With probability `p` the qubit is replaced by the maximally mixed state:
    /// $\rho \mapsto (1-p)\rho + p\,I/2$.
    pub fn depolarizing(p: f64) -> Result<QuantumChannel, ChannelError> {
        validate_rate(p)?;

        let weight_i = (1.0 - 0.75 * p).sqrt();
        let w = (p / 4.0).sqrt();

        let k2 = array![
            // ~ Y
            [Complex64::new(0.0, 0.0), Complex64::new(0.0, -w)],
            [Complex64::new(0.0, w), Complex64::new(0.0, 0.0)]
        ];

        QuantumChannel::new(vec![
            mat2([weight_i, 0.0, 0.0, weight_i]),
            mat2([0.0, w, w, 0.0]),
            k2,
            mat2([w, 0.0, 0.0, -w]),
        ])
    }

    /// Amplitude Damping -> T1 relaxation
    pub fn amplitude_damping(gamma: f64) -> Result<QuantumChannel, ChannelError> {
        validate_rate(gamma)?;
        QuantumChannel::new(vec![
            mat2([1.0, 0.0, 0.0, (1.0 - gamma).sqrt()]),
            mat2([0.0, gamma.sqrt(), 0.0, 0.0]),
        ])
    }

    /// Phase Damping -> T2 relaxation
    pub fn phase_damping(lambda: f64) -> Result<QuantumChannel, ChannelError> {
        validate_rate(lambda)?;
        QuantumChannel::new(vec![
            mat2([1.0, 0.0, 0.0, (1.0 - lambda).sqrt()]),
            mat2([0.0, 0.0, 0.0, lambda.sqrt()]),
        ])
    }

    /// Combined Amplitude & Phase Damping -> T1 relaxation + T2 relaxation
    pub fn combined_amplitude_phase_damping(
        gamma: f64,
        lambda: f64,
    ) -> Result<QuantumChannel, ChannelError> {
        let amp_channel = Self::amplitude_damping(gamma)?;
        let phase_channel = Self::phase_damping(lambda)?;
        QuantumChannel::new(amp_channel.compose(&phase_channel)?.kraus_ops)
    }
}

/// Depolarizes a single-qubit density matrix.
pub fn depolarize(rho: &Array2<Complex64>, rate: f64) -> Result<Array2<Complex64>, ChannelError> {
    QuantumChannel::depolarizing(rate)?.apply_to(rho)
}

/// Dephases (phase damping) a single-qubit density matrix.
pub fn dephase(rho: &Array2<Complex64>, rate: f64) -> Result<Array2<Complex64>, ChannelError> {
    QuantumChannel::phase_damping(rate)?.apply_to(rho)
}

/// Amplitude-damps a single-qubit density matrix.
pub fn amplitude_damp(rho: &Array2<Complex64>, rate: f64) -> Result<Array2<Complex64>, ChannelError> {
    QuantumChannel::amplitude_damping(rate)?.apply_to(rho)
}

/// $\sum_k K_k \rho K_k^\dagger$ for operators already sized to `rho`.
pub(crate) fn sum_kraus(ops: &[Array2<Complex64>], rho: &Array2<Complex64>) -> Array2<Complex64> {
    let dim = rho.nrows();
    ops.iter()
        .fold(Array2::<Complex64>::zeros((dim, dim)), |acc, k| {
            acc + k.dot(rho).dot(&utils::dagger(k))
        })
}

/// Real 2x2 matrix from row-major entries.
fn mat2(m: [f64; 4]) -> Array2<Complex64> {
    array![
        [Complex64::new(m[0], 0.0), Complex64::new(m[1], 0.0)],
        [Complex64::new(m[2], 0.0), Complex64::new(m[3], 0.0)]
    ]
}

/// Validate rate parameter
fn validate_rate(p: f64) -> Result<(), ChannelError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ChannelError::InvalidParameter(p));
    }
    Ok(())
}
