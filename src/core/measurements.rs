use crate::core::errors::MeasurementError;
use crate::core::utils;
use ndarray::{Array1, Array2, array};
use num_complex::Complex64;

/// Label of one measurement outcome, one entry per measured qubit.
///
/// Canonical bases label their outcomes with the observable's eigenvalue,
/// `+1` or `-1`.
pub type OutcomeLabel = Vec<i8>;

#[derive(Clone, Debug)]
pub struct Measurement {
    /// List of measurement operators
    pub operators: Vec<Array2<Complex64>>,
    /// Outcome label associated with each operator
    pub labels: Vec<OutcomeLabel>,
    /// Number of qubits which the measurement acts on
    pub num_qubits: usize,
}

impl Measurement {
    /// Creates a single-qubit-labelled measurement, one value per operator.
    pub fn new(operators: Vec<Array2<Complex64>>, values: Vec<i8>) -> Result<Self, MeasurementError> {
        Self::with_labels(operators, values.into_iter().map(|v| vec![v]).collect())
    }

    /// Creates a measurement with arbitrary outcome labels.
    pub fn with_labels(
        operators: Vec<Array2<Complex64>>,
        labels: Vec<OutcomeLabel>,
    ) -> Result<Self, MeasurementError> {
        let num_qubits = Self::check_operators(&operators, labels.len())?;

        if !utils::check_completeness(&operators, 1 << num_qubits) {
            return Err(MeasurementError::NotComplete);
        }

        Ok(Self {
            operators,
            labels,
            num_qubits,
        })
    }

    /// Creates a valid Measurement from given POVM elements.
    ///
    /// The measurement operators are the positive square roots $M_k = \sqrt{E_k}$.
    pub fn from_povm(
        povm_elements: Vec<Array2<Complex64>>,
        values: Vec<i8>,
    ) -> Result<Self, MeasurementError> {
        let num_qubits = Self::check_operators(&povm_elements, values.len())?;

        if !utils::check_povm_completeness(&povm_elements, 1 << num_qubits) {
            return Err(MeasurementError::NotComplete);
        }

        let operators = povm_elements
            .iter()
            .map(utils::sqrt_positive_matrix)
            .collect();

        Ok(Measurement {
            operators,
            labels: values.into_iter().map(|v| vec![v]).collect(),
            num_qubits,
        })
    }

    /// Shared shape validation, returns the number of qubits acted on.
    fn check_operators(
        operators: &[Array2<Complex64>],
        num_labels: usize,
    ) -> Result<usize, MeasurementError> {
        if operators.len() != num_labels {
            return Err(MeasurementError::CountMismatch {
                ops: operators.len(),
                labels: num_labels,
            });
        }

        let Some(first) = operators.first() else {
            return Err(MeasurementError::InvalidDimensions);
        };

        let (rows, cols) = first.dim();
        if rows != cols || !rows.is_power_of_two() || rows < 2 {
            return Err(MeasurementError::InvalidDimensions);
        }

        if operators.iter().any(|op| op.dim() != (rows, cols)) {
            return Err(MeasurementError::InvalidDimensions);
        }

        // log_2 as rows is power of two
        Ok(rows.trailing_zeros() as usize)
    }

    /// Joint measurement of `self` on the first qubits and `other` on the next ones.
    ///
    /// Labels are concatenated in the same order. Qubit 0 is the low bit, so the
    /// local operator is `other ⊗ self`.
    pub fn tensor(&self, other: &Measurement) -> Measurement {
        let mut operators = Vec::with_capacity(self.operators.len() * other.operators.len());
        let mut labels = Vec::with_capacity(operators.capacity());

        for (op_a, label_a) in self.operators.iter().zip(&self.labels) {
            for (op_b, label_b) in other.operators.iter().zip(&other.labels) {
                operators.push(utils::kronecker_product(op_b, op_a));
                labels.push(label_a.iter().chain(label_b).copied().collect());
            }
        }

        Measurement {
            operators,
            labels,
            num_qubits: self.num_qubits + other.num_qubits,
        }
    }

    /// Expands measurements operator to a larger system
    pub fn get_expanded_operators(
        &self,
        num_total_qubits: usize,
        targets: &[usize],
    ) -> Result<Vec<Array2<Complex64>>, MeasurementError> {
        if targets.len() != self.num_qubits {
            return Err(MeasurementError::InvalidDimensions);
        }

        if let Some(dup) = utils::find_duplicate(targets) {
            return Err(MeasurementError::DuplicateQubit(dup));
        }

        Ok(self
            .operators
            .iter()
            .map(|op| utils::expand_operator(num_total_qubits, op, targets, &[]))
            .collect())
    }

    /// Projective measurement onto an orthonormal pair, labelled `+1` / `-1`.
    fn projective(plus: Array1<Complex64>, minus: Array1<Complex64>) -> Measurement {
        Measurement {
            operators: vec![
                utils::outer_product(&plus, &plus),
                utils::outer_product(&minus, &minus),
            ],
            labels: vec![vec![1], vec![-1]],
            num_qubits: 1,
        }
    }

    /// Z basis (Computational) -> {|0>, |1>}.
    pub fn z_basis() -> Measurement {
        Self::angle(0.0)
    }

    /// X basis (Hadamard) -> {|+>, |->}.
    pub fn x_basis() -> Measurement {
        let inv_sqrt2 = Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0);
        Self::projective(array![inv_sqrt2, inv_sqrt2], array![inv_sqrt2, -inv_sqrt2])
    }

    /// Y basis -> {|+i>, |-i>}
    pub fn y_basis() -> Measurement {
        let inv_sqrt2 = Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0);
        let i_inv_sqrt2 = Complex64::new(0.0, 1.0 / 2.0_f64.sqrt());
        Self::projective(array![inv_sqrt2, i_inv_sqrt2], array![inv_sqrt2, -i_inv_sqrt2])
    }

    /// Spin measurement along angle `theta` (radians) in the X–Z plane of the Bloch sphere.
    ///
    /// `theta = 0` is the Z basis and `theta = π/2` the X basis. On |Φ⁺⟩ two such
    /// measurements correlate as `cos(θa − θb)`.
    pub fn angle(theta: f64) -> Measurement {
        let (s, c) = (theta / 2.0).sin_cos();
        Self::projective(
            array![Complex64::new(c, 0.0), Complex64::new(s, 0.0)],
            array![Complex64::new(-s, 0.0), Complex64::new(c, 0.0)],
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementResult {
    /// Applied measurement operator index
    pub index: usize,
    /// Outcome label
    pub label: OutcomeLabel,
}
