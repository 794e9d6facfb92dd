use crate::core::Gate;
use crate::core::channels::{QuantumChannel, sum_kraus};
use crate::core::errors::{MeasurementError, StateError};
use crate::core::measurements::{Measurement, MeasurementResult};
use crate::core::utils::{self, find_duplicate, outer_product, trace};
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rand::Rng;
use tracing::{error, warn};

/// Largest register `initialize` accepts.
pub const MAX_QUBITS: usize = 2;

/// Largest register reachable by tensoring states together (teleportation uses 3).
pub const MAX_REGISTER_QUBITS: usize = 3;

/// Norm/trace drift rescaled silently after every operation.
pub const NORM_TOLERANCE: f64 = 1e-9;

/// Drift beyond this bound is treated as a kernel bug.
pub const INSTABILITY_THRESHOLD: f64 = 1e-3;

/// Amplitude vector or density matrix.
#[derive(Clone, Debug, PartialEq)]
pub enum StateRepr {
    Pure(Array1<Complex64>),
    Mixed(Array2<Complex64>),
}

/// State of a small qubit register.
///
/// Qubit `k` is bit `k` of the computational basis index, so qubit 0 is the
/// least significant bit.
#[derive(Clone, Debug, PartialEq)]
pub struct QuantumState {
    repr: StateRepr,
    num_qubits: usize,
}

impl QuantumState {
    /// Creates a pure computational basis state.
    ///
    /// `basis_label` is a bitstring where character `k` gives the value of qubit `k`,
    /// e.g. `"01"` is qubit 0 in |0⟩ and qubit 1 in |1⟩.
    pub fn initialize(qubit_count: usize, basis_label: &str) -> Result<Self, StateError> {
        if !(1..=MAX_QUBITS).contains(&qubit_count) {
            return Err(StateError::InvalidQubitCount(qubit_count));
        }

        let invalid = || StateError::InvalidBasisLabel {
            label: basis_label.to_string(),
            num_qubits: qubit_count,
        };

        if basis_label.len() != qubit_count {
            return Err(invalid());
        }

        let mut index = 0usize;
        for (qubit, ch) in basis_label.chars().enumerate() {
            match ch {
                '0' => {}
                '1' => index |= 1 << qubit,
                _ => return Err(invalid()),
            }
        }

        let mut amplitudes = Array1::<Complex64>::zeros(1 << qubit_count);
        amplitudes[index] = Complex64::new(1.0, 0.0);

        Ok(Self {
            repr: StateRepr::Pure(amplitudes),
            num_qubits: qubit_count,
        })
    }

    /// Single-qubit pure state from Bloch angles: `cos(θ/2)|0⟩ + e^{iφ} sin(θ/2)|1⟩`.
    pub fn from_bloch(theta: f64, phi: f64) -> Self {
        let amplitudes = Array1::from(vec![
            Complex64::new((theta / 2.0).cos(), 0.0),
            Complex64::from_polar((theta / 2.0).sin(), phi),
        ]);
        Self {
            repr: StateRepr::Pure(amplitudes),
            num_qubits: 1,
        }
    }

    /// |Φ⁺⟩ = (|00⟩ + |11⟩)/√2
    pub fn bell_phi_plus() -> Self {
        Self::two_qubit_bell([0, 3], 1.0)
    }

    /// Singlet |Ψ⁻⟩ = (|01⟩ − |10⟩)/√2
    pub fn singlet() -> Self {
        Self::two_qubit_bell([1, 2], -1.0)
    }

    fn two_qubit_bell(indices: [usize; 2], sign: f64) -> Self {
        let h = 1.0 / 2.0_f64.sqrt();
        let mut amplitudes = Array1::<Complex64>::zeros(4);
        amplitudes[indices[0]] = Complex64::new(h, 0.0);
        amplitudes[indices[1]] = Complex64::new(sign * h, 0.0);
        Self {
            repr: StateRepr::Pure(amplitudes),
            num_qubits: 2,
        }
    }

    /// Validates that the input vector is a valid quantum state.
    fn check_vector_state(vector: &Array1<Complex64>) -> Result<usize, StateError> {
        let dim = vector.len();

        if !dim.is_power_of_two() || dim < 2 {
            return Err(StateError::InvalidDimensions);
        }

        let norm_sqr: f64 = vector.iter().map(|c| c.norm_sqr()).sum();
        if (norm_sqr - 1.0).abs() > NORM_TOLERANCE {
            return Err(StateError::NotNormalized(norm_sqr));
        }

        Self::check_register_size(dim.trailing_zeros() as usize)
    }

    /// Checks the validity of a density matrix
    fn check_density_matrix(matrix: &Array2<Complex64>) -> Result<usize, StateError> {
        let (rows, cols) = matrix.dim();

        if rows != cols {
            return Err(StateError::DimensionMismatch {
                expected: rows,
                got_rows: rows,
                got_cols: cols,
            });
        }
        if !rows.is_power_of_two() || rows < 2 {
            return Err(StateError::InvalidDimensions);
        }

        let num_qubits = Self::check_register_size(rows.trailing_zeros() as usize)?;

        let tr = trace(matrix)?;
        if (tr - Complex64::new(1.0, 0.0)).norm() > NORM_TOLERANCE {
            return Err(StateError::InvalidTrace(tr));
        }

        if !utils::is_hermitian(matrix, NORM_TOLERANCE) {
            return Err(StateError::NotHermitian);
        }

        let min_eigenvalue = utils::min_hermitian_eigenvalue(matrix);
        if min_eigenvalue < -NORM_TOLERANCE {
            return Err(StateError::NotPositiveSemidefinite(min_eigenvalue));
        }

        Ok(num_qubits)
    }

    fn check_register_size(num_qubits: usize) -> Result<usize, StateError> {
        if num_qubits > MAX_REGISTER_QUBITS {
            return Err(StateError::InvalidQubitCount(num_qubits));
        }
        Ok(num_qubits)
    }

    /// Creates a QuantumState from a normalized amplitude vector.
    pub fn from_state_vector(vector: Array1<Complex64>) -> Result<Self, StateError> {
        let num_qubits = Self::check_vector_state(&vector)?;
        Ok(Self {
            repr: StateRepr::Pure(vector),
            num_qubits,
        })
    }

    /// Creates a QuantumState from a unit-trace, Hermitian, positive semidefinite matrix.
    pub fn from_density_matrix(matrix: Array2<Complex64>) -> Result<Self, StateError> {
        let num_qubits = Self::check_density_matrix(&matrix)?;
        Ok(Self {
            repr: StateRepr::Mixed(matrix),
            num_qubits,
        })
    }

    /// Checks if a QuantumState is valid.
    pub fn is_valid(&self) -> Result<(), StateError> {
        match &self.repr {
            StateRepr::Pure(v) => Self::check_vector_state(v).map(|_| ()),
            StateRepr::Mixed(m) => Self::check_density_matrix(m).map(|_| ()),
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn repr(&self) -> &StateRepr {
        &self.repr
    }

    pub fn is_pure(&self) -> bool {
        matches!(self.repr, StateRepr::Pure(_))
    }

    /// Amplitudes, if the state is still held in pure form.
    pub fn amplitudes(&self) -> Option<&Array1<Complex64>> {
        match &self.repr {
            StateRepr::Pure(v) => Some(v),
            StateRepr::Mixed(_) => None,
        }
    }

    /// Density matrix of the state (computed for pure states).
    pub fn density_matrix(&self) -> Array2<Complex64> {
        match &self.repr {
            StateRepr::Pure(v) => outer_product(v, v),
            StateRepr::Mixed(m) => m.clone(),
        }
    }

    /// Converts to density form, $\rho = |\psi\rangle\langle\psi|$. Idempotent.
    pub fn to_density_matrix(&self) -> Self {
        Self {
            repr: StateRepr::Mixed(self.density_matrix()),
            num_qubits: self.num_qubits,
        }
    }

    fn make_mixed(&mut self) {
        if let StateRepr::Pure(v) = &self.repr {
            self.repr = StateRepr::Mixed(outer_product(v, v));
        }
    }

    /// Register holding `self` on the low qubits and `other` on the following ones.
    pub fn tensor(&self, other: &QuantumState) -> Result<Self, StateError> {
        let num_qubits = self.num_qubits + other.num_qubits;
        if num_qubits > MAX_REGISTER_QUBITS {
            return Err(StateError::InvalidQubitCount(num_qubits));
        }

        // Qubit 0 is the low bit, so `other` is the left Kronecker factor
        let repr = match (&self.repr, &other.repr) {
            (StateRepr::Pure(a), StateRepr::Pure(b)) => {
                StateRepr::Pure(utils::kronecker_vector(b, a))
            }
            _ => StateRepr::Mixed(utils::kronecker_product(
                &other.density_matrix(),
                &self.density_matrix(),
            )),
        };

        Ok(Self { repr, num_qubits })
    }

    /// Checks if a given index is within the register
    fn validate_qubit_index(&self, index: usize) -> Result<(), StateError> {
        if index >= self.num_qubits {
            return Err(StateError::IndexOutOfBounds {
                index,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }

    /// Apply an operator already expanded to the whole register
    fn apply_operator(&mut self, u: &Array2<Complex64>) -> Result<(), StateError> {
        let (rows, cols) = u.dim();
        let dim = 1 << self.num_qubits;

        if rows != dim || cols != dim {
            return Err(StateError::DimensionMismatch {
                expected: dim,
                got_rows: rows,
                got_cols: cols,
            });
        }

        self.repr = match &self.repr {
            StateRepr::Pure(v) => StateRepr::Pure(u.dot(v)),
            StateRepr::Mixed(rho) => StateRepr::Mixed(u.dot(rho).dot(&utils::dagger(u))),
        };

        Ok(())
    }

    /// Applies non controlled quantum gate
    pub fn apply(&mut self, gate: &Gate, target_qubits: &[usize]) -> Result<(), StateError> {
        self.apply_controlled(gate, target_qubits, None)
    }

    /// Applies generic quantum gate, then renormalizes.
    pub fn apply_controlled(
        &mut self,
        gate: &Gate,
        target_qubits: &[usize],
        control_qubits: Option<&[usize]>,
    ) -> Result<(), StateError> {
        if gate.num_qubits != target_qubits.len() {
            return Err(StateError::GateArityMismatch {
                expected: gate.num_qubits,
                got: target_qubits.len(),
            });
        }

        let controls = control_qubits.unwrap_or(&[]);
        if gate.num_qubits + controls.len() > self.num_qubits {
            let gate_dim = 1 << (gate.num_qubits + controls.len());
            return Err(StateError::DimensionMismatch {
                expected: 1 << self.num_qubits,
                got_rows: gate_dim,
                got_cols: gate_dim,
            });
        }

        for &q in target_qubits.iter().chain(controls) {
            self.validate_qubit_index(q)?;
        }

        let full_gate_operator = Gate::expand_gate(self.num_qubits, gate, target_qubits, controls)?;

        self.apply_operator(&full_gate_operator.matrix)?;
        self.renormalize()
    }

    /// Apply QuantumChannel to the target qubits. The state becomes mixed.
    pub fn apply_channel(
        &mut self,
        channel: &QuantumChannel,
        target_qubits: &[usize],
    ) -> Result<(), StateError> {
        for &q in target_qubits {
            self.validate_qubit_index(q)?;
        }

        let ops = channel.get_expanded_operators(self.num_qubits, target_qubits)?;

        self.make_mixed();
        if let StateRepr::Mixed(rho) = &self.repr {
            self.repr = StateRepr::Mixed(sum_kraus(&ops, rho));
        }

        self.renormalize()
    }

    /// Rescales norm (pure) or trace (mixed) back to one.
    ///
    /// Drift above [`INSTABILITY_THRESHOLD`] is reported as `NumericalInstability`.
    pub fn renormalize(&mut self) -> Result<(), StateError> {
        let norm = match &self.repr {
            StateRepr::Pure(v) => v.iter().map(|c| c.norm_sqr()).sum::<f64>(),
            StateRepr::Mixed(rho) => trace(rho)?.re,
        };

        let drift = (norm - 1.0).abs();
        if !drift.is_finite() || drift > INSTABILITY_THRESHOLD {
            error!(
                target: "qplayground::state",
                drift,
                num_qubits = self.num_qubits,
                "numerical instability: state norm drifted"
            );
            return Err(StateError::NumericalInstability { drift });
        }

        if drift > 0.0 {
            match &mut self.repr {
                StateRepr::Pure(v) => {
                    let scale = norm.sqrt();
                    v.mapv_inplace(|c| c / scale);
                }
                StateRepr::Mixed(rho) => rho.mapv_inplace(|c| c / norm),
            }
        }

        Ok(())
    }

    /// Born-rule probability of each measurement operator on `target_qubits`.
    ///
    /// Also returns the operators expanded to the whole register.
    pub fn set_measurement(
        &self,
        measurement: &Measurement,
        target_qubits: &[usize],
    ) -> Result<(Vec<f64>, Vec<Array2<Complex64>>), StateError> {
        for &q in target_qubits {
            self.validate_qubit_index(q)?;
        }

        if let Some(dup) = find_duplicate(target_qubits) {
            return Err(MeasurementError::DuplicateQubit(dup).into());
        }

        let expanded_ops = measurement.get_expanded_operators(self.num_qubits, target_qubits)?;

        let mut probs = Vec::with_capacity(expanded_ops.len());
        for op in &expanded_ops {
            let p_k = match &self.repr {
                StateRepr::Pure(v) => op.dot(v).iter().map(|c| c.norm_sqr()).sum::<f64>(),
                StateRepr::Mixed(rho) => trace(&op.dot(rho).dot(&utils::dagger(op)))?.re,
            };

            if p_k < -NORM_TOLERANCE {
                warn!(
                    target: "qplayground::state",
                    probability = p_k,
                    "clamping negative outcome probability"
                );
            }
            probs.push(p_k.max(0.0));
        }

        let sum: f64 = probs.iter().sum();
        if (sum - 1.0).abs() > NORM_TOLERANCE {
            return Err(MeasurementError::NormalizationError(sum).into());
        }

        for p in &mut probs {
            *p /= sum;
        }

        Ok((probs, expanded_ops))
    }

    /// Physical measurement which changes the state irretrievably
    pub fn measure<R: Rng + ?Sized>(
        &mut self,
        measurement: &Measurement,
        target_qubits: &[usize],
        rng: &mut R,
    ) -> Result<MeasurementResult, StateError> {
        let (probs, ops) = self.set_measurement(measurement, target_qubits)?;

        let outcome_idx = pick_outcome(&probs, rng);
        let p_selected = probs[outcome_idx];
        if p_selected <= 1e-12 {
            return Err(StateError::InvalidTrace(Complex64::new(p_selected, 0.0)));
        }

        let m_k = &ops[outcome_idx];
        self.repr = match &self.repr {
            // |ψ'⟩ = M_k|ψ⟩ / √p_k
            StateRepr::Pure(v) => {
                let scale = p_selected.sqrt();
                StateRepr::Pure(m_k.dot(v).mapv(|c| c / scale))
            }
            // ρ' = M_k ρ M_k† / p_k
            StateRepr::Mixed(rho) => StateRepr::Mixed(
                m_k.dot(rho)
                    .dot(&utils::dagger(m_k))
                    .mapv(|c| c / p_selected),
            ),
        };
        self.renormalize()?;

        Ok(MeasurementResult {
            index: outcome_idx,
            label: measurement.labels[outcome_idx].clone(),
        })
    }

    /// Reduced 2x2 density matrix of one qubit.
    pub fn reduced_state(&self, qubit: usize) -> Result<Array2<Complex64>, StateError> {
        self.validate_qubit_index(qubit)?;
        Ok(utils::partial_trace(&self.density_matrix(), qubit)?)
    }

    /// Bloch vector `(x, y, z)` of one qubit's reduced state.
    pub fn bloch_vector(&self, qubit: usize) -> Result<(f64, f64, f64), StateError> {
        let rho = self.reduced_state(qubit)?;
        let x = 2.0 * rho[[0, 1]].re;
        let y = -2.0 * rho[[0, 1]].im;
        let z = (rho[[0, 0]] - rho[[1, 1]]).re;
        Ok((x, y, z))
    }

    /// $\mathrm{tr}(\rho^2)$, one for pure states.
    pub fn purity(&self) -> Result<f64, StateError> {
        match &self.repr {
            StateRepr::Pure(_) => Ok(1.0),
            StateRepr::Mixed(rho) => Ok(trace(&rho.dot(rho))?.re),
        }
    }

    /// Fidelity with another state of the same register size.
    pub fn fidelity(&self, other: &QuantumState) -> Result<f64, StateError> {
        if self.num_qubits != other.num_qubits {
            let dim = 1 << other.num_qubits;
            return Err(StateError::DimensionMismatch {
                expected: 1 << self.num_qubits,
                got_rows: dim,
                got_cols: dim,
            });
        }
        let f = match (&self.repr, &other.repr) {
            (StateRepr::Pure(psi), _) => utils::pure_state_fidelity(psi, &other.density_matrix())?,
            (_, StateRepr::Pure(psi)) => utils::pure_state_fidelity(psi, &self.density_matrix())?,
            (StateRepr::Mixed(a), StateRepr::Mixed(b)) => utils::fidelity(a, b)?,
        };
        Ok(f)
    }
}

/// Randomly selects an outcome index weighted by `probs`.
pub(crate) fn pick_outcome<R: Rng + ?Sized>(probs: &[f64], rng: &mut R) -> usize {
    let roll: f64 = rng.random();

    let mut cumulative = 0.0;
    for (i, &p) in probs.iter().enumerate() {
        cumulative += p;
        if roll < cumulative {
            return i;
        }
    }
    // Round-off can leave the CDF just below one; fall back to the last possible outcome
    probs.iter().rposition(|&p| p > 0.0).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::PI;

    #[test]
    fn test_initialize_validates_count_and_label() {
        let state = QuantumState::initialize(2, "01").unwrap();
        let amps = state.amplitudes().unwrap();
        assert_eq!(amps[2], Complex64::new(1.0, 0.0));

        assert_eq!(
            QuantumState::initialize(0, "").unwrap_err(),
            StateError::InvalidQubitCount(0)
        );
        assert_eq!(
            QuantumState::initialize(3, "000").unwrap_err(),
            StateError::InvalidQubitCount(3)
        );
        assert!(matches!(
            QuantumState::initialize(2, "0"),
            Err(StateError::InvalidBasisLabel { .. })
        ));
        assert!(matches!(
            QuantumState::initialize(1, "+"),
            Err(StateError::InvalidBasisLabel { .. })
        ));
    }

    #[test]
    fn test_h_then_cnot_prepares_bell_state() {
        let mut state = QuantumState::initialize(2, "00").unwrap();
        state.apply(&Gate::h(), &[0]).unwrap();
        state.apply(&Gate::cnot(), &[0, 1]).unwrap();
        assert_relative_eq!(
            state.fidelity(&QuantumState::bell_phi_plus()).unwrap(),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_apply_rejects_arity_and_size() {
        let mut one = QuantumState::initialize(1, "0").unwrap();
        assert_eq!(
            one.apply(&Gate::h(), &[0, 1]).unwrap_err(),
            StateError::GateArityMismatch {
                expected: 1,
                got: 2
            }
        );
        assert!(matches!(
            one.apply(&Gate::cnot(), &[0, 1]),
            Err(StateError::DimensionMismatch { expected: 2, .. })
        ));

        let mut two = QuantumState::initialize(2, "00").unwrap();
        assert!(matches!(
            two.apply(&Gate::x(), &[2]),
            Err(StateError::IndexOutOfBounds { index: 2, .. })
        ));
    }

    #[test]
    fn test_to_density_matrix_is_idempotent() {
        let state = QuantumState::from_bloch(PI / 3.0, PI / 5.0);
        let rho = state.to_density_matrix();
        assert!(!rho.is_pure());
        assert_eq!(rho.to_density_matrix(), rho);
        assert_relative_eq!(rho.purity().unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gates_agree_on_pure_and_mixed_forms() {
        let mut pure = QuantumState::from_bloch(0.7, 1.9);
        let mut mixed = pure.to_density_matrix();
        for gate in [Gate::h(), Gate::ry(0.4), Gate::s(), Gate::rx(2.2)] {
            pure.apply(&gate, &[0]).unwrap();
            mixed.apply(&gate, &[0]).unwrap();
        }
        assert!(utils::approx_eq(&pure.density_matrix(), &mixed.density_matrix(), 1e-12).unwrap());
    }

    #[test]
    fn test_renormalize_rescales_small_drift_and_rejects_large() {
        let mut state = QuantumState {
            repr: StateRepr::Pure(Array1::from(vec![
                Complex64::new(1.0 + 1e-6, 0.0),
                Complex64::new(0.0, 0.0),
            ])),
            num_qubits: 1,
        };
        state.renormalize().unwrap();
        assert!(state.is_valid().is_ok());

        let mut broken = QuantumState {
            repr: StateRepr::Mixed(Array2::eye(2)),
            num_qubits: 1,
        };
        assert!(matches!(
            broken.renormalize(),
            Err(StateError::NumericalInstability { .. })
        ));
    }

    #[test]
    fn test_from_density_matrix_requires_hermitian_psd() {
        let c = |re: f64, im: f64| Complex64::new(re, im);

        let negative = ndarray::array![[c(1.5, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(-0.5, 0.0)]];
        assert_eq!(
            QuantumState::from_density_matrix(negative).unwrap_err(),
            StateError::NotPositiveSemidefinite(-0.5)
        );

        let skewed = ndarray::array![[c(0.5, 0.0), c(0.3, 0.0)], [c(-0.3, 0.0), c(0.5, 0.0)]];
        assert_eq!(
            QuantumState::from_density_matrix(skewed).unwrap_err(),
            StateError::NotHermitian
        );

        let tampered = QuantumState {
            repr: StateRepr::Mixed(ndarray::array![
                [c(0.5, 0.0), c(0.9, 0.0)],
                [c(0.9, 0.0), c(0.5, 0.0)]
            ]),
            num_qubits: 1,
        };
        assert!(matches!(
            tampered.is_valid(),
            Err(StateError::NotPositiveSemidefinite(_))
        ));

        let plus = QuantumState::from_bloch(PI / 2.0, 0.0).density_matrix();
        assert!(QuantumState::from_density_matrix(plus).is_ok());
    }

    #[test]
    fn test_bloch_vector_and_amplitude_damping() {
        let mut state = QuantumState::from_bloch(PI / 2.0, 0.0);
        let (x, y, z) = state.bloch_vector(0).unwrap();
        assert_relative_eq!(x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(z, 0.0, epsilon = 1e-12);

        state
            .apply_channel(&QuantumChannel::amplitude_damping(1.0).unwrap(), &[0])
            .unwrap();
        let (_, _, z) = state.bloch_vector(0).unwrap();
        assert_relative_eq!(z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tensor_orders_qubits_low_first() {
        let one = QuantumState::initialize(1, "1").unwrap();
        let zero = QuantumState::initialize(1, "0").unwrap();
        let joint = one.tensor(&zero).unwrap();
        assert_eq!(joint, QuantumState::initialize(2, "10").unwrap());

        let big = joint.tensor(&zero).unwrap();
        assert_eq!(big.num_qubits(), 3);
        assert!(matches!(
            big.tensor(&zero),
            Err(StateError::InvalidQubitCount(4))
        ));
    }

    #[test]
    fn test_measure_collapses_bell_partner() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let mut state = QuantumState::bell_phi_plus();
            let first = state.measure(&Measurement::z_basis(), &[0], &mut rng).unwrap();
            let second = state.measure(&Measurement::z_basis(), &[1], &mut rng).unwrap();
            assert_eq!(first.label, second.label);
        }
    }

    #[test]
    fn test_set_measurement_on_mixed_state() {
        let mut state = QuantumState::from_bloch(PI / 2.0, 0.0);
        state
            .apply_channel(&QuantumChannel::depolarizing(0.5).unwrap(), &[0])
            .unwrap();
        let (probs, _) = state.set_measurement(&Measurement::x_basis(), &[0]).unwrap();
        assert_relative_eq!(probs[0], 0.75, epsilon = 1e-12);
        assert_relative_eq!(probs.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }
}
