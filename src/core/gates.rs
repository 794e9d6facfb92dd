use crate::core::errors::GateError;
use crate::core::utils;
use ndarray::{Array2, arr2};
use num_complex::Complex64;
use std::f64::consts::PI;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// Represents a quantum gate.
///
/// A gate is defined by its unitary matrix and the number of qubits it acts on.
#[derive(Clone, Debug)]
pub struct Gate {
    /// Display name, e.g. `"h"` or `"ry"`.
    pub name: String,
    /// The unitary matrix of the gate.
    pub matrix: Array2<Complex64>,
    /// The number of qubits the gate acts on.
    pub num_qubits: usize,
}

impl Gate {
    /// Creates a new `Gate` from a unitary matrix.
    ///
    /// # Arguments
    ///
    /// * `matrix` - A square, unitary `Array2<Complex64>`.
    ///
    /// # Errors
    ///
    /// Returns a `GateError` if:
    /// - The matrix is not square.
    /// - The matrix dimensions are not a power of 2.
    /// - The matrix is not unitary.
    pub fn new(matrix: Array2<Complex64>) -> Result<Self, GateError> {
        Self::named("custom", matrix)
    }

    /// Same as [`Gate::new`] with an explicit name.
    pub fn named(name: impl Into<String>, matrix: Array2<Complex64>) -> Result<Self, GateError> {
        let (rows, cols) = matrix.dim();

        if rows != cols {
            return Err(GateError::NotSquareMatrix);
        }

        if !rows.is_power_of_two() || rows < 2 {
            return Err(GateError::InvalidDimensions);
        }

        if !Self::check_unitary(&matrix) {
            return Err(GateError::NonUnitary);
        }

        Ok(Self::standard(name, matrix))
    }

    /// Builds a gate from a matrix known to be unitary.
    fn standard(name: impl Into<String>, matrix: Array2<Complex64>) -> Self {
        let num_qubits = matrix.nrows().trailing_zeros() as usize;
        Self {
            name: name.into(),
            matrix,
            num_qubits,
        }
    }

    /// Checks if a given matrix is unitary
    fn check_unitary(matrix: &Array2<Complex64>) -> bool {
        let eye = Array2::<Complex64>::eye(matrix.nrows());
        let product = matrix.dot(&utils::dagger(matrix));

        product
            .iter()
            .zip(eye.iter())
            .all(|(a, b)| (*a - *b).norm() < 1e-9)
    }

    /// Expands a gate to act on a larger system of qubits.
    ///
    /// This function creates a new gate that acts on `num_total_qubits` by applying the original `gate`
    /// to the specified `targets` and `controls` (if any), and Identity on the rest.
    ///
    /// # Errors
    ///
    /// Returns `GateError` if:
    /// - `targets` does not match the gate's arity.
    /// - A target or control lies outside the register.
    /// - Duplicate indices are found in `targets` or `controls`.
    /// - A qubit is used as both control and target.
    pub fn expand_gate(
        num_total_qubits: usize,
        gate: &Gate,
        targets: &[usize],
        controls: &[usize],
    ) -> Result<Gate, GateError> {
        if targets.len() != gate.num_qubits {
            return Err(GateError::ArityMismatch {
                expected: gate.num_qubits,
                got: targets.len(),
            });
        }

        if let Some(&index) = targets
            .iter()
            .chain(controls)
            .find(|&&q| q >= num_total_qubits)
        {
            return Err(GateError::QubitOutOfRange {
                index,
                num_qubits: num_total_qubits,
            });
        }

        if let Some(dup) = utils::find_duplicate(targets) {
            return Err(GateError::DuplicateQubit(dup));
        }

        if let Some(dup) = utils::find_duplicate(controls) {
            return Err(GateError::DuplicateQubit(dup));
        }

        if let Some(&c) = controls.iter().find(|c| targets.contains(c)) {
            return Err(GateError::ControlTargetOverlap(c));
        }

        Ok(Gate {
            name: gate.name.clone(),
            matrix: utils::expand_operator(num_total_qubits, &gate.matrix, targets, controls),
            num_qubits: num_total_qubits,
        })
    }

    /// Resolves a gate by name, as used in experiment gate sequences.
    ///
    /// Rotation gates (`rx`, `ry`, `rz`, `phase`) take one angle in radians;
    /// every other gate takes none. Names are case-insensitive.
    pub fn from_name(name: &str, params: &[f64]) -> Result<Gate, GateError> {
        let lower = name.to_ascii_lowercase();
        let expected = match lower.as_str() {
            "rx" | "ry" | "rz" | "phase" | "p" => 1,
            _ => 0,
        };
        if params.len() != expected {
            return Err(GateError::InvalidParameter {
                gate: lower,
                expected,
                got: params.len(),
            });
        }
        if let Some(&value) = params.iter().find(|p| !p.is_finite()) {
            return Err(GateError::NonFiniteParameter { gate: lower, value });
        }

        let gate = match lower.as_str() {
            "i" | "id" => Gate::i(),
            "x" => Gate::x(),
            "y" => Gate::y(),
            "z" => Gate::z(),
            "h" => Gate::h(),
            "s" => Gate::s(),
            "t" => Gate::t_gate(),
            "rx" => Gate::rx(params[0]),
            "ry" => Gate::ry(params[0]),
            "rz" => Gate::rz(params[0]),
            "phase" | "p" => Gate::phase(params[0]),
            "cnot" | "cx" => Gate::cnot(),
            "cz" => Gate::cz(),
            "swap" => Gate::swap(),
            _ => return Err(GateError::UnknownGate(name.to_string())),
        };
        Ok(gate)
    }

    // --- Standard Gates ---

    /// Creates an Identity gate.
    pub fn i() -> Gate {
        Gate::standard("i", Array2::eye(2))
    }

    /// Creates a Pauli-X gate (NOT gate).
    pub fn x() -> Gate {
        Gate::standard("x", arr2(&[[ZERO, ONE], [ONE, ZERO]]))
    }

    /// Creates a Pauli-Y gate.
    pub fn y() -> Gate {
        Gate::standard(
            "y",
            arr2(&[
                [ZERO, Complex64::new(0.0, -1.0)],
                [Complex64::new(0.0, 1.0), ZERO],
            ]),
        )
    }

    /// Creates a Pauli-Z gate.
    pub fn z() -> Gate {
        Gate::standard("z", arr2(&[[ONE, ZERO], [ZERO, -ONE]]))
    }

    /// Creates a Hadamard gate.
    pub fn h() -> Gate {
        let f = Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0);
        Gate::standard("h", arr2(&[[f, f], [f, -f]]))
    }

    /// Creates an S gate (Phase gate, Z^1/2).
    pub fn s() -> Gate {
        Gate::standard("s", arr2(&[[ONE, ZERO], [ZERO, Complex64::new(0.0, 1.0)]]))
    }

    /// Creates a T gate (Z^1/4).
    pub fn t_gate() -> Gate {
        let mut gate = Gate::phase(PI / 4.0);
        gate.name = "t".to_string();
        gate
    }

    /// Phase shift `diag(1, e^{iφ})`.
    pub fn phase(phi: f64) -> Gate {
        Gate::standard("phase", arr2(&[[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, phi)]]))
    }

    /// Rotation about the X axis of the Bloch sphere.
    pub fn rx(theta: f64) -> Gate {
        let (s, c) = (theta / 2.0).sin_cos();
        Gate::standard(
            "rx",
            arr2(&[
                [Complex64::new(c, 0.0), Complex64::new(0.0, -s)],
                [Complex64::new(0.0, -s), Complex64::new(c, 0.0)],
            ]),
        )
    }

    /// Rotation about the Y axis of the Bloch sphere.
    pub fn ry(theta: f64) -> Gate {
        let (s, c) = (theta / 2.0).sin_cos();
        Gate::standard(
            "ry",
            arr2(&[
                [Complex64::new(c, 0.0), Complex64::new(-s, 0.0)],
                [Complex64::new(s, 0.0), Complex64::new(c, 0.0)],
            ]),
        )
    }

    /// Rotation about the Z axis of the Bloch sphere.
    pub fn rz(theta: f64) -> Gate {
        Gate::standard(
            "rz",
            arr2(&[
                [Complex64::from_polar(1.0, -theta / 2.0), ZERO],
                [ZERO, Complex64::from_polar(1.0, theta / 2.0)],
            ]),
        )
    }

    /// Creates a CNOT (Controlled-NOT) gate. Local qubit 0 is the control.
    pub fn cnot() -> Gate {
        Gate::standard("cnot", utils::expand_operator(2, &Gate::x().matrix, &[1], &[0]))
    }

    /// Controlled-Z, symmetric in its two qubits.
    pub fn cz() -> Gate {
        Gate::standard("cz", utils::expand_operator(2, &Gate::z().matrix, &[1], &[0]))
    }

    /// Creates a SWAP gate.
    pub fn swap() -> Gate {
        let mut matrix = Array2::<Complex64>::zeros((4, 4));
        matrix[[0, 0]] = ONE;
        matrix[[1, 2]] = ONE;
        matrix[[2, 1]] = ONE;
        matrix[[3, 3]] = ONE;
        Gate::standard("swap", matrix)
    }
}
