//! Single-qubit decoherence trajectories.

use crate::core::errors::ChannelError;
use crate::core::{ChannelKind, QuantumState};
use ndarray::Array2;
use num_complex::Complex64;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecoherencePoint {
    pub gamma: f64,
    #[serde(skip)]
    pub rho: Array2<Complex64>,
    /// |ρ01|
    pub coherence: f64,
    /// (ρ00, ρ11)
    pub populations: (f64, f64),
    pub bloch: (f64, f64, f64),
    pub purity: f64,
}

/// Applies `kind` at each strength in `gammas` to the pure state at Bloch
/// angles `(theta, phi)`.
///
/// Every point starts from the same initial state; the strengths are not
/// cumulative.
pub fn evolve_under_noise(
    theta: f64,
    phi: f64,
    gammas: &[f64],
    kind: ChannelKind,
) -> Result<Vec<DecoherencePoint>, ChannelError> {
    let rho0 = QuantumState::from_bloch(theta, phi).density_matrix();

    gammas
        .iter()
        .map(|&gamma| {
            let rho = kind.channel(gamma)?.apply_to(&rho0)?;
            Ok(DecoherencePoint {
                gamma,
                coherence: rho[[0, 1]].norm(),
                populations: (rho[[0, 0]].re, rho[[1, 1]].re),
                bloch: (
                    2.0 * rho[[0, 1]].re,
                    -2.0 * rho[[0, 1]].im,
                    (rho[[0, 0]] - rho[[1, 1]]).re,
                ),
                purity: rho.dot(&rho).diag().iter().map(|c| c.re).sum(),
                rho,
            })
        })
        .collect()
}
