//! Three-qubit teleportation of a single-qubit state.
//!
//! Qubit 0 holds the input state, qubits 1 (Alice) and 2 (Bob) the shared
//! pair. Alice measures qubits 0 and 1 in Z; Bob applies X^m1 then Z^m0.

use crate::core::errors::{ExperimentError, StateError};
use crate::core::{Gate, Measurement, QuantumChannel, QuantumState};
use crate::sampler::outcome_probabilities;
use ndarray::Array2;
use num_complex::Complex64;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

/// One teleportation shot.
#[derive(Debug, Clone, PartialEq)]
pub struct TeleportationRun {
    pub m0: u8,
    pub m1: u8,
    /// P(m0, m1) indexed by `2 * m0 + m1`
    pub branch_probabilities: [f64; 4],
    /// Bob's reduced state after correction
    pub bob_state: Array2<Complex64>,
    /// ⟨ψ|ρ_Bob|ψ⟩
    pub fidelity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeleportationBatch {
    /// Shots per measurement branch, indexed by `2 * m0 + m1`
    pub counts: [usize; 4],
    pub mean_fidelity: f64,
}

/// Teleports `cos(θ/2)|0⟩ + e^{iφ} sin(θ/2)|1⟩` once.
///
/// `noise`, when given, hits each qubit of the shared pair after it is created.
pub fn teleport_once<R: Rng + ?Sized>(
    theta: f64,
    phi: f64,
    noise: Option<&QuantumChannel>,
    rng: &mut R,
) -> Result<TeleportationRun, StateError> {
    let input = QuantumState::from_bloch(theta, phi);
    let mut state = input.tensor(&QuantumState::initialize(2, "00")?)?;

    state.apply(&Gate::h(), &[1])?;
    state.apply(&Gate::cnot(), &[1, 2])?;

    if let Some(channel) = noise {
        state.apply_channel(channel, &[1])?;
        state.apply_channel(channel, &[2])?;
    }

    state.apply(&Gate::cnot(), &[0, 1])?;
    state.apply(&Gate::h(), &[0])?;

    let bell_measurement = Measurement::z_basis().tensor(&Measurement::z_basis());
    let probs = outcome_probabilities(&state, &bell_measurement, &[0, 1])?;
    let mut branch_probabilities = [0.0; 4];
    for (label, p) in &probs {
        branch_probabilities[branch_index(bit(label[0]), bit(label[1]))] = *p;
    }

    let outcome = state.measure(&bell_measurement, &[0, 1], rng)?;
    let (m0, m1) = (bit(outcome.label[0]), bit(outcome.label[1]));

    if m1 == 1 {
        state.apply(&Gate::x(), &[2])?;
    }
    if m0 == 1 {
        state.apply(&Gate::z(), &[2])?;
    }

    let bob_state = state.reduced_state(2)?;
    let fidelity = input.fidelity(&QuantumState::from_density_matrix(bob_state.clone())?)?;

    Ok(TeleportationRun {
        m0,
        m1,
        branch_probabilities,
        bob_state,
        fidelity,
    })
}

/// Runs `shots` teleportations of the same input state.
pub fn run_batch<R: Rng + ?Sized>(
    theta: f64,
    phi: f64,
    shots: usize,
    noise: Option<&QuantumChannel>,
    rng: &mut R,
) -> Result<TeleportationBatch, ExperimentError> {
    if shots == 0 {
        return Err(ExperimentError::InvalidParameter(
            "shots must be positive".to_string(),
        ));
    }

    let mut counts = [0usize; 4];
    let mut fidelity_sum = 0.0;
    for _ in 0..shots {
        let run = teleport_once(theta, phi, noise, rng)?;
        counts[branch_index(run.m0, run.m1)] += 1;
        fidelity_sum += run.fidelity;
    }

    let batch = TeleportationBatch {
        counts,
        mean_fidelity: fidelity_sum / shots as f64,
    };
    debug!(
        target: "qplayground::teleportation",
        shots,
        mean_fidelity = batch.mean_fidelity,
        noisy = noise.is_some(),
        "teleportation batch complete"
    );
    Ok(batch)
}

/// Z eigenvalue +1 is bit 0, −1 is bit 1.
fn bit(eigenvalue: i8) -> u8 {
    u8::from(eigenvalue < 0)
}

fn branch_index(m0: u8, m1: u8) -> usize {
    2 * usize::from(m0) + usize::from(m1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_ideal_teleportation_is_perfect() {
        let mut rng = StdRng::seed_from_u64(4);
        for (theta, phi) in [(0.0, 0.0), (1.2, 0.7), (std::f64::consts::PI, 2.0), (2.5, -1.0)] {
            let run = teleport_once(theta, phi, None, &mut rng).unwrap();
            assert_relative_eq!(run.fidelity, 1.0, epsilon = 1e-9);
            for p in run.branch_probabilities {
                assert_relative_eq!(p, 0.25, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_bob_state_matches_input() {
        let mut rng = StdRng::seed_from_u64(10);
        let run = teleport_once(1.0, 0.5, None, &mut rng).unwrap();
        let expected = QuantumState::from_bloch(1.0, 0.5).density_matrix();
        for (a, b) in run.bob_state.iter().zip(expected.iter()) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-9);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_noise_reduces_fidelity() {
        let channel = QuantumChannel::depolarizing(0.3).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let batch = run_batch(1.0, 0.3, 200, Some(&channel), &mut rng).unwrap();
        assert!(batch.mean_fidelity < 0.99);
        assert!(batch.mean_fidelity > 0.5);
        assert_eq!(batch.counts.iter().sum::<usize>(), 200);
    }

    #[test]
    fn test_batch_counts_cover_all_branches() {
        let mut rng = StdRng::seed_from_u64(6);
        let batch = run_batch(0.8, 0.0, 400, None, &mut rng).unwrap();
        assert!(batch.counts.iter().all(|&c| c > 50));
        assert_relative_eq!(batch.mean_fidelity, 1.0, epsilon = 1e-9);
        assert!(run_batch(0.8, 0.0, 0, None, &mut rng).is_err());
    }
}
