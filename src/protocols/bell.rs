//! Two-party correlation measurements on an entangled pair.

use crate::core::errors::ExperimentError;
use crate::core::{OutcomeLabel, QuantumState};
use crate::experiment::{Setting, measurement_for};
use crate::sampler::{OutcomeDistribution, outcome_probabilities};
use crate::statistics::theoretical_correlation;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;

/// Joint probability of each `(r, s)` outcome pair when Alice measures qubit 0
/// along `theta_a` and Bob measures qubit 1 along `theta_b`.
pub fn joint_probabilities(
    state: &QuantumState,
    theta_a: f64,
    theta_b: f64,
) -> Result<BTreeMap<OutcomeLabel, f64>, ExperimentError> {
    let measurement = measurement_for(&Setting::new(theta_a, theta_b), 2)?;
    Ok(outcome_probabilities(state, &measurement, &[0, 1])?)
}

/// Exact ⟨A ⊗ B⟩ = Σ r·s·P(r, s).
pub fn exact_correlation(
    state: &QuantumState,
    theta_a: f64,
    theta_b: f64,
) -> Result<f64, ExperimentError> {
    let probs = joint_probabilities(state, theta_a, theta_b)?;
    Ok(probs
        .iter()
        .map(|(label, p)| label.iter().map(|&v| f64::from(v)).product::<f64>() * p)
        .sum())
}

/// Draws `trials` outcome pairs `(r, s)`.
pub fn sample_outcomes<R: Rng + ?Sized>(
    state: &QuantumState,
    theta_a: f64,
    theta_b: f64,
    trials: usize,
    rng: &mut R,
) -> Result<Vec<(i8, i8)>, ExperimentError> {
    let measurement = measurement_for(&Setting::new(theta_a, theta_b), 2)?;
    let distribution = OutcomeDistribution::new(state, &measurement, &[0, 1])?;

    Ok((0..trials)
        .map(|_| {
            let label = distribution.sample(rng);
            (label[0], label[1])
        })
        .collect())
}

/// Mean of r·s, `None` without samples.
pub fn empirical_correlation(samples: &[(i8, i8)]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let sum: i64 = samples.iter().map(|&(r, s)| i64::from(r) * i64::from(s)).sum();
    Some(sum as f64 / samples.len() as f64)
}

/// Correlation estimate after each sample, for convergence plots.
pub fn running_correlation(samples: &[(i8, i8)]) -> Vec<f64> {
    samples
        .iter()
        .scan(0i64, |acc, &(r, s)| {
            *acc += i64::from(r) * i64::from(s);
            Some(*acc)
        })
        .enumerate()
        .map(|(i, sum)| sum as f64 / (i + 1) as f64)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationPoint {
    /// θb − θa
    pub delta: f64,
    pub empirical: f64,
    /// Born-rule expectation on the measured state
    pub exact: f64,
    /// cos(Δ), the |Φ⁺⟩ prediction
    pub theoretical: f64,
}

/// Sweeps Bob's angle over `theta_a + delta` for each delta.
pub fn sweep_correlation<R: Rng + ?Sized>(
    state: &QuantumState,
    theta_a: f64,
    deltas: &[f64],
    trials_each: usize,
    rng: &mut R,
) -> Result<Vec<CorrelationPoint>, ExperimentError> {
    if trials_each == 0 {
        return Err(ExperimentError::InvalidParameter(
            "trials_each must be positive".to_string(),
        ));
    }

    deltas
        .iter()
        .map(|&delta| {
            let theta_b = theta_a + delta;
            let samples = sample_outcomes(state, theta_a, theta_b, trials_each, rng)?;
            Ok(CorrelationPoint {
                delta,
                empirical: empirical_correlation(&samples).unwrap_or(0.0),
                exact: exact_correlation(state, theta_a, theta_b)?,
                theoretical: theoretical_correlation(theta_a, theta_b),
            })
        })
        .collect()
}
