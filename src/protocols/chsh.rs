//! CHSH inequality test on top of [`run_experiment`].

use super::bell::exact_correlation;
use crate::core::errors::ExperimentError;
use crate::experiment::{ExperimentConfig, prepare_state, run_experiment};
use crate::sampler::trial_seed;
use crate::statistics::{CLASSICAL_BOUND, ChshSettings, chsh_value};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChshReport {
    pub settings: ChshSettings,
    /// E(a,b), E(a,b′), E(a′,b), E(a′,b′) from the sampled trials
    pub correlations: [f64; 4],
    pub s_empirical: f64,
    /// S from Born-rule expectations on the prepared state
    pub s_exact: f64,
}

impl ChshReport {
    pub fn violates_classical_bound(&self) -> bool {
        self.s_empirical.abs() > CLASSICAL_BOUND
    }
}

/// Runs a CHSH experiment. The measurement settings of `config` must be the
/// four CHSH pairs in [`ChshSettings::pairs`] order on a two-qubit register.
pub fn run(config: &ExperimentConfig) -> Result<ChshReport, ExperimentError> {
    let settings = ChshSettings::from_pairs(&config.measurement_settings).ok_or_else(|| {
        ExperimentError::InvalidParameter(
            "measurement settings are not the four CHSH pairs".to_string(),
        )
    })?;
    if config.qubit_count != 2 {
        return Err(ExperimentError::InvalidParameter(format!(
            "CHSH needs two qubits, got {}",
            config.qubit_count
        )));
    }

    let result = run_experiment(config)?;

    let mut correlations = [0.0; 4];
    for (idx, e) in correlations.iter_mut().enumerate() {
        *e = result.correlation(idx).ok_or_else(|| {
            ExperimentError::InvalidParameter(format!("no correlation for setting {idx}"))
        })?;
    }

    let state = prepare_state(config)?;
    let mut exact = [0.0; 4];
    for (e, s) in exact.iter_mut().zip(settings.pairs()) {
        *e = exact_correlation(&state, s.alice, s.bob)?;
    }

    let report = ChshReport {
        settings,
        correlations,
        s_empirical: chsh_value(correlations),
        s_exact: chsh_value(exact),
    };

    debug!(
        target: "qplayground::chsh",
        s_empirical = report.s_empirical,
        s_exact = report.s_exact,
        "CHSH run complete"
    );

    Ok(report)
}

/// CHSH on |Φ⁺⟩ with the given settings.
pub fn run_bell_pair(
    settings: ChshSettings,
    trial_count: usize,
    seed: u64,
) -> Result<ChshReport, ExperimentError> {
    run(&ExperimentConfig::chsh(settings)
        .with_trials(trial_count)
        .with_seed(seed))
}

/// Reruns [`run_bell_pair`] for each value of b′, keeping a, a′ and b fixed.
///
/// Point `i` is sampled with its own seed derived from `seed`.
pub fn sweep_b_prime(
    settings: ChshSettings,
    b_primes: &[f64],
    trial_count: usize,
    seed: u64,
) -> Result<Vec<ChshReport>, ExperimentError> {
    b_primes
        .iter()
        .enumerate()
        .map(|(i, &b_prime)| {
            let point = ChshSettings { b_prime, ..settings };
            run_bell_pair(point, trial_count, trial_seed(seed, i, 0))
        })
        .collect()
}
