use super::config::{ExperimentConfig, Setting};
use super::result::{ExperimentResult, ResultAggregator, Trial};
use crate::core::errors::{ExperimentError, StateError};
use crate::core::{ChannelKind, Gate, Measurement, QuantumState};
use crate::sampler::{OutcomeDistribution, trial_rng};
use rayon::prelude::*;
use tracing::debug;

/// Runs one experiment end to end.
///
/// The register starts in |0…0⟩, goes through the gate sequence and the noise
/// steps, and is then sampled `trial_count` times per measurement setting.
/// Trial `t` of setting `s` draws from its own generator seeded from
/// `(seed, s, t)`, so serial and parallel runs produce identical results.
pub fn run_experiment(config: &ExperimentConfig) -> Result<ExperimentResult, ExperimentError> {
    config.validate()?;

    debug!(
        target: "qplayground::experiment",
        qubits = config.qubit_count,
        gates = config.gate_sequence.len(),
        noise = config.noise.len(),
        settings = config.measurement_settings.len(),
        trials = config.trial_count,
        seed = config.seed,
        parallel = config.parallel,
        "starting experiment"
    );

    let state = prepare_state(config)?;
    let targets: Vec<usize> = (0..config.qubit_count).collect();

    let mut aggregator = ResultAggregator::new(
        config.measurement_settings.clone(),
        config.qubit_count,
        config.seed,
    );

    for (setting_index, setting) in config.measurement_settings.iter().enumerate() {
        let measurement = measurement_for(setting, config.qubit_count)?;
        let distribution = OutcomeDistribution::new(&state, &measurement, &targets)?;

        debug!(
            target: "qplayground::experiment",
            setting_index,
            alice = setting.alice,
            bob = setting.bob,
            probabilities = ?distribution.probabilities(),
            "sampling setting"
        );

        let sample = |trial_index: usize| {
            let mut rng = trial_rng(config.seed, setting_index, trial_index);
            Trial {
                setting_index,
                setting: *setting,
                outcomes: distribution.sample(&mut rng).clone(),
            }
        };

        let trials: Vec<Trial> = if config.parallel {
            (0..config.trial_count).into_par_iter().map(sample).collect()
        } else {
            (0..config.trial_count).map(sample).collect()
        };

        for trial in trials {
            aggregator.add_trial(trial)?;
        }
    }

    Ok(aggregator.finalize()?)
}

/// Builds the pre-measurement state of `config`: |0…0⟩, then gates, then noise.
pub fn prepare_state(config: &ExperimentConfig) -> Result<QuantumState, ExperimentError> {
    let mut state = QuantumState::initialize(config.qubit_count, &"0".repeat(config.qubit_count))?;

    for step in &config.gate_sequence {
        let gate = Gate::from_name(&step.name, &step.params)?;
        state.apply(&gate, &step.targets)?;
    }

    for step in &config.noise {
        let channel = ChannelKind::from_name(&step.channel)?.channel(step.rate)?;
        for q in step.resolved_targets(config.qubit_count)? {
            state.apply_channel(&channel, &[q])?;
        }
    }

    Ok(state)
}

/// Angle measurement for one setting: Alice's angle alone on one qubit,
/// Alice's ⊗ Bob's on two.
pub fn measurement_for(setting: &Setting, qubit_count: usize) -> Result<Measurement, StateError> {
    match qubit_count {
        1 => Ok(Measurement::angle(setting.alice)),
        2 => Ok(Measurement::angle(setting.alice).tensor(&Measurement::angle(setting.bob))),
        n => Err(StateError::InvalidQubitCount(n)),
    }
}
