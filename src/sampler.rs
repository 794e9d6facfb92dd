use crate::core::{Measurement, OutcomeLabel, QuantumChannel, QuantumState, errors::StateError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// Born-rule probability of every outcome label of `measurement` on `targets`.
///
/// Operators sharing a label are summed. Fails with `NormalizationError` when
/// the probabilities do not sum to one within tolerance.
pub fn outcome_probabilities(
    state: &QuantumState,
    measurement: &Measurement,
    targets: &[usize],
) -> Result<BTreeMap<OutcomeLabel, f64>, StateError> {
    let (probs, _) = state.set_measurement(measurement, targets)?;

    let mut map = BTreeMap::new();
    for (label, p) in measurement.labels.iter().zip(probs) {
        *map.entry(label.clone()).or_insert(0.0) += p;
    }
    Ok(map)
}

/// Draws one outcome label. The state is not modified.
pub fn sample_outcome<R: Rng + ?Sized>(
    state: &QuantumState,
    measurement: &Measurement,
    targets: &[usize],
    rng: &mut R,
) -> Result<OutcomeLabel, StateError> {
    let distribution = OutcomeDistribution::new(state, measurement, targets)?;
    Ok(distribution.sample(rng).clone())
}

/// Outcome distribution with a precomputed CDF, for repeated sampling.
#[derive(Debug, Clone)]
pub struct OutcomeDistribution {
    labels: Vec<OutcomeLabel>,
    probabilities: Vec<f64>,
    cdf: Vec<f64>,
}

impl OutcomeDistribution {
    pub fn new(
        state: &QuantumState,
        measurement: &Measurement,
        targets: &[usize],
    ) -> Result<Self, StateError> {
        let (probabilities, _) = state.set_measurement(measurement, targets)?;

        let cdf = probabilities
            .iter()
            .scan(0.0, |acc, &p| {
                *acc += p;
                Some(*acc)
            })
            .collect();

        Ok(Self {
            labels: measurement.labels.clone(),
            probabilities,
            cdf,
        })
    }

    pub fn labels(&self) -> &[OutcomeLabel] {
        &self.labels
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Index of the outcome drawn by one uniform roll.
    pub fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let r: f64 = rng.random();
        match self.cdf.iter().position(|&c| r < c) {
            Some(idx) => idx,
            // Floating point rounding can leave the last CDF entry below one
            None => self
                .probabilities
                .iter()
                .rposition(|&p| p > 0.0)
                .unwrap_or(0),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &OutcomeLabel {
        &self.labels[self.sample_index(rng)]
    }
}

/// Sub-seed for one trial, so trials can be sampled in any order or in
/// parallel and still reproduce the same sequence under one top-level seed.
pub fn trial_seed(seed: u64, setting_index: usize, trial_index: usize) -> u64 {
    let stream = splitmix64(seed ^ splitmix64(setting_index as u64));
    splitmix64(stream.wrapping_add(trial_index as u64))
}

/// Random source of one trial, derived with [`trial_seed`].
pub fn trial_rng(seed: u64, setting_index: usize, trial_index: usize) -> StdRng {
    StdRng::seed_from_u64(trial_seed(seed, setting_index, trial_index))
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Repeated-shot sampler for a quantum state.
///
/// The `Sampler` runs multiple shots of a measurement on a state, optionally
/// applying a quantum channel before measurement.
#[derive(Debug, Clone, Default)]
pub struct Sampler {
    /// Optional quantum channel to apply to the state before measurement.
    pub channel: Option<QuantumChannel>,
}

impl Sampler {
    /// Creates a new `Sampler` instance with no channel (noise-free).
    pub fn new() -> Self {
        Self { channel: None }
    }

    /// Sets the quantum channel for the sampler.
    pub fn with_channel(mut self, channel: QuantumChannel) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Samples a `QuantumState` `num_shots` times using a specified `Measurement`.
    ///
    /// # Arguments
    ///
    /// * `state` - The quantum state to measure.
    /// * `measurement` - The measurement to apply.
    /// * `targets` - The indices of the qubits to measure.
    /// * `num_shots` - The number of times to repeat the measurement.
    /// * `rng` - Random source; seed it for reproducible counts.
    ///
    /// # Returns
    ///
    /// Counts per outcome label; labels never drawn are absent.
    pub fn run<R: Rng + ?Sized>(
        &self,
        state: &QuantumState,
        measurement: &Measurement,
        targets: &[usize],
        num_shots: usize,
        rng: &mut R,
    ) -> Result<BTreeMap<OutcomeLabel, usize>, StateError> {
        let mut state_copy = state.clone();

        if let Some(chan) = &self.channel {
            state_copy.apply_channel(chan, targets)?;
        }

        let distribution = OutcomeDistribution::new(&state_copy, measurement, targets)?;

        let mut raw_counts = vec![0usize; distribution.labels.len()];
        for _ in 0..num_shots {
            raw_counts[distribution.sample_index(rng)] += 1;
        }

        let mut counts = BTreeMap::new();
        for (label, count) in distribution.labels.iter().zip(raw_counts) {
            if count > 0 {
                *counts.entry(label.clone()).or_insert(0) += count;
            }
        }

        Ok(counts)
    }
}
