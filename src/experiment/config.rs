use crate::core::errors::{ChannelError, ExperimentError};
use crate::core::{ChannelKind, Gate, utils};
use crate::statistics::ChshSettings;
use serde::{Deserialize, Serialize};

/// Measurement angles (radians, X–Z plane) for Alice's and Bob's qubit.
///
/// Single-qubit experiments only use `alice`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub alice: f64,
    pub bob: f64,
}

impl Setting {
    pub fn new(alice: f64, bob: f64) -> Self {
        Self { alice, bob }
    }

    pub fn approx_eq(&self, other: &Setting, tol: f64) -> bool {
        (self.alice - other.alice).abs() <= tol && (self.bob - other.bob).abs() <= tol
    }
}

/// One gate of the preparation sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateStep {
    pub name: String,
    pub targets: Vec<usize>,
    #[serde(default)]
    pub params: Vec<f64>,
}

/// One noise channel applied after the gate sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseStep {
    pub channel: String,
    pub rate: f64,
    /// Qubits hit by the channel, each independently. `None` means every qubit.
    #[serde(default)]
    pub targets: Option<Vec<usize>>,
}

impl NoiseStep {
    /// Qubits the channel hits, each exactly once.
    pub fn resolved_targets(&self, qubit_count: usize) -> Result<Vec<usize>, ChannelError> {
        match &self.targets {
            Some(targets) => match utils::find_duplicate(targets) {
                Some(dup) => Err(ChannelError::DuplicateQubit(dup)),
                None => Ok(targets.clone()),
            },
            None => Ok((0..qubit_count).collect()),
        }
    }
}

/// Everything one experiment run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// 1 or 2
    pub qubit_count: usize,
    pub gate_sequence: Vec<GateStep>,
    pub measurement_settings: Vec<Setting>,
    pub noise: Vec<NoiseStep>,
    /// Trials sampled per measurement setting
    pub trial_count: usize,
    pub seed: u64,
    /// Sample trials on the rayon pool
    pub parallel: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            qubit_count: 2,
            gate_sequence: Vec::new(),
            measurement_settings: Vec::new(),
            noise: Vec::new(),
            trial_count: 1000,
            seed: 0,
            parallel: true,
        }
    }
}

impl ExperimentConfig {
    pub fn new(qubit_count: usize) -> Self {
        Self {
            qubit_count,
            ..Self::default()
        }
    }

    /// Two qubits prepared in |Φ⁺⟩ by H on qubit 0 and CNOT 0 → 1.
    pub fn bell_pair() -> Self {
        Self::new(2).with_gate("h", &[0], &[]).with_gate("cnot", &[0, 1], &[])
    }

    /// |Φ⁺⟩ measured with the four CHSH setting pairs.
    pub fn chsh(settings: ChshSettings) -> Self {
        settings
            .pairs()
            .into_iter()
            .fold(Self::bell_pair(), |config, s| config.with_setting(s.alice, s.bob))
    }

    pub fn with_gate(mut self, name: &str, targets: &[usize], params: &[f64]) -> Self {
        self.gate_sequence.push(GateStep {
            name: name.to_string(),
            targets: targets.to_vec(),
            params: params.to_vec(),
        });
        self
    }

    /// Adds a channel applied to every qubit.
    pub fn with_noise(mut self, channel: &str, rate: f64) -> Self {
        self.noise.push(NoiseStep {
            channel: channel.to_string(),
            rate,
            targets: None,
        });
        self
    }

    pub fn with_noise_on(mut self, channel: &str, rate: f64, targets: &[usize]) -> Self {
        self.noise.push(NoiseStep {
            channel: channel.to_string(),
            rate,
            targets: Some(targets.to_vec()),
        });
        self
    }

    pub fn with_setting(mut self, alice: f64, bob: f64) -> Self {
        self.measurement_settings.push(Setting::new(alice, bob));
        self
    }

    pub fn with_trials(mut self, trial_count: usize) -> Self {
        self.trial_count = trial_count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ExperimentError> {
        serde_json::from_str(json).map_err(|e| ExperimentError::Config(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ExperimentError> {
        serde_json::to_string_pretty(self).map_err(|e| ExperimentError::Config(e.to_string()))
    }

    /// Checks everything that can be checked without running.
    ///
    /// Gate names, parameter counts and noise rates are resolved here so that a
    /// bad configuration fails before any state is built.
    pub fn validate(&self) -> Result<(), ExperimentError> {
        if self.trial_count == 0 {
            return Err(ExperimentError::InvalidParameter(
                "trial_count must be positive".to_string(),
            ));
        }

        if self.measurement_settings.is_empty() {
            return Err(ExperimentError::InvalidParameter(
                "at least one measurement setting is required".to_string(),
            ));
        }

        if let Some(s) = self
            .measurement_settings
            .iter()
            .find(|s| !s.alice.is_finite() || !s.bob.is_finite())
        {
            return Err(ExperimentError::InvalidParameter(format!(
                "measurement angles must be finite, got ({}, {})",
                s.alice, s.bob
            )));
        }

        for step in &self.gate_sequence {
            Gate::from_name(&step.name, &step.params)?;
        }

        for step in &self.noise {
            ChannelKind::from_name(&step.channel)?.channel(step.rate)?;
            step.resolved_targets(self.qubit_count)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::GateError;

    #[test]
    fn test_builder_and_defaults() {
        let config = ExperimentConfig::bell_pair()
            .with_setting(0.0, 0.5)
            .with_trials(10)
            .with_seed(3);
        assert_eq!(config.qubit_count, 2);
        assert_eq!(config.gate_sequence.len(), 2);
        assert_eq!(config.gate_sequence[1].targets, vec![0, 1]);
        assert!(config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_chsh_preset_has_four_settings() {
        let config = ExperimentConfig::chsh(ChshSettings::canonical());
        assert_eq!(config.measurement_settings.len(), 4);
        assert_eq!(
            ChshSettings::from_pairs(&config.measurement_settings),
            Some(ChshSettings::canonical())
        );
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let base = ExperimentConfig::bell_pair().with_setting(0.0, 0.0);

        let err = base.clone().with_trials(0).validate().unwrap_err();
        assert!(matches!(err, ExperimentError::InvalidParameter(_)));

        let err = ExperimentConfig::bell_pair().validate().unwrap_err();
        assert!(matches!(err, ExperimentError::InvalidParameter(_)));

        let err = base.clone().with_gate("rz", &[0], &[]).validate().unwrap_err();
        assert!(matches!(
            err,
            ExperimentError::GateError(GateError::InvalidParameter { .. })
        ));

        let err = base.clone().with_noise("dephase", 1.5).validate().unwrap_err();
        assert!(matches!(
            err,
            ExperimentError::ChannelError(ChannelError::InvalidParameter(_))
        ));

        let err = base.with_setting(f64::NAN, 0.0).validate().unwrap_err();
        assert!(matches!(err, ExperimentError::InvalidParameter(_)));
    }

    #[test]
    fn test_validate_rejects_repeated_noise_targets() {
        let config = ExperimentConfig::new(1)
            .with_noise_on("dephase", 0.5, &[0, 0])
            .with_setting(0.0, 0.0);
        assert_eq!(
            config.validate(),
            Err(ExperimentError::ChannelError(ChannelError::DuplicateQubit(0)))
        );

        let step = &ExperimentConfig::new(2).with_noise("dephase", 0.5).noise[0];
        assert_eq!(step.resolved_targets(2), Ok(vec![0, 1]));
    }

    #[test]
    fn test_validate_rejects_non_finite_gate_angle() {
        let config = ExperimentConfig::new(1)
            .with_gate("rx", &[0], &[f64::NAN])
            .with_setting(0.0, 0.0);
        assert!(matches!(
            config.validate(),
            Err(ExperimentError::GateError(GateError::NonFiniteParameter { .. }))
        ));
    }

    #[test]
    fn test_json_round_trip_with_defaults() {
        let json = r#"{
            "qubit_count": 2,
            "gate_sequence": [
                {"name": "h", "targets": [0]},
                {"name": "cnot", "targets": [0, 1]}
            ],
            "measurement_settings": [{"alice": 0.0, "bob": 0.785}],
            "noise": [{"channel": "depolarizing", "rate": 0.1}],
            "trial_count": 500,
            "seed": 42
        }"#;
        let config = ExperimentConfig::from_json(json).unwrap();
        assert_eq!(config.trial_count, 500);
        assert_eq!(config.seed, 42);
        assert!(config.parallel);
        assert_eq!(config.noise[0].targets, None);
        assert!(config.gate_sequence[0].params.is_empty());

        let again = ExperimentConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(again, config);

        assert!(matches!(
            ExperimentConfig::from_json("{\"trial_count\": -1}"),
            Err(ExperimentError::Config(_))
        ));
    }
}
