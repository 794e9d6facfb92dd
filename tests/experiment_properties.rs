//! End-to-end runs through `run_experiment`.

use qplayground::errors::{ExperimentError, ResultError};
use qplayground::experiment::{ExperimentConfig, ResultAggregator, Setting, Trial};
use qplayground::protocols::chsh;
use qplayground::run_experiment;
use qplayground::statistics::{
    CLASSICAL_BOUND, ChshSettings, TSIRELSON_BOUND, correlation_statistic,
};
use std::f64::consts::FRAC_PI_2;

#[test]
fn test_bell_state_reaches_tsirelson_bound() {
    let config = ExperimentConfig::chsh(ChshSettings::canonical())
        .with_trials(100_000)
        .with_seed(42);
    let result = run_experiment(&config).unwrap();

    let s = result.chsh().unwrap();
    assert!((s - TSIRELSON_BOUND).abs() < 0.05, "S = {s}");
    assert!(s > CLASSICAL_BOUND);
    assert_eq!(result.trials().len(), 400_000);
}

#[test]
fn test_chsh_value_agrees_with_correlation_statistic() {
    let settings = ChshSettings::canonical();
    let config = ExperimentConfig::chsh(settings)
        .with_trials(2_000)
        .with_seed(17);
    let result = run_experiment(&config).unwrap();

    for (idx, pair) in settings.pairs().iter().enumerate() {
        assert_eq!(
            correlation_statistic(result.trials(), pair.alice, pair.bob),
            result.correlation(idx)
        );
    }
}

#[test]
fn test_product_state_is_uncorrelated_in_x() {
    let config = ExperimentConfig::new(2)
        .with_setting(FRAC_PI_2, FRAC_PI_2)
        .with_trials(20_000)
        .with_seed(3);
    let result = run_experiment(&config).unwrap();
    let e = result.correlation(0).unwrap();
    assert!(e.abs() < 0.03, "E = {e}");
}

#[test]
fn test_product_state_respects_classical_bound() {
    let config = ExperimentConfig::chsh(ChshSettings::canonical())
        .with_trials(20_000)
        .with_seed(5);
    // Drop the entangling gates: |00⟩ is a product state
    let config = ExperimentConfig {
        gate_sequence: Vec::new(),
        ..config
    };
    let report = chsh::run(&config).unwrap();
    assert!(report.s_exact.abs() <= CLASSICAL_BOUND);
    assert!(report.s_empirical.abs() <= CLASSICAL_BOUND);
    assert!((report.s_exact - std::f64::consts::SQRT_2).abs() < 1e-9);
}

#[test]
fn test_fixed_seed_is_deterministic() {
    let config = ExperimentConfig::chsh(ChshSettings::canonical())
        .with_noise("amplitude_damping", 0.2)
        .with_trials(1_000)
        .with_seed(99);

    let first = run_experiment(&config).unwrap();
    let second = run_experiment(&config).unwrap();
    assert_eq!(first, second);

    let serial = run_experiment(&config.clone().with_parallel(false)).unwrap();
    assert_eq!(first.trials(), serial.trials());

    let other = run_experiment(&config.with_seed(100)).unwrap();
    assert_ne!(first.trials(), other.trials());
}

#[test]
fn test_config_from_json_runs() {
    let json = r#"{
        "qubit_count": 2,
        "gate_sequence": [
            {"name": "h", "targets": [0]},
            {"name": "cnot", "targets": [0, 1]}
        ],
        "measurement_settings": [
            {"alice": 0.0, "bob": 0.7853981633974483},
            {"alice": 0.0, "bob": 2.356194490192345},
            {"alice": 1.5707963267948966, "bob": 0.7853981633974483},
            {"alice": 1.5707963267948966, "bob": 2.356194490192345}
        ],
        "noise": [],
        "trial_count": 5000,
        "seed": 42,
        "parallel": false
    }"#;
    let config = ExperimentConfig::from_json(json).unwrap();
    let result = run_experiment(&config).unwrap();
    assert!(result.chsh().unwrap() > CLASSICAL_BOUND);

    let encoded = result.to_json().unwrap();
    assert!(encoded.contains("\"chsh\""));
}

#[test]
fn test_aggregator_rejects_trials_after_finalize() {
    let setting = Setting::new(0.0, 0.0);
    let mut aggregator = ResultAggregator::new(vec![setting], 2, 0);
    aggregator
        .add_trial(Trial {
            setting_index: 0,
            setting,
            outcomes: vec![1, 1],
        })
        .unwrap();
    aggregator.finalize().unwrap();

    let err = aggregator
        .add_trial(Trial {
            setting_index: 0,
            setting,
            outcomes: vec![-1, -1],
        })
        .unwrap_err();
    assert_eq!(err, ResultError::ResultAlreadyFinalized);
    assert_eq!(
        ExperimentError::from(err).to_string(),
        "Result error: Result already finalized, no more trials can be added"
    );
}
