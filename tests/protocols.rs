use approx::assert_relative_eq;
use qplayground::protocols::{bell, decoherence, teleportation};
use qplayground::statistics::theoretical_correlation;
use qplayground::{ChannelKind, QuantumChannel, QuantumState};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn test_teleportation_fidelity_with_and_without_noise() {
    let mut rng = StdRng::seed_from_u64(42);
    let ideal = teleportation::run_batch(2.0, 1.3, 300, None, &mut rng).unwrap();
    assert_relative_eq!(ideal.mean_fidelity, 1.0, epsilon = 1e-9);

    for kind in [ChannelKind::Depolarizing, ChannelKind::AmplitudeDamping, ChannelKind::Dephasing] {
        let channel = kind.channel(0.4).unwrap();
        let noisy = teleportation::run_batch(2.0, 1.3, 300, Some(&channel), &mut rng).unwrap();
        assert!(noisy.mean_fidelity < 1.0 - 1e-3, "{kind:?}: {}", noisy.mean_fidelity);
    }
}

#[test]
fn test_teleportation_is_reproducible() {
    let channel = QuantumChannel::bit_flip(0.1).unwrap();
    let run = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        teleportation::run_batch(0.5, 0.0, 100, Some(&channel), &mut rng).unwrap()
    };
    assert_eq!(run(7), run(7));
}

#[test]
fn test_decoherence_endpoints() {
    let gammas: Vec<f64> = (0..=10).map(|i| f64::from(i) / 10.0).collect();

    let phase = decoherence::evolve_under_noise(1.0, 0.2, &gammas, ChannelKind::Dephasing).unwrap();
    let coherences: Vec<f64> = phase.iter().map(|p| p.coherence).collect();
    assert!(coherences.windows(2).all(|w| w[1] <= w[0]));
    assert_relative_eq!(phase[10].coherence, 0.0, epsilon = 1e-12);
    assert_relative_eq!(phase[10].populations.0, phase[0].populations.0, epsilon = 1e-12);

    let amplitude =
        decoherence::evolve_under_noise(2.7, 0.0, &gammas, ChannelKind::AmplitudeDamping).unwrap();
    assert_relative_eq!(amplitude[10].populations.0, 1.0, epsilon = 1e-12);
    assert_relative_eq!(amplitude[10].populations.1, 0.0, epsilon = 1e-12);
}

#[test]
fn test_bell_sweep_over_half_turn() {
    let state = QuantumState::bell_phi_plus();
    let deltas: Vec<f64> = (0..8).map(|i| f64::from(i) * std::f64::consts::PI / 7.0).collect();
    let mut rng = StdRng::seed_from_u64(1);
    let points = bell::sweep_correlation(&state, 0.3, &deltas, 3000, &mut rng).unwrap();

    for (point, delta) in points.iter().zip(&deltas) {
        assert_relative_eq!(point.exact, theoretical_correlation(0.3, 0.3 + delta), epsilon = 1e-9);
        assert!((point.empirical - point.exact).abs() < 0.06);
    }
}
