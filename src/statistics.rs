//! Correlation and CHSH statistics over sampled trials.

use crate::experiment::{Setting, Trial};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// Classical (local hidden variable) bound on |S|.
pub const CLASSICAL_BOUND: f64 = 2.0;

/// Tsirelson bound on |S|, 2√2.
pub const TSIRELSON_BOUND: f64 = 2.0 * std::f64::consts::SQRT_2;

/// Angles compare equal when closer than this.
const SETTING_TOLERANCE: f64 = 1e-12;

/// E(a,b) = (N_same − N_different) / N_total over trials measured with `(setting_a, setting_b)`.
///
/// Only trials with two outcome labels take part. Returns `None` when no trial matches.
pub fn correlation_statistic(trials: &[Trial], setting_a: f64, setting_b: f64) -> Option<f64> {
    let target = Setting::new(setting_a, setting_b);
    correlation_of(
        trials
            .iter()
            .filter(|t| t.setting.approx_eq(&target, SETTING_TOLERANCE)),
    )
}

/// Correlation over an arbitrary set of trials.
pub(crate) fn correlation_of<'a>(trials: impl IntoIterator<Item = &'a Trial>) -> Option<f64> {
    let (mut same, mut different) = (0usize, 0usize);
    for trial in trials {
        if let [a, b] = trial.outcomes.as_slice() {
            if a == b {
                same += 1;
            } else {
                different += 1;
            }
        }
    }

    let total = same + different;
    (total > 0).then(|| (same as f64 - different as f64) / total as f64)
}

/// S = E(a,b) − E(a,b′) + E(a′,b) + E(a′,b′).
///
/// The raw value is returned without clamping so that readings above the
/// Tsirelson bound (sampling noise or bugs) stay visible.
pub fn chsh_value(correlations: [f64; 4]) -> f64 {
    let [e_ab, e_abp, e_apb, e_apbp] = correlations;
    e_ab - e_abp + e_apb + e_apbp
}

/// Correlation predicted for |Φ⁺⟩ measured along X–Z plane angles `theta_a`, `theta_b`.
pub fn theoretical_correlation(theta_a: f64, theta_b: f64) -> f64 {
    (theta_a - theta_b).cos()
}

/// Alice's two angles and Bob's two angles of a CHSH test, in radians.
///
/// Angles are Bloch-sphere angles in the X–Z plane; a polarizer angle is half
/// of the Bloch angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChshSettings {
    pub a: f64,
    pub a_prime: f64,
    pub b: f64,
    pub b_prime: f64,
}

impl ChshSettings {
    pub fn new(a: f64, a_prime: f64, b: f64, b_prime: f64) -> Self {
        Self {
            a,
            a_prime,
            b,
            b_prime,
        }
    }

    /// Settings reaching S = 2√2 on |Φ⁺⟩: a = 0, a′ = π/2, b = π/4, b′ = 3π/4
    /// (polarizer angles 0°, 45°, 22.5°, 67.5°).
    pub fn canonical() -> Self {
        Self::new(0.0, FRAC_PI_2, FRAC_PI_4, 3.0 * FRAC_PI_4)
    }

    /// The four setting pairs in the order [`chsh_value`] expects.
    pub fn pairs(&self) -> [Setting; 4] {
        [
            Setting::new(self.a, self.b),
            Setting::new(self.a, self.b_prime),
            Setting::new(self.a_prime, self.b),
            Setting::new(self.a_prime, self.b_prime),
        ]
    }

    /// S predicted for |Φ⁺⟩.
    pub fn theoretical_s(&self) -> f64 {
        chsh_value(self.pairs().map(|s| theoretical_correlation(s.alice, s.bob)))
    }

    /// Matches `settings` against the four pairs, in order.
    pub fn from_pairs(settings: &[Setting]) -> Option<Self> {
        let [ab, abp, apb, apbp] = settings else {
            return None;
        };
        let candidate = Self::new(ab.alice, apb.alice, ab.bob, abp.bob);
        let consistent = candidate
            .pairs()
            .iter()
            .zip([ab, abp, apb, apbp])
            .all(|(expected, got)| expected.approx_eq(got, SETTING_TOLERANCE));
        consistent.then_some(candidate)
    }
}
