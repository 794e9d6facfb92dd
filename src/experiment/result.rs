use super::config::Setting;
use crate::core::OutcomeLabel;
use crate::core::errors::ResultError;
use crate::statistics::{self, ChshSettings};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// One sampled measurement: which setting was used and the ±1 outcome per
/// measured qubit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trial {
    pub setting_index: usize,
    pub setting: Setting,
    pub outcomes: OutcomeLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeCount {
    pub outcome: OutcomeLabel,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingStatistics {
    pub setting_index: usize,
    pub setting: Setting,
    pub trials: usize,
    /// E for two-qubit outcomes, `None` for single-qubit runs or no trials
    pub correlation: Option<f64>,
    /// Observed outcomes in label order
    pub frequencies: Vec<OutcomeCount>,
}

/// Statistics derived from a set of trials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub per_setting: Vec<SettingStatistics>,
    /// Present only when the settings are the four CHSH pairs in order and
    /// every pair has a correlation.
    pub chsh: Option<f64>,
}

impl Statistics {
    fn compute(settings: &[Setting], trials: &[Trial]) -> Self {
        // add_trial guarantees every index is in range
        let mut grouped: Vec<Vec<&Trial>> = vec![Vec::new(); settings.len()];
        for trial in trials {
            if let Some(group) = grouped.get_mut(trial.setting_index) {
                group.push(trial);
            }
        }

        let per_setting: Vec<SettingStatistics> = settings
            .iter()
            .zip(&grouped)
            .enumerate()
            .map(|(setting_index, (setting, group))| {
                let mut counts: BTreeMap<&OutcomeLabel, usize> = BTreeMap::new();
                for trial in group {
                    *counts.entry(&trial.outcomes).or_insert(0) += 1;
                }
                SettingStatistics {
                    setting_index,
                    setting: *setting,
                    trials: group.len(),
                    correlation: statistics::correlation_of(group.iter().copied()),
                    frequencies: counts
                        .into_iter()
                        .map(|(outcome, count)| OutcomeCount {
                            outcome: outcome.clone(),
                            count,
                        })
                        .collect(),
                }
            })
            .collect();

        let chsh = ChshSettings::from_pairs(settings).and_then(|_| {
            let correlations: Vec<f64> = per_setting
                .iter()
                .map(|s| s.correlation)
                .collect::<Option<_>>()?;
            let correlations: [f64; 4] = correlations.try_into().ok()?;
            Some(statistics::chsh_value(correlations))
        });

        Self { per_setting, chsh }
    }

    pub fn correlation(&self, setting_index: usize) -> Option<f64> {
        self.per_setting.get(setting_index)?.correlation
    }
}

/// Collects trials and derives statistics on demand.
///
/// Statistics are computed lazily and cached until the next trial arrives.
/// [`finalize`](Self::finalize) freezes the collection; afterwards
/// [`add_trial`](Self::add_trial) fails with `ResultAlreadyFinalized`.
#[derive(Debug, Clone)]
pub struct ResultAggregator {
    settings: Vec<Setting>,
    outcome_arity: usize,
    seed: u64,
    trials: Vec<Trial>,
    cache: Option<Statistics>,
    finalized: bool,
}

impl ResultAggregator {
    pub fn new(settings: Vec<Setting>, outcome_arity: usize, seed: u64) -> Self {
        Self {
            settings,
            outcome_arity,
            seed,
            trials: Vec::new(),
            cache: None,
            finalized: false,
        }
    }

    pub fn add_trial(&mut self, trial: Trial) -> Result<(), ResultError> {
        if self.finalized {
            return Err(ResultError::ResultAlreadyFinalized);
        }
        match self.settings.get(trial.setting_index) {
            None => {
                return Err(ResultError::SettingIndexOutOfRange {
                    index: trial.setting_index,
                    len: self.settings.len(),
                });
            }
            Some(setting) if *setting != trial.setting => {
                return Err(ResultError::SettingMismatch {
                    index: trial.setting_index,
                });
            }
            Some(_) => {}
        }
        if trial.outcomes.len() != self.outcome_arity {
            return Err(ResultError::OutcomeArityMismatch {
                expected: self.outcome_arity,
                got: trial.outcomes.len(),
            });
        }
        self.trials.push(trial);
        self.cache = None;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn statistics(&mut self) -> &Statistics {
        let (settings, trials) = (&self.settings, &self.trials);
        self.cache
            .get_or_insert_with(|| Statistics::compute(settings, trials))
    }

    /// Freezes the aggregator and hands out the immutable result.
    pub fn finalize(&mut self) -> Result<ExperimentResult, ResultError> {
        if self.finalized {
            return Err(ResultError::ResultAlreadyFinalized);
        }

        let statistics = match self.cache.take() {
            Some(stats) => stats,
            None => Statistics::compute(&self.settings, &self.trials),
        };
        self.finalized = true;

        debug!(
            target: "qplayground::experiment",
            trials = self.trials.len(),
            chsh = ?statistics.chsh,
            "result finalized"
        );

        Ok(ExperimentResult {
            seed: self.seed,
            settings: self.settings.clone(),
            trials: std::mem::take(&mut self.trials),
            statistics,
        })
    }
}

/// Frozen outcome of one experiment run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentResult {
    seed: u64,
    settings: Vec<Setting>,
    trials: Vec<Trial>,
    statistics: Statistics,
}

impl ExperimentResult {
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn settings(&self) -> &[Setting] {
        &self.settings
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn chsh(&self) -> Option<f64> {
        self.statistics.chsh
    }

    pub fn correlation(&self, setting_index: usize) -> Option<f64> {
        self.statistics.correlation(setting_index)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
