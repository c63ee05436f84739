use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{dice::DiceSpec, error::Result};

/// A frequency table of sampled totals.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    counts: FxHashMap<i64, u64>,
    len: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub mean: f64,
    /// Sample standard deviation; NaN for a single draw.
    pub std_dev: f64,
}

impl SampleSummary {
    /// The theoretical mean and standard deviation of the sum of `spec`'s dice.
    ///
    /// `None` for specs without dice or faces.
    pub fn expected(spec: DiceSpec) -> Option<Self> {
        use statrs::{distribution::DiscreteUniform, statistics::Distribution};

        if spec.count == 0 || spec.sides == 0 {
            return None;
        }
        let die = DiscreteUniform::new(1, i64::from(spec.sides)).ok()?;
        let count = f64::from(spec.count);

        Some(SampleSummary {
            mean: count * die.mean()?,
            std_dev: (count * die.variance()?).sqrt(),
        })
    }
}

impl Sample {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, value: i64) {
        *self.counts.entry(value).or_default() += 1;
        self.len += 1;
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn count(&self, value: i64) -> u64 {
        self.counts.get(&value).copied().unwrap_or(0)
    }

    /// Share of draws equal to `value`, in `0..=1`.
    pub fn frequency(&self, value: i64) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.count(value) as f64 / self.len as f64
    }

    /// Every observed value with its frequency, in ascending value order.
    pub fn frequencies(&self) -> Vec<(i64, f64)> {
        let mut frequencies: Vec<_> = self
            .counts
            .keys()
            .map(|&value| (value, self.frequency(value)))
            .collect();
        frequencies.sort_unstable_by_key(|&(value, _)| value);
        frequencies
    }

    pub fn min(&self) -> Option<i64> {
        self.counts.keys().copied().min()
    }

    pub fn max(&self) -> Option<i64> {
        self.counts.keys().copied().max()
    }

    /// Mean and sample standard deviation, weighted by the tallies.
    pub fn summary(&self) -> Option<SampleSummary> {
        if self.is_empty() {
            return None;
        }
        let n = self.len as f64;
        let mean = self
            .counts
            .iter()
            .map(|(&value, &count)| value as f64 * count as f64)
            .sum::<f64>()
            / n;
        let squares: f64 = self
            .counts
            .iter()
            .map(|(&value, &count)| count as f64 * (value as f64 - mean).powi(2))
            .sum();

        Some(SampleSummary {
            mean,
            std_dev: (squares / (n - 1.0)).sqrt(),
        })
    }
}

/// Calls `sampler` `n` times and tallies the results. Stops at the first error.
pub fn sample<F>(n: u64, mut sampler: F) -> Result<Sample>
where
    F: FnMut() -> Result<i64>,
{
    let mut sample = Sample::new();
    for _ in 0..n {
        sample.record(sampler()?);
    }
    log::debug!(
        "Sampled {} draws over {} distinct values",
        sample.len(),
        sample.counts.len()
    );
    Ok(sample)
}
