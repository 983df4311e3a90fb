//! Primitive results.
//!
//! Bitstring ordering: the rightmost character is classical bit 0, so
//! `"01"` means bit 0 read `1` and bit 1 read `0`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{HalError, HalResult};

/// Measurement counts from a sampler pub.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    counts: FxHashMap<String, u64>,
}

impl Counts {
    /// Create empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create counts from (bitstring, count) pairs. Duplicates are summed.
    pub fn from_pairs(iter: impl IntoIterator<Item = (impl Into<String>, u64)>) -> Self {
        let mut counts = Self::new();
        for (k, v) in iter {
            counts.insert(k, v);
        }
        counts
    }

    /// Add `count` occurrences of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_default() += count;
    }

    /// Get the count for a bitstring.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Iterate over (bitstring, count) pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.counts.iter()
    }

    /// Get the total number of shots.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// The most frequent bitstring; ties go to the smaller bitstring.
    pub fn most_frequent(&self) -> Option<(&String, &u64)> {
        self.sorted().into_iter().next()
    }

    /// Get probabilities for each bitstring.
    #[allow(clippy::cast_precision_loss)]
    pub fn probabilities(&self) -> FxHashMap<String, f64> {
        let total = self.total_shots();
        if total == 0 {
            return FxHashMap::default();
        }
        self.counts
            .iter()
            .map(|(k, &v)| (k.clone(), v as f64 / total as f64))
            .collect()
    }

    /// Counts by descending count, then ascending bitstring.
    pub fn sorted(&self) -> Vec<(&String, &u64)> {
        let mut items: Vec<_> = self.counts.iter().collect();
        items.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        items
    }

    /// Get the number of unique bitstrings.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if counts are empty.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<(String, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

/// Expectation values for one estimator pub, one entry per observable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorPubResult {
    /// Expectation values.
    pub evs: Vec<f64>,
    /// Standard errors.
    pub stds: Vec<f64>,
}

/// Counts for one sampler pub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerPubResult {
    /// Outcome counts over the pub's classical register.
    pub counts: Counts,
    /// Shots executed.
    pub shots: u32,
}

/// Result of a primitive job, one entry per submitted pub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "primitive", content = "pubs", rename_all = "snake_case")]
pub enum PrimitiveResult {
    /// Estimator output.
    Estimator(Vec<EstimatorPubResult>),
    /// Sampler output.
    Sampler(Vec<SamplerPubResult>),
}

impl PrimitiveResult {
    /// Number of pub results.
    pub fn len(&self) -> usize {
        match self {
            PrimitiveResult::Estimator(pubs) => pubs.len(),
            PrimitiveResult::Sampler(pubs) => pubs.len(),
        }
    }

    /// Check if there are no pub results.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unwrap estimator results.
    pub fn into_estimator(self) -> HalResult<Vec<EstimatorPubResult>> {
        match self {
            PrimitiveResult::Estimator(pubs) => Ok(pubs),
            PrimitiveResult::Sampler(_) => Err(HalError::UnexpectedResult(
                "expected estimator result, got sampler".into(),
            )),
        }
    }

    /// Unwrap sampler results.
    pub fn into_sampler(self) -> HalResult<Vec<SamplerPubResult>> {
        match self {
            PrimitiveResult::Sampler(pubs) => Ok(pubs),
            PrimitiveResult::Estimator(_) => Err(HalError::UnexpectedResult(
                "expected sampler result, got estimator".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_basic() {
        let mut counts = Counts::new();
        counts.insert("00", 500);
        counts.insert("11", 400);
        counts.insert("11", 100);

        assert_eq!(counts.get("00"), 500);
        assert_eq!(counts.get("11"), 500);
        assert_eq!(counts.get("01"), 0);
        assert_eq!(counts.total_shots(), 1000);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_counts_sorted_breaks_ties_by_bitstring() {
        let counts = Counts::from_pairs([("11", 5), ("01", 9), ("00", 5)]);
        let sorted: Vec<_> = counts.sorted().into_iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(sorted, vec![("01", 9), ("00", 5), ("11", 5)]);
        assert_eq!(counts.most_frequent().map(|(k, _)| k.as_str()), Some("01"));
    }

    #[test]
    fn test_counts_probabilities() {
        let counts = Counts::from_pairs([("0", 300), ("1", 700)]);
        let probs = counts.probabilities();
        assert!((probs["0"] - 0.3).abs() < 1e-10);
        assert!(Counts::new().probabilities().is_empty());
    }

    #[test]
    fn test_result_shape_checks() {
        let result = PrimitiveResult::Sampler(vec![SamplerPubResult {
            counts: Counts::from_pairs([("1", 3)]),
            shots: 3,
        }]);
        assert_eq!(result.len(), 1);
        assert!(matches!(
            result.clone().into_estimator(),
            Err(HalError::UnexpectedResult(_))
        ));
        assert_eq!(result.into_sampler().unwrap()[0].shots, 3);
    }

    #[test]
    fn test_result_json_shape() {
        let result = PrimitiveResult::Estimator(vec![EstimatorPubResult {
            evs: vec![1.0],
            stds: vec![0.0],
        }]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["primitive"], "estimator");
        assert_eq!(json["pubs"][0]["evs"][0], 1.0);
    }
}
