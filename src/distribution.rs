//! Bitstring Distribution - a probability distribution over fixed-length bitstrings.
//!
//! A distribution maps each measured bitstring (e.g. `"0110"`) to a
//! non-negative weight. It is validated once at construction; any live
//! [`BitstringDistribution`] is guaranteed to be well formed.
//!
//! Three ways to build one:
//! - directly from a [`BitstringMap`] via [`BitstringDistribution::new`],
//! - from a dense vector of `2^L` probabilities
//!   ([`BitstringDistribution::create_from_probability_distribution`]),
//! - from raw measurement samples
//!   ([`BitstringDistribution::create_from_measurements`]).

use crate::error::{DistributionError, NormalizationError, Result};
use crate::validation::{describe_violation, is_normalized, BitstringMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Rescale every weight by `1 / sum`, leaving the mapping untouched on failure
fn rescale(distribution: &mut BitstringMap) -> Result<()> {
    let norm: f64 = distribution.values().sum();

    if norm == 0.0 {
        return Err(NormalizationError::EmptyDistribution.into());
    }
    if !norm.is_finite() || (norm > 0.0 && norm < f64::MIN_POSITIVE) {
        return Err(NormalizationError::DegenerateDistribution { norm }.into());
    }
    if norm == 1.0 {
        return Ok(());
    }

    let scale = 1.0 / norm;
    for value in distribution.values_mut() {
        *value *= scale;
    }

    tracing::debug!(
        norm,
        n_bitstrings = distribution.len(),
        "normalized bitstring distribution"
    );
    Ok(())
}

/// Normalize a bitstring mapping so that its weights sum to 1.0
///
/// Returns the input unchanged when it already sums to exactly 1.
///
/// # Errors
///
/// - [`NormalizationError::EmptyDistribution`] if every weight is zero
///   (including the empty mapping)
/// - [`NormalizationError::DegenerateDistribution`] if the sum is positive
///   but smaller than `f64::MIN_POSITIVE`, or not finite
pub fn normalize_bitstring_distribution(mut distribution: BitstringMap) -> Result<BitstringMap> {
    rescale(&mut distribution)?;
    Ok(distribution)
}

/// Render measurement samples as bitstrings.
///
/// Each sample's entries are concatenated in decimal, so `[0, 1, 1]`
/// becomes `"011"`. Entries other than 0 and 1 produce non-binary keys.
pub fn convert_tuples_to_bitstrings<I, S>(samples: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    samples
        .into_iter()
        .map(|sample| sample.as_ref().iter().map(|bit| bit.to_string()).collect())
        .collect()
}

/// Little-endian bitstring of `state` over `qubit_count` bits.
///
/// The binary rendering is zero-padded to `qubit_count` and then reversed,
/// so qubit 0 is the leading character.
fn state_to_bitstring(state: usize, qubit_count: usize) -> String {
    format!("{:0width$b}", state, width = qubit_count)
        .chars()
        .rev()
        .collect()
}

/// A probability distribution defined on discrete bitstrings.
///
/// Invariants held by every instance:
/// - at least one bitstring,
/// - all bitstrings share one length (the qubit count),
/// - all bitstrings are binary,
/// - all weights are non-negative,
/// - `is_normalized()` reports whether the weights sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BitstringMap", into = "BitstringMap")]
pub struct BitstringDistribution {
    /// Weight per bitstring
    distribution: BitstringMap,

    /// Whether the weights sum to 1.0
    normalized: bool,
}

impl BitstringDistribution {
    /// Create a new distribution, taking ownership of the mapping.
    ///
    /// If the mapping is not normalized and `normalize` is true, it is
    /// rescaled to unit sum. With `normalize == false` it is stored as-is,
    /// a warning is logged and [`is_normalized`](Self::is_normalized)
    /// reports `false`.
    pub fn new(input: BitstringMap, normalize: bool) -> Result<Self> {
        if let Some(reason) = describe_violation(&input) {
            return Err(DistributionError::InvalidDistribution(format!(
                "Initialization of BitstringDistribution object FAILED: \
                 the input dictionary is not a bitstring probability distribution ({})",
                reason
            )));
        }

        if is_normalized(&input) {
            return Ok(Self {
                distribution: input,
                normalized: true,
            });
        }

        if normalize {
            let distribution = normalize_bitstring_distribution(input)?;
            if !is_normalized(&distribution) {
                let norm = distribution.values().sum();
                return Err(NormalizationError::DegenerateDistribution { norm }.into());
            }
            return Ok(Self {
                distribution,
                normalized: true,
            });
        }

        tracing::warn!(
            n_bitstrings = input.len(),
            "BitstringDistribution object is not normalized"
        );
        Ok(Self {
            distribution: input,
            normalized: false,
        })
    }

    /// Build from a dense vector of `2^L` probabilities.
    ///
    /// Entry `i` is keyed by the `L`-bit binary rendering of `i`, reversed
    /// (least significant bit first). The result is normalized.
    ///
    /// ```rust
    /// use bitstring_distribution::BitstringDistribution;
    ///
    /// let dist = BitstringDistribution::create_from_probability_distribution(&[0.1, 0.2, 0.3, 0.4])
    ///     .unwrap();
    /// assert_eq!(dist.get("10"), 0.2);
    /// assert_eq!(dist.get("01"), 0.3);
    /// ```
    pub fn create_from_probability_distribution(probabilities: &[f64]) -> Result<Self> {
        let n = probabilities.len();
        if n < 2 || !n.is_power_of_two() {
            return Err(DistributionError::InvalidDistribution(format!(
                "probability vector length must be a power of two >= 2, got {}",
                n
            )));
        }

        let qubit_count = n.trailing_zeros() as usize;
        let distribution: BitstringMap = probabilities
            .iter()
            .enumerate()
            .map(|(state, &p)| (state_to_bitstring(state, qubit_count), p))
            .collect();

        tracing::debug!(qubit_count, "bitstring distribution from probability vector");
        Self::new(distribution, true)
    }

    /// Build from measurement samples, normalizing counts into probabilities.
    ///
    /// ```rust
    /// use bitstring_distribution::BitstringDistribution;
    ///
    /// let samples = vec![vec![0u8, 0], vec![0, 0], vec![1, 1]];
    /// let dist = BitstringDistribution::create_from_measurements(&samples).unwrap();
    /// assert!((dist.get("00") - 2.0 / 3.0).abs() < 1e-12);
    /// ```
    pub fn create_from_measurements<I, S>(samples: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        Self::create_from_measurements_with(samples, true)
    }

    /// Build from measurement samples, keeping raw counts when `normalize` is false
    pub fn create_from_measurements_with<I, S>(samples: I, normalize: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for bitstring in convert_tuples_to_bitstrings(samples) {
            *counts.entry(bitstring).or_insert(0) += 1;
        }

        tracing::debug!(
            n_outcomes = counts.len(),
            n_samples = counts.values().sum::<u64>(),
            "bitstring distribution from measurements"
        );

        let distribution = counts
            .into_iter()
            .map(|(bitstring, count)| (bitstring, count as f64))
            .collect();
        Self::new(distribution, normalize)
    }

    /// Number of qubits, i.e. the common bitstring length
    #[inline]
    pub fn get_qubit_count(&self) -> usize {
        // non-empty and fixed-length, checked in `new`
        self.distribution.keys().next().map_or(0, |key| key.len())
    }

    /// Whether the weights sum to 1.0
    #[inline]
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Rescale in place to unit sum. No-op if already normalized.
    ///
    /// On failure the distribution is left unchanged.
    pub fn normalize(&mut self) -> Result<()> {
        if self.normalized {
            return Ok(());
        }
        rescale(&mut self.distribution)?;
        if !is_normalized(&self.distribution) {
            let norm = self.distribution.values().sum();
            return Err(NormalizationError::DegenerateDistribution { norm }.into());
        }
        self.normalized = true;
        Ok(())
    }

    /// Underlying bitstring mapping
    #[inline]
    pub fn distribution_dict(&self) -> &BitstringMap {
        &self.distribution
    }

    /// Weight of a bitstring, 0.0 if absent
    #[inline]
    pub fn get(&self, bitstring: &str) -> f64 {
        self.distribution.get(bitstring).copied().unwrap_or(0.0)
    }

    /// Number of bitstrings with an explicit weight
    #[inline]
    pub fn len(&self) -> usize {
        self.distribution.len()
    }

    /// True if there are no bitstrings (never, for a constructed distribution)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.distribution.is_empty()
    }

    /// Iterate over `(bitstring, weight)` pairs in lexicographic order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.distribution.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Consume into the underlying mapping
    pub fn into_inner(self) -> BitstringMap {
        self.distribution
    }
}

impl TryFrom<BitstringMap> for BitstringDistribution {
    type Error = DistributionError;

    fn try_from(input: BitstringMap) -> Result<Self> {
        Self::new(input, true)
    }
}

impl From<BitstringDistribution> for BitstringMap {
    fn from(dist: BitstringDistribution) -> Self {
        dist.distribution
    }
}

impl fmt::Display for BitstringDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitstringDistribution(input={:?})", self.distribution)
    }
}
