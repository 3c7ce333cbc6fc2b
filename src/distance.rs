//! Distance measures between bitstring distributions.
//!
//! Currently implemented:
//! - Clipped negative log-likelihood
//!
//! ```text
//! NLL(T, M) = -Σ_k T(k) · ln(max(ε, M(k)))
//! ```
//!
//! where `k` runs over the union of both supports and missing bitstrings
//! weigh 0. Flooring `M(k)` at `ε` keeps the loss finite when the measured
//! distribution never produced a bitstring the target expects.

use crate::distribution::BitstringDistribution;
use crate::error::{DistributionError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Default clipping floor for the log-likelihood
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Available distance measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMeasure {
    /// Negative log-likelihood with the measured weights floored at epsilon
    ClippedLogLikelihood,
}

impl Default for DistanceMeasure {
    fn default() -> Self {
        Self::ClippedLogLikelihood
    }
}

impl DistanceMeasure {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMeasure::ClippedLogLikelihood => "clipped_log_likelihood",
        }
    }
}

impl FromStr for DistanceMeasure {
    type Err = DistributionError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "clipped_log_likelihood" => Ok(DistanceMeasure::ClippedLogLikelihood),
            other => Err(DistributionError::UnsupportedStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for DistanceMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Evaluator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceConfig {
    /// Which distance measure to compute
    #[serde(default)]
    pub measure: DistanceMeasure,

    /// Floor applied to measured weights before taking the logarithm
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            measure: DistanceMeasure::default(),
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl DistanceConfig {
    /// Check that the parameters are usable
    pub fn validate(&self) -> Result<()> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(DistributionError::ConfigError(format!(
                "epsilon must be finite and positive, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Clipped negative log-likelihood of `measured` under `target`.
///
/// See Equation (4) in Benedetti et al., "A generative modeling approach
/// for benchmarking and training shallow quantum circuits" (2019).
pub fn compute_clipped_negative_log_likelihood(
    target: &BitstringDistribution,
    measured: &BitstringDistribution,
    epsilon: f64,
) -> f64 {
    let all_keys: BTreeSet<&str> = target
        .distribution_dict()
        .keys()
        .chain(measured.distribution_dict().keys())
        .map(String::as_str)
        .collect();

    let mut value = 0.0;
    for bitstring in all_keys {
        let target_value = target.get(bitstring);
        let measured_value = measured.get(bitstring);
        value += target_value * epsilon.max(measured_value).ln();
    }

    -value
}

/// Check the preconditions shared by every distance measure
fn check_comparable(target: &BitstringDistribution, measured: &BitstringDistribution) -> Result<()> {
    let (target_qubits, measured_qubits) = (target.get_qubit_count(), measured.get_qubit_count());
    if target_qubits != measured_qubits {
        return Err(DistributionError::DomainMismatch {
            target: target_qubits,
            measured: measured_qubits,
        });
    }

    if target.is_normalized() != measured.is_normalized() {
        return Err(DistributionError::NormalizationMismatch {
            target: target.is_normalized(),
            measured: measured.is_normalized(),
        });
    }

    Ok(())
}

/// Evaluate the distance between a target and a measured distribution
/// with a measure chosen by name.
///
/// Fails with `DomainMismatch` on differing qubit counts,
/// `NormalizationMismatch` if only one side is normalized and
/// `UnsupportedStrategy` for an unknown measure name.
pub fn evaluate_distribution_distance(
    target: &BitstringDistribution,
    measured: &BitstringDistribution,
    measure: &str,
    epsilon: f64,
) -> Result<f64> {
    check_comparable(target, measured)?;
    let config = DistanceConfig {
        measure: measure.parse()?,
        epsilon,
    };
    Ok(DistanceEvaluator::with_config(config)?.evaluate_unchecked(target, measured))
}

/// Reusable distance evaluator bound to one configuration.
///
/// Typical use is as the cost function of a training loop that scores
/// many measured distributions against a fixed target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistanceEvaluator {
    config: DistanceConfig,
}

impl DistanceEvaluator {
    /// Create an evaluator with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: DistanceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get evaluator configuration
    pub fn config(&self) -> &DistanceConfig {
        &self.config
    }

    /// Distance between `target` and `measured`
    pub fn evaluate(
        &self,
        target: &BitstringDistribution,
        measured: &BitstringDistribution,
    ) -> Result<f64> {
        check_comparable(target, measured)?;
        Ok(self.evaluate_unchecked(target, measured))
    }

    fn evaluate_unchecked(
        &self,
        target: &BitstringDistribution,
        measured: &BitstringDistribution,
    ) -> f64 {
        let value = match self.config.measure {
            DistanceMeasure::ClippedLogLikelihood => {
                compute_clipped_negative_log_likelihood(target, measured, self.config.epsilon)
            }
        };

        tracing::debug!(
            measure = %self.config.measure,
            qubits = target.get_qubit_count(),
            value,
            "evaluated distribution distance"
        );
        value
    }

    /// Distance of each measured distribution from one target
    pub fn evaluate_batch(
        &self,
        target: &BitstringDistribution,
        measured: &[BitstringDistribution],
    ) -> Vec<Result<f64>> {
        measured.iter().map(|m| self.evaluate(target, m)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::BitstringMap;
    use approx::assert_relative_eq;

    fn dist(entries: &[(&str, f64)], normalize: bool) -> BitstringDistribution {
        let map: BitstringMap = entries.iter().map(|&(k, v)| (k.to_string(), v)).collect();
        BitstringDistribution::new(map, normalize).unwrap()
    }

    #[test]
    fn test_clipped_log_likelihood_value() {
        let target = dist(&[("00", 1.0)], true);
        let measured = dist(&[("00", 0.5), ("01", 0.5)], true);

        let value =
            evaluate_distribution_distance(&target, &measured, "clipped_log_likelihood", DEFAULT_EPSILON)
                .unwrap();
        assert_relative_eq!(value, std::f64::consts::LN_2, epsilon = 1e-12);
    }

    #[test]
    fn test_identical_distributions() {
        let p = dist(&[("0", 0.5), ("1", 0.5)], true);
        let value = DistanceEvaluator::new().evaluate(&p, &p).unwrap();
        assert_relative_eq!(value, std::f64::consts::LN_2, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_bitstring_is_clipped() {
        let target = dist(&[("11", 1.0)], true);
        let measured = dist(&[("00", 1.0)], true);

        let value = compute_clipped_negative_log_likelihood(&target, &measured, 1e-9);
        assert_relative_eq!(value, -(1e-9f64).ln(), epsilon = 1e-9);
        assert!(value.is_finite());

        let value = compute_clipped_negative_log_likelihood(&target, &measured, 1e-3);
        assert_relative_eq!(value, -(1e-3f64).ln(), epsilon = 1e-9);
    }

    #[test]
    fn test_unnormalized_pair_is_accepted() {
        let target = dist(&[("0", 2.0), ("1", 2.0)], false);
        let measured = dist(&[("0", 1.0), ("1", 3.0)], false);

        let value = DistanceEvaluator::new().evaluate(&target, &measured).unwrap();
        assert_relative_eq!(value, -(2.0 * 3.0f64.ln()), epsilon = 1e-12);
    }

    #[test]
    fn test_domain_mismatch() {
        let two = dist(&[("00", 1.0)], true);
        let three = dist(&[("000", 1.0)], true);

        let err = evaluate_distribution_distance(&two, &three, "clipped_log_likelihood", DEFAULT_EPSILON)
            .unwrap_err();
        assert!(matches!(
            err,
            DistributionError::DomainMismatch {
                target: 2,
                measured: 3
            }
        ));
    }

    #[test]
    fn test_normalization_mismatch() {
        let normalized = dist(&[("0", 0.5), ("1", 0.5)], true);
        let raw = dist(&[("0", 5.0), ("1", 5.0)], false);

        let err = DistanceEvaluator::new().evaluate(&normalized, &raw).unwrap_err();
        assert!(matches!(
            err,
            DistributionError::NormalizationMismatch {
                target: true,
                measured: false
            }
        ));
    }

    #[test]
    fn test_overflowing_weights_do_not_pass_as_normalized() {
        let normalized = dist(&[("0", 0.5), ("1", 0.5)], true);
        let overflowing = dist(&[("0", f64::MAX), ("1", f64::MAX)], false);

        let err = evaluate_distribution_distance(
            &normalized,
            &overflowing,
            "clipped_log_likelihood",
            DEFAULT_EPSILON,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DistributionError::NormalizationMismatch {
                target: true,
                measured: false
            }
        ));
    }

    #[test]
    fn test_unsupported_strategy() {
        let p = dist(&[("0", 1.0)], true);
        let err = evaluate_distribution_distance(&p, &p, "earth_movers", DEFAULT_EPSILON).unwrap_err();
        match err {
            DistributionError::UnsupportedStrategy(name) => assert_eq!(name, "earth_movers"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mismatch_checked_before_strategy() {
        let two = dist(&[("00", 1.0)], true);
        let one = dist(&[("0", 1.0)], true);
        let err = evaluate_distribution_distance(&two, &one, "unknown", DEFAULT_EPSILON).unwrap_err();
        assert!(matches!(err, DistributionError::DomainMismatch { .. }));
    }

    #[test]
    fn test_config_validation_and_serde() {
        assert!(DistanceEvaluator::with_config(DistanceConfig {
            epsilon: 0.0,
            ..Default::default()
        })
        .is_err());
        assert!(DistanceEvaluator::with_config(DistanceConfig {
            epsilon: f64::NAN,
            ..Default::default()
        })
        .is_err());

        let config: DistanceConfig = serde_json::from_str(r#"{"epsilon": 1e-6}"#).unwrap();
        assert_eq!(config.measure, DistanceMeasure::ClippedLogLikelihood);
        assert_eq!(config.epsilon, 1e-6);

        let config: DistanceConfig =
            serde_json::from_str(r#"{"measure": "clipped_log_likelihood"}"#).unwrap();
        assert_eq!(config.epsilon, DEFAULT_EPSILON);

        assert!(serde_json::from_str::<DistanceConfig>(r#"{"measure": "kl"}"#).is_err());
    }

    #[test]
    fn test_measure_names() {
        let measure: DistanceMeasure = "clipped_log_likelihood".parse().unwrap();
        assert_eq!(measure, DistanceMeasure::ClippedLogLikelihood);
        assert_eq!(measure.to_string(), "clipped_log_likelihood");
        assert!("".parse::<DistanceMeasure>().is_err());
    }

    #[test]
    fn test_batch_evaluation() {
        let target = dist(&[("0", 1.0)], true);
        let measured = vec![
            dist(&[("0", 1.0)], true),
            dist(&[("0", 0.5), ("1", 0.5)], true),
            dist(&[("00", 1.0)], true),
        ];

        let results = DistanceEvaluator::new().evaluate_batch(&target, &measured);
        assert_relative_eq!(*results[0].as_ref().unwrap(), 0.0);
        assert!(*results[1].as_ref().unwrap() > 0.0);
        assert!(results[2].is_err());
    }
}
