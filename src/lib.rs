//! # Bitstring Distribution
//!
//! Probability distributions over fixed-length bitstrings, as produced by
//! sampling the measurement outcomes of a quantum circuit.
//!
//! ## Theory
//!
//! A circuit over `L` qubits yields one of `2^L` bitstrings per shot. The
//! empirical distribution of those outcomes is compared against a target
//! distribution with the clipped negative log-likelihood
//!
//! ```text
//! NLL(T, M) = -Σ_k T(k) · ln(max(ε, M(k)))
//! ```
//!
//! which serves as the cost of generative-model training loops.
//!
//! ## Features
//!
//! - `std` (default): Standard library support
//! - `wasm`: WebAssembly bindings via wasm-bindgen
//!
//! ## Example
//!
//! ```rust
//! use bitstring_distribution::{BitstringDistribution, DistanceEvaluator};
//!
//! // Bell state target: |00> and |11> with equal probability
//! let target =
//!     BitstringDistribution::create_from_probability_distribution(&[0.5, 0.0, 0.0, 0.5]).unwrap();
//!
//! // Shots returned by the device
//! let shots = vec![vec![0u8, 0], vec![1, 1], vec![0, 0], vec![0, 1]];
//! let measured = BitstringDistribution::create_from_measurements(&shots).unwrap();
//!
//! let nll = DistanceEvaluator::new().evaluate(&target, &measured).unwrap();
//! println!("NLL = {:.4}", nll);
//! ```

pub mod artifact;
pub mod distance;
pub mod distribution;
pub mod error;
pub mod validation;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-exports
pub use artifact::*;
pub use distance::*;
pub use distribution::*;
pub use error::*;
pub use validation::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library (call once, especially important for WASM)
#[cfg(feature = "wasm")]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_basic_workflow() {
        let target =
            BitstringDistribution::create_from_probability_distribution(&[0.5, 0.0, 0.0, 0.5])
                .unwrap();
        assert_eq!(target.get("00"), 0.5);
        assert_eq!(target.get("11"), 0.5);

        let shots = vec![vec![0u8, 0], vec![1, 1], vec![0, 0], vec![0, 1]];
        let measured = BitstringDistribution::create_from_measurements(&shots).unwrap();

        let nll = DistanceEvaluator::new().evaluate(&target, &measured).unwrap();
        // -(0.5 ln 0.5 + 0.5 ln 0.25)
        assert_relative_eq!(nll, 1.5 * std::f64::consts::LN_2, epsilon = 1e-12);

        let by_name =
            evaluate_distribution_distance(&target, &measured, "clipped_log_likelihood", 1e-9)
                .unwrap();
        assert_relative_eq!(nll, by_name);
    }

    #[test]
    fn test_persisted_distributions_score_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("target.json");

        let target =
            BitstringDistribution::create_from_probability_distribution(&[0.1, 0.2, 0.3, 0.4])
                .unwrap();
        save_bitstring_distribution(&target, &path).unwrap();
        let reloaded = load_bitstring_distribution(&path).unwrap();

        let measured = BitstringDistribution::create_from_measurements([[0u8, 1], [1, 0]]).unwrap();
        let evaluator = DistanceEvaluator::new();
        assert_relative_eq!(
            evaluator.evaluate(&target, &measured).unwrap(),
            evaluator.evaluate(&reloaded, &measured).unwrap(),
            epsilon = 1e-12
        );
    }
}
