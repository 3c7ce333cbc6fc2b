//! Well-formedness predicates over bitstring-keyed weight mappings.
//!
//! A mapping qualifies as a bitstring distribution when:
//! - every weight is non-negative,
//! - every key has the same length,
//! - every key is made of `'0'` and `'1'` only.
//!
//! Normalization is checked separately by [`is_normalized`].

use std::collections::BTreeMap;

/// Sparse mapping from bitstring to weight
pub type BitstringMap = BTreeMap<String, f64>;

/// Relative tolerance used by [`is_normalized`]
pub const RELATIVE_TOLERANCE: f64 = 1e-9;

/// Absolute tolerance used by [`is_normalized`]
pub const ABSOLUTE_TOLERANCE: f64 = 0.0;

/// Closeness test with combined relative and absolute tolerance.
///
/// Non-finite values are never close to anything.
#[inline]
pub fn is_close(a: f64, b: f64, rel_tol: f64, abs_tol: f64) -> bool {
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    if a == b {
        return true;
    }
    let diff = (a - b).abs();
    diff <= (rel_tol * a.abs().max(b.abs())).max(abs_tol)
}

/// True iff every weight is `>= 0`. Vacuously true for an empty mapping.
///
/// NaN weights are rejected.
#[inline]
pub fn is_non_negative(input: &BitstringMap) -> bool {
    input.values().all(|&value| value >= 0.0)
}

/// True iff every key has the length of the first key.
///
/// An empty mapping has no key length and is reported as not fixed.
pub fn is_key_length_fixed(input: &BitstringMap) -> bool {
    let mut keys = input.keys();
    match keys.next() {
        Some(first) => {
            let key_length = first.len();
            keys.all(|key| key.len() == key_length)
        }
        None => false,
    }
}

/// True iff every character of every key is `'0'` or `'1'`
#[inline]
pub fn are_keys_binary_strings(input: &BitstringMap) -> bool {
    input
        .keys()
        .all(|key| key.chars().all(|c| c == '0' || c == '1'))
}

/// Combined well-formedness gate used at construction
pub fn is_bitstring_distribution(input: &BitstringMap) -> bool {
    is_non_negative(input) && is_key_length_fixed(input) && are_keys_binary_strings(input)
}

/// True iff the weights sum to 1.0 within tolerance
pub fn is_normalized(input: &BitstringMap) -> bool {
    let norm: f64 = input.values().sum();
    is_close(norm, 1.0, RELATIVE_TOLERANCE, ABSOLUTE_TOLERANCE)
}

/// Explain why a mapping fails [`is_bitstring_distribution`], if it does
pub(crate) fn describe_violation(input: &BitstringMap) -> Option<String> {
    if input.is_empty() {
        return Some("the input dictionary is empty".to_string());
    }
    if !is_non_negative(input) {
        return Some("values must be non-negative floats".to_string());
    }
    if !is_key_length_fixed(input) {
        return Some("keys must be same-length binary strings (mixed lengths)".to_string());
    }
    if !are_keys_binary_strings(input) {
        return Some("keys must be same-length binary strings (non-binary characters)".to_string());
    }
    None
}
