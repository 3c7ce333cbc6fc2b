//! WebAssembly bindings for bitstring distributions.
//!
//! Provides a JavaScript-friendly API for browser and Node.js environments.
//!
//! ## Usage (JavaScript/TypeScript)
//!
//! ```javascript
//! import init, { WasmBitstringDistribution, evaluateDistance } from 'bitstring-distribution';
//!
//! await init();
//!
//! const target = WasmBitstringDistribution.fromProbabilities([0.5, 0, 0, 0.5]);
//! const measured = WasmBitstringDistribution.fromMeasurements(
//!     new Uint8Array([0, 0, 1, 1, 0, 0]), 2);
//!
//! const nll = evaluateDistance(target.toJson(), measured.toJson());
//! console.log(`NLL = ${nll}`);
//! ```

use crate::artifact::{load_bitstring_distribution_with, SerializableArtifact};
use crate::distance::{evaluate_distribution_distance, DistanceMeasure, DEFAULT_EPSILON};
use crate::distribution::BitstringDistribution;
use crate::error::DistributionError;
use crate::validation::BitstringMap;
use wasm_bindgen::prelude::*;

/// Initialize the WASM module (call once at startup)
#[wasm_bindgen(start)]
pub fn wasm_init() {
    console_error_panic_hook::set_once();
}

/// WASM-compatible bitstring distribution
#[wasm_bindgen]
pub struct WasmBitstringDistribution {
    inner: BitstringDistribution,
}

#[wasm_bindgen]
impl WasmBitstringDistribution {
    /// Create from a JSON object mapping bitstrings to weights
    #[wasm_bindgen(constructor)]
    pub fn new(mapping_json: &str, normalize: bool) -> Result<WasmBitstringDistribution, JsValue> {
        let map: BitstringMap = serde_json::from_str(mapping_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid mapping: {}", e)))?;
        let inner = BitstringDistribution::new(map, normalize)?;
        Ok(Self { inner })
    }

    /// Create from a dense vector of 2^L probabilities
    #[wasm_bindgen(js_name = "fromProbabilities")]
    pub fn from_probabilities(
        probabilities: Vec<f64>,
    ) -> Result<WasmBitstringDistribution, JsValue> {
        let inner = BitstringDistribution::create_from_probability_distribution(&probabilities)?;
        Ok(Self { inner })
    }

    /// Create from measurement samples packed as consecutive `qubit_count`-bit groups
    #[wasm_bindgen(js_name = "fromMeasurements")]
    pub fn from_measurements(
        bits: Vec<u8>,
        qubit_count: usize,
    ) -> Result<WasmBitstringDistribution, JsValue> {
        if qubit_count == 0 || bits.len() % qubit_count != 0 {
            return Err(DistributionError::InvalidDistribution(format!(
                "{} bits cannot be split into samples of {} qubits",
                bits.len(),
                qubit_count
            ))
            .into());
        }
        let inner = BitstringDistribution::create_from_measurements(bits.chunks_exact(qubit_count))?;
        Ok(Self { inner })
    }

    /// Restore from a schema-tagged document, keeping its normalization state
    #[wasm_bindgen(js_name = "fromJson")]
    pub fn from_json(document_json: &str) -> Result<WasmBitstringDistribution, JsValue> {
        let inner = load_bitstring_distribution_with(document_json.as_bytes(), false)?;
        Ok(Self { inner })
    }

    /// Export as a schema-tagged document
    #[wasm_bindgen(js_name = "toJson")]
    pub fn to_json(&self) -> Result<String, JsValue> {
        Ok(self.inner.to_json_string()?)
    }

    #[wasm_bindgen(js_name = "qubitCount")]
    pub fn qubit_count(&self) -> usize {
        self.inner.get_qubit_count()
    }

    #[wasm_bindgen(js_name = "isNormalized")]
    pub fn is_normalized(&self) -> bool {
        self.inner.is_normalized()
    }

    /// Weight of a bitstring (0 if absent)
    pub fn get(&self, bitstring: &str) -> f64 {
        self.inner.get(bitstring)
    }

    /// Bitstrings with an explicit weight, in lexicographic order
    pub fn bitstrings(&self) -> js_sys::Array {
        self.inner
            .iter()
            .map(|(bitstring, _)| JsValue::from_str(bitstring))
            .collect()
    }

    /// Rescale to unit sum in place
    pub fn normalize(&mut self) -> Result<(), JsValue> {
        Ok(self.inner.normalize()?)
    }

    /// Get library version
    #[wasm_bindgen(js_name = "version")]
    pub fn version() -> String {
        crate::VERSION.to_string()
    }
}

/// Distance between two schema-tagged distribution documents.
///
/// Documents keep their saved normalization state, so a normalized target
/// cannot be scored against raw counts.
#[wasm_bindgen(js_name = "evaluateDistance")]
pub fn evaluate_distance(
    target_json: &str,
    measured_json: &str,
    measure: Option<String>,
    epsilon: Option<f64>,
) -> Result<f64, JsValue> {
    let target = load_bitstring_distribution_with(target_json.as_bytes(), false)?;
    let measured = load_bitstring_distribution_with(measured_json.as_bytes(), false)?;
    let measure = measure.unwrap_or_else(|| DistanceMeasure::default().as_str().to_string());

    Ok(evaluate_distribution_distance(
        &target,
        &measured,
        &measure,
        epsilon.unwrap_or(DEFAULT_EPSILON),
    )?)
}
