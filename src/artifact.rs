//! Schema-tagged JSON artifacts.
//!
//! Every serialized artifact is a JSON object carrying a `"schema"` string
//! next to its payload field:
//!
//! ```text
//! {
//!   "schema": "zapata-v1-bitstring-probability-distribution",
//!   "bitstring_distribution": { "00": 0.5, "11": 0.5 }
//! }
//! ```

use crate::distribution::BitstringDistribution;
use crate::error::{DistributionError, Result};
use crate::validation::BitstringMap;
use serde_json::{Map, Value};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Version prefix of every schema tag
pub const SCHEMA_VERSION: &str = "zapata-v1";

/// Contract for entities stored as schema-tagged JSON documents
pub trait SerializableArtifact: Sized {
    /// Schema tag without the version prefix
    const SCHEMA_SUFFIX: &'static str;

    /// Name of the field holding the payload
    const PAYLOAD_FIELD: &'static str;

    /// Full schema tag, e.g. `zapata-v1-bitstring-probability-distribution`
    fn schema() -> String {
        format!("{}-{}", SCHEMA_VERSION, Self::SCHEMA_SUFFIX)
    }

    fn to_payload(&self) -> Result<Value>;

    fn from_payload(payload: Value) -> Result<Self>;

    /// Tagged document as a JSON value
    fn to_document(&self) -> Result<Value> {
        let mut document = Map::new();
        document.insert("schema".to_string(), Value::String(Self::schema()));
        document.insert(Self::PAYLOAD_FIELD.to_string(), self.to_payload()?);
        Ok(Value::Object(document))
    }

    /// Extract the payload of a document, checking its schema tag
    fn payload_from_document(document: Value) -> Result<Value> {
        let mut document = match document {
            Value::Object(map) => map,
            other => {
                return Err(DistributionError::SerializationError(format!(
                    "expected a JSON object, got {}",
                    other
                )))
            }
        };

        let schema = match document.get("schema") {
            Some(Value::String(schema)) => schema.clone(),
            Some(other) => {
                return Err(DistributionError::SerializationError(format!(
                    "\"schema\" must be a string, got {}",
                    other
                )))
            }
            None => {
                return Err(DistributionError::SerializationError(
                    "missing \"schema\" field".to_string(),
                ))
            }
        };
        if !schema.ends_with(Self::SCHEMA_SUFFIX) {
            return Err(DistributionError::TypeMismatch {
                expected: Self::schema(),
                got: schema,
            });
        }

        document.remove(Self::PAYLOAD_FIELD).ok_or_else(|| {
            DistributionError::SerializationError(format!(
                "missing \"{}\" field",
                Self::PAYLOAD_FIELD
            ))
        })
    }

    /// Pretty-printed document with 2-space indentation
    fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document()?)?)
    }

    /// Parse a document from a JSON string
    fn from_json_str(json: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(json)?;
        Self::from_payload(Self::payload_from_document(document)?)
    }

    /// Write the document to `path`, overwriting any existing file
    fn save_to_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json_string()?)?;
        tracing::info!(path = %path.display(), schema = %Self::schema(), "saved artifact");
        Ok(())
    }

    /// Read a document from any reader
    fn load_from_json<R: Read>(reader: R) -> Result<Self> {
        let document: Value = serde_json::from_reader(reader)?;
        Self::from_payload(Self::payload_from_document(document)?)
    }

    /// Read a document from a file
    fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = fs::File::open(path)?;
        tracing::info!(path = %path.display(), schema = %Self::schema(), "loading artifact");
        Self::load_from_json(file)
    }
}

impl SerializableArtifact for BitstringDistribution {
    const SCHEMA_SUFFIX: &'static str = "bitstring-probability-distribution";
    const PAYLOAD_FIELD: &'static str = "bitstring_distribution";

    fn to_payload(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.distribution_dict())?)
    }

    /// Always renormalizes; see [`load_bitstring_distribution_with`] to keep raw weights
    fn from_payload(payload: Value) -> Result<Self> {
        let map: BitstringMap = serde_json::from_value(payload)?;
        BitstringDistribution::new(map, true)
    }
}

/// Save a bitstring distribution to a file
pub fn save_bitstring_distribution(
    distribution: &BitstringDistribution,
    path: impl AsRef<Path>,
) -> Result<()> {
    distribution.save_to_json(path)
}

/// Load a bitstring distribution from a file, normalizing it
pub fn load_bitstring_distribution(path: impl AsRef<Path>) -> Result<BitstringDistribution> {
    BitstringDistribution::load_from_path(path)
}

/// Load a bitstring distribution from a reader.
///
/// With `normalize == false` a distribution saved un-normalized (e.g. raw
/// measurement counts) is restored as-is instead of being rescaled.
pub fn load_bitstring_distribution_with<R: Read>(
    reader: R,
    normalize: bool,
) -> Result<BitstringDistribution> {
    let document: Value = serde_json::from_reader(reader)?;
    let payload = BitstringDistribution::payload_from_document(document)?;
    let map: BitstringMap = serde_json::from_value(payload)?;
    BitstringDistribution::new(map, normalize)
}
