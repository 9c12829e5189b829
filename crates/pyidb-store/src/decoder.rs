//! Record decoders.
//!
//! The loader only ever sees `serde_json::Value` trees: strings, numbers,
//! booleans, null, lists and string-keyed mappings. A decoder turns one file
//! into such a tree.

use anyhow::{anyhow, Result};
use serde_json::Value;
use std::path::Path;

/// Decodes one record file into a nested value tree.
pub trait RecordDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<Value>;
}

/// Decoder for JSON-encoded record files.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRecordDecoder;

impl RecordDecoder for JsonRecordDecoder {
    fn decode(&self, path: &Path) -> Result<Value> {
        let bytes = std::fs::read(path)
            .map_err(|e| anyhow!("Failed to read module file {}: {}", path.display(), e))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| anyhow!("Failed to decode module file {}: {}", path.display(), e))
    }
}
