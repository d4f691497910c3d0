use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::store::file_store::FileStoreConfig;

/// A wrapper for the credential store configuration:
/// - enabled: if false, the store is effectively disabled (NoStore).
/// - backend: the actual store backend (file, memory).
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct StoreConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(flatten)]
    pub backend: Option<StoreBackend>,
}

/// The existing store backends. We differentiate them via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(tag = "type")]
pub enum StoreBackend {
    #[serde(rename = "file")]
    File(FileStoreConfig),
    #[serde(rename = "memory")]
    Memory,
}
