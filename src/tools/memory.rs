use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::memory::KeyValueStore;

/// Store operation. Anything outside this set is rejected during argument
/// deserialization, before the store is touched.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemoryOperation {
    Set,
    Get,
    Delete,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MemoryParams {
    #[schemars(description = "Operation to perform: set, get, or delete")]
    pub operation: MemoryOperation,
    #[schemars(description = "Key to operate on")]
    pub key: String,
    #[schemars(description = "Value to store (required for set)")]
    pub value: Option<String>,
}

/// Run a key/value operation against the shared store.
///
/// `get` on an unset key returns an empty string, indistinguishable from a
/// stored empty string.
pub async fn memory_store(
    store: &KeyValueStore,
    params: &MemoryParams,
) -> Result<String, ToolError> {
    match params.operation {
        MemoryOperation::Set => {
            let value = params.value.as_deref().ok_or_else(|| {
                ToolError::InvalidParams("Missing 'value' for set operation".to_string())
            })?;
            store.set(&params.key, value).await;
            Ok(format!("Stored value for key: {}", params.key))
        }
        MemoryOperation::Get => Ok(store.get(&params.key).await.unwrap_or_default()),
        MemoryOperation::Delete => {
            store.delete(&params.key).await;
            Ok(format!("Deleted key: {}", params.key))
        }
    }
}
