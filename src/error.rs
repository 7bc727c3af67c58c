use rmcp::Error as McpError;

/// Typed failures surfaced by tool handlers.
///
/// Everything a handler can fail with collapses into one of these variants
/// before it reaches the transport. The dispatch boundary converts them to
/// protocol errors, so a caller never sees a raw error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// A required CSS selector matched nothing on the page.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// A required argument was missing or malformed.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Any failure from the HTTP fetch, HTML parse, or browser engine.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::InvalidParams(msg) => McpError::invalid_params(msg, None),
            // ElementNotFound keeps its own message so callers can tell it
            // apart from navigation or engine failures.
            ToolError::ElementNotFound(selector) => {
                McpError::internal_error(format!("Element not found: {}", selector), None)
            }
            ToolError::Internal(e) => McpError::internal_error(format!("{:#}", e), None),
        }
    }
}
