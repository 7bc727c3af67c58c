use anyhow::Context;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ScreenshotParams {
    #[schemars(description = "URL of the page to screenshot")]
    pub url: String,
    #[schemars(description = "CSS selector of the element to screenshot (omit for full page)")]
    pub selector: Option<String>,
}

/// Navigate to a URL and capture a PNG screenshot, returned base64-encoded.
///
/// With a selector, captures the first matching element and fails with
/// `ElementNotFound` when nothing matches. Without one, captures the full
/// scrollable page.
pub async fn screenshot(page: &Page, params: &ScreenshotParams) -> Result<String, ToolError> {
    use base64::Engine;

    tracing::info!("Screenshot: {}", params.url);
    page.goto(&params.url)
        .await
        .with_context(|| format!("Failed to navigate to {}", params.url))?;

    // goto() waits for the load event; give post-load JS a moment to render.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let bytes = if let Some(ref selector) = params.selector {
        let element = page
            .find_element(selector.as_str())
            .await
            .map_err(|e| find_element_error(selector, e))?;
        element
            .screenshot(chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat::Png)
            .await
            .context("Failed to take element screenshot")?
    } else {
        page.screenshot(
            chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotParams::builder()
                .capture_beyond_viewport(true)
                .build(),
        )
        .await
        .context("Failed to take page screenshot")?
    };

    Ok(base64::engine::general_purpose::STANDARD.encode(&bytes))
}

/// Tell a selector that matched nothing apart from an engine or transport
/// failure at the same call site.
///
/// Chrome reports an unmatched selector as a failed node lookup; any other
/// CDP error (dropped connection, crashed page) stays an internal failure.
fn find_element_error(selector: &str, err: CdpError) -> ToolError {
    match err {
        CdpError::NotFound => ToolError::ElementNotFound(selector.to_string()),
        CdpError::Chrome(ref e) if e.message.contains("Could not find node") => {
            ToolError::ElementNotFound(selector.to_string())
        }
        other => anyhow::Error::new(other)
            .context(format!("Failed to query selector '{}'", selector))
            .into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_node_maps_to_element_not_found() {
        let err = find_element_error("#hero", CdpError::NotFound);
        assert!(matches!(err, ToolError::ElementNotFound(ref s) if s == "#hero"));
    }

    #[test]
    fn engine_failure_stays_internal() {
        let err = find_element_error("#hero", CdpError::Timeout);
        assert!(matches!(err, ToolError::Internal(_)));
        assert!(err.to_string().contains("#hero"));
    }
}
