use anyhow::Context;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct FetchParams {
    #[schemars(description = "URL of the web page to fetch")]
    pub url: String,
    #[schemars(description = "CSS selector to extract text from (omit for full body text)")]
    pub selector: Option<String>,
}

/// Fetch a page over plain HTTP and extract its text content.
pub async fn fetch_web_content(
    client: &reqwest::Client,
    params: &FetchParams,
) -> Result<String, ToolError> {
    tracing::info!("Fetching: {}", params.url);

    let response = client
        .get(&params.url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("Failed to fetch {}", params.url))?;
    let html = response
        .text()
        .await
        .with_context(|| format!("Failed to read response body from {}", params.url))?;

    extract_text(&html, params.selector.as_deref())
}

/// Extract text from an HTML document.
///
/// With a selector, concatenates the text of every matching element
/// (empty string when nothing matches). Without one, returns the text of
/// the document body.
pub fn extract_text(html: &str, selector: Option<&str>) -> Result<String, ToolError> {
    let document = Html::parse_document(html);

    let selector = selector.unwrap_or("body");
    let parsed = Selector::parse(selector)
        .map_err(|e| ToolError::InvalidParams(format!("Invalid selector '{}': {}", selector, e)))?;

    let text = document
        .select(&parsed)
        .map(|element| element.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(text)
}
