use anyhow::Context;
use chromiumoxide::page::Page;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchParams {
    #[schemars(description = "Search query")]
    pub query: String,
}

/// One search result as scraped from the rendered results page.
/// Either field may come back empty when the page layout shifts.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
}

/// Runs inside the results page. The url comes from the link enclosing the
/// heading; the block's first anchor is only a fallback, since result blocks
/// often lead with cite or tracking links.
pub const RESULTS_JS: &str = r#"
    (() => {
        return [...document.querySelectorAll('div.g')].map(el => {
            const heading = el.querySelector('h3');
            const link = (heading && heading.closest('a')) || el.querySelector('a');
            return {
                title: heading ? heading.textContent : '',
                url: link ? link.href : '',
            };
        });
    })()
"#;

/// Run a web search by rendering the results page in the browser and
/// scraping `{title, url}` records out of it.
pub async fn search_web(page: &Page, params: &SearchParams) -> Result<String, ToolError> {
    let url = url::Url::parse_with_params("https://www.google.com/search", [("q", &params.query)])
        .context("Failed to build search URL")?;

    tracing::info!("Searching: {}", params.query);
    page.goto(url.as_str())
        .await
        .with_context(|| format!("Failed to navigate to search results for '{}'", params.query))?;

    // Results are rendered client-side; let them settle.
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    let results: Vec<SearchResult> = page
        .evaluate(RESULTS_JS)
        .await
        .context("Failed to extract search results")?
        .into_value()
        .context("Failed to parse search results")?;

    format_results(&results).map_err(ToolError::from)
}

/// Serialize result records as pretty-printed JSON text.
pub fn format_results(results: &[SearchResult]) -> anyhow::Result<String> {
    serde_json::to_string_pretty(results).context("Failed to serialize search results")
}
