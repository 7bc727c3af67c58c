use rmcp::model::*;
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{Error as McpError, ServerHandler};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::browser::BrowserSession;
use crate::error::ToolError;
use crate::memory::KeyValueStore;
use crate::tools::{fetch, memory, screenshot, search};

/// The MCP server that routes tool calls to their handlers.
///
/// Holds the lazily-launched shared browser, the in-memory key/value store,
/// and the HTTP client. `dispatch` is the routing layer: exact-name lookup,
/// argument validation, and normalization of every handler failure into a
/// typed protocol error — `MethodNotFound` for unknown tools, `InvalidParams`
/// for missing or malformed arguments, `InternalError` for everything else.
#[derive(Clone)]
pub struct WebToolsServer {
    session: Arc<Mutex<Option<BrowserSession>>>,
    store: KeyValueStore,
    http: reqwest::Client,
    headless: bool,
}

impl WebToolsServer {
    pub fn new(headless: bool) -> Self {
        Self {
            session: Arc::new(Mutex::new(None)),
            store: KeyValueStore::new(),
            http: reqwest::Client::new(),
            headless,
        }
    }

    /// The advertised tool catalog, in a fixed order.
    pub fn catalog() -> Vec<Tool> {
        vec![
            Tool::new(
                "fetch_web_content",
                "Fetch a web page and extract its text content, optionally scoped to a CSS selector.",
                input_schema::<fetch::FetchParams>(),
            ),
            Tool::new(
                "memory_store",
                "Store, retrieve, or delete a value in the in-memory key/value store.",
                input_schema::<memory::MemoryParams>(),
            ),
            Tool::new(
                "puppeteer_screenshot",
                "Navigate to a URL and take a screenshot of the page or a specific element. Returns base64-encoded PNG.",
                input_schema::<screenshot::ScreenshotParams>(),
            ),
            Tool::new(
                "search_web",
                "Search the web and return results as JSON records with title and url.",
                input_schema::<search::SearchParams>(),
            ),
        ]
    }

    /// Route an invocation to its handler by exact tool name.
    pub async fn dispatch(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, McpError> {
        match request.name.as_ref() {
            "fetch_web_content" => {
                let params: fetch::FetchParams = parse_params(request.arguments)?;
                let text = fetch::fetch_web_content(&self.http, &params).await?;
                Self::text_result(text)
            }
            "memory_store" => {
                let params: memory::MemoryParams = parse_params(request.arguments)?;
                let msg = memory::memory_store(&self.store, &params).await?;
                Self::text_result(msg)
            }
            "puppeteer_screenshot" => {
                let params: screenshot::ScreenshotParams = parse_params(request.arguments)?;
                let encoded = self
                    .with_new_page(|page| async move {
                        screenshot::screenshot(&page, &params).await
                    })
                    .await?;
                Self::text_result(encoded)
            }
            "search_web" => {
                let params: search::SearchParams = parse_params(request.arguments)?;
                let results = self
                    .with_new_page(|page| async move { search::search_web(&page, &params).await })
                    .await?;
                Self::text_result(results)
            }
            other => Err(McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("Unknown tool: {}", other),
                None,
            )),
        }
    }

    /// Ensure the browser is launched.
    ///
    /// The launch happens while the session lock is held, so a concurrent
    /// first caller waits for the in-flight launch instead of starting a
    /// second Chrome instance.
    pub async fn ensure_browser(&self) -> Result<(), McpError> {
        let mut session = self.session.lock().await;
        if session.is_none() {
            tracing::info!("Launching browser (headless: {})", self.headless);
            let s = BrowserSession::launch(self.headless).await.map_err(|e| {
                McpError::internal_error(format!("Failed to launch browser: {}", e), None)
            })?;
            *session = Some(s);
        }
        Ok(())
    }

    /// Run a browser-dependent handler on a fresh page.
    ///
    /// Opens a new page, runs the handler, and closes the page whether the
    /// handler succeeded or not, then propagates the handler's result.
    pub async fn with_new_page<F, Fut, T>(&self, f: F) -> Result<T, McpError>
    where
        F: FnOnce(chromiumoxide::page::Page) -> Fut,
        Fut: std::future::Future<Output = Result<T, ToolError>>,
    {
        self.ensure_browser().await?;
        let page = {
            let session = self.session.lock().await;
            let session_ref = session.as_ref().unwrap();
            session_ref.new_page().await.map_err(|e| {
                McpError::internal_error(format!("Failed to open page: {}", e), None)
            })?
            // Lock drops here — concurrent calls get their own pages
        };

        let result = f(page.clone()).await;

        if let Err(e) = page.close().await {
            tracing::warn!("Failed to close page: {}", e);
        }

        result.map_err(McpError::from)
    }

    /// Close the browser if it was ever launched. Called on shutdown.
    pub async fn shutdown(&self) {
        let mut session = self.session.lock().await;
        if let Some(s) = session.take() {
            if let Err(e) = s.close().await {
                tracing::warn!("Failed to close browser: {}", e);
            }
        }
    }

    pub async fn is_browser_running(&self) -> bool {
        self.session.lock().await.is_some()
    }

    fn text_result(msg: impl Into<String>) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(msg)]))
    }
}

impl ServerHandler for WebToolsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "webtools-mcp: Fetch and parse web pages, capture screenshots, \
                 search the web, and keep short-lived key/value notes."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch(request).await
    }

    async fn list_tools(
        &self,
        _request: PaginatedRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            next_cursor: None,
            tools: Self::catalog(),
        })
    }
}

/// Deserialize untyped request arguments into a tool's typed params.
fn parse_params<T: serde::de::DeserializeOwned>(
    arguments: Option<JsonObject>,
) -> Result<T, McpError> {
    let value = serde_json::Value::Object(arguments.unwrap_or_default());
    serde_json::from_value(value)
        .map_err(|e| McpError::invalid_params(format!("Invalid arguments: {}", e), None))
}

/// JSON schema for a tool's params, derived from its type.
fn input_schema<T: schemars::JsonSchema>() -> Arc<JsonObject> {
    match serde_json::to_value(schemars::schema_for!(T)) {
        Ok(serde_json::Value::Object(map)) => Arc::new(map),
        _ => Arc::new(JsonObject::default()),
    }
}
