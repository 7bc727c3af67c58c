use std::path::PathBuf;

use rmcp::model::{CallToolRequestParam, ErrorCode};
use webtools_mcp::browser::BrowserSession;
use webtools_mcp::error::ToolError;
use webtools_mcp::server::WebToolsServer;
use webtools_mcp::tools::screenshot::{self, ScreenshotParams};
use webtools_mcp::tools::search::{SearchResult, RESULTS_JS};

fn call(name: &'static str, arguments: serde_json::Value) -> CallToolRequestParam {
    CallToolRequestParam {
        name: name.into(),
        arguments: arguments.as_object().cloned(),
    }
}

fn content_text(result: &rmcp::model::CallToolResult) -> String {
    let value = serde_json::to_value(result).expect("tool result should serialize");
    value["content"][0]["text"]
        .as_str()
        .expect("tool result should carry text content")
        .to_string()
}

fn fixture_url(name: &str) -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let path = PathBuf::from(manifest_dir).join("fixtures").join(name);
    format!("file://{}", path.display())
}

fn decode_png(base64_text: &str) -> Vec<u8> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(base64_text)
        .expect("screenshot should be valid base64")
}

// ── Dispatch Tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_unknown_tool_is_method_not_found() {
    let server = WebToolsServer::new(true);
    let err = server
        .dispatch(call("no_such_tool", serde_json::json!({})))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::METHOD_NOT_FOUND);
    assert!(
        err.message.contains("no_such_tool"),
        "error should name the offending tool, got: {}",
        err.message
    );
}

#[tokio::test]
async fn test_supported_tool_routes_to_handler() {
    let server = WebToolsServer::new(true);
    server
        .dispatch(call(
            "memory_store",
            serde_json::json!({"operation": "set", "key": "k", "value": "v"}),
        ))
        .await
        .unwrap();

    let result = server
        .dispatch(call(
            "memory_store",
            serde_json::json!({"operation": "get", "key": "k"}),
        ))
        .await
        .unwrap();
    assert_eq!(content_text(&result), "v");
}

#[tokio::test]
async fn test_dispatch_set_without_value_is_invalid_params() {
    let server = WebToolsServer::new(true);
    let err = server
        .dispatch(call(
            "memory_store",
            serde_json::json!({"operation": "set", "key": "k"}),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
}

#[tokio::test]
async fn test_dispatch_rejects_unrecognized_operation() {
    let server = WebToolsServer::new(true);
    let err = server
        .dispatch(call(
            "memory_store",
            serde_json::json!({"operation": "clear", "key": "k"}),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
}

#[tokio::test]
async fn test_catalog_advertises_all_tools_in_order() {
    let names: Vec<String> = WebToolsServer::catalog()
        .iter()
        .map(|tool| tool.name.to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "fetch_web_content",
            "memory_store",
            "puppeteer_screenshot",
            "search_web"
        ]
    );
    for tool in WebToolsServer::catalog() {
        assert!(!tool.description.is_empty());
        assert!(!tool.input_schema.is_empty(), "{} needs a schema", tool.name);
    }
}

// ── Screenshot Tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_page_screenshot_is_base64_png() {
    let session = BrowserSession::launch(true).await.unwrap();
    let page = session.new_page().await.unwrap();

    let params = ScreenshotParams {
        url: fixture_url("basic.html"),
        selector: None,
    };
    let encoded = screenshot::screenshot(&page, &params).await.unwrap();
    assert!(!encoded.is_empty());

    let bytes = decode_png(&encoded);
    assert_eq!(&bytes[0..4], &[0x89, 0x50, 0x4E, 0x47]);

    page.close().await.unwrap();
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_element_screenshot_with_selector() {
    let session = BrowserSession::launch(true).await.unwrap();
    let page = session.new_page().await.unwrap();

    let params = ScreenshotParams {
        url: fixture_url("basic.html"),
        selector: Some("#title".to_string()),
    };
    let encoded = screenshot::screenshot(&page, &params).await.unwrap();

    let bytes = decode_png(&encoded);
    assert_eq!(&bytes[0..4], &[0x89, 0x50, 0x4E, 0x47]);

    page.close().await.unwrap();
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_unmatched_selector_is_element_not_found() {
    let session = BrowserSession::launch(true).await.unwrap();
    let page = session.new_page().await.unwrap();

    let params = ScreenshotParams {
        url: fixture_url("basic.html"),
        selector: Some("#does-not-exist".to_string()),
    };
    let err = screenshot::screenshot(&page, &params).await.unwrap_err();
    assert!(
        matches!(err, ToolError::ElementNotFound(ref s) if s == "#does-not-exist"),
        "expected ElementNotFound, got: {err}"
    );

    page.close().await.unwrap();
    session.close().await.unwrap();
}

// ── Search Extraction Tests ─────────────────────────────────────────────

#[tokio::test]
async fn test_search_extraction_uses_link_enclosing_heading() {
    let session = BrowserSession::launch(true).await.unwrap();
    let page = session.new_page().await.unwrap();

    page.goto(fixture_url("search.html").as_str()).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    let results: Vec<SearchResult> = page
        .evaluate(RESULTS_JS)
        .await
        .unwrap()
        .into_value()
        .unwrap();

    assert_eq!(results.len(), 3);
    // The heading's enclosing link wins over the block's first anchor
    assert_eq!(results[0].title, "Result One");
    assert_eq!(results[0].url, "https://example.com/result1");
    // A heading with no enclosing or fallback link yields an empty url
    assert_eq!(results[1].title, "No Link Heading");
    assert_eq!(results[1].url, "");
    // No heading at all falls back to the block's first anchor
    assert_eq!(results[2].title, "");
    assert_eq!(results[2].url, "https://example.com/only-link");

    page.close().await.unwrap();
    session.close().await.unwrap();
}

// ── Browser Lifecycle Tests ─────────────────────────────────────────────

#[tokio::test]
async fn test_concurrent_first_calls_launch_one_browser() {
    let server = WebToolsServer::new(true);

    let a = server.with_new_page(|page| {
        let params = ScreenshotParams {
            url: fixture_url("basic.html"),
            selector: None,
        };
        async move { screenshot::screenshot(&page, &params).await }
    });
    let b = server.with_new_page(|page| {
        let params = ScreenshotParams {
            url: fixture_url("basic.html"),
            selector: None,
        };
        async move { screenshot::screenshot(&page, &params).await }
    });

    let (a, b) = tokio::join!(a, b);
    assert!(a.is_ok(), "first concurrent call failed: {a:?}");
    assert!(b.is_ok(), "second concurrent call failed: {b:?}");
    assert!(server.is_browser_running().await);

    server.shutdown().await;
    assert!(!server.is_browser_running().await);
}

#[tokio::test]
async fn test_failed_call_does_not_poison_session() {
    let server = WebToolsServer::new(true);

    // A call that fails on an unmatched selector still closes its page
    let failed = server
        .with_new_page(|page| {
            let params = ScreenshotParams {
                url: fixture_url("basic.html"),
                selector: Some("#nope".to_string()),
            };
            async move { screenshot::screenshot(&page, &params).await }
        })
        .await;
    assert!(failed.is_err());

    // The shared browser keeps serving subsequent calls
    let ok = server
        .with_new_page(|page| {
            let params = ScreenshotParams {
                url: fixture_url("basic.html"),
                selector: None,
            };
            async move { screenshot::screenshot(&page, &params).await }
        })
        .await;
    assert!(ok.is_ok(), "call after failure should succeed: {ok:?}");

    server.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_without_launch_is_noop() {
    let server = WebToolsServer::new(true);
    assert!(!server.is_browser_running().await);
    server.shutdown().await;
    assert!(!server.is_browser_running().await);
}
