//! HTTP API server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::ledger: Ledger page, table and balance fragments, JSON API
//! - routes::settings: Configuration display
//! - routes::data: The static feed document

pub mod error;
pub mod routes;

use axum::{
    http::{header, HeaderMap, HeaderValue},
    routing::get,
    Router,
};
use lunacy_config::{Config, Theme};
use lunacy_core::Ledger;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::data::serve_feed;
    use routes::ledger::{
        api_balance, api_summary, api_transaction_detail, api_transactions, htmx_ledger_balance,
        htmx_ledger_table, page_ledger,
    };
    use routes::settings::api_settings;

    // Everything derived from the feed must be re-fetched, never replayed from a cache
    let uncached = Router::new()
        .route("/ledger/table", get(htmx_ledger_table))
        .route("/ledger/balance", get(htmx_ledger_balance))
        .route("/api/transactions", get(api_transactions))
        .route("/api/transactions/:id", get(api_transaction_detail))
        .route("/api/balance", get(api_balance))
        .route("/data/:file", get(serve_feed))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/summary", get(api_summary))
        .route("/api/settings", get(api_settings))
        // HTMX page routes
        .route("/", get(page_ledger))
        .route("/ledger", get(page_ledger))
        .merge(uncached)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str, default_theme: Theme) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Ledger Lunacy</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <script>
        tailwind.config = {{ darkMode: 'class' }};
        function applyTheme(theme) {{
            var dark = theme === 'dark' || (theme === 'system' && window.matchMedia('(prefers-color-scheme: dark)').matches);
            document.documentElement.classList.toggle('dark', dark);
        }}
        function setTheme(theme) {{
            localStorage.setItem('theme', theme);
            applyTheme(theme);
        }}
        applyTheme(localStorage.getItem('theme') || '{}');
        document.addEventListener('DOMContentLoaded', function () {{
            var select = document.getElementById('theme-select');
            if (select) {{ select.value = localStorage.getItem('theme') || '{}'; }}
        }});
    </script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
        .ledger-skeleton {{ display: none; }}
        .htmx-request .ledger-skeleton {{ display: table-row-group; }}
        .htmx-request .ledger-rows {{ display: none; }}
        details > summary::-webkit-details-marker {{ display: none; }}
    </style>
</head>
<body class="bg-white text-gray-900 dark:bg-gray-950 dark:text-gray-100">
    {}
</body>
</html>"#,
        title, default_theme, default_theme, content
    )
}

/// Top bar with the title and theme toggle
pub fn nav_bar() -> String {
    let options: String = [Theme::System, Theme::Light, Theme::Dark]
        .iter()
        .map(|theme| format!("<option value='{}'>{}</option>", theme, theme))
        .collect();

    format!(
        r#"<header class='border-b dark:border-gray-800'>
    <div class='mx-auto flex max-w-6xl items-center justify-between px-6 py-3'>
        <h1 class='text-xl font-bold'>Ledger Lunacy</h1>
        <label class='flex items-center gap-2 text-sm text-gray-500 dark:text-gray-400'>Theme
            <select id='theme-select' onchange='setTheme(this.value)' class='rounded-md border px-2 py-1 capitalize dark:border-gray-700 dark:bg-gray-900'>{}</select>
        </label>
    </div>
</header>"#,
        options
    )
}

/// Check if request is from HTMX
fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &HeaderMap, title: &str, inner_content: &str, config: &Config) -> String {
    if is_htmx_request(headers) {
        format!("<main class='px-6 py-10'>{}</main>", inner_content)
    } else {
        base_html(
            title,
            &format!("{}<main class='px-6 py-10'>{}</main>", nav_bar(), inner_content),
            config.display.default_theme,
        )
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Start the HTTP server
///
/// Binds to `server.host:server.port` and serves until Ctrl-C.
pub async fn start_server(config: Config, ledger: Arc<Ledger>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let feed_route = config.feed_route();
    let state = AppState { ledger, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting lunacy server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Ledger)");
    log::info!("  - /ledger/table, /ledger/balance (HTMX fragments)");
    log::info!("  - /api/* (JSON API endpoints)");
    log::info!("  - {} (static feed)", feed_route);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use lunacy_feed::{FetcherRef, FileFeedFetcher};
    use std::io::Write;
    use tower::ServiceExt;

    const FEED: &str = r#"{"transactions":[
        {"activity_id":"A1","date":"2023-03-14T10:00:00Z","type":"DEPOSIT","method":"ACH","amount":100,"balance":100,"source":{"description":"Checking"},"destination":{"description":"Brokerage"}},
        {"activity_id":"A3","date":"2023-03-15T10:00:00Z","type":"WITHDRAWAL","method":null,"amount":-50,"balance":50,"source":{"description":"Brokerage"},"destination":{"description":"Checking"}},
        {"activity_id":"A1","date":"2023-03-16T10:00:00Z","type":"DEPOSIT","amount":500,"balance":550,"source":{"description":"Checking"},"destination":{"description":"Brokerage"}},
        {"activity_id":"A2","date":"2023-03-17T10:00:00Z","type":"REFUND","amount":25,"balance":75,"source":{"description":"Store"},"destination":{"description":"Brokerage"}}
    ]}"#;

    struct Fixture {
        dir: tempfile::TempDir,
        router: Router,
    }

    fn fixture(feed: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.data.path = dir.path().to_path_buf();
        let mut file = std::fs::File::create(config.feed_path()).unwrap();
        file.write_all(feed.as_bytes()).unwrap();

        let fetcher: FetcherRef = Arc::new(FileFeedFetcher::new(config.feed_path()));
        let ledger = Arc::new(Ledger::new(config.clone(), fetcher));
        let router = create_router(AppState { ledger, config });
        Fixture { dir, router }
    }

    async fn get(router: &Router, uri: &str) -> (StatusCode, HeaderMap, String) {
        let response = router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn get_json(router: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, _, body) = get(router, uri).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_check() {
        let fx = fixture(FEED);
        let (status, _, body) = get(&fx.router, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_page_shell() {
        let fx = fixture(FEED);
        let (status, _, body) = get(&fx.router, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("<!DOCTYPE html>"));
        assert!(body.contains("Ledger Lunacy"));
        assert!(body.contains("hx-trigger='load delay:1000ms'"));
        assert!(body.contains("Loading balance"));
        assert!(body.contains("hx-get='/ledger/table?sort=txID&amp;desc=true&amp;page=0&amp;size=10'"));
        assert!(body.contains("Investing Account"));
        assert!(body.contains("Your Transactions"));
    }

    #[tokio::test]
    async fn test_page_partial_for_htmx() {
        let fx = fixture(FEED);
        let response = fx
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/ledger")
                    .header("hx-request", "true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.starts_with("<main"));
        assert!(!body.contains("<!DOCTYPE html>"));
    }

    #[tokio::test]
    async fn test_table_fragment_default_sort_and_dedupe() {
        let fx = fixture(FEED);
        let (status, headers, body) = get(&fx.router, "/ledger/table").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");

        let a3 = body.find(">A3</td>").unwrap();
        let a2 = body.find(">A2</td>").unwrap();
        let a1 = body.find(">A1</td>").unwrap();
        assert!(a3 < a2 && a2 < a1);
        assert_eq!(body.matches(">A1</td>").count(), 1);
        assert!(body.contains("$100.00"));
        assert!(!body.contains("$500.00"));
        assert!(body.contains("Tue, 14 Mar 2023 10:00:00 GMT"));
    }

    #[tokio::test]
    async fn test_table_fragment_type_filter() {
        let fx = fixture(FEED);
        let (_, _, body) = get(&fx.router, "/ledger/table?type=DEPOSIT").await;
        assert!(body.contains(">A1</td>"));
        assert!(!body.contains(">A2</td>"));
        assert!(!body.contains(">A3</td>"));
        assert!(body.contains("Clear Filter"));

        let (_, _, body) = get(&fx.router, "/ledger/table?type=INVESTMENT").await;
        assert!(body.contains("No results."));
    }

    #[tokio::test]
    async fn test_table_fragment_timestamp_filter() {
        let fx = fixture(FEED);
        let (_, _, body) = get(&fx.router, "/ledger/table?ts=15+mar").await;
        assert!(body.contains(">A3</td>"));
        assert!(!body.contains(">A1</td>"));
        assert!(body.contains("value='15 mar'"));
    }

    #[tokio::test]
    async fn test_table_fragment_schema_error_banner() {
        let fx = fixture(r#"{"transactions":[{"activity_id":"A1","amount":"12"}]}"#);
        let (status, _, body) = get(&fx.router, "/ledger/table").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("role='alert'"));
        assert!(body.contains("transactions[0].amount: expected number, found string"));
        assert!(body.contains("No results."));
    }

    #[tokio::test]
    async fn test_balance_fragment() {
        let fx = fixture(FEED);
        let (status, _, body) = get(&fx.router, "/ledger/balance").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(">$75</span>"));

        let fx = fixture(r#"{}"#);
        let (_, _, body) = get(&fx.router, "/ledger/balance").await;
        assert!(body.contains(">$0</span>"));
    }

    #[tokio::test]
    async fn test_api_transactions() {
        let fx = fixture(FEED);
        let (status, json) = get_json(&fx.router, "/api/transactions?sort=txID&desc=false").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_count"], 3);
        assert_eq!(json["filtered_count"], 3);
        assert_eq!(json["page"], 1);
        assert_eq!(json["page_count"], 1);
        assert_eq!(json["total_balance"], 75.0);
        assert_eq!(json["transactions"][0]["txID"], "A1");
        assert_eq!(json["transactions"][0]["amount"], 100.0);
        assert!(json["transactions"][1].get("method").is_none());
    }

    #[tokio::test]
    async fn test_api_transactions_rejects_unknown_page_size() {
        let fx = fixture(FEED);
        let (status, json) = get_json(&fx.router, "/api/transactions?size=15").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_TABLE_STATE");

        // The HTML table keeps rendering with the default size
        let (status, _, body) = get(&fx.router, "/ledger/table?size=15").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<option value='10' selected>10</option>"));
    }

    #[tokio::test]
    async fn test_api_transaction_detail() {
        let fx = fixture(FEED);
        let (status, json) = get_json(&fx.router, "/api/transactions/A2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["type"], "REFUND");
        assert_eq!(json["source"], "Store");

        let (status, json) = get_json(&fx.router, "/api/transactions/Z9").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "TRANSACTION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_api_balance_and_summary() {
        let fx = fixture(FEED);
        let (_, json) = get_json(&fx.router, "/api/summary").await;
        assert!(json.is_null());

        let (status, json) = get_json(&fx.router, "/api/balance").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_balance"], 75.0);
        assert_eq!(json["transaction_count"], 3);
        assert_eq!(json["duplicate_count"], 1);

        let (_, json) = get_json(&fx.router, "/api/summary").await;
        assert_eq!(json["transaction_count"], 3);
    }

    #[tokio::test]
    async fn test_api_errors() {
        let fx = fixture(r#"{"transactions":5}"#);
        let (status, json) = get_json(&fx.router, "/api/transactions").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "INVALID_FEED");

        std::fs::remove_file(fx.dir.path().join("complicated-ledger.json")).unwrap();
        let (status, json) = get_json(&fx.router, "/api/balance").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["code"], "FEED_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_static_feed() {
        let fx = fixture(FEED);
        let (status, headers, body) = get(&fx.router, "/data/complicated-ledger.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(body, FEED);

        let (status, _, _) = get(&fx.router, "/data/other.json").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_settings() {
        let fx = fixture(FEED);
        let (status, json) = get_json(&fx.router, "/api/settings").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["pagination"]["default_page_size"], 10);
        assert_eq!(json["display"]["balance_reveal_delay_ms"], 1000);
    }
}
