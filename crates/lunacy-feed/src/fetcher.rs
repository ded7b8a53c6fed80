//! Feed fetchers: local static file and remote URL
//!
//! Neither fetcher keeps a copy of what it read; every call goes back to
//! the source.

use crate::error::FeedError;
use crate::FeedFetcherTrait;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

const UA: &str = concat!("lunacy/", env!("CARGO_PKG_VERSION"));

/// HTTP timeout for remote feeds
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Reads the feed document from disk on every call
#[derive(Debug, Clone)]
pub struct FileFeedFetcher {
    path: PathBuf,
}

impl FileFeedFetcher {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl FeedFetcherTrait for FileFeedFetcher {
    async fn fetch_bytes(&self) -> Result<Vec<u8>, FeedError> {
        tokio::fs::read(&self.path).await.map_err(|source| FeedError::Io {
            path: self.path.to_string_lossy().to_string(),
            source,
        })
    }

    fn describe(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

/// Fetches the feed over HTTP, asking every cache on the way to stay out
#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    url: String,
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new(url: impl Into<String>) -> Result<Self, FeedError> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(UA)
            .build()
            .map_err(|e| FeedError::Http {
                url: url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl FeedFetcherTrait for HttpFeedFetcher {
    async fn fetch_bytes(&self) -> Result<Vec<u8>, FeedError> {
        let http_err = |e: reqwest::Error| FeedError::Http {
            url: self.url.clone(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .header(reqwest::header::PRAGMA, "no-cache")
            .send()
            .await
            .map_err(http_err)?
            .error_for_status()
            .map_err(http_err)?;

        let body = response.bytes().await.map_err(http_err)?;
        Ok(body.to_vec())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_fetcher_reads_and_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"transactions":[{{"activity_id":"A1","date":"2023-01-01","type":"DEPOSIT","amount":5,"balance":5,"source":{{"description":"s"}},"destination":{{"description":"d"}}}}]}}"#
        )
        .unwrap();

        let fetcher = FileFeedFetcher::new(file.path().to_path_buf());
        let feed = fetcher.fetch_feed().await.unwrap();
        assert_eq!(feed.records().len(), 1);
        assert_eq!(feed.records()[0].activity_id, "A1");
    }

    #[tokio::test]
    async fn test_file_fetcher_sees_changes_between_calls() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"transactions":[]}}"#).unwrap();
        let fetcher = FileFeedFetcher::new(file.path().to_path_buf());
        assert!(fetcher.fetch_feed().await.unwrap().records().is_empty());

        std::fs::write(file.path(), r#"{}"#).unwrap();
        let value = fetcher.fetch().await.unwrap();
        assert!(value.get("transactions").is_none());
    }

    #[tokio::test]
    async fn test_file_fetcher_missing_file() {
        let fetcher = FileFeedFetcher::new(PathBuf::from("/nonexistent/feed.json"));
        let err = fetcher.fetch().await.unwrap_err();
        assert!(matches!(err, FeedError::Io { .. }));
    }

    #[tokio::test]
    async fn test_file_fetcher_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let fetcher = FileFeedFetcher::new(file.path().to_path_buf());
        let err = fetcher.fetch().await.unwrap_err();
        assert!(matches!(err, FeedError::InvalidJson { .. }));
    }

    #[tokio::test]
    async fn test_file_fetcher_schema_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"transactions":[{{"activity_id":1}}]}}"#).unwrap();
        let fetcher = FileFeedFetcher::new(file.path().to_path_buf());
        match fetcher.fetch_feed().await.unwrap_err() {
            FeedError::Schema(schema) => assert!(schema.violations.len() > 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_http_fetcher_unreachable_host() {
        let fetcher = HttpFeedFetcher::new("http://127.0.0.1:9/feed.json").unwrap();
        assert_eq!(fetcher.describe(), "http://127.0.0.1:9/feed.json");
        let err = fetcher.fetch().await.unwrap_err();
        assert!(matches!(err, FeedError::Http { .. }));
    }

    /// Serve one canned 500 and hand back the raw request it answered
    async fn serve_once_500() -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/feed.json", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                .await
                .unwrap();
            String::from_utf8_lossy(&request).to_lowercase()
        });
        (url, handle)
    }

    #[tokio::test]
    async fn test_http_fetcher_bypasses_caches_and_rejects_server_errors() {
        let (url, server) = serve_once_500().await;
        let fetcher = HttpFeedFetcher::new(url.clone()).unwrap();

        match fetcher.fetch().await.unwrap_err() {
            FeedError::Http { url: failed, message } => {
                assert_eq!(failed, url);
                assert!(message.contains("500"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let request = server.await.unwrap();
        assert!(request.starts_with("get /feed.json http/1.1"));
        assert!(request.contains("cache-control: no-store"));
        assert!(request.contains("pragma: no-cache"));
        assert!(request.contains("user-agent: lunacy/"));
    }
}
