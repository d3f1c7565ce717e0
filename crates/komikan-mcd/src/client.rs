use reqwest::Client;
use serde_json::Value;

use crate::error::McdError;
use crate::models::{SearchResult, SeriesMetadata};
use crate::types::{SearchResponse, SeriesResponse};

/// Production catalog host (Manga Cover Database).
const DEFAULT_BASE_URL: &str = "http://mcd.iosphe.re";

/// MCD catalog client.
///
/// Each operation issues a single HTTP request and completes exactly once;
/// no state is shared between calls and no responses are cached. There is no
/// retry or timeout policy beyond what the transport provides.
pub struct McdClient {
    base_url: String,
    http: Client,
}

impl McdClient {
    /// Client against the production catalog.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client against an alternate catalog host, e.g. a local fixture server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            http: Client::new(),
        }
    }

    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, McdError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "MCD API error");
            Err(McdError::Api { status, message: body })
        }
    }

    async fn json_body(resp: reqwest::Response) -> Result<Value, McdError> {
        resp.json().await.map_err(|e| McdError::Parse(e.to_string()))
    }

    /// Searches the catalog for series matching a (possibly partial) title.
    ///
    /// Zero matches is a success with an empty vec, not an error.
    pub async fn search(&self, title: &str) -> Result<Vec<SearchResult>, McdError> {
        tracing::debug!(title, "searching catalog");

        let resp = self
            .http
            .post(format!("{}/api/v1/search/", self.base_url))
            .json(&serde_json::json!({ "Title": title }))
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let body = Self::json_body(resp).await?;
        let results = SearchResponse::from_value(body)?.into_results();

        if results.is_empty() {
            tracing::debug!(title, "no search results");
        }
        Ok(results)
    }

    /// Fetches full metadata for a search result.
    pub async fn get_series(&self, result: &SearchResult) -> Result<SeriesMetadata, McdError> {
        tracing::debug!(title = %result.title, id = result.id, "fetching series metadata");
        self.get_series_by_id(result.id).await
    }

    /// Fetches full metadata by raw catalog id.
    pub async fn get_series_by_id(&self, id: u64) -> Result<SeriesMetadata, McdError> {
        let resp = self
            .http
            .get(format!("{}/api/v1/series/{id}/", self.base_url))
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let body = Self::json_body(resp).await?;
        Ok(SeriesResponse::from_value(body)?.into_metadata())
    }
}

impl Default for McdClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one HTTP request with a canned response and returns the
    /// base URL to point the client at.
    async fn serve_once(status_line: &str, content_type: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status_line}\r\n\
             Content-Type: {content_type}\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{body}",
            body.len()
        );

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request_complete(&request) {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{addr}")
    }

    /// True once the header block and any Content-Length body are in.
    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let body_len: usize = text
            .lines()
            .filter_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse().ok())?
            })
            .next()
            .unwrap_or(0);
        request.len() >= header_end + 4 + body_len
    }

    #[tokio::test]
    async fn test_search_against_fixture_server() {
        let base = serve_once(
            "200 OK",
            "application/json",
            r#"{"Results": [[1234, "Nichijou"], [17], [7, "Azumanga Daioh"]]}"#,
        )
        .await;

        let results = McdClient::with_base_url(base).search("nichijou").await.unwrap();
        assert_eq!(
            results,
            vec![
                SearchResult { title: "Nichijou".into(), id: 1234 },
                SearchResult { title: "Azumanga Daioh".into(), id: 7 },
            ]
        );
    }

    #[tokio::test]
    async fn test_series_against_fixture_server() {
        let base = serve_once(
            "200 OK",
            "application/json",
            r#"{
                "Title": "Nichijou",
                "Authors": ["Keiichi Arawi"],
                "Covers": {"1": [{"Side": "front", "Raw": "http://example.com/r.jpg"}]},
                "Volumes": 10
            }"#,
        )
        .await;

        let result = SearchResult { title: "Nichijou".into(), id: 1234 };
        let metadata = McdClient::with_base_url(base).get_series(&result).await.unwrap();
        assert_eq!(metadata.title, "Nichijou");
        assert_eq!(metadata.writers, vec!["Keiichi Arawi"]);
        assert_eq!(metadata.volumes, 10);
        assert_eq!(metadata.cover_urls.len(), 1);
    }

    #[tokio::test]
    async fn test_http_error_surfaces_status_and_body() {
        let base = serve_once("404 Not Found", "text/plain", "no such series").await;

        let err = McdClient::with_base_url(base)
            .get_series_by_id(99999)
            .await
            .unwrap_err();
        match err {
            McdError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "no such series");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_a_parse_error() {
        let base = serve_once("200 OK", "text/html", "<html>maintenance</html>").await;

        let err = McdClient::with_base_url(base).search("anything").await.unwrap_err();
        assert!(matches!(err, McdError::Parse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_transport_error() {
        // Bind then drop to get a port with nothing listening on it.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = McdClient::with_base_url(format!("http://{addr}"))
            .search("anything")
            .await
            .unwrap_err();
        assert!(matches!(err, McdError::Http(_)));
    }
}
