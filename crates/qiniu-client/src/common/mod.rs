//! Common utilities for the Qiniu API client
//!
//! Provides the signed HTTP transport, error classification and marker
//! pagination shared by every gateway.

use std::collections::HashSet;
use std::sync::Arc;

use reqwest::{Client, Method, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::Credentials;
use crate::error::QiniuError;

const JSON: &str = "application/json";

/// Provider messages that mean the addressed resource does not exist
const NOT_FOUND_MESSAGES: &[&str] = &["no such domain", "无此域名", "no such entry"];

/// Provider error codes that mean the addressed resource does not exist
const NOT_FOUND_CODES: &[i64] = &[404, 404_001];

/// Error body returned by the Qiniu management APIs
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    error: Option<String>,
}

/// One page of a `marker`-paginated listing
pub trait MarkerPage: DeserializeOwned {
    type Item;

    /// Split into the next marker (empty on the last page) and the items
    fn into_parts(self) -> (String, Vec<Self::Item>);
}

/// HTTP client wrapper with request signing
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    credentials: Arc<Credentials>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: String, credentials: Arc<Credentials>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Build query string from key/value pairs
    pub fn build_query_string(&self, params: &[(&str, &str)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Issue one signed request and decode the JSON response.
    ///
    /// An empty response body decodes as JSON `null`, so callers that do not
    /// care about the payload can ask for [`serde::de::IgnoredAny`].
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, QiniuError> {
        let url = self.build_url(path);
        let parsed = Url::parse(&url)
            .map_err(|e| QiniuError::InvalidRequest(format!("bad URL {url}: {e}")))?;

        let payload = body.map(serde_json::to_vec).transpose()?;
        let content_type = payload.as_ref().map(|_| JSON);
        let authorization = self.credentials.authorization(
            method.as_str(),
            &parsed,
            content_type,
            payload.as_deref().unwrap_or_default(),
        )?;

        match body {
            Some(b) => debug!("{} {} with body: {}", method, url, b),
            None => debug!("{} {}", method, url),
        }

        let mut request = self
            .client
            .request(method.clone(), parsed)
            .header("Authorization", authorization)
            .header("Accept", JSON);
        if let Some(bytes) = payload {
            request = request.header("Content-Type", JSON).body(bytes);
        }

        let response = request.send().await.map_err(QiniuError::Http)?;
        let status = response.status();
        let text = response.text().await.map_err(QiniuError::Http)?;

        if !status.is_success() {
            return Err(classify_error(status.as_u16(), &format!("{method} {path}"), &text));
        }

        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| {
            QiniuError::InvalidResponse(format!(
                "error decoding {} {} response: {} - Response (first 500 chars): {}",
                method,
                path,
                e,
                text.chars().take(500).collect::<String>()
            ))
        })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, QiniuError> {
        self.call(Method::GET, path, None).await
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, QiniuError> {
        self.call(Method::POST, path, body).await
    }

    /// Make a PUT request
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, QiniuError> {
        self.call(Method::PUT, path, body).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<(), QiniuError> {
        self.call::<serde::de::IgnoredAny>(Method::DELETE, path, None)
            .await
            .map(|_| ())
    }

    /// Fetch every page of a `marker`-paginated listing.
    ///
    /// Items of the final page (the one carrying an empty marker) are kept.
    /// A provider that hands back a marker it already returned would loop
    /// forever, so that is reported as [`QiniuError::InvalidResponse`].
    pub async fn fetch_all_marker_pages<P: MarkerPage>(
        &self,
        path: &str,
        limit: u32,
    ) -> Result<Vec<P::Item>, QiniuError> {
        let limit = limit.to_string();
        let mut marker = String::new();
        let mut seen = HashSet::new();
        let mut all_results = Vec::new();

        loop {
            let query = self.build_query_string(&[("marker", &marker), ("limit", &limit)]);
            debug!("Fetching page: {}?{}", path, query);

            let page: P = self.get(&format!("{path}?{query}")).await?;
            let (next, items) = page.into_parts();
            all_results.extend(items);

            if next.is_empty() {
                break;
            }
            if !seen.insert(next.clone()) {
                return Err(QiniuError::InvalidResponse(format!(
                    "{path}: provider repeated pagination marker {next:?}"
                )));
            }
            marker = next;
        }

        Ok(all_results)
    }
}

/// Map a non-success response onto a typed error
pub fn classify_error(status: u16, context: &str, body: &str) -> QiniuError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .error
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    let not_found = status == 404
        || parsed.code.is_some_and(|c| NOT_FOUND_CODES.contains(&c))
        || NOT_FOUND_MESSAGES.iter().any(|m| message.contains(m));

    if not_found {
        QiniuError::NotFound(format!("{context}: {message}"))
    } else if status == 401 || status == 403 {
        QiniuError::Authentication(format!("{context} failed: {status} - {message}"))
    } else {
        QiniuError::Api {
            status,
            code: parsed.code,
            message: format!("{context} failed: {message}"),
        }
    }
}
