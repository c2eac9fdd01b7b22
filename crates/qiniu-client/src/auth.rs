//! Qiniu access-token signing
//!
//! Management API requests carry `Authorization: Qiniu <ak>:<sign>`, where
//! `sign` is the URL-safe base64 HMAC-SHA1 of a canonical request string:
//!
//! ```text
//! <METHOD> <path>[?<query>]
//! Host: <host>
//! [Content-Type: <content type>]
//!
//! [<body>]
//! ```
//!
//! The body is only part of the signature when a content type is sent and it
//! is not `application/octet-stream`.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha1::Sha1;

use crate::error::QiniuError;

type HmacSha1 = Hmac<Sha1>;

/// Access key / secret key pair
#[derive(Clone)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// # Errors
    ///
    /// Returns [`QiniuError::Authentication`] if either key is empty.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Result<Self, QiniuError> {
        let access_key = access_key.into();
        let secret_key = secret_key.into();
        if access_key.trim().is_empty() || secret_key.trim().is_empty() {
            return Err(QiniuError::Authentication(
                "access key and secret key must both be set".to_string(),
            ));
        }
        Ok(Self { access_key, secret_key })
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// URL-safe base64 HMAC-SHA1 of `data` under the secret key
    pub fn sign(&self, data: &[u8]) -> Result<String, QiniuError> {
        let mut mac = HmacSha1::new_from_slice(self.secret_key.as_bytes())
            .map_err(|e| QiniuError::Authentication(format!("invalid secret key: {e}")))?;
        mac.update(data);
        Ok(URL_SAFE.encode(mac.finalize().into_bytes()))
    }

    /// Build the `Authorization` header value for one request
    pub fn authorization(
        &self,
        method: &str,
        url: &Url,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<String, QiniuError> {
        let data = signing_data(method, url, content_type, body)?;
        Ok(format!("Qiniu {}:{}", self.access_key, self.sign(&data)?))
    }
}

/// Canonical request string covered by the signature
pub fn signing_data(
    method: &str,
    url: &Url,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<Vec<u8>, QiniuError> {
    let host = url
        .host_str()
        .ok_or_else(|| QiniuError::InvalidRequest(format!("URL has no host: {url}")))?;

    let mut data = format!("{} {}", method.to_uppercase(), url.path());
    if let Some(query) = url.query() {
        data.push('?');
        data.push_str(query);
    }
    data.push_str("\nHost: ");
    data.push_str(host);
    if let Some(port) = url.port() {
        data.push(':');
        data.push_str(&port.to_string());
    }
    if let Some(ct) = content_type {
        data.push_str("\nContent-Type: ");
        data.push_str(ct);
    }
    data.push_str("\n\n");

    let mut data = data.into_bytes();
    if content_type.is_some_and(|ct| ct != "application/octet-stream") {
        data.extend_from_slice(body);
    }
    Ok(data)
}
