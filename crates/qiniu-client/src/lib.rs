//! Qiniu REST API Client
//!
//! A Rust client library for the parts of the Qiniu API the CDN controller
//! needs: CDN domain management, SSL certificate management and the bucket
//! metadata listing. Every request is signed with a Qiniu access token.
//!
//! # Example
//!
//! ```no_run
//! use qiniu_client::{Credentials, QiniuClient, DEFAULT_API_HOST, DEFAULT_UC_HOST};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new("access-key", "secret-key")?;
//! let client = QiniuClient::new(
//!     DEFAULT_API_HOST.to_string(),
//!     DEFAULT_UC_HOST.to_string(),
//!     credentials,
//! )?;
//!
//! // Where is the last job on this domain at?
//! let status = client.describe_domain("cdn.example.com").await?;
//! println!("{status}");
//!
//! // Every certificate on the account, across all pages
//! let certs = client.list_certs().await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod qiniu_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use auth::Credentials;
pub use client::{CERT_PAGE_LIMIT, DEFAULT_API_HOST, DEFAULT_UC_HOST, DOMAIN_PAGE_LIMIT, QiniuClient};
pub use common::{HttpClient, MarkerPage};
pub use error::QiniuError;
pub use models::*;
pub use qiniu_trait::QiniuClientTrait;
#[cfg(feature = "test-util")]
pub use mock::{MockQiniuClient, RecordedCall, ScriptedDescribe};
