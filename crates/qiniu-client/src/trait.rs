//! QiniuClient trait for mocking
//!
//! This trait abstracts the QiniuClient so the reconciler can run against an
//! in-memory mock in unit tests. Each method maps to exactly one remote call,
//! except the listings, which follow the pagination marker to the end.

use cdn_resources::RegionId;

use crate::error::QiniuError;
use crate::models::*;

/// Trait for Qiniu API client operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait QiniuClientTrait: Send + Sync {
    /// Management API host the client talks to
    fn api_host(&self) -> &str;

    // CDN domains
    async fn list_domains(&self) -> Result<Vec<DomainSummary>, QiniuError>;
    async fn get_domain(&self, name: &str) -> Result<DomainInfo, QiniuError>;
    async fn describe_domain(&self, name: &str) -> Result<OperationDescriptor, QiniuError>;
    async fn create_domain(&self, name: &str, body: &DomainInfo) -> Result<(), QiniuError>;
    async fn offline_domain(&self, name: &str) -> Result<(), QiniuError>;
    async fn delete_domain(&self, name: &str) -> Result<(), QiniuError>;
    async fn sslize_domain(&self, name: &str, https: &DomainHttpsInfo) -> Result<(), QiniuError>;
    async fn unsslize_domain(&self, name: &str) -> Result<(), QiniuError>;
    async fn modify_domain_https_conf(&self, name: &str, https: &DomainHttpsInfo) -> Result<(), QiniuError>;

    // SSL certificates
    async fn list_certs(&self) -> Result<Vec<CertInfo>, QiniuError>;
    async fn get_cert(&self, id: &str) -> Result<CertInfo, QiniuError>;
    /// Upload a certificate and return its provider id
    async fn create_cert(&self, body: &CertBody) -> Result<String, QiniuError>;
    async fn delete_cert(&self, id: &str) -> Result<(), QiniuError>;

    // Storage buckets (read-only)
    async fn list_buckets_in_region(&self, region: RegionId) -> Result<Vec<BucketSummary>, QiniuError>;
}
