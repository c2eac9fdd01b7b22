//! Qiniu API client
//!
//! Implements the CDN domain and SSL certificate management endpoints on the
//! API host, and the bucket listing on the UC host.

use std::sync::Arc;
use std::time::Duration;

use cdn_resources::RegionId;
use reqwest::Client;
use serde::de::IgnoredAny;
use tracing::debug;

use crate::auth::Credentials;
use crate::common::HttpClient;
use crate::error::QiniuError;
use crate::models::*;
use crate::qiniu_trait::QiniuClientTrait;

/// Default management API host
pub const DEFAULT_API_HOST: &str = "https://api.qiniu.com";

/// Default UC (bucket metadata) host
pub const DEFAULT_UC_HOST: &str = "https://uc.qbox.me";

/// Page size of the domain listing
pub const DOMAIN_PAGE_LIMIT: u32 = 1000;

/// Page size of the certificate listing
pub const CERT_PAGE_LIMIT: u32 = 100;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Qiniu API client
#[derive(Debug, Clone)]
pub struct QiniuClient {
    api: HttpClient,
    uc: HttpClient,
}

fn domain_path(name: &str) -> String {
    format!("/domain/{}", urlencoding::encode(name))
}

fn cert_path(id: &str) -> String {
    format!("/sslcert/{}", urlencoding::encode(id))
}

impl QiniuClient {
    /// Create a new Qiniu client with a 30 second request timeout
    ///
    /// # Arguments
    /// * `api_host` - Management API host (e.g., "https://api.qiniu.com")
    /// * `uc_host` - UC host used for bucket metadata (e.g., "https://uc.qbox.me")
    /// * `credentials` - Access/secret key pair used to sign every request
    pub fn new(api_host: String, uc_host: String, credentials: Credentials) -> Result<Self, QiniuError> {
        Self::with_timeout(api_host, uc_host, credentials, DEFAULT_TIMEOUT)
    }

    /// Create a new Qiniu client with an explicit request timeout
    pub fn with_timeout(
        api_host: String,
        uc_host: String,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, QiniuError> {
        let client = Client::builder().timeout(timeout).build().map_err(QiniuError::Http)?;
        let credentials = Arc::new(credentials);

        Ok(Self {
            api: HttpClient::new(client.clone(), api_host, Arc::clone(&credentials)),
            uc: HttpClient::new(client, uc_host, credentials),
        })
    }

    /// Get the management API host
    pub fn api_host(&self) -> &str {
        self.api.base_url()
    }

    /// List every CDN domain on the account, following the pagination marker
    pub async fn list_domains(&self) -> Result<Vec<DomainSummary>, QiniuError> {
        self.api
            .fetch_all_marker_pages::<DomainPage>("/domain", DOMAIN_PAGE_LIMIT)
            .await
    }

    /// Get the full configuration of a domain
    ///
    /// # Returns
    /// * `Ok(DomainInfo)` - Current remote configuration
    /// * `Err(QiniuError::NotFound)` - The domain does not exist
    pub async fn get_domain(&self, name: &str) -> Result<DomainInfo, QiniuError> {
        self.api.get(&domain_path(name)).await
    }

    /// Read the operation status of a domain
    ///
    /// Same endpoint as [`Self::get_domain`], decoded as the operation fields only.
    pub async fn describe_domain(&self, name: &str) -> Result<OperationDescriptor, QiniuError> {
        let descriptor: OperationDescriptor = self.api.get(&domain_path(name)).await?;
        debug!("Domain {} operation status: {}", name, descriptor);
        Ok(descriptor)
    }

    /// Create a domain; the provider finishes the job asynchronously (`create_domain`)
    pub async fn create_domain(&self, name: &str, body: &DomainInfo) -> Result<(), QiniuError> {
        let body = serde_json::to_value(body)?;
        self.api
            .post::<IgnoredAny>(&domain_path(name), Some(&body))
            .await
            .map(|_| ())
    }

    /// Take a domain offline; required before deletion
    pub async fn offline_domain(&self, name: &str) -> Result<(), QiniuError> {
        self.api
            .post::<IgnoredAny>(&format!("{}/offline", domain_path(name)), None)
            .await
            .map(|_| ())
    }

    /// Delete an offline domain; the provider finishes the job asynchronously (`delete_domain`)
    pub async fn delete_domain(&self, name: &str) -> Result<(), QiniuError> {
        self.api.delete(&domain_path(name)).await
    }

    /// Switch a domain to https (`sslize`)
    pub async fn sslize_domain(&self, name: &str, https: &DomainHttpsInfo) -> Result<(), QiniuError> {
        let body = serde_json::to_value(https)?;
        self.api
            .put::<IgnoredAny>(&format!("{}/sslize", domain_path(name)), Some(&body))
            .await
            .map(|_| ())
    }

    /// Switch a domain back to http (`unsslize`)
    pub async fn unsslize_domain(&self, name: &str) -> Result<(), QiniuError> {
        self.api
            .put::<IgnoredAny>(&format!("{}/unsslize", domain_path(name)), None)
            .await
            .map(|_| ())
    }

    /// Change the https settings of a domain already on https (`modify_https_conf`)
    pub async fn modify_domain_https_conf(&self, name: &str, https: &DomainHttpsInfo) -> Result<(), QiniuError> {
        let body = serde_json::to_value(https)?;
        self.api
            .put::<IgnoredAny>(&format!("{}/httpsconf", domain_path(name)), Some(&body))
            .await
            .map(|_| ())
    }

    /// List every uploaded certificate, following the pagination marker
    pub async fn list_certs(&self) -> Result<Vec<CertInfo>, QiniuError> {
        self.api
            .fetch_all_marker_pages::<CertPage>("/sslcert", CERT_PAGE_LIMIT)
            .await
    }

    /// Get one certificate by id
    pub async fn get_cert(&self, id: &str) -> Result<CertInfo, QiniuError> {
        let response: CertResponse = self.api.get(&cert_path(id)).await?;
        Ok(response.cert)
    }

    /// Upload a certificate
    ///
    /// # Returns
    /// * `Ok(String)` - Provider-assigned certificate id
    pub async fn create_cert(&self, body: &CertBody) -> Result<String, QiniuError> {
        let body = serde_json::to_value(body)?;
        let response: CreateCertResponse = self.api.post("/sslcert", Some(&body)).await?;
        if response.cert_id.is_empty() {
            return Err(QiniuError::InvalidResponse(
                "POST /sslcert returned an empty certificate id".to_string(),
            ));
        }
        debug!("Uploaded certificate {}", response.cert_id);
        Ok(response.cert_id)
    }

    /// Delete a certificate
    pub async fn delete_cert(&self, id: &str) -> Result<(), QiniuError> {
        self.api.delete(&cert_path(id)).await
    }

    /// List the account's own buckets in one region
    pub async fn list_buckets_in_region(&self, region: RegionId) -> Result<Vec<BucketSummary>, QiniuError> {
        let query = self
            .uc
            .build_query_string(&[("region", region.as_str()), ("shared", "false")]);
        let buckets: Option<Vec<BucketSummary>> = self.uc.get(&format!("/v2/bucketInfos?{query}")).await?;
        Ok(buckets.unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl QiniuClientTrait for QiniuClient {
    fn api_host(&self) -> &str {
        self.api_host()
    }

    async fn list_domains(&self) -> Result<Vec<DomainSummary>, QiniuError> {
        self.list_domains().await
    }

    async fn get_domain(&self, name: &str) -> Result<DomainInfo, QiniuError> {
        self.get_domain(name).await
    }

    async fn describe_domain(&self, name: &str) -> Result<OperationDescriptor, QiniuError> {
        self.describe_domain(name).await
    }

    async fn create_domain(&self, name: &str, body: &DomainInfo) -> Result<(), QiniuError> {
        self.create_domain(name, body).await
    }

    async fn offline_domain(&self, name: &str) -> Result<(), QiniuError> {
        self.offline_domain(name).await
    }

    async fn delete_domain(&self, name: &str) -> Result<(), QiniuError> {
        self.delete_domain(name).await
    }

    async fn sslize_domain(&self, name: &str, https: &DomainHttpsInfo) -> Result<(), QiniuError> {
        self.sslize_domain(name, https).await
    }

    async fn unsslize_domain(&self, name: &str) -> Result<(), QiniuError> {
        self.unsslize_domain(name).await
    }

    async fn modify_domain_https_conf(&self, name: &str, https: &DomainHttpsInfo) -> Result<(), QiniuError> {
        self.modify_domain_https_conf(name, https).await
    }

    async fn list_certs(&self) -> Result<Vec<CertInfo>, QiniuError> {
        self.list_certs().await
    }

    async fn get_cert(&self, id: &str) -> Result<CertInfo, QiniuError> {
        self.get_cert(id).await
    }

    async fn create_cert(&self, body: &CertBody) -> Result<String, QiniuError> {
        self.create_cert(body).await
    }

    async fn delete_cert(&self, id: &str) -> Result<(), QiniuError> {
        self.delete_cert(id).await
    }

    async fn list_buckets_in_region(&self, region: RegionId) -> Result<Vec<BucketSummary>, QiniuError> {
        self.list_buckets_in_region(region).await
    }
}
