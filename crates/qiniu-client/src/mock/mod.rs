//! Mock QiniuClient for unit testing
//!
//! This module provides a mock implementation of QiniuClientTrait that can be
//! used in unit tests without network access.
//!
//! The mock is organized into resource-specific modules:
//! - `domain.rs` - CDN domains and their asynchronous operations
//! - `cert.rs` - SSL certificates
//! - `bucket.rs` - Bucket listing
//!
//! Domain operations complete instantly: unless a test scripts the describe
//! responses for a domain, describing it reports the last mutating operation
//! as `success`, and not-found once the domain is gone.

mod bucket;
mod cert;
mod domain;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cdn_resources::RegionId;

use crate::error::QiniuError;
use crate::models::*;
use crate::qiniu_trait::QiniuClientTrait;

/// Canned answer for one `describe_domain` call
#[derive(Debug, Clone)]
pub enum ScriptedDescribe {
    Descriptor(OperationDescriptor),
    NotFound,
    /// Transport-level failure with the given message
    Error(String),
}

impl ScriptedDescribe {
    /// Shorthand for a descriptor with the given type and state
    pub fn state(operation_type: OperationType, operating_state: OperatingState) -> Self {
        Self::Descriptor(OperationDescriptor::new(operation_type, operating_state))
    }
}

/// One call made against the mock, in order
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Trait method name, e.g. `create_domain`
    pub operation: &'static str,
    /// Domain name, certificate id or region
    pub target: String,
    /// Request body, if the call carries one
    pub body: Option<serde_json::Value>,
}

/// Mock QiniuClient for testing
///
/// This mock stores resources in memory and can be configured to return
/// specific responses for testing different scenarios.
#[derive(Debug, Clone, Default)]
pub struct MockQiniuClient {
    pub(crate) domains: Arc<Mutex<HashMap<String, DomainInfo>>>,
    pub(crate) last_operation: Arc<Mutex<HashMap<String, OperationType>>>,
    pub(crate) describe_script: Arc<Mutex<HashMap<String, VecDeque<ScriptedDescribe>>>>,
    pub(crate) certs: Arc<Mutex<HashMap<String, CertInfo>>>,
    pub(crate) buckets: Arc<Mutex<HashMap<RegionId, Vec<BucketSummary>>>>,
    pub(crate) failures: Arc<Mutex<HashMap<&'static str, VecDeque<String>>>>,
    pub(crate) calls: Arc<Mutex<Vec<RecordedCall>>>,
    pub(crate) next_id: Arc<Mutex<u64>>,
}

/// Lock a mock store; a panicking test thread must not hide the state from others
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockQiniuClient {
    /// Create a new, empty mock client
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a domain to the mock store (for test setup)
    pub fn add_domain(&self, mut info: DomainInfo) {
        if info.cname.is_empty() {
            info.cname = format!("{}.qiniudns.com", info.name);
        }
        lock(&self.domains).insert(info.name.clone(), info);
    }

    /// Add a certificate to the mock store (for test setup)
    pub fn add_cert(&self, cert: CertInfo) {
        lock(&self.certs).insert(cert.cert_id.clone(), cert);
    }

    /// Add buckets to a region (for test setup)
    pub fn add_buckets(&self, region: RegionId, buckets: Vec<BucketSummary>) {
        lock(&self.buckets).entry(region).or_default().extend(buckets);
    }

    /// Queue describe responses for a domain; consumed in order before the
    /// default behaviour resumes
    pub fn script_describe(&self, name: &str, responses: impl IntoIterator<Item = ScriptedDescribe>) {
        lock(&self.describe_script)
            .entry(name.to_string())
            .or_default()
            .extend(responses);
    }

    /// Make the next call of `operation` fail with an API error
    pub fn fail_next(&self, operation: &'static str, message: impl Into<String>) {
        lock(&self.failures)
            .entry(operation)
            .or_default()
            .push_back(message.into());
    }

    /// Every call so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Names of the calls so far, in order
    pub fn call_names(&self) -> Vec<&'static str> {
        lock(&self.calls).iter().map(|c| c.operation).collect()
    }

    /// Calls of one operation
    pub fn calls_to(&self, operation: &str) -> Vec<RecordedCall> {
        lock(&self.calls)
            .iter()
            .filter(|c| c.operation == operation)
            .cloned()
            .collect()
    }

    /// Current stored configuration of a domain
    pub fn domain(&self, name: &str) -> Option<DomainInfo> {
        lock(&self.domains).get(name).cloned()
    }

    /// Whether a certificate with this id is stored
    pub fn has_cert(&self, id: &str) -> bool {
        lock(&self.certs).contains_key(id)
    }

    /// Record a call and fail it if a failure was injected
    pub(crate) fn record(
        &self,
        operation: &'static str,
        target: &str,
        body: Option<serde_json::Value>,
    ) -> Result<(), QiniuError> {
        lock(&self.calls).push(RecordedCall {
            operation,
            target: target.to_string(),
            body,
        });

        let injected = lock(&self.failures)
            .get_mut(operation)
            .and_then(VecDeque::pop_front);
        match injected {
            Some(message) => Err(QiniuError::Api {
                status: 500,
                code: None,
                message,
            }),
            None => Ok(()),
        }
    }

    /// Generate next ID
    pub(crate) fn next_id(&self) -> u64 {
        let mut id = lock(&self.next_id);
        *id += 1;
        *id
    }
}

#[async_trait::async_trait]
impl QiniuClientTrait for MockQiniuClient {
    fn api_host(&self) -> &str {
        "http://mock.qiniu.local"
    }

    // Domains - delegated to domain module
    async fn list_domains(&self) -> Result<Vec<DomainSummary>, QiniuError> {
        domain::list_domains(self)
    }

    async fn get_domain(&self, name: &str) -> Result<DomainInfo, QiniuError> {
        domain::get_domain(self, name)
    }

    async fn describe_domain(&self, name: &str) -> Result<OperationDescriptor, QiniuError> {
        domain::describe_domain(self, name)
    }

    async fn create_domain(&self, name: &str, body: &DomainInfo) -> Result<(), QiniuError> {
        domain::create_domain(self, name, body)
    }

    async fn offline_domain(&self, name: &str) -> Result<(), QiniuError> {
        domain::offline_domain(self, name)
    }

    async fn delete_domain(&self, name: &str) -> Result<(), QiniuError> {
        domain::delete_domain(self, name)
    }

    async fn sslize_domain(&self, name: &str, https: &DomainHttpsInfo) -> Result<(), QiniuError> {
        domain::sslize_domain(self, name, https)
    }

    async fn unsslize_domain(&self, name: &str) -> Result<(), QiniuError> {
        domain::unsslize_domain(self, name)
    }

    async fn modify_domain_https_conf(&self, name: &str, https: &DomainHttpsInfo) -> Result<(), QiniuError> {
        domain::modify_domain_https_conf(self, name, https)
    }

    // Certificates - delegated to cert module
    async fn list_certs(&self) -> Result<Vec<CertInfo>, QiniuError> {
        cert::list_certs(self)
    }

    async fn get_cert(&self, id: &str) -> Result<CertInfo, QiniuError> {
        cert::get_cert(self, id)
    }

    async fn create_cert(&self, body: &CertBody) -> Result<String, QiniuError> {
        cert::create_cert(self, body)
    }

    async fn delete_cert(&self, id: &str) -> Result<(), QiniuError> {
        cert::delete_cert(self, id)
    }

    async fn list_buckets_in_region(&self, region: RegionId) -> Result<Vec<BucketSummary>, QiniuError> {
        bucket::list_buckets_in_region(self, region)
    }
}
