//! Qiniu API data models
//!
//! Wire shapes of the CDN domain, certificate and bucket endpoints. Enumerated
//! fields reuse the closed vocabularies from `cdn-resources`, so a value the
//! controller cannot represent fails at decode time rather than deep inside a
//! reconcile.

use cdn_resources::{CacheRuleType, DomainType, GeoCover, Platform, Protocol, SourceType, TimeUnit, UrlScheme};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::common::MarkerPage;

/// Accept `null` wherever the provider may send it instead of an empty value
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The provider reports "no scheme" as an empty string
fn empty_scheme_as_none<'de, D>(deserializer: D) -> Result<Option<UrlScheme>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

// Domains

/// Full domain configuration, as sent on create and returned by `GET /domain/{name}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainInfo {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Provider-assigned CNAME target; never sent
    #[serde(default, deserialize_with = "nullable", skip_serializing)]
    pub cname: String,

    #[serde(rename = "type")]
    pub domain_type: DomainType,

    pub platform: Platform,

    pub geo_cover: GeoCover,

    pub protocol: Protocol,

    pub source: DomainSourceInfo,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https: Option<DomainHttpsInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<DomainCacheInfo>,
}

/// Origin section of [`DomainInfo`]; only the fields of the active type are set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainSourceInfo {
    #[serde(rename = "sourceType")]
    pub source_type: SourceType,

    #[serde(rename = "sourceHost", default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub source_host: String,

    #[serde(rename = "sourceIPs", default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub source_ips: Vec<String>,

    #[serde(rename = "sourceDomain", default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub source_domain: String,

    #[serde(rename = "sourceQiniuBucket", default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub source_qiniu_bucket: String,

    #[serde(rename = "sourceURLScheme", default, deserialize_with = "empty_scheme_as_none", skip_serializing_if = "Option::is_none")]
    pub source_url_scheme: Option<UrlScheme>,

    #[serde(rename = "testURLPath", default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub test_url_path: String,

    #[serde(rename = "advancedSources", default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub advanced_sources: Vec<AdvancedSourceInfo>,
}

impl DomainSourceInfo {
    /// Empty source of the given type
    #[must_use]
    pub fn of_type(source_type: SourceType) -> Self {
        Self {
            source_type,
            source_host: String::new(),
            source_ips: Vec::new(),
            source_domain: String::new(),
            source_qiniu_bucket: String::new(),
            source_url_scheme: None,
            test_url_path: String::new(),
            advanced_sources: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedSourceInfo {
    pub addr: String,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub backup: bool,
}

/// HTTPS section, also the body of the sslize and httpsconf calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainHttpsInfo {
    #[serde(rename = "certId", alias = "certid", default, deserialize_with = "nullable")]
    pub cert_id: String,

    #[serde(default)]
    pub force_https: bool,

    #[serde(default)]
    pub http2_enable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainCacheInfo {
    #[serde(default)]
    pub ignore_param: bool,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub cache_controls: Vec<CacheControlInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheControlInfo {
    #[serde(default)]
    pub time: u32,

    #[serde(default)]
    pub timeunit: TimeUnit,

    #[serde(rename = "type")]
    pub rule_type: CacheRuleType,

    #[serde(default, deserialize_with = "nullable")]
    pub rule: String,
}

/// Entry of the domain listing; a subset of [`DomainInfo`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSummary {
    pub name: String,

    #[serde(default, deserialize_with = "nullable")]
    pub cname: String,

    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub domain_type: String,

    #[serde(default, deserialize_with = "nullable")]
    pub platform: String,

    #[serde(default, deserialize_with = "nullable")]
    pub geo_cover: String,

    #[serde(default, deserialize_with = "nullable")]
    pub protocol: String,

    #[serde(default)]
    pub operation_type: OperationType,

    #[serde(default)]
    pub operating_state: OperatingState,
}

/// `GET /domain?marker=&limit=` page
#[derive(Debug, Clone, Deserialize)]
pub struct DomainPage {
    #[serde(default, deserialize_with = "nullable")]
    pub marker: String,
    #[serde(default, deserialize_with = "nullable")]
    pub domains: Vec<DomainSummary>,
}

impl MarkerPage for DomainPage {
    type Item = DomainSummary;

    fn into_parts(self) -> (String, Vec<DomainSummary>) {
        (self.marker, self.domains)
    }
}

// Asynchronous operations

/// Kind of the provider job last started on a domain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationType {
    CreateDomain,
    Sslize,
    Unsslize,
    ModifyHttpsConf,
    DeleteDomain,
    OfflineDomain,
    OnlineDomain,
    /// Unknown value, preserved verbatim
    Other(String),
}

impl OperationType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::CreateDomain => "create_domain",
            Self::Sslize => "sslize",
            Self::Unsslize => "unsslize",
            Self::ModifyHttpsConf => "modify_https_conf",
            Self::DeleteDomain => "delete_domain",
            Self::OfflineDomain => "offline_domain",
            Self::OnlineDomain => "online_domain",
            Self::Other(raw) => raw,
        }
    }
}

impl Default for OperationType {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for OperationType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "create_domain" => Self::CreateDomain,
            "sslize" => Self::Sslize,
            "unsslize" => Self::Unsslize,
            "modify_https_conf" => Self::ModifyHttpsConf,
            "delete_domain" => Self::DeleteDomain,
            "offline_domain" => Self::OfflineDomain,
            "online_domain" => Self::OnlineDomain,
            _ => Self::Other(raw),
        }
    }
}

impl From<OperationType> for String {
    fn from(op: OperationType) -> Self {
        match op {
            OperationType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of the last provider job on a domain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperatingState {
    Processing,
    Success,
    Failed,
    Other(String),
}

impl OperatingState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Other(raw) => raw,
        }
    }
}

impl Default for OperatingState {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for OperatingState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "processing" => Self::Processing,
            "success" => Self::Success,
            "failed" => Self::Failed,
            _ => Self::Other(raw),
        }
    }
}

impl From<OperatingState> for String {
    fn from(state: OperatingState) -> Self {
        match state {
            OperatingState::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for OperatingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation status of a domain, read from `GET /domain/{name}`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDescriptor {
    #[serde(default)]
    pub operation_type: OperationType,

    #[serde(default)]
    pub operating_state: OperatingState,

    /// Provider explanation, usually only set on failure
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub operating_state_desc: String,
}

impl OperationDescriptor {
    pub fn new(operation_type: OperationType, operating_state: OperatingState) -> Self {
        Self {
            operation_type,
            operating_state,
            operating_state_desc: String::new(),
        }
    }
}

impl std::fmt::Display for OperationDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.operation_type, self.operating_state)?;
        if !self.operating_state_desc.is_empty() {
            write!(f, " ({})", self.operating_state_desc)?;
        }
        Ok(())
    }
}

// Certificates

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertInfo {
    #[serde(rename = "certid", alias = "certID", alias = "certId")]
    pub cert_id: String,

    #[serde(default, deserialize_with = "nullable")]
    pub name: String,

    #[serde(default, deserialize_with = "nullable")]
    pub common_name: String,

    #[serde(default, deserialize_with = "nullable")]
    pub dnsnames: Vec<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub pri: String,

    #[serde(default, deserialize_with = "nullable")]
    pub ca: String,

    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub not_before: Option<DateTime<Utc>>,

    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub not_after: Option<DateTime<Utc>>,
}

/// Upload body of `POST /sslcert`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertBody {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,

    pub pri: String,

    pub ca: String,
}

/// Response of `POST /sslcert`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreateCertResponse {
    #[serde(rename = "certID", alias = "certid", alias = "certId")]
    pub cert_id: String,
}

/// Response of `GET /sslcert/{id}`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CertResponse {
    pub cert: CertInfo,
}

/// `GET /sslcert?marker=&limit=` page
#[derive(Debug, Clone, Deserialize)]
pub struct CertPage {
    #[serde(default, deserialize_with = "nullable")]
    pub marker: String,
    #[serde(default, deserialize_with = "nullable")]
    pub certs: Vec<CertInfo>,
}

impl MarkerPage for CertPage {
    type Item = CertInfo;

    fn into_parts(self) -> (String, Vec<CertInfo>) {
        (self.marker, self.certs)
    }
}

// Buckets

/// Entry of `GET /v2/bucketInfos`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSummary {
    pub name: String,
    pub info: BucketInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BucketInfo {
    #[serde(default, deserialize_with = "nullable")]
    pub region: String,

    /// 1 when the bucket is private
    #[serde(default)]
    pub private: i32,

    /// 1 when index pages are disabled
    #[serde(default)]
    pub no_index_page: i32,

    #[serde(default)]
    pub max_age: i64,
}
