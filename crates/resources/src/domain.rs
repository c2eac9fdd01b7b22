//! CDN domain spec
//!
//! Defines the desired state of a CDN-accelerated domain: its class,
//! platform, coverage, origin and optional HTTPS and cache configuration.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Origin test path used when none is given
pub const DEFAULT_TEST_URL_PATH: &str = "qiniu_do_not_delete.gif";

string_enum! {
    /// Domain class
    DomainType("type") {
        /// Plain host name
        Normal => "normal",
        /// Wildcard host name (`*.example.com`)
        Wildcard => "wildcard",
    }
}

string_enum! {
    /// Acceleration platform
    Platform("platform") {
        Web => "web",
        Download => "download",
        Vod => "vod",
        Dynamic => "dynamic",
    }
}

string_enum! {
    /// Geographic coverage
    GeoCover("geoCover") {
        China => "china",
        Foreign => "foreign",
        Global => "global",
    }
}

string_enum! {
    /// Protocol served to clients
    Protocol("protocol") {
        Http => "http",
        Https => "https",
    }
}

string_enum! {
    /// Scheme used to reach the origin
    UrlScheme("urlScheme") {
        Http => "http",
        Https => "https",
    }
}

string_enum! {
    /// Origin kind; matches the `type` discriminant of [`SourceConfig`]
    SourceType("source.type") {
        Domain => "domain",
        Ip => "ip",
        QiniuBucket => "qiniuBucket",
        Advanced => "advanced",
    }
}

string_enum! {
    /// How a cache rule matches request paths
    CacheRuleType("cache.controls.type") {
        All => "all",
        Path => "path",
        Suffix => "suffix",
        Follow => "follow",
    }
}

/// Cache duration unit, 0 (second) through 6 (year)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TimeUnit(u8);

impl TimeUnit {
    pub const SECOND: Self = Self(0);
    pub const MINUTE: Self = Self(1);
    pub const HOUR: Self = Self(2);
    pub const DAY: Self = Self(3);
    pub const WEEK: Self = Self(4);
    pub const MONTH: Self = Self(5);
    pub const YEAR: Self = Self(6);

    /// Raw unit code as sent to the provider
    #[must_use]
    pub fn code(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for TimeUnit {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= Self::YEAR.0 {
            Ok(Self(value))
        } else {
            Err(ValidationError::InvalidTimeUnit(value))
        }
    }
}

impl From<TimeUnit> for u8 {
    fn from(unit: TimeUnit) -> Self {
        unit.0
    }
}

impl JsonSchema for TimeUnit {
    fn schema_name() -> std::borrow::Cow<'static, str> {
        "TimeUnit".into()
    }

    fn json_schema(_generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::json_schema!({
            "type": "integer",
            "minimum": 0,
            "maximum": 6,
            "description": "0 second, 1 minute, 2 hour, 3 day, 4 week, 5 month, 6 year"
        })
    }
}

/// Desired state of a CDN domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DomainSpec {
    /// Domain name; the resource identity, never changes
    pub name: String,

    #[serde(rename = "type")]
    pub domain_type: DomainType,

    pub platform: Platform,

    pub geo_cover: GeoCover,

    pub protocol: Protocol,

    /// Required when `protocol` is https, ignored otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https: Option<HttpsConfig>,

    pub source: SourceConfig,

    /// Absent means the cache configuration is left unmanaged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheConfig>,
}

impl DomainSpec {
    /// Check the structural rules not covered by deserialization.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "name",
                context: "domain".to_string(),
            });
        }
        if self.protocol == Protocol::Https && self.https.is_none() {
            return Err(ValidationError::MissingHttpsConfig {
                domain: self.name.clone(),
            });
        }
        if let Some(https) = self.https.as_ref().filter(|_| self.protocol == Protocol::Https) {
            if https.cert_id.trim().is_empty() {
                return Err(ValidationError::EmptyField {
                    field: "https.certId",
                    context: self.name.clone(),
                });
            }
        }
        self.source.validate(&self.name)
    }

    /// HTTPS block that takes effect under the current protocol
    #[must_use]
    pub fn effective_https(&self) -> Option<&HttpsConfig> {
        match self.protocol {
            Protocol::Https => self.https.as_ref(),
            Protocol::Http => None,
        }
    }
}

/// HTTPS settings for a domain served over https
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HttpsConfig {
    /// Provider certificate id
    pub cert_id: String,

    /// Redirect plain http requests to https
    #[serde(default)]
    pub force: bool,

    #[serde(default)]
    pub http2: bool,
}

/// Origin configuration, discriminated by `type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum SourceConfig {
    #[serde(rename = "domain")]
    Domain(DomainOrigin),

    #[serde(rename = "ip")]
    Ip(IpOrigin),

    #[serde(rename = "qiniuBucket")]
    QiniuBucket(BucketOrigin),

    #[serde(rename = "advanced")]
    Advanced(AdvancedOrigin),
}

impl SourceConfig {
    #[must_use]
    pub fn source_type(&self) -> SourceType {
        match self {
            Self::Domain(_) => SourceType::Domain,
            Self::Ip(_) => SourceType::Ip,
            Self::QiniuBucket(_) => SourceType::QiniuBucket,
            Self::Advanced(_) => SourceType::Advanced,
        }
    }

    #[must_use]
    pub fn test_url_path(&self) -> &str {
        match self {
            Self::Domain(o) => &o.test_url_path,
            Self::Ip(o) => &o.test_url_path,
            Self::QiniuBucket(o) => &o.test_url_path,
            Self::Advanced(o) => &o.test_url_path,
        }
    }

    /// Origin scheme; always `None` for bucket origins
    #[must_use]
    pub fn url_scheme(&self) -> Option<UrlScheme> {
        match self {
            Self::Domain(o) => o.url_scheme,
            Self::Ip(o) => o.url_scheme,
            Self::Advanced(o) => o.url_scheme,
            Self::QiniuBucket(_) => None,
        }
    }

    /// Mutable origin scheme slot; `None` for bucket origins, which have none
    pub fn url_scheme_mut(&mut self) -> Option<&mut Option<UrlScheme>> {
        match self {
            Self::Domain(o) => Some(&mut o.url_scheme),
            Self::Ip(o) => Some(&mut o.url_scheme),
            Self::Advanced(o) => Some(&mut o.url_scheme),
            Self::QiniuBucket(_) => None,
        }
    }

    fn validate(&self, domain: &str) -> Result<(), ValidationError> {
        let empty = |field: &'static str| ValidationError::EmptyField {
            field,
            context: domain.to_string(),
        };
        match self {
            Self::Domain(o) if o.domain.trim().is_empty() => Err(empty("source.domain")),
            Self::Ip(o) if o.ips.is_empty() || o.ips.iter().any(|ip| ip.trim().is_empty()) => {
                Err(empty("source.ips"))
            }
            Self::QiniuBucket(o) if o.qiniu_bucket.trim().is_empty() => {
                Err(empty("source.qiniuBucket"))
            }
            Self::Advanced(o)
                if o.advanced_sources.is_empty()
                    || o.advanced_sources.iter().any(|s| s.addr.trim().is_empty()) =>
            {
                Err(empty("source.advancedSources"))
            }
            _ => Ok(()),
        }
    }
}

fn default_test_url_path() -> String {
    DEFAULT_TEST_URL_PATH.to_string()
}

/// Origin reached through another host name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DomainOrigin {
    pub domain: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_scheme: Option<UrlScheme>,

    #[serde(default = "default_test_url_path")]
    pub test_url_path: String,
}

/// Origin reached through a fixed list of addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IpOrigin {
    pub ips: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_scheme: Option<UrlScheme>,

    #[serde(default = "default_test_url_path")]
    pub test_url_path: String,
}

/// Origin backed by a Qiniu storage bucket; the provider picks the scheme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BucketOrigin {
    pub qiniu_bucket: String,

    #[serde(default = "default_test_url_path")]
    pub test_url_path: String,
}

/// Weighted origin list with optional backups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdvancedOrigin {
    pub advanced_sources: Vec<AdvancedSource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_scheme: Option<UrlScheme>,

    #[serde(default = "default_test_url_path")]
    pub test_url_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdvancedSource {
    /// Host or address of the origin
    pub addr: String,

    #[serde(default)]
    pub weight: u32,

    /// Only used when every primary origin is down
    #[serde(default)]
    pub backup: bool,
}

/// Cache behaviour for a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CacheConfig {
    /// Drop query parameters from the cache key
    #[serde(default)]
    pub ignore_param: bool,

    /// Cache rules; order carries no meaning
    #[serde(default)]
    pub controls: BTreeSet<CacheControl>,
}

/// One cache rule
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CacheControl {
    pub time: u32,

    pub timeunit: TimeUnit,

    #[serde(rename = "type")]
    pub rule_type: CacheRuleType,

    /// Paths or suffixes the rule applies to, `;`-separated
    pub rule: String,
}
