//! Mapping between desired-state specs and Qiniu wire shapes.
//!
//! `*_to_remote` validates and builds request bodies; `*_from_remote` turns
//! provider responses back into spec-shaped state. Neither direction touches
//! the network. Only fields that belong to the origin type are ever set, in
//! either direction.

use cdn_resources::{
    AdvancedOrigin, AdvancedSource, BucketOrigin, CacheConfig, CacheControl, CertSpec, DomainOrigin, DomainSpec,
    HttpsConfig, IpOrigin, Protocol, SourceConfig, SourceType, ValidationError, DEFAULT_TEST_URL_PATH,
};
use chrono::{DateTime, Utc};
use qiniu_client::{
    AdvancedSourceInfo, BucketSummary, CacheControlInfo, CertBody, CertInfo, DomainCacheInfo, DomainHttpsInfo,
    DomainInfo, DomainSourceInfo,
};
use serde::Serialize;

/// Observed state of a managed domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainState {
    pub spec: DomainSpec,
    /// Provider-assigned CNAME target
    pub cname: String,
}

/// Observed state of an uploaded certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertState {
    /// Provider-assigned id
    pub id: String,
    pub spec: CertSpec,
    pub common_name: String,
    pub dns_names: Vec<String>,
    pub not_before: Option<DateTime<Utc>>,
    pub not_after: Option<DateTime<Utc>>,
}

/// One bucket of the region listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketView {
    pub name: String,
    pub region_id: String,
    pub private: bool,
    pub index_page_on: bool,
    pub max_age: i64,
}

// Domains

/// Build the create body for a domain.
///
/// The https block is only sent for `protocol: https`; cache only when set.
pub fn domain_to_remote(spec: &DomainSpec) -> Result<DomainInfo, ValidationError> {
    spec.validate()?;
    Ok(DomainInfo {
        name: spec.name.clone(),
        cname: String::new(),
        domain_type: spec.domain_type,
        platform: spec.platform,
        geo_cover: spec.geo_cover,
        protocol: spec.protocol,
        source: source_to_remote(&spec.source),
        https: spec.effective_https().map(https_to_remote),
        cache: spec.cache.as_ref().map(cache_to_remote),
    })
}

/// Read a domain back into spec shape
pub fn domain_from_remote(info: &DomainInfo) -> DomainState {
    let https = match info.protocol {
        Protocol::Https => info.https.as_ref().map(https_from_remote),
        Protocol::Http => None,
    };
    DomainState {
        spec: DomainSpec {
            name: info.name.clone(),
            domain_type: info.domain_type,
            platform: info.platform,
            geo_cover: info.geo_cover,
            protocol: info.protocol,
            https,
            source: source_from_remote(&info.source),
            cache: info.cache.as_ref().map(cache_from_remote),
        },
        cname: info.cname.clone(),
    }
}

pub fn source_to_remote(source: &SourceConfig) -> DomainSourceInfo {
    let mut info = DomainSourceInfo::of_type(source.source_type());
    info.test_url_path = source.test_url_path().to_string();
    info.source_url_scheme = source.url_scheme();
    match source {
        SourceConfig::Domain(o) => info.source_domain = o.domain.clone(),
        SourceConfig::Ip(o) => info.source_ips = o.ips.clone(),
        SourceConfig::QiniuBucket(o) => info.source_qiniu_bucket = o.qiniu_bucket.clone(),
        SourceConfig::Advanced(o) => {
            info.advanced_sources = o
                .advanced_sources
                .iter()
                .map(|s| AdvancedSourceInfo {
                    addr: s.addr.clone(),
                    weight: s.weight,
                    backup: s.backup,
                })
                .collect();
        }
    }
    info
}

pub fn source_from_remote(info: &DomainSourceInfo) -> SourceConfig {
    let test_url_path = if info.test_url_path.is_empty() {
        DEFAULT_TEST_URL_PATH.to_string()
    } else {
        info.test_url_path.clone()
    };
    let url_scheme = info.source_url_scheme;

    match info.source_type {
        SourceType::Domain => SourceConfig::Domain(DomainOrigin {
            domain: info.source_domain.clone(),
            url_scheme,
            test_url_path,
        }),
        SourceType::Ip => SourceConfig::Ip(IpOrigin {
            ips: info.source_ips.clone(),
            url_scheme,
            test_url_path,
        }),
        SourceType::QiniuBucket => SourceConfig::QiniuBucket(BucketOrigin {
            qiniu_bucket: info.source_qiniu_bucket.clone(),
            test_url_path,
        }),
        SourceType::Advanced => SourceConfig::Advanced(AdvancedOrigin {
            advanced_sources: info
                .advanced_sources
                .iter()
                .map(|s| AdvancedSource {
                    addr: s.addr.clone(),
                    weight: s.weight,
                    backup: s.backup,
                })
                .collect(),
            url_scheme,
            test_url_path,
        }),
    }
}

pub fn https_to_remote(https: &HttpsConfig) -> DomainHttpsInfo {
    DomainHttpsInfo {
        cert_id: https.cert_id.clone(),
        force_https: https.force,
        http2_enable: https.http2,
    }
}

pub fn https_from_remote(info: &DomainHttpsInfo) -> HttpsConfig {
    HttpsConfig {
        cert_id: info.cert_id.clone(),
        force: info.force_https,
        http2: info.http2_enable,
    }
}

pub fn cache_to_remote(cache: &CacheConfig) -> DomainCacheInfo {
    DomainCacheInfo {
        ignore_param: cache.ignore_param,
        cache_controls: cache
            .controls
            .iter()
            .map(|c| CacheControlInfo {
                time: c.time,
                timeunit: c.timeunit,
                rule_type: c.rule_type,
                rule: c.rule.clone(),
            })
            .collect(),
    }
}

pub fn cache_from_remote(info: &DomainCacheInfo) -> CacheConfig {
    CacheConfig {
        ignore_param: info.ignore_param,
        controls: info
            .cache_controls
            .iter()
            .map(|c| CacheControl {
                time: c.time,
                timeunit: c.timeunit,
                rule_type: c.rule_type,
                rule: c.rule.clone(),
            })
            .collect(),
    }
}

// Certificates and buckets

pub fn cert_to_remote(spec: &CertSpec) -> Result<CertBody, ValidationError> {
    spec.validate()?;
    Ok(CertBody {
        name: spec.name.clone(),
        common_name: None,
        pri: spec.private_key.clone(),
        ca: spec.cert_chain.clone(),
    })
}

pub fn cert_from_remote(info: &CertInfo) -> CertState {
    CertState {
        id: info.cert_id.clone(),
        spec: CertSpec {
            name: info.name.clone(),
            private_key: info.pri.clone(),
            cert_chain: info.ca.clone(),
        },
        common_name: info.common_name.clone(),
        dns_names: info.dnsnames.clone(),
        not_before: info.not_before,
        not_after: info.not_after,
    }
}

pub fn bucket_from_remote(summary: &BucketSummary) -> BucketView {
    BucketView {
        name: summary.name.clone(),
        region_id: summary.info.region.clone(),
        private: summary.info.private == 1,
        index_page_on: summary.info.no_index_page == 0,
        max_age: summary.info.max_age,
    }
}
