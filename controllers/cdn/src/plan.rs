//! Diff between desired and observed domain state.
//!
//! A plan holds at most one action. Protocol direction decides between
//! sslize and unsslize before any https content change is considered, so a
//! single pass can never issue both.

use cdn_resources::{DomainSpec, HttpsConfig, Protocol, SourceConfig, ValidationError};
use qiniu_client::OperationType;

/// Single in-place mutation on an existing domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainAction {
    /// http -> https with the full https settings
    Sslize(HttpsConfig),
    /// https -> http
    Unsslize,
    /// https settings change while staying on https
    ModifyHttpsConf(HttpsConfig),
}

impl DomainAction {
    /// Provider job this action starts
    pub fn operation_type(&self) -> OperationType {
        match self {
            Self::Sslize(_) => OperationType::Sslize,
            Self::Unsslize => OperationType::Unsslize,
            Self::ModifyHttpsConf(_) => OperationType::ModifyHttpsConf,
        }
    }
}

/// Next step for a domain the provider already has
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePlan {
    InSync,
    Apply(DomainAction),
    /// Fields that changed but have no in-place transition
    Replace(Vec<&'static str>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainPlan {
    Create,
    Update(UpdatePlan),
}

/// Compute the next step towards `desired`.
///
/// # Errors
///
/// Returns the validation error of `desired`, if any.
pub fn plan_domain(desired: &DomainSpec, current: Option<&DomainSpec>) -> Result<DomainPlan, ValidationError> {
    match current {
        None => {
            desired.validate()?;
            Ok(DomainPlan::Create)
        }
        Some(current) => plan_update(desired, current).map(DomainPlan::Update),
    }
}

/// Compute the next step for an existing domain.
///
/// A desired `cache` of `None` leaves the remote cache configuration alone.
///
/// # Errors
///
/// Returns the validation error of `desired`, if any.
pub fn plan_update(desired: &DomainSpec, current: &DomainSpec) -> Result<UpdatePlan, ValidationError> {
    desired.validate()?;

    let fields = replacement_fields(desired, current);
    if !fields.is_empty() {
        return Ok(UpdatePlan::Replace(fields));
    }

    let plan = match (current.protocol, desired.protocol) {
        (Protocol::Https, Protocol::Http) => UpdatePlan::Apply(DomainAction::Unsslize),
        (Protocol::Http, Protocol::Https) => desired
            .https
            .clone()
            .map_or(UpdatePlan::InSync, |h| UpdatePlan::Apply(DomainAction::Sslize(h))),
        (Protocol::Https, Protocol::Https) => match &desired.https {
            Some(h) if current.https.as_ref() != Some(h) => {
                UpdatePlan::Apply(DomainAction::ModifyHttpsConf(h.clone()))
            }
            _ => UpdatePlan::InSync,
        },
        (Protocol::Http, Protocol::Http) => UpdatePlan::InSync,
    };
    Ok(plan)
}

fn replacement_fields(desired: &DomainSpec, current: &DomainSpec) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if desired.name != current.name {
        fields.push("name");
    }
    if desired.domain_type != current.domain_type {
        fields.push("type");
    }
    if desired.platform != current.platform {
        fields.push("platform");
    }
    if desired.geo_cover != current.geo_cover {
        fields.push("geoCover");
    }
    if source_differs(&desired.source, &current.source) {
        fields.push("source");
    }
    if desired.cache.is_some() && desired.cache != current.cache {
        fields.push("cache");
    }
    fields
}

/// An unset desired scheme accepts whatever scheme the provider chose
fn source_differs(desired: &SourceConfig, current: &SourceConfig) -> bool {
    let mut desired = desired.clone();
    if let (Some(slot @ None), Some(observed)) = (desired.url_scheme_mut(), current.url_scheme()) {
        *slot = Some(observed);
    }
    desired != *current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use cdn_resources::{CacheConfig, Platform, UrlScheme};

    #[test]
    fn test_absent_domain_is_created() {
        let desired = domain_spec("a.example.com");
        assert_eq!(plan_domain(&desired, None), Ok(DomainPlan::Create));
    }

    #[test]
    fn test_identical_spec_is_in_sync() {
        let desired = https_domain_spec("a.example.com", "cert-1");
        assert_eq!(plan_update(&desired, &desired.clone()), Ok(UpdatePlan::InSync));
    }

    #[test]
    fn test_https_to_http_wins_over_https_change() {
        let current = https_domain_spec("a.example.com", "cert-1");
        let mut desired = https_domain_spec("a.example.com", "cert-2");
        desired.protocol = Protocol::Http;
        assert_eq!(plan_update(&desired, &current), Ok(UpdatePlan::Apply(DomainAction::Unsslize)));
    }

    #[test]
    fn test_http_to_https_sends_full_config() {
        let current = domain_spec("a.example.com");
        let desired = https_domain_spec("a.example.com", "cert-1");
        let expected = desired.https.clone().unwrap();
        assert_eq!(
            plan_update(&desired, &current),
            Ok(UpdatePlan::Apply(DomainAction::Sslize(expected)))
        );
    }

    #[test]
    fn test_https_change_on_https_modifies_conf() {
        let current = https_domain_spec("a.example.com", "cert-1");
        let mut desired = current.clone();
        desired.https.as_mut().unwrap().http2 = true;
        let plan = plan_update(&desired, &current).unwrap();
        assert_eq!(plan, UpdatePlan::Apply(DomainAction::ModifyHttpsConf(desired.https.unwrap())));
    }

    #[test]
    fn test_untransitioned_fields_require_replacement() {
        let current = domain_spec("a.example.com");
        let mut desired = current.clone();
        desired.platform = Platform::Download;
        desired.cache = Some(CacheConfig {
            ignore_param: true,
            ..CacheConfig::default()
        });
        assert_eq!(
            plan_update(&desired, &current),
            Ok(UpdatePlan::Replace(vec!["platform", "cache"]))
        );
    }

    #[test]
    fn test_unmanaged_cache_is_not_diffed() {
        let mut current = domain_spec("a.example.com");
        current.cache = Some(CacheConfig {
            ignore_param: true,
            ..CacheConfig::default()
        });
        let mut desired = current.clone();
        desired.cache = None;
        assert_eq!(plan_update(&desired, &current), Ok(UpdatePlan::InSync));
    }

    #[test]
    fn test_unset_scheme_accepts_provider_default() {
        let current = domain_spec("a.example.com");
        let mut desired = current.clone();
        if let Some(slot) = desired.source.url_scheme_mut() {
            *slot = None;
        }
        assert_eq!(plan_update(&desired, &current), Ok(UpdatePlan::InSync));

        if let Some(slot) = desired.source.url_scheme_mut() {
            *slot = Some(UrlScheme::Https);
        }
        assert_eq!(
            plan_update(&desired, &current),
            Ok(UpdatePlan::Replace(vec!["source"]))
        );
    }

    #[test]
    fn test_existing_domain_gets_an_update_plan() {
        let current = domain_spec("a.example.com");
        let desired = https_domain_spec("a.example.com", "cert-1");
        assert!(matches!(
            plan_domain(&desired, Some(&current)),
            Ok(DomainPlan::Update(UpdatePlan::Apply(DomainAction::Sslize(_))))
        ));
    }

    #[test]
    fn test_invalid_desired_spec_is_rejected() {
        let mut desired = https_domain_spec("a.example.com", "cert-1");
        desired.https = None;
        assert!(plan_domain(&desired, None).is_err());
        assert!(plan_update(&desired, &domain_spec("a.example.com")).is_err());
    }
}
