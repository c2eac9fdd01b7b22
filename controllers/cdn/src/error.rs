//! Controller-specific error types.
//!
//! Every variant names the resource it concerns. Errors raised while waiting
//! on a provider job also carry the job type and the last status observed,
//! so a failed apply can be diagnosed from the error alone.

use std::time::Duration;

use cdn_resources::ValidationError;
use qiniu_client::{OperationDescriptor, OperationType, QiniuError};
use thiserror::Error;

fn observed(last: &Option<OperationDescriptor>) -> String {
    last.as_ref()
        .map_or_else(|| "nothing".to_string(), ToString::to_string)
}

/// Errors that can occur while reconciling a resource.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Desired spec rejected before any network call
    #[error("{resource_id}: invalid spec: {source}")]
    Validation {
        resource_id: String,
        #[source]
        source: ValidationError,
    },

    /// Remote call failed
    #[error("{resource_id}: {operation} failed: {source}")]
    Transport {
        resource_id: String,
        operation: &'static str,
        #[source]
        source: QiniuError,
    },

    /// Provider job ended in failure or reported something unexpected
    #[error("{resource_id}: {operation} failed: {reason} (last observed: {})", observed(.last_observed))]
    OperationFailed {
        resource_id: String,
        operation: OperationType,
        reason: String,
        last_observed: Option<OperationDescriptor>,
    },

    /// Provider job still running when the deadline passed
    #[error("{resource_id}: {operation} still running after {elapsed:?} (deadline {deadline:?}, last observed: {})", observed(.last_observed))]
    DeadlineExceeded {
        resource_id: String,
        operation: OperationType,
        deadline: Duration,
        elapsed: Duration,
        last_observed: Option<OperationDescriptor>,
    },

    /// Caller gave up waiting
    #[error("{resource_id}: cancelled while waiting for {operation} (last observed: {})", observed(.last_observed))]
    Cancelled {
        resource_id: String,
        operation: OperationType,
        last_observed: Option<OperationDescriptor>,
    },

    /// Desired change has no in-place transition; destroy and recreate
    #[error("{resource_id}: changing {} requires replacing the resource", .fields.join(", "))]
    ReplacementRequired {
        resource_id: String,
        fields: Vec<&'static str>,
    },

    /// Resource expected to exist is gone
    #[error("{resource_id}: not found")]
    NotFound { resource_id: String },
}

impl ReconcileError {
    /// Resource this error concerns
    pub fn resource_id(&self) -> &str {
        match self {
            Self::Validation { resource_id, .. }
            | Self::Transport { resource_id, .. }
            | Self::OperationFailed { resource_id, .. }
            | Self::DeadlineExceeded { resource_id, .. }
            | Self::Cancelled { resource_id, .. }
            | Self::ReplacementRequired { resource_id, .. }
            | Self::NotFound { resource_id } => resource_id,
        }
    }

    /// Whether running the same pass again may succeed without a spec change
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { source, .. } => match source {
                QiniuError::Http(_) => true,
                QiniuError::Api { status, .. } => *status >= 500 || *status == 429,
                _ => false,
            },
            Self::DeadlineExceeded { .. } | Self::Cancelled { .. } | Self::NotFound { .. } => true,
            Self::Validation { .. } | Self::OperationFailed { .. } | Self::ReplacementRequired { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qiniu_client::OperatingState;

    #[test]
    fn test_display_includes_last_observed() {
        let err = ReconcileError::DeadlineExceeded {
            resource_id: "a.example.com".to_string(),
            operation: OperationType::CreateDomain,
            deadline: Duration::from_secs(30),
            elapsed: Duration::from_secs(30),
            last_observed: Some(OperationDescriptor::new(
                OperationType::CreateDomain,
                OperatingState::Processing,
            )),
        };
        let text = err.to_string();
        assert!(text.starts_with("a.example.com: create_domain still running"), "{text}");
        assert!(text.contains("create_domain/processing"), "{text}");
        assert_eq!(err.resource_id(), "a.example.com");
    }

    #[test]
    fn test_replacement_lists_fields() {
        let err = ReconcileError::ReplacementRequired {
            resource_id: "a.example.com".to_string(),
            fields: vec!["platform", "source"],
        };
        assert_eq!(
            err.to_string(),
            "a.example.com: changing platform, source requires replacing the resource"
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_server_errors_are_retryable() {
        let err = ReconcileError::Transport {
            resource_id: "x".to_string(),
            operation: "get_domain",
            source: QiniuError::Api {
                status: 503,
                code: None,
                message: "busy".to_string(),
            },
        };
        assert!(err.is_retryable());
    }
}
