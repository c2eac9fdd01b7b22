//! Helper functions for common reconciliation patterns
//!
//! Shared by the domain and certificate reconcilers.

use std::future::Future;

use qiniu_client::{OperationType, QiniuError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::error::ReconcileError;

/// Wrap a client error for `resource_id`
pub fn transport<'a>(resource_id: &'a str, operation: &'static str) -> impl FnOnce(QiniuError) -> ReconcileError + 'a {
    move |source| ReconcileError::Transport {
        resource_id: resource_id.to_string(),
        operation,
        source,
    }
}

/// Simple drift detection
///
/// Returns:
/// - `Ok(Some(resource))` if the resource exists
/// - `Ok(None)` if the provider no longer knows it
/// - `Err(e)` for any other failure; the resource is not assumed gone
pub async fn check_existing<F, T>(resource_id: &str, operation: &'static str, get: F) -> Result<Option<T>, ReconcileError>
where
    F: Future<Output = Result<T, QiniuError>> + Send,
{
    match get.await {
        Ok(existing) => {
            debug!("{} exists at the provider", resource_id);
            Ok(Some(existing))
        }
        Err(e) if e.is_not_found() => {
            warn!("{} not found at the provider (drift detected)", resource_id);
            Ok(None)
        }
        Err(e) => {
            error!("Failed to verify {} exists: {}", resource_id, e);
            Err(transport(resource_id, operation)(e))
        }
    }
}

/// Run a removal call; not-found counts as done.
///
/// Returns `Ok(false)` when the resource was already gone.
pub async fn ignore_not_found<F>(resource_id: &str, operation: &'static str, call: F) -> Result<bool, ReconcileError>
where
    F: Future<Output = Result<(), QiniuError>> + Send,
{
    match call.await {
        Ok(()) => Ok(true),
        Err(e) if e.is_not_found() => {
            warn!("{} already absent during {}: {}", resource_id, operation, e);
            Ok(false)
        }
        Err(e) => Err(transport(resource_id, operation)(e)),
    }
}

/// Refuse to start `operation` once the caller has given up
pub fn ensure_not_cancelled(
    resource_id: &str,
    operation: OperationType,
    cancel: &CancellationToken,
) -> Result<(), ReconcileError> {
    if cancel.is_cancelled() {
        return Err(ReconcileError::Cancelled {
            resource_id: resource_id.to_string(),
            operation,
            last_observed: None,
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "reconcile_helpers_test.rs"]
mod reconcile_helpers_test;
