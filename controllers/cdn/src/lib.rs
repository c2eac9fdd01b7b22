//! Qiniu CDN Controller
//!
//! Converges CDN domains and SSL certificates on a Qiniu account towards a
//! desired-state manifest:
//! - Certificates: uploaded on demand, replaced when their content changes
//! - Domains: created, switched between http and https, re-pointed at a new
//!   certificate, replaced or deleted, waiting for each provider job to finish
//! - Buckets: listed per region for reference

pub mod backoff;
pub mod clock;
pub mod config;
pub mod converter;
pub mod error;
pub mod manifest;
pub mod plan;
pub mod poller;
pub mod reconcile_helpers;
pub mod reconciler;
#[cfg(test)]
mod test_utils;

pub use error::ReconcileError;
pub use manifest::{apply, ApplyReport, Manifest, Outcome};
pub use reconciler::{Converged, Reconciler, ResourceKind, Timeouts};
