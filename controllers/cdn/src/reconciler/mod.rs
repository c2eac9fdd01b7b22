//! Reconciliation logic for Qiniu CDN resources.
//!
//! This module is organized by resource kind:
//! - `domain`: CDN domains, whose changes run as asynchronous provider jobs
//! - `cert`: SSL certificates, created synchronously and never updated
//! - `bucket`: read-only bucket listing

pub mod bucket;
pub mod cert;
pub mod domain;
#[cfg(test)]
mod cert_test;

use std::sync::Arc;
use std::time::Duration;

use qiniu_client::QiniuClientTrait;
use tokio_util::sync::CancellationToken;

use crate::clock::{Clock, TokioClock};
use crate::error::ReconcileError;
use crate::poller::Poller;

pub use cert::Certificates;
pub use domain::Domains;

pub const DEFAULT_CREATE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_UPDATE_TIMEOUT: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_DELETE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// How long each kind of provider job may run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: DEFAULT_CREATE_TIMEOUT,
            update: DEFAULT_UPDATE_TIMEOUT,
            delete: DEFAULT_DELETE_TIMEOUT,
        }
    }
}

/// Result of an update pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Converged<S> {
    /// Remote already matched; no call was made
    Unchanged(S),
    /// One mutation was applied and has completed
    Changed(S),
}

impl<S> Converged<S> {
    pub fn into_inner(self) -> S {
        match self {
            Self::Unchanged(s) | Self::Changed(s) => s,
        }
    }
}

/// Lifecycle of one resource kind at the provider
///
/// Every mutating method either returns once the provider has finished or
/// returns an error naming the resource.
#[async_trait::async_trait]
pub trait ResourceKind: Send + Sync {
    type Spec: Send + Sync;
    type State: Send + Sync;

    /// Name used in logs and reports
    const KIND: &'static str;

    /// A replacement is created before the resource it supersedes is
    /// deleted, so dependents never lose their target
    const CREATE_BEFORE_DESTROY: bool = false;

    /// Provider identifier of an observed resource
    fn state_id(state: &Self::State) -> String;

    /// The resource matching `spec`, if the provider has one
    async fn find(&self, spec: &Self::Spec) -> Result<Option<Self::State>, ReconcileError>;

    async fn create(&self, spec: &Self::Spec, cancel: &CancellationToken) -> Result<Self::State, ReconcileError>;

    /// `Ok(None)` when the provider does not know `id`
    async fn read(&self, id: &str) -> Result<Option<Self::State>, ReconcileError>;

    /// Bring `id` in line with `spec`.
    ///
    /// Returns `ReplacementRequired` when that needs a destroy and create.
    async fn update(
        &self,
        id: &str,
        spec: &Self::Spec,
        cancel: &CancellationToken,
    ) -> Result<Converged<Self::State>, ReconcileError>;

    /// Remove `id`; an already absent resource is not an error
    async fn delete(&self, id: &str, cancel: &CancellationToken) -> Result<(), ReconcileError>;
}

/// Reconciles Qiniu CDN resources.
pub struct Reconciler {
    pub(crate) client: Box<dyn QiniuClientTrait>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) timeouts: Timeouts,
    poll_min: Duration,
    poll_max: Duration,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("api_host", &self.client.api_host())
            .field("timeouts", &self.timeouts)
            .field("poll_min", &self.poll_min)
            .field("poll_max", &self.poll_max)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    pub fn new(client: Box<dyn QiniuClientTrait>) -> Self {
        Self {
            client,
            clock: Arc::new(TokioClock),
            timeouts: Timeouts::default(),
            poll_min: Duration::from_secs(1),
            poll_max: Duration::from_secs(10),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Bounds of the wait between two status checks
    pub fn with_poll_backoff(mut self, min: Duration, max: Duration) -> Self {
        self.poll_min = min;
        self.poll_max = max;
        self
    }

    pub fn client(&self) -> &dyn QiniuClientTrait {
        self.client.as_ref()
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    pub fn domains(&self) -> Domains<'_> {
        Domains::new(self)
    }

    pub fn certificates(&self) -> Certificates<'_> {
        Certificates::new(self)
    }

    pub(crate) fn poller(&self) -> Poller<'_> {
        Poller::new(self.client.as_ref(), self.clock.as_ref(), self.poll_min, self.poll_max)
    }
}
