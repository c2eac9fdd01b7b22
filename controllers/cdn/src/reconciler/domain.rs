//! CDN domain reconciler
//!
//! Every mutation starts a provider job. Each call here waits for its job to
//! finish before returning, so a domain never has two jobs in flight.

use cdn_resources::DomainSpec;
use qiniu_client::{DomainSummary, OperationType};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{Converged, Reconciler, ResourceKind};
use crate::converter::{domain_from_remote, domain_to_remote, https_to_remote, DomainState};
use crate::error::ReconcileError;
use crate::plan::{plan_update, DomainAction, UpdatePlan};
use crate::poller::{NotFoundPolicy, PollPolicy};
use crate::reconcile_helpers::{check_existing, ensure_not_cancelled, ignore_not_found, transport};

/// Domain handle of a [`Reconciler`]
#[derive(Debug, Clone, Copy)]
pub struct Domains<'a> {
    reconciler: &'a Reconciler,
}

impl<'a> Domains<'a> {
    pub(crate) fn new(reconciler: &'a Reconciler) -> Self {
        Self { reconciler }
    }

    /// Every domain on the account
    pub async fn list(&self) -> Result<Vec<DomainSummary>, ReconcileError> {
        self.reconciler
            .client
            .list_domains()
            .await
            .map_err(transport("*", "list_domains"))
    }

    async fn wait(
        &self,
        name: &str,
        expected: OperationType,
        deadline: std::time::Duration,
        not_found: NotFoundPolicy,
        cancel: &CancellationToken,
    ) -> Result<(), ReconcileError> {
        let policy = PollPolicy {
            expected,
            deadline,
            not_found,
        };
        let report = self.reconciler.poller().await_completion(name, &policy, cancel).await?;
        debug!("{} settled after {} checks", name, report.attempts);
        Ok(())
    }

    /// Read back a domain that must exist after a completed job
    async fn read_existing(&self, name: &str) -> Result<DomainState, ReconcileError> {
        self.read(name).await?.ok_or_else(|| ReconcileError::NotFound {
            resource_id: name.to_string(),
        })
    }

    async fn apply(
        &self,
        name: &str,
        action: &DomainAction,
        cancel: &CancellationToken,
    ) -> Result<(), ReconcileError> {
        let operation = action.operation_type();
        ensure_not_cancelled(name, operation.clone(), cancel)?;
        info!("Applying {} to domain {}", operation, name);

        let client = &self.reconciler.client;
        match action {
            DomainAction::Sslize(https) => client
                .sslize_domain(name, &https_to_remote(https))
                .await
                .map_err(transport(name, "sslize_domain"))?,
            DomainAction::Unsslize => client
                .unsslize_domain(name)
                .await
                .map_err(transport(name, "unsslize_domain"))?,
            DomainAction::ModifyHttpsConf(https) => client
                .modify_domain_https_conf(name, &https_to_remote(https))
                .await
                .map_err(transport(name, "modify_domain_https_conf"))?,
        }

        self.wait(
            name,
            operation,
            self.reconciler.timeouts.update,
            NotFoundPolicy::Fail,
            cancel,
        )
        .await
    }
}

#[async_trait::async_trait]
impl<'a> ResourceKind for Domains<'a> {
    type Spec = DomainSpec;
    type State = DomainState;

    const KIND: &'static str = "domain";

    fn state_id(state: &DomainState) -> String {
        state.spec.name.clone()
    }

    async fn find(&self, spec: &DomainSpec) -> Result<Option<DomainState>, ReconcileError> {
        self.read(&spec.name).await
    }

    async fn create(&self, spec: &DomainSpec, cancel: &CancellationToken) -> Result<DomainState, ReconcileError> {
        let name = spec.name.as_str();
        let body = domain_to_remote(spec).map_err(|source| ReconcileError::Validation {
            resource_id: name.to_string(),
            source,
        })?;
        ensure_not_cancelled(name, OperationType::CreateDomain, cancel)?;

        info!("Creating domain {} ({} origin, {})", name, spec.source.source_type(), spec.protocol);
        self.reconciler
            .client
            .create_domain(name, &body)
            .await
            .map_err(transport(name, "create_domain"))?;

        self.wait(
            name,
            OperationType::CreateDomain,
            self.reconciler.timeouts.create,
            NotFoundPolicy::Fail,
            cancel,
        )
        .await?;

        let state = self.read_existing(name).await?;
        info!("Created domain {} (cname {})", name, state.cname);
        Ok(state)
    }

    async fn read(&self, id: &str) -> Result<Option<DomainState>, ReconcileError> {
        let info = check_existing(id, "get_domain", self.reconciler.client.get_domain(id)).await?;
        Ok(info.as_ref().map(domain_from_remote))
    }

    async fn update(
        &self,
        id: &str,
        spec: &DomainSpec,
        cancel: &CancellationToken,
    ) -> Result<Converged<DomainState>, ReconcileError> {
        let current = self.read_existing(id).await?;
        let plan = plan_update(spec, &current.spec).map_err(|source| ReconcileError::Validation {
            resource_id: id.to_string(),
            source,
        })?;

        match plan {
            UpdatePlan::InSync => {
                debug!("Domain {} already up-to-date", id);
                Ok(Converged::Unchanged(current))
            }
            UpdatePlan::Replace(fields) => {
                warn!("Domain {} needs replacement: {} changed", id, fields.join(", "));
                Err(ReconcileError::ReplacementRequired {
                    resource_id: id.to_string(),
                    fields,
                })
            }
            UpdatePlan::Apply(action) => {
                self.apply(id, &action, cancel).await?;
                let state = self.read_existing(id).await?;
                info!("Updated domain {}", id);
                Ok(Converged::Changed(state))
            }
        }
    }

    async fn delete(&self, id: &str, cancel: &CancellationToken) -> Result<(), ReconcileError> {
        ensure_not_cancelled(id, OperationType::DeleteDomain, cancel)?;
        let client = &self.reconciler.client;

        info!("Taking domain {} offline", id);
        if !ignore_not_found(id, "offline_domain", client.offline_domain(id)).await? {
            return Ok(());
        }

        info!("Deleting domain {}", id);
        if !ignore_not_found(id, "delete_domain", client.delete_domain(id)).await? {
            return Ok(());
        }

        self.wait(
            id,
            OperationType::DeleteDomain,
            self.reconciler.timeouts.delete,
            NotFoundPolicy::Success,
            cancel,
        )
        .await?;
        info!("Deleted domain {}", id);
        Ok(())
    }
}
