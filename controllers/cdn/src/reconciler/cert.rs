//! SSL certificate reconciler
//!
//! Certificates are uploaded synchronously and have no update call, so every
//! field change is a replacement.

use cdn_resources::CertSpec;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{Converged, Reconciler, ResourceKind};
use crate::converter::{cert_from_remote, cert_to_remote, CertState};
use crate::error::ReconcileError;
use crate::reconcile_helpers::{check_existing, ignore_not_found, transport};

/// Certificate handle of a [`Reconciler`]
#[derive(Debug, Clone, Copy)]
pub struct Certificates<'a> {
    reconciler: &'a Reconciler,
}

impl<'a> Certificates<'a> {
    pub(crate) fn new(reconciler: &'a Reconciler) -> Self {
        Self { reconciler }
    }

    /// Every certificate on the account
    pub async fn list(&self) -> Result<Vec<CertState>, ReconcileError> {
        let certs = self
            .reconciler
            .client
            .list_certs()
            .await
            .map_err(transport("*", "list_certs"))?;
        Ok(certs.iter().map(cert_from_remote).collect())
    }
}

/// Fields of `desired` that differ from `current`; PEM blocks compare trimmed
fn changed_fields(desired: &CertSpec, current: &CertSpec) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if desired.name != current.name {
        fields.push("name");
    }
    if desired.private_key.trim() != current.private_key.trim() {
        fields.push("privateKey");
    }
    if desired.cert_chain.trim() != current.cert_chain.trim() {
        fields.push("certChain");
    }
    fields
}

#[async_trait::async_trait]
impl<'a> ResourceKind for Certificates<'a> {
    type Spec = CertSpec;
    type State = CertState;

    const KIND: &'static str = "certificate";
    const CREATE_BEFORE_DESTROY: bool = true;

    fn state_id(state: &CertState) -> String {
        state.id.clone()
    }

    /// Looks the certificate up by display name
    async fn find(&self, spec: &CertSpec) -> Result<Option<CertState>, ReconcileError> {
        let certs = self
            .reconciler
            .client
            .list_certs()
            .await
            .map_err(transport(&spec.name, "list_certs"))?;
        let mut matching = certs.into_iter().filter(|c| c.name == spec.name);
        let found = matching.next().map(|c| cert_from_remote(&c));
        if matching.next().is_some() {
            warn!(
                "Several certificates are named {}, using {:?}",
                spec.name,
                found.as_ref().map(|c| &c.id)
            );
        }
        Ok(found)
    }

    async fn create(&self, spec: &CertSpec, _cancel: &CancellationToken) -> Result<CertState, ReconcileError> {
        let body = cert_to_remote(spec).map_err(|source| ReconcileError::Validation {
            resource_id: spec.name.clone(),
            source,
        })?;

        info!("Uploading certificate {}", spec.name);
        let id = self
            .reconciler
            .client
            .create_cert(&body)
            .await
            .map_err(transport(&spec.name, "create_cert"))?;

        let state = self.read(&id).await?.ok_or_else(|| ReconcileError::NotFound {
            resource_id: id.clone(),
        })?;
        info!("Uploaded certificate {} as {}", spec.name, state.id);
        Ok(state)
    }

    async fn read(&self, id: &str) -> Result<Option<CertState>, ReconcileError> {
        let info = check_existing(id, "get_cert", self.reconciler.client.get_cert(id)).await?;
        Ok(info.as_ref().map(cert_from_remote))
    }

    async fn update(
        &self,
        id: &str,
        spec: &CertSpec,
        _cancel: &CancellationToken,
    ) -> Result<Converged<CertState>, ReconcileError> {
        spec.validate().map_err(|source| ReconcileError::Validation {
            resource_id: id.to_string(),
            source,
        })?;
        let current = self.read(id).await?.ok_or_else(|| ReconcileError::NotFound {
            resource_id: id.to_string(),
        })?;

        let fields = changed_fields(spec, &current.spec);
        if fields.is_empty() {
            debug!("Certificate {} already up-to-date", id);
            return Ok(Converged::Unchanged(current));
        }
        Err(ReconcileError::ReplacementRequired {
            resource_id: id.to_string(),
            fields,
        })
    }

    async fn delete(&self, id: &str, _cancel: &CancellationToken) -> Result<(), ReconcileError> {
        info!("Deleting certificate {}", id);
        if ignore_not_found(id, "delete_cert", self.reconciler.client.delete_cert(id)).await? {
            info!("Deleted certificate {}", id);
        }
        Ok(())
    }
}
