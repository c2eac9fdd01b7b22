//! Unit tests for the certificate reconciler

#[cfg(test)]
mod tests {
    use super::super::{Converged, ResourceKind};
    use crate::error::ReconcileError;
    use crate::test_utils::*;
    use qiniu_client::MockQiniuClient;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn test_create_uploads_and_reads_back() {
        let mock = MockQiniuClient::new();
        let (reconciler, clock) = reconciler_with(&mock);

        let state = reconciler
            .certificates()
            .create(&cert_spec("site"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(state.id, "cert-0001");
        assert_eq!(state.spec, cert_spec("site"));
        assert_eq!(mock.call_names(), vec!["create_cert", "get_cert"]);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_pem_makes_no_call() {
        let mock = MockQiniuClient::new();
        let (reconciler, _) = reconciler_with(&mock);
        let mut spec = cert_spec("site");
        spec.private_key = "not a key".to_string();

        let err = reconciler
            .certificates()
            .create(&spec, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Validation { .. }));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_any_change_requires_replacement() {
        let mock = MockQiniuClient::new();
        let (reconciler, _) = reconciler_with(&mock);
        let cancel = CancellationToken::new();
        let certs = reconciler.certificates();
        let created = certs.create(&cert_spec("site"), &cancel).await.unwrap();

        let mut same = cert_spec("site");
        same.cert_chain.push_str("\n\n");
        let result = certs.update(&created.id, &same, &cancel).await.unwrap();
        assert!(matches!(result, Converged::Unchanged(_)));

        let renamed = cert_spec("site-2024");
        let err = certs.update(&created.id, &renamed, &cancel).await.unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::ReplacementRequired { ref fields, .. } if fields == &vec!["name"]
        ));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let mock = MockQiniuClient::new();
        let (reconciler, _) = reconciler_with(&mock);
        let cancel = CancellationToken::new();
        let certs = reconciler.certificates();
        let created = certs.create(&cert_spec("site"), &cancel).await.unwrap();

        certs.delete(&created.id, &cancel).await.unwrap();
        assert!(!mock.has_cert(&created.id));
        certs.delete(&created.id, &cancel).await.unwrap();
        assert!(certs.read(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let mock = MockQiniuClient::new();
        let (reconciler, _) = reconciler_with(&mock);
        let certs = reconciler.certificates();
        let created = certs
            .create(&cert_spec("site"), &CancellationToken::new())
            .await
            .unwrap();

        let found = certs.find(&cert_spec("site")).await.unwrap();
        assert_eq!(found.map(|c| c.id), Some(created.id));
        assert!(certs.find(&cert_spec("other")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_failure_is_transport_error() {
        let mock = MockQiniuClient::new();
        mock.fail_next("list_certs", "service unavailable");
        let (reconciler, _) = reconciler_with(&mock);

        let err = reconciler.certificates().list().await.unwrap_err();
        assert!(err.is_retryable());
    }
}
