//! Bucket listing

use cdn_resources::RegionId;
use tracing::debug;

use super::Reconciler;
use crate::converter::{bucket_from_remote, BucketView};
use crate::error::ReconcileError;
use crate::reconcile_helpers::transport;

impl Reconciler {
    /// Buckets of one region, owned by the account.
    ///
    /// The region id is checked before any request is made.
    pub async fn list_buckets(&self, region_id: &str) -> Result<Vec<BucketView>, ReconcileError> {
        let region: RegionId = region_id.parse().map_err(|source| ReconcileError::Validation {
            resource_id: region_id.to_string(),
            source,
        })?;

        let buckets = self
            .client
            .list_buckets_in_region(region)
            .await
            .map_err(transport(region_id, "list_buckets_in_region"))?;
        debug!("Region {} has {} buckets", region, buckets.len());
        Ok(buckets.iter().map(bucket_from_remote).collect())
    }
}

#[cfg(test)]
mod tests {
    use cdn_resources::ValidationError;
    use qiniu_client::{BucketInfo, BucketSummary, MockQiniuClient};

    use super::*;
    use crate::test_utils::reconciler_with;

    #[tokio::test]
    async fn test_unknown_region_makes_no_call() {
        let mock = MockQiniuClient::new();
        let (reconciler, _) = reconciler_with(&mock);

        let err = reconciler.list_buckets("zz").await.unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::Validation {
                source: ValidationError::InvalidValue { field: "region_id", .. },
                ..
            }
        ));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_buckets_of_region() {
        let mock = MockQiniuClient::new();
        mock.add_buckets(
            RegionId::Z2,
            vec![BucketSummary {
                name: "assets".to_string(),
                info: BucketInfo {
                    region: "z2".to_string(),
                    private: 0,
                    no_index_page: 0,
                    max_age: 0,
                },
            }],
        );
        let (reconciler, _) = reconciler_with(&mock);

        let buckets = reconciler.list_buckets("z2").await.unwrap();
        assert_eq!(buckets.len(), 1);
        assert!(!buckets[0].private);
        assert!(buckets[0].index_page_on);
        assert!(reconciler.list_buckets("z0").await.unwrap().is_empty());
        assert_eq!(mock.call_names(), vec!["list_buckets_in_region", "list_buckets_in_region"]);
    }
}
