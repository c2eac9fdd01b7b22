//! Bucket listing for MockQiniuClient

use cdn_resources::RegionId;

use super::{MockQiniuClient, lock};
use crate::error::QiniuError;
use crate::models::BucketSummary;

pub fn list_buckets_in_region(client: &MockQiniuClient, region: RegionId) -> Result<Vec<BucketSummary>, QiniuError> {
    client.record("list_buckets_in_region", region.as_str(), None)?;
    Ok(lock(&client.buckets).get(&region).cloned().unwrap_or_default())
}
