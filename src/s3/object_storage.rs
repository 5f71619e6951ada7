// Implement the ObjectStorage trait for the s3::Client
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use async_trait::async_trait;
use crate::common::{
    BucketInfo,
    ObjectPage,
    ObjectStorage,
    Result,
};
use super::client::Client;
use tracing::debug;

#[async_trait]
impl ObjectStorage for Client {
    /// Return `BucketInfo` for every bucket discovered in S3.
    async fn buckets(&self) -> Result<Vec<BucketInfo>> {
        debug!("buckets: Listing...");

        self.list_buckets().await
    }

    /// Return one page of the object listing of `bucket`.
    async fn list_objects(
        &self,
        bucket:             &str,
        continuation_token: Option<String>,
    ) -> Result<ObjectPage> {
        let page = self.list_objects_v2(bucket, continuation_token).await?;

        debug!(
            "list_objects: '{}' returned {} objects, more: {}",
            bucket,
            page.objects.len(),
            page.next_continuation_token.is_some(),
        );

        Ok(page)
    }
}
