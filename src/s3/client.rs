// Implements the S3 Client
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::client::Client as S3Client;
use aws_sdk_s3::types::{
    Bucket,
    Object,
};
use aws_smithy_types_convert::date_time::DateTimeExt;
use aws_types::region::Region;
use chrono::{
    DateTime,
    Utc,
};
use crate::common::{
    BucketInfo,
    ClientConfig,
    ObjectPage,
    ObjectSummary,
    Result,
};
use super::sdk_error::classify;
use tracing::{
    debug,
    warn,
};

// Name reported by the static credentials provider.
const CREDENTIALS_SOURCE: &str = "s3review-config-file";

/// The S3 `Client`.
pub struct Client {
    /// The AWS SDK `S3Client`.
    pub client: S3Client,
}

impl Client {
    /// Return a new S3 `Client` with the given `ClientConfig`.
    ///
    /// Retries of throttled and failed requests use the SDK's standard
    /// strategy with exponential backoff, capped at
    /// `ClientConfig::max_attempts`.
    pub async fn new(config: &ClientConfig) -> Self {
        debug!("new: Creating S3Client in region '{}'", config.region);

        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            CREDENTIALS_SOURCE,
        );

        let retry_config = RetryConfig::standard()
            .with_max_attempts(config.max_attempts);

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(config.timeout)
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = &config.endpoint_url {
            debug!("new: Using custom endpoint '{}'", endpoint_url);

            loader = loader.endpoint_url(endpoint_url);
        }

        let sdk_config = loader.load().await;

        // Custom endpoints are usually S3 compatible services that don't
        // support virtual hosted buckets.
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint_url.is_some())
            .build();

        Self {
            client: S3Client::from_conf(s3_config),
        }
    }

    /// Returns every bucket the identity can see, following continuation
    /// tokens until the listing is complete.
    pub async fn list_buckets(&self) -> Result<Vec<BucketInfo>> {
        debug!("list_buckets: Listing...");

        let mut buckets            = Vec::new();
        let mut continuation_token = None;

        loop {
            let output = self.client.list_buckets()
                .set_continuation_token(continuation_token)
                .send()
                .await
                .map_err(|e| classify("ListBuckets", None, e))?;

            buckets.extend(output.buckets().iter().filter_map(bucket_info));

            match output.continuation_token() {
                Some(token) if !token.is_empty() => {
                    continuation_token = Some(token.to_string());
                },
                _ => break,
            }
        }

        debug!("list_buckets: Found {} buckets", buckets.len());

        Ok(buckets)
    }

    /// Returns one page of `ListObjectsV2` output for `bucket`.
    pub async fn list_objects_v2(
        &self,
        bucket:             &str,
        continuation_token: Option<String>,
    ) -> Result<ObjectPage> {
        debug!(
            "list_objects_v2: '{}' with token {:?}",
            bucket,
            continuation_token,
        );

        let output = self.client.list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|e| classify("ListObjectsV2", Some(bucket), e))?;

        let objects = output.contents()
            .iter()
            .map(object_summary)
            .collect();

        // If the output was truncated (Some(true)), we should have a
        // next_continuation_token.
        // If it wasn't, (Some(false) | None) we're done.
        let next_continuation_token = match output.is_truncated() {
            Some(true) => {
                let token = output.next_continuation_token()
                    .map(ToOwned::to_owned);

                if token.is_none() {
                    warn!(
                        "Truncated listing of '{}' without a continuation token",
                        bucket,
                    );
                }

                token
            },
            _ => None,
        };

        Ok(ObjectPage {
            objects,
            next_continuation_token,
        })
    }
}

// Buckets always come with a name, skip any that somehow don't.
fn bucket_info(bucket: &Bucket) -> Option<BucketInfo> {
    let Some(name) = bucket.name() else {
        warn!("Skipping bucket without a name: {:?}", bucket);

        return None;
    };

    let creation_date = bucket.creation_date()
        .and_then(|date| date.to_chrono_utc().ok())
        .unwrap_or_else(|| {
            warn!("No usable creation date for '{}', using the epoch", name);

            DateTime::<Utc>::default()
        });

    Some(BucketInfo {
        name: name.to_string(),
        creation_date,
    })
}

fn object_summary(object: &Object) -> ObjectSummary {
    let size = object.size()
        .and_then(|size| u64::try_from(size).ok())
        .unwrap_or(0);

    let last_modified = object.last_modified()
        .and_then(|date| date.to_chrono_utc().ok());

    ObjectSummary {
        size,
        last_modified,
    }
}
