// ObjectStorage trait
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use async_trait::async_trait;
use chrono::{
    DateTime,
    Utc,
};
use super::Result;

/// A bucket as returned by the provider's bucket listing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BucketInfo {
    /// Provider assigned, unique bucket name.
    pub name:          String,

    /// When the bucket was created.
    pub creation_date: DateTime<Utc>,
}

/// The parts of a listed object that bucket metrics are built from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ObjectSummary {
    /// Object size in bytes.
    pub size:          u64,

    /// Last modification time, if the provider reported one.
    pub last_modified: Option<DateTime<Utc>>,
}

/// One page of an object listing.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ObjectPage {
    /// Objects on this page.
    pub objects:                 Vec<ObjectSummary>,

    /// Token to request the following page with, `None` on the last page.
    pub next_continuation_token: Option<String>,
}

/// `ObjectStorage` represents the required methods to enumerate buckets and
/// walk their object listings.
///
/// This trait should be implemented by every storage provider client.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Returns every bucket visible to the configured identity, in the order
    /// the provider enumerates them.
    async fn buckets(&self) -> Result<Vec<BucketInfo>>;

    /// Returns a single page of the object listing for `bucket`.
    ///
    /// `continuation_token` is `None` for the first page and the previous
    /// page's `next_continuation_token` afterwards.
    async fn list_objects(
        &self,
        bucket:             &str,
        continuation_token: Option<String>,
    ) -> Result<ObjectPage>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::common::Error;
    use std::collections::HashMap;
    use std::sync::atomic::{
        AtomicUsize,
        Ordering,
    };
    use std::sync::Mutex;

    // Parse an RFC 3339 timestamp, tests in other modules import this too.
    pub fn timestamp(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    /// In-memory `ObjectStorage` that counts how often object listings are
    /// started, so tests can tell cache hits from fresh scans.
    #[derive(Default)]
    pub struct MockStorage {
        buckets:      Vec<BucketInfo>,
        objects:      Mutex<HashMap<String, Vec<ObjectSummary>>>,
        failing:      Mutex<Option<String>>,
        page_size:    usize,
        bucket_lists: AtomicUsize,
        scans:        AtomicUsize,
    }

    impl MockStorage {
        pub fn new(page_size: usize) -> Self {
            Self {
                page_size,
                ..Default::default()
            }
        }

        pub fn with_bucket(
            mut self,
            name:          &str,
            creation_date: &str,
            objects:       Vec<(u64, &str)>,
        ) -> Self {
            self.buckets.push(BucketInfo {
                name:          name.into(),
                creation_date: timestamp(creation_date),
            });

            let objects = objects
                .into_iter()
                .map(|(size, modified)| ObjectSummary {
                    size,
                    last_modified: Some(timestamp(modified)),
                })
                .collect();

            self.objects.lock().unwrap().insert(name.into(), objects);
            self
        }

        // Append an object to a bucket after construction.
        pub fn put_object(&self, bucket: &str, size: u64, modified: &str) {
            self.objects
                .lock()
                .unwrap()
                .entry(bucket.into())
                .or_default()
                .push(ObjectSummary {
                    size,
                    last_modified: Some(timestamp(modified)),
                });
        }

        // Make listings of `bucket` fail on their second page.
        pub fn fail_listing(&self, bucket: &str) {
            *self.failing.lock().unwrap() = Some(bucket.into());
        }

        pub fn recover(&self) {
            *self.failing.lock().unwrap() = None;
        }

        // Number of full object listings that were started.
        pub fn scans(&self) -> usize {
            self.scans.load(Ordering::SeqCst)
        }

        pub fn bucket_lists(&self) -> usize {
            self.bucket_lists.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ObjectStorage for MockStorage {
        async fn buckets(&self) -> Result<Vec<BucketInfo>> {
            self.bucket_lists.fetch_add(1, Ordering::SeqCst);

            Ok(self.buckets.clone())
        }

        async fn list_objects(
            &self,
            bucket:             &str,
            continuation_token: Option<String>,
        ) -> Result<ObjectPage> {
            let start = match continuation_token {
                Some(token) => token.parse::<usize>().unwrap(),
                None        => {
                    self.scans.fetch_add(1, Ordering::SeqCst);
                    0
                },
            };

            let failing = self.failing.lock().unwrap().clone();
            if start > 0 && failing.as_deref() == Some(bucket) {
                return Err(Error::Network {
                    operation: "ListObjectsV2",
                    message:   "connection reset by peer".into(),
                });
            }

            let objects = self.objects.lock().unwrap();
            let objects = objects
                .get(bucket)
                .ok_or_else(|| Error::BucketNotFound(bucket.into()))?;

            let page_size = self.page_size.max(1);
            let end       = (start + page_size).min(objects.len());

            let next_continuation_token = if end < objects.len() {
                Some(end.to_string())
            }
            else {
                None
            };

            Ok(ObjectPage {
                objects: objects[start..end].to_vec(),
                next_continuation_token,
            })
        }
    }
}
