// Definition of a bucket and its lazily calculated metrics
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use chrono::{
    DateTime,
    Utc,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use super::{
    BucketDetails,
    BucketInfo,
    ObjectStorage,
    ObjectSummary,
    Result,
    SizeUnit,
};

/// Metrics calculated from a complete object listing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Snapshot {
    /// Number of objects.
    pub count:         u64,

    /// Sum of object sizes in bytes.
    pub size:          u64,

    /// Latest object modification time, never earlier than the bucket's
    /// creation date.
    pub last_modified: DateTime<Utc>,
}

impl Snapshot {
    /// Metrics of an empty bucket created at `creation_date`.
    pub const fn empty(creation_date: DateTime<Utc>) -> Self {
        Self {
            count:         0,
            size:          0,
            last_modified: creation_date,
        }
    }

    /// Fold a single listed object into the running totals.
    pub fn record(&mut self, object: &ObjectSummary) {
        self.count += 1;
        self.size = self.size.saturating_add(object.size);

        if let Some(modified) = object.last_modified {
            if modified > self.last_modified {
                self.last_modified = modified;
            }
        }
    }
}

/// Represents a storage bucket.
///
/// The `Snapshot` is calculated on first access and then reused until a
/// caller forces a recalculation; changes in the underlying storage are never
/// noticed on their own.
pub struct Bucket<S> {
    storage:  Arc<S>,
    info:     BucketInfo,
    snapshot: Mutex<Option<Snapshot>>,
}

impl<S: ObjectStorage> Bucket<S> {
    /// Return a new `Bucket` backed by `storage`, with nothing calculated yet.
    pub fn new(storage: Arc<S>, info: BucketInfo) -> Self {
        Self {
            storage,
            info,
            snapshot: Mutex::new(None),
        }
    }

    /// Bucket name.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// When the bucket was created.
    pub fn creation_date(&self) -> DateTime<Utc> {
        self.info.creation_date
    }

    /// Returns `true` once a `Snapshot` has been cached.
    #[cfg(test)]
    pub async fn is_calculated(&self) -> bool {
        self.snapshot.lock().await.is_some()
    }

    // Walk every page of the object listing. Nothing is kept if a page fails.
    async fn scan(&self) -> Result<Snapshot> {
        debug!("scan: Listing objects in '{}'", self.name());

        let mut continuation_token = None;
        let mut snapshot           = Snapshot::empty(self.creation_date());

        // Loop until all objects are processed.
        loop {
            let page = self.storage
                .list_objects(self.name(), continuation_token)
                .await?;

            for object in &page.objects {
                snapshot.record(object);
            }

            match page.next_continuation_token {
                Some(token) => continuation_token = Some(token),
                None        => break,
            }
        }

        debug!("scan: '{}' -> {:?}", self.name(), snapshot);

        Ok(snapshot)
    }

    /// Recalculate the metrics from a fresh object listing and cache them.
    ///
    /// If the listing fails part way through, the error is returned and any
    /// previously cached `Snapshot` is left untouched.
    pub async fn calculate(&self) -> Result<Snapshot> {
        let mut cached = self.snapshot.lock().await;

        let snapshot = self.scan().await?;
        *cached = Some(snapshot);

        Ok(snapshot)
    }

    /// Return the cached metrics, calculating them on first access.
    ///
    /// Concurrent first accesses wait on each other, so only one listing is
    /// performed.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let mut cached = self.snapshot.lock().await;

        if let Some(snapshot) = *cached {
            debug!("snapshot: Using cached metrics for '{}'", self.name());

            return Ok(snapshot);
        }

        let snapshot = self.scan().await?;
        *cached = Some(snapshot);

        Ok(snapshot)
    }

    /// Number of objects in the bucket.
    pub async fn count(&self) -> Result<u64> {
        Ok(self.snapshot().await?.count)
    }

    /// Total object size in the given `unit`.
    pub async fn size(&self, unit: SizeUnit) -> Result<f64> {
        Ok(unit.convert(self.snapshot().await?.size))
    }

    /// Most recent modification time of any object.
    pub async fn last_modified(&self) -> Result<DateTime<Utc>> {
        Ok(self.snapshot().await?.last_modified)
    }

    /// Returns the bucket's `BucketDetails` with the size in `unit`.
    ///
    /// When `calculate` is set the metrics are recalculated first, otherwise
    /// the cached metrics are used if there are any.
    pub async fn details(
        &self,
        unit:      SizeUnit,
        calculate: bool,
    ) -> Result<BucketDetails> {
        let snapshot = if calculate {
            self.calculate().await?
        }
        else {
            self.snapshot().await?
        };

        let details = BucketDetails {
            name:          self.info.name.clone(),
            creation_date: self.info.creation_date,
            count:         snapshot.count,
            size_bytes:    snapshot.size,
            unit,
            last_modified: snapshot.last_modified,
        };

        Ok(details)
    }
}
