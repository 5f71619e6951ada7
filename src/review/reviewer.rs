// Reviewer: the registry of every bucket visible to the configured identity
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use crate::common::{
    Bucket,
    BucketDetails,
    BucketNames,
    Error,
    ObjectStorage,
    Result,
    SizeUnit,
    DEFAULT_CONCURRENCY,
};
use futures::stream::{
    self,
    StreamExt,
    TryStreamExt,
};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{
    debug,
    info,
    warn,
};
use super::{
    DetailTable,
    ExportFormat,
};

/// Convenience type for the registry contents, in provider order.
pub type Buckets<S> = Vec<Arc<Bucket<S>>>;

/// The bucket registry.
///
/// Buckets are fetched from the provider on first use and each bucket's
/// metrics are calculated on first access. The per-bucket metrics and the
/// table built from them are kept for the lifetime of the `Reviewer` and are
/// only rebuilt when a refresh is explicitly requested.
pub struct Reviewer<S> {
    storage:     Arc<S>,
    concurrency: usize,
    buckets:     Mutex<Option<Buckets<S>>>,
    table:       Mutex<Option<Vec<BucketDetails>>>,
}

impl<S: ObjectStorage> Reviewer<S> {
    /// Return a new `Reviewer` over `storage`. Nothing is fetched yet.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            concurrency: DEFAULT_CONCURRENCY,
            buckets:     Mutex::new(None),
            table:       Mutex::new(None),
        }
    }

    /// Set how many buckets may be scanned at the same time.
    pub fn set_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    // Build the registry from a fresh provider listing.
    async fn load_buckets(&self) -> Result<Buckets<S>> {
        let infos = self.storage.buckets().await?;

        let mut seen    = HashSet::new();
        let mut buckets = Buckets::new();

        for info in infos {
            if !seen.insert(info.name.clone()) {
                warn!("Ignoring duplicate bucket '{}'", info.name);

                continue;
            }

            buckets.push(Arc::new(Bucket::new(Arc::clone(&self.storage), info)));
        }

        debug!("load_buckets: Registered {} buckets", buckets.len());

        Ok(buckets)
    }

    /// Re-fetch the bucket list from the provider, discarding every cached
    /// metric and the cached table.
    pub async fn fetch_buckets(&self) -> Result<Buckets<S>> {
        let buckets = self.load_buckets().await?;

        *self.buckets.lock().await = Some(buckets.clone());
        *self.table.lock().await   = None;

        Ok(buckets)
    }

    // Registry contents, fetching them on first use.
    async fn registry(&self) -> Result<Buckets<S>> {
        let mut cached = self.buckets.lock().await;

        if let Some(buckets) = cached.as_ref() {
            return Ok(buckets.clone());
        }

        let buckets = self.load_buckets().await?;
        *cached = Some(buckets.clone());

        Ok(buckets)
    }

    /// Returns the bucket names, in provider order.
    pub async fn list(&self) -> Result<BucketNames> {
        let names = self.registry()
            .await?
            .iter()
            .map(|bucket| bucket.name().to_string())
            .collect();

        Ok(names)
    }

    /// Returns every `Bucket`, in provider order.
    pub async fn buckets(&self) -> Result<Buckets<S>> {
        self.registry().await
    }

    /// Returns the bucket called exactly `name`.
    pub async fn get_bucket(&self, name: &str) -> Result<Arc<Bucket<S>>> {
        self.registry()
            .await?
            .into_iter()
            .find(|bucket| bucket.name() == name)
            .ok_or_else(|| Error::BucketNotFound(name.to_string()))
    }

    /// Calculate the metrics of every bucket now, so later reads are served
    /// from cache.
    pub async fn preload_buckets(&self) -> Result<()> {
        let buckets = self.registry().await?;

        info!(
            "Preloading metrics for {} buckets, {} at a time",
            buckets.len(),
            self.concurrency,
        );

        stream::iter(&buckets)
            .map(|bucket| bucket.calculate())
            .buffer_unordered(self.concurrency)
            .try_collect::<Vec<_>>()
            .await?;

        Ok(())
    }

    // Details of every bucket in registry order, in bytes.
    async fn collect_details(&self, calculate: bool) -> Result<Vec<BucketDetails>> {
        let buckets = self.registry().await?;

        stream::iter(&buckets)
            .map(|bucket| bucket.details(SizeUnit::Byte, calculate))
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    /// Returns a `DetailTable` of every bucket with sizes in `unit`.
    ///
    /// The table is built once and reused. With `refresh` every bucket is
    /// recalculated and the table rebuilt; if that fails the previous table
    /// is kept.
    pub async fn table(&self, unit: SizeUnit, refresh: bool) -> Result<DetailTable> {
        let mut cached = self.table.lock().await;

        if refresh || cached.is_none() {
            debug!("table: Building table, refresh: {}", refresh);

            *cached = Some(self.collect_details(refresh).await?);
        }

        let rows = cached.get_or_insert_with(Vec::new);

        Ok(DetailTable::new(rows, unit))
    }

    /// Write the table as boxed text to `out`.
    pub async fn show_details<W: Write>(
        &self,
        out:     &mut W,
        unit:    SizeUnit,
        refresh: bool,
    ) -> Result<()> {
        let table = self.table(unit, refresh).await?;

        writeln!(out, "{}", table.render())?;

        Ok(())
    }

    /// Save the table to `path`, as a workbook or CSV depending on the
    /// extension.
    pub async fn save_detail_table(
        &self,
        path:    &Path,
        unit:    SizeUnit,
        refresh: bool,
    ) -> Result<ExportFormat> {
        self.table(unit, refresh).await?.save(path)
    }
}
