// Imports all of the components needed for s3::client
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// S3 `Client`.
mod client;

/// Implementation of the `ObjectStorage` trait for our S3 `Client`.
mod object_storage;

/// Mapping of SDK errors onto our `Error`.
mod sdk_error;

pub use client::*;
