// Common traits and types
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod bucket;
mod bucket_details;
mod client_config;
mod error;
pub mod object_storage;
mod size_unit;

pub use bucket::*;
pub use bucket_details::*;
pub use client_config::*;
pub use error::*;
pub use object_storage::{
    BucketInfo,
    ObjectPage,
    ObjectStorage,
    ObjectSummary,
};
pub use size_unit::*;

// Used by the registry and the command line.
pub type BucketNames = Vec<String>;
