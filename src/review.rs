// Bucket registry and the tabular views built from it
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// `DetailTable` rendering and file export.
mod detail_table;

/// The `Reviewer` bucket registry.
mod reviewer;

pub use detail_table::*;
pub use reviewer::*;
