//! Catalog module
//!
//! Discovery builds a Singer catalog from the stream registry and the
//! bundled schemas. A catalog passed with `--catalog` is parsed into the
//! same types and decides which streams a sync run touches.

mod discover;
mod types;

pub use discover::{catalog_entry, discover, standard_metadata};
pub use types::{Catalog, CatalogEntry, MetadataEntry};
