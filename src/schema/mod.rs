//! Schema loading module
//!
//! Every stream has one static JSON Schema document. The documents ship
//! inside the binary (from `schemas/<stream>.json`) and can be overridden
//! from a directory on disk.

mod loader;

pub use loader::{SchemaLoader, SchemaSource};
