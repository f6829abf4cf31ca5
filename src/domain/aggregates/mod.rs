//! Aggregates - Cluster of domain objects treated as a single unit

pub mod reference_catalog;

pub use reference_catalog::ReferenceCatalog;
