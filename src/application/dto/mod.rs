//! Data Transfer Objects - For API boundaries
//!
//! Request DTOs convert into service requests; response DTOs add the values
//! derived from an entity so clients do not have to recompute them. Field
//! names are camelCase to match the stored and exported documents.

pub mod character;
pub mod note;
pub mod reference;
pub mod relationship;
pub mod transfer;

pub use character::*;
pub use note::*;
pub use reference::*;
pub use relationship::*;
pub use transfer::*;
