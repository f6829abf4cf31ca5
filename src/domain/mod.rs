//! Domain layer - Core character-sheet rules with no I/O
//!
//! This layer contains:
//! - Entities: Character, Relationship, Note and the reference records
//! - Value Objects: identifiers, abilities and skills, avatar payloads
//! - Aggregates: the read-only reference catalog

pub mod aggregates;
pub mod entities;
pub mod value_objects;
