//! Application layer - Use cases orchestrating the domain
//!
//! - Ports: traits the infrastructure must implement (storage)
//! - Services: character sheet, relationship, note, reference and transfer use cases
//! - DTOs: request/response shapes for the HTTP boundary

pub mod dto;
pub mod ports;
pub mod services;
