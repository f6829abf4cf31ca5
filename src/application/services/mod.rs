//! Application services - Use case implementations
//!
//! Each service depends on outbound ports only and returns domain entities.
//! Errors are `anyhow` chains; failures a caller can act on carry a
//! [`ServiceError`] at their root so the HTTP layer can pick a status code.

pub mod character_service;
pub mod note_service;
pub mod reference_service;
pub mod relationship_service;
pub mod transfer_service;

use std::fmt::Display;

use thiserror::Error;

pub use character_service::{
    CharacterService, CharacterServiceImpl, CreateCharacterRequest, UpdateCharacterRequest,
};
pub use note_service::{CreateNoteRequest, NoteService, NoteServiceImpl, UpdateNoteRequest};
pub use reference_service::{CharacterFavorites, ReferenceService, ReferenceServiceImpl};
pub use relationship_service::{
    CreateRelationshipRequest, RelationshipService, RelationshipServiceImpl,
    UpdateRelationshipRequest,
};
pub use transfer_service::{ImportSummary, TransferService, TransferServiceImpl};

/// Failures caused by the request rather than the system
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Validation(String),
}

pub(crate) fn not_found(entity: &'static str, id: impl Display) -> anyhow::Error {
    ServiceError::NotFound {
        entity,
        id: id.to_string(),
    }
    .into()
}

pub(crate) fn invalid(message: impl Into<String>) -> anyhow::Error {
    ServiceError::Validation(message.into()).into()
}

/// Reject empty or overlong required text
pub(crate) fn validate_text(field: &str, value: &str, max_len: usize) -> anyhow::Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{} cannot be empty", field)));
    }
    if value.len() > max_len {
        return Err(invalid(format!(
            "{} cannot exceed {} characters",
            field, max_len
        )));
    }
    Ok(())
}
