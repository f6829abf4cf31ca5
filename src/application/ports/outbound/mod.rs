//! Outbound ports - Interfaces that the application requires from external systems

mod repository_port;
mod store_port;

pub use repository_port::{
    CharacterRepositoryPort, Edit, FavoritesRepositoryPort, NoteRepositoryPort,
    RelationshipRepositoryPort,
};
pub use store_port::{KeyValueStorePort, StoreError};
