//! Shared application state

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::services::{
    CharacterServiceImpl, NoteServiceImpl, ReferenceServiceImpl, RelationshipServiceImpl,
    TransferServiceImpl,
};
use crate::domain::aggregates::ReferenceCatalog;
use crate::infrastructure::cache::FileCache;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::persistence::Repositories;
use crate::infrastructure::reference_data::ReferenceDataLoader;
use crate::infrastructure::storage::create_store;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub cache: Arc<FileCache>,
    /// Rules content, immutable after startup
    pub catalog: Arc<ReferenceCatalog>,
    // Application services
    pub character_service: CharacterServiceImpl,
    pub relationship_service: RelationshipServiceImpl,
    pub note_service: NoteServiceImpl,
    pub reference_service: ReferenceServiceImpl,
    pub transfer_service: TransferServiceImpl,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        // Initialize the key/value store
        let store = create_store(&config.storage).await?;

        // Initialize the file cache
        let cache = FileCache::new(config.cache.clone())
            .await
            .context("Failed to create cache directory")?;
        let cache = Arc::new(cache);

        let repositories = Repositories::new(store, Some(cache.clone()));

        // Load reference data
        let catalog = ReferenceDataLoader::new(&config.assets_dir)
            .load_catalog()
            .await;

        Ok(Self::from_parts(config, repositories, Arc::new(catalog), cache))
    }

    /// Wire the services over already constructed infrastructure
    pub fn from_parts(
        config: AppConfig,
        repositories: Repositories,
        catalog: Arc<ReferenceCatalog>,
        cache: Arc<FileCache>,
    ) -> Self {
        Self {
            character_service: CharacterServiceImpl::new(&repositories),
            relationship_service: RelationshipServiceImpl::new(&repositories),
            note_service: NoteServiceImpl::new(&repositories),
            reference_service: ReferenceServiceImpl::new(catalog.clone(), &repositories),
            transfer_service: TransferServiceImpl::new(catalog.clone(), &repositories),
            config,
            cache,
            catalog,
        }
    }
}
