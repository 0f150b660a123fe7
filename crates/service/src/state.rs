use std::sync::Arc;

use store::{DynStoreClient, Storage, StoreClient, StoreError};

use super::config::Config;

/// Process-wide service state. The store client is constructed once and
/// shared read-only by every request.
#[derive(Clone)]
pub struct State {
    store: DynStoreClient,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        if let Some(bucket) = config.store.bucket() {
            tracing::info!("Connecting to bucket: {}", bucket);
        }
        let storage = Storage::new(config.store.clone()).await?;

        Ok(Self {
            store: Arc::new(storage),
        })
    }

    /// Build state around an already constructed client.
    pub fn new(store: DynStoreClient) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn StoreClient {
        self.store.as_ref()
    }

    pub fn store_handle(&self) -> DynStoreClient {
        self.store.clone()
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State").finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("object store setup error: {0}")]
    Store(#[from] StoreError),
}
