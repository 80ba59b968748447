//! Backend selection.

use std::sync::Arc;

use tracing::info;
use validation_state::{
    CatalogStore, MemoryCatalog, MemoryResultStore, ResultStore, StateError, SurrealCatalog,
    SurrealHandle, SurrealResultStore,
};

use crate::config::StoreConfig;

/// Result and catalog stores sharing one backend.
#[derive(Clone)]
pub struct Stores {
    pub results: Arc<dyn ResultStore>,
    pub catalog: Arc<dyn CatalogStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Stores {
            results: Arc::new(MemoryResultStore::new()),
            catalog: Arc::new(MemoryCatalog::new()),
        }
    }

    pub async fn open(config: &StoreConfig) -> Result<Self, StateError> {
        match config {
            StoreConfig::Memory => {
                info!("Using in-memory store");
                Ok(Self::in_memory())
            }
            StoreConfig::Surreal(surreal) => {
                let handle = SurrealHandle::connect(surreal).await?;
                Ok(Stores {
                    results: Arc::new(SurrealResultStore::new(&handle)),
                    catalog: Arc::new(SurrealCatalog::new(&handle)),
                })
            }
        }
    }
}
