use std::sync::Arc;

use tracing::{error, info, instrument};

use super::config::Settings;
use crate::clients::{ScreenClient, StoreClient};
use crate::error::StoreError;
use crate::screen::ShoppingListScreen;
use crate::store::{MemoryRepository, ProductRepository, SqliteRepository, StoreService};

/// The application: a store service and the screen that drives it.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct ShoppingListSystem {
    pub screen_client: ScreenClient,
    pub store_client: StoreClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl ShoppingListSystem {
    /// Start both actors over an already opened repository.
    ///
    /// **Startup Order:**
    /// 1. Start the store service (no dependencies)
    /// 2. Start the screen with a store client
    #[instrument(name = "shopping_system", skip(repository))]
    pub fn start(repository: Arc<dyn ProductRepository>, channel_capacity: usize) -> Self {
        info!("Starting shopping list system");

        let (store_service, store_client) = StoreService::new(channel_capacity, repository);
        let store_handle = tokio::spawn(store_service.run());

        let (screen, screen_client) = ShoppingListScreen::new(channel_capacity, store_client.clone());
        let screen_handle = tokio::spawn(screen.run());

        info!("Shopping list system started");

        Self {
            screen_client,
            store_client,
            handles: vec![screen_handle, store_handle],
        }
    }

    /// Open the repository the settings ask for, then start.
    pub async fn from_settings(settings: &Settings) -> Result<Self, StoreError> {
        let repository: Arc<dyn ProductRepository> = if settings.memory {
            info!("Using in-memory product store");
            Arc::new(MemoryRepository::new())
        } else {
            Arc::new(SqliteRepository::connect(&settings.database_url).await?)
        };
        Ok(Self::start(repository, settings.channel_capacity))
    }

    /// Exit the screen first (dropping its in-flight results), then stop the store.
    ///
    /// **Error Handling:** Log errors but continue shutdown to prevent hangs
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down shopping list system");

        let _ = self.screen_client.exit().await;
        let mut handles = self.handles.into_iter();
        if let Some(screen_handle) = handles.next() {
            if let Err(e) = screen_handle.await {
                error!(error = ?e, "Screen shutdown error");
            }
        }

        let _ = self.store_client.shutdown().await;
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Store shutdown error");
                return Err(format!("Store task failed: {e:?}"));
            }
        }

        info!("Shopping list system shutdown complete");
        Ok(())
    }
}
