use tokio::sync::mpsc;
use tracing::{debug, instrument};

use crate::domain::{NewProduct, Product, ProductId};
use crate::error::StoreError;
use crate::messages::StoreRequest;

/// Client for the store service. Every call is answered on the store's worker
/// task, never on the caller's.
#[derive(Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    /// Manual method for the one request that needs no response.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        debug!("Sending shutdown request");
        self.sender
            .send(StoreRequest::Shutdown)
            .await
            .map_err(|e| StoreError::ActorCommunicationError(e.to_string()))
    }
}

client_method!(StoreClient => fn get_all_products() -> Vec<Product> as StoreRequest::GetAllProducts, Error = StoreError);
client_method!(StoreClient => fn insert_product(product: NewProduct) -> ProductId as StoreRequest::InsertProduct, Error = StoreError);
client_method!(StoreClient => fn delete_product(product: Product) -> () as StoreRequest::DeleteProduct, Error = StoreError);
client_method!(StoreClient => fn delete_all_products() -> () as StoreRequest::DeleteAllProducts, Error = StoreError);
