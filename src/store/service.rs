use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

use super::ProductRepository;
use crate::clients::StoreClient;
use crate::domain::{NewProduct, Product, ProductId};
use crate::error::StoreError;
use crate::messages::{ServiceResponse, StoreRequest};

/// Store actor. Owns the repository and serves requests one at a time on its own
/// task, so repository I/O never runs on the screen's interaction loop.
pub struct StoreService {
    receiver: mpsc::Receiver<StoreRequest>,
    repository: Arc<dyn ProductRepository>,
}

impl StoreService {
    pub fn new(buffer_size: usize, repository: Arc<dyn ProductRepository>) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self { receiver, repository };
        let client = StoreClient::new(sender);
        (service, client)
    }

    #[instrument(name = "store_service", skip(self))]
    pub async fn run(mut self) {
        info!("StoreService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::GetAllProducts { respond_to } => {
                    self.handle_get_all_products(respond_to).await;
                }
                StoreRequest::InsertProduct { product, respond_to } => {
                    self.handle_insert_product(product, respond_to).await;
                }
                StoreRequest::DeleteProduct { product, respond_to } => {
                    self.handle_delete_product(product, respond_to).await;
                }
                StoreRequest::DeleteAllProducts { respond_to } => {
                    self.handle_delete_all_products(respond_to).await;
                }
                StoreRequest::Shutdown => {
                    info!("StoreService shutting down");
                    break;
                }
            }
        }

        info!("StoreService stopped");
    }

    #[instrument(skip(self, respond_to))]
    async fn handle_get_all_products(&self, respond_to: ServiceResponse<Vec<Product>, StoreError>) {
        debug!("Processing get_all_products request");

        let result = self.repository.get_all_products().await;
        match &result {
            Ok(products) => debug!(product_count = products.len(), "Listed products"),
            Err(e) => error!(error = %e, "Listing products failed"),
        }

        let _ = respond_to.send(result);
    }

    #[instrument(fields(product_name = %product.name, quantity = product.quantity), skip(self, product, respond_to))]
    async fn handle_insert_product(&self, product: NewProduct, respond_to: ServiceResponse<ProductId, StoreError>) {
        debug!("Processing insert_product request");

        let result = self.repository.insert_product(product).await;
        match &result {
            Ok(id) => info!(product_id = %id, "Product inserted"),
            Err(e) => error!(error = %e, "Inserting product failed"),
        }

        let _ = respond_to.send(result);
    }

    #[instrument(fields(product_id = %product.id), skip(self, product, respond_to))]
    async fn handle_delete_product(&self, product: Product, respond_to: ServiceResponse<(), StoreError>) {
        debug!("Processing delete_product request");

        let result = self.repository.delete_product(&product).await;
        match &result {
            Ok(()) => info!("Product deleted"),
            Err(e) => error!(error = %e, "Deleting product failed"),
        }

        let _ = respond_to.send(result);
    }

    #[instrument(skip(self, respond_to))]
    async fn handle_delete_all_products(&self, respond_to: ServiceResponse<(), StoreError>) {
        debug!("Processing delete_all_products request");

        let result = self.repository.delete_all_products().await;
        match &result {
            Ok(()) => info!("All products deleted"),
            Err(e) => error!(error = %e, "Deleting all products failed"),
        }

        let _ = respond_to.send(result);
    }
}
