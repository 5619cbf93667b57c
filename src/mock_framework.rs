//! # Mock Framework
//!
//! Utilities for testing the screen against a store the test drives by hand.
//!
//! Use [`create_mock_store_client`] to get a client and a receiver.
//! Then use helpers like [`expect_get_all`] or [`expect_insert`] to assert the
//! requests the screen sends and to answer them in whatever order a test needs.

use tokio::sync::mpsc;

use crate::clients::StoreClient;
use crate::domain::{NewProduct, Product, ProductId};
use crate::error::StoreError;
use crate::messages::{ServiceResponse, StoreRequest};

/// Creates a store client whose requests land on a receiver the test owns.
///
/// Responding out of order, failing a request, or never responding at all are
/// then just a matter of what the test does with the responders.
pub fn create_mock_store_client(buffer_size: usize) -> (StoreClient, mpsc::Receiver<StoreRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Helper to verify that the next message is a GetAllProducts request
pub async fn expect_get_all(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<ServiceResponse<Vec<Product>, StoreError>> {
    match receiver.recv().await {
        Some(StoreRequest::GetAllProducts { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is an InsertProduct request
pub async fn expect_insert(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(NewProduct, ServiceResponse<ProductId, StoreError>)> {
    match receiver.recv().await {
        Some(StoreRequest::InsertProduct { product, respond_to }) => Some((product, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a DeleteProduct request
pub async fn expect_delete(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(Product, ServiceResponse<(), StoreError>)> {
    match receiver.recv().await {
        Some(StoreRequest::DeleteProduct { product, respond_to }) => Some((product, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a DeleteAllProducts request
pub async fn expect_delete_all(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<ServiceResponse<(), StoreError>> {
    match receiver.recv().await {
        Some(StoreRequest::DeleteAllProducts { respond_to }) => Some(respond_to),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_store_client() {
        let (client, mut receiver) = create_mock_store_client(10);

        let insert_task = tokio::spawn(async move { client.insert_product(NewProduct::new("Milk", 2)).await });

        let (payload, responder) = expect_insert(&mut receiver).await.expect("Expected Insert request");
        assert_eq!(payload.name, "Milk");
        responder.send(Ok(ProductId(1))).unwrap();

        let result = insert_task.await.unwrap();
        assert_eq!(result, Ok(ProductId(1)));
    }
}
