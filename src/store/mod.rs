//! Durable product storage: the repository seam and the store service that
//! runs it off the interaction thread.

mod memory;
mod service;
mod sqlite;

pub use memory::MemoryRepository;
pub use service::StoreService;
pub use sqlite::SqliteRepository;

use async_trait::async_trait;

use crate::domain::{NewProduct, Product, ProductId};
use crate::error::StoreError;

/// Create/read/delete access to the products a shopping list is made of.
///
/// `get_all_products` returns products ordered by id. `delete_product` removes by
/// identity and succeeds when the product is already gone.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn get_all_products(&self) -> Result<Vec<Product>, StoreError>;

    async fn insert_product(&self, product: NewProduct) -> Result<ProductId, StoreError>;

    async fn delete_product(&self, product: &Product) -> Result<(), StoreError>;

    async fn delete_all_products(&self) -> Result<(), StoreError>;
}
