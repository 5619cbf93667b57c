use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::ProductRepository;
use crate::domain::{NewProduct, Product, ProductId};
use crate::error::StoreError;

struct MemoryState {
    products: BTreeMap<ProductId, Product>,
    next_id: i64,
}

/// Repository that keeps products in process memory.
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                products: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> Result<T, StoreError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| StoreError::Database("memory store lock poisoned".to_string()))?;
        Ok(f(&mut state))
    }
}

#[async_trait]
impl ProductRepository for MemoryRepository {
    async fn get_all_products(&self) -> Result<Vec<Product>, StoreError> {
        self.with_state(|state| state.products.values().cloned().collect())
    }

    async fn insert_product(&self, product: NewProduct) -> Result<ProductId, StoreError> {
        product.validate()?;
        self.with_state(|state| {
            let id = ProductId(state.next_id);
            state.next_id += 1;
            state.products.insert(id, product.into_product(id));
            id
        })
    }

    async fn delete_product(&self, product: &Product) -> Result<(), StoreError> {
        self.with_state(|state| {
            state.products.remove(&product.id);
        })
    }

    async fn delete_all_products(&self) -> Result<(), StoreError> {
        self.with_state(|state| state.products.clear())
    }
}
