//! Projection of the backing sequence into renderable rows.

use std::sync::Arc;

use crate::domain::Product;

/// One rendered list entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub name_label: String,
    pub quantity_label: String,
}

/// Quantity label shown next to a product name, e.g. `3X`.
pub fn quantity_label(quantity: u32) -> String {
    format!("{quantity}X")
}

/// Renders whatever sequence it was last given. Holds no authoritative state.
#[derive(Debug, Clone)]
pub struct ShoppingListAdapter {
    products: Arc<[Product]>,
    generation: u64,
}

impl Default for ShoppingListAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ShoppingListAdapter {
    pub fn new() -> Self {
        Self {
            products: Arc::from(Vec::new()),
            generation: 0,
        }
    }

    /// Replaces the rendered sequence wholesale and marks every row dirty.
    pub fn submit(&mut self, products: Arc<[Product]>) {
        self.products = products;
        self.generation += 1;
    }

    /// Number of full re-renders requested so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn row_count(&self) -> usize {
        self.products.len()
    }

    pub fn product_at(&self, position: usize) -> Option<&Product> {
        self.products.get(position)
    }

    /// Builds a blank row from the fixed row template.
    pub fn create_row(&self) -> Row {
        Row::default()
    }

    pub fn bind(&self, row: &mut Row, product: &Product) {
        row.name_label.clone_from(&product.name);
        row.quantity_label = quantity_label(product.quantity);
    }

    /// Binds the product at `position`; returns false past the end of the list.
    pub fn bind_position(&self, row: &mut Row, position: usize) -> bool {
        match self.product_at(position) {
            Some(product) => {
                self.bind(row, product);
                true
            }
            None => false,
        }
    }

    pub fn render(&self) -> Vec<Row> {
        self.products
            .iter()
            .map(|product| {
                let mut row = self.create_row();
                self.bind(&mut row, product);
                row
            })
            .collect()
    }
}
