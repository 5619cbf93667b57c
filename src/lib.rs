//! # Shopping List
//!
//! A shopping-list screen built as a small actor system: a list of products kept
//! in a local database, with add, swipe-to-delete and delete-all.
//!
//! ## Pieces
//!
//! - **Domain types** - [`domain::Product`], the add-dialog [`domain::ProductForm`]
//! - **Store service** - [`store::StoreService`] owns a [`store::ProductRepository`]
//!   (SQLite or in-memory) and answers on its own task
//! - **Screen** - [`screen::ShoppingListScreen`] is the interaction loop: it owns the
//!   rows on display, runs store calls in the background and reloads after every
//!   mutation, applying only the newest reload
//! - **Adapter** - [`adapter::ShoppingListAdapter`] turns the rows into labels
//! - **System coordinator** - [`app_system::ShoppingListSystem`] wires it together
//!
//! ## Example Usage
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use shopping_list::app_system::ShoppingListSystem;
//! use shopping_list::domain::ProductForm;
//! use shopping_list::store::MemoryRepository;
//!
//! let system = ShoppingListSystem::start(Arc::new(MemoryRepository::new()), 32);
//! system.screen_client.enter().await?;
//! system.screen_client.add_product(ProductForm::new("Milk", "2")).await?;
//! let snapshot = system.screen_client.settled().await?;
//! assert_eq!(snapshot.rows[0].quantity_label, "2X");
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod app_system;
pub mod clients;
pub mod domain;
pub mod error;
pub mod messages;
pub mod screen;
pub mod store;

#[cfg(test)]
mod mock_framework;
