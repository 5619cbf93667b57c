//! Thin handles over the actors' request channels.

#[macro_use]
mod macros;

mod screen_client;
mod store_client;

pub use screen_client::ScreenClient;
pub use store_client::StoreClient;
