//! The shopping-list screen: an actor whose run loop is the interaction thread.

mod controller;
mod reload;
mod state;

pub use controller::ShoppingListScreen;
pub use reload::ReloadTracker;
pub use state::{ScreenSnapshot, ScreenState, SwipeDirection};
