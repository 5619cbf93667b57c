use tokio::sync::oneshot;

use crate::domain::{NewProduct, Product, ProductForm, ProductId};
use crate::error::{ScreenError, StoreError};
use crate::screen::{ScreenSnapshot, SwipeDirection};

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Typed message enums for actor communication. Each variant includes parameters
/// and a oneshot channel for responses.

#[derive(Debug)]
pub enum StoreRequest {
    GetAllProducts {
        respond_to: ServiceResponse<Vec<Product>, StoreError>,
    },
    InsertProduct {
        product: NewProduct,
        respond_to: ServiceResponse<ProductId, StoreError>,
    },
    DeleteProduct {
        product: Product,
        respond_to: ServiceResponse<(), StoreError>,
    },
    DeleteAllProducts {
        respond_to: ServiceResponse<(), StoreError>,
    },
    Shutdown,
}

#[derive(Debug)]
pub enum ScreenRequest {
    Enter {
        respond_to: ServiceResponse<(), ScreenError>,
    },
    AddProduct {
        form: ProductForm,
        respond_to: ServiceResponse<(), ScreenError>,
    },
    Swipe {
        position: usize,
        direction: SwipeDirection,
        respond_to: ServiceResponse<Option<ProductId>, ScreenError>,
    },
    DeleteAll {
        respond_to: ServiceResponse<(), ScreenError>,
    },
    Snapshot {
        respond_to: ServiceResponse<ScreenSnapshot, ScreenError>,
    },
    Exit,
}
