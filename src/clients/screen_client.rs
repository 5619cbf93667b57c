use tokio::sync::{mpsc, watch};
use tracing::{debug, instrument};

use crate::domain::{ProductForm, ProductId};
use crate::error::ScreenError;
use crate::messages::ScreenRequest;
use crate::screen::{ScreenSnapshot, SwipeDirection};

/// Handle to the shopping-list screen. Requests are answered once the screen has
/// accepted them; the resulting store work finishes in the background and shows
/// up in the published snapshots.
#[derive(Clone)]
pub struct ScreenClient {
    sender: mpsc::Sender<ScreenRequest>,
    snapshots: watch::Receiver<ScreenSnapshot>,
}

impl ScreenClient {
    pub fn new(sender: mpsc::Sender<ScreenRequest>, snapshots: watch::Receiver<ScreenSnapshot>) -> Self {
        Self { sender, snapshots }
    }

    /// Waits until no store work is in flight and returns the snapshot at that point.
    #[instrument(skip(self))]
    pub async fn settled(&self) -> Result<ScreenSnapshot, ScreenError> {
        let mut snapshots = self.snapshots.clone();
        let snapshot = snapshots
            .wait_for(|snapshot| !snapshot.state.is_busy())
            .await
            .map_err(|e| ScreenError::ActorCommunicationError(e.to_string()))?;
        Ok(snapshot.clone())
    }

    /// Tears the screen down. In-flight results are discarded.
    #[instrument(skip(self))]
    pub async fn exit(&self) -> Result<(), ScreenError> {
        debug!("Sending exit request");
        self.sender
            .send(ScreenRequest::Exit)
            .await
            .map_err(|e| ScreenError::ActorCommunicationError(e.to_string()))
    }
}

client_method!(ScreenClient => fn enter() -> () as ScreenRequest::Enter, Error = ScreenError);
client_method!(ScreenClient => fn add_product(form: ProductForm) -> () as ScreenRequest::AddProduct, Error = ScreenError);
client_method!(ScreenClient => fn swipe(position: usize, direction: SwipeDirection) -> Option<ProductId> as ScreenRequest::Swipe, Error = ScreenError);
client_method!(ScreenClient => fn delete_all() -> () as ScreenRequest::DeleteAll, Error = ScreenError);
client_method!(ScreenClient => fn snapshot() -> ScreenSnapshot as ScreenRequest::Snapshot, Error = ScreenError);
