use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, debug_span, error, info, instrument, warn, Instrument};

use super::reload::ReloadTracker;
use super::state::{ScreenSnapshot, ScreenState, SwipeDirection};
use crate::adapter::ShoppingListAdapter;
use crate::clients::{ScreenClient, StoreClient};
use crate::domain::{NewProduct, Product, ProductForm, ProductId};
use crate::error::{ScreenError, StoreError};
use crate::messages::{ScreenRequest, ServiceResponse};

#[derive(Debug)]
enum Mutation {
    Add(NewProduct),
    Delete(Product),
    DeleteAll,
}

impl Mutation {
    fn kind(&self) -> &'static str {
        match self {
            Mutation::Add(_) => "add",
            Mutation::Delete(_) => "delete",
            Mutation::DeleteAll => "delete_all",
        }
    }
}

/// Screen controller. Its run loop is the only place the backing sequence and
/// the adapter are touched; store calls run as background tasks whose results
/// come back through the same loop.
///
/// Mutations reach the store one at a time, in the order they were accepted.
/// Reloads run alongside them and are told apart by ticket.
pub struct ShoppingListScreen {
    receiver: mpsc::Receiver<ScreenRequest>,
    store: StoreClient,
    /// Backing sequence, replaced wholesale on every applied reload.
    products: Arc<[Product]>,
    adapter: ShoppingListAdapter,
    reloads: ReloadTracker,
    queued_mutations: VecDeque<Mutation>,
    /// Kind of the mutation currently at the store, if any.
    in_flight: Option<&'static str>,
    entered: bool,
    loaded: bool,
    notice: Option<String>,
    /// Holds at most one task.
    mutation_task: JoinSet<Result<(), StoreError>>,
    reload_tasks: JoinSet<(u64, Result<Vec<Product>, StoreError>)>,
    snapshots: watch::Sender<ScreenSnapshot>,
}

impl ShoppingListScreen {
    pub fn new(buffer_size: usize, store: StoreClient) -> (Self, ScreenClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (snapshots, snapshot_rx) = watch::channel(ScreenSnapshot::default());
        let screen = Self {
            receiver,
            store,
            products: Arc::from(Vec::new()),
            adapter: ShoppingListAdapter::new(),
            reloads: ReloadTracker::default(),
            queued_mutations: VecDeque::new(),
            in_flight: None,
            entered: false,
            loaded: false,
            notice: None,
            mutation_task: JoinSet::new(),
            reload_tasks: JoinSet::new(),
            snapshots,
        };
        let client = ScreenClient::new(sender, snapshot_rx);
        (screen, client)
    }

    /// Main loop: serves requests and task completions until exit.
    ///
    /// Store work still running at exit is aborted on our side; whatever the
    /// store service already received still completes there. Queued mutations
    /// that never reached the store are dropped.
    #[instrument(name = "shopping_list_screen", skip(self))]
    pub async fn run(mut self) {
        info!("ShoppingListScreen starting");

        loop {
            tokio::select! {
                msg = self.receiver.recv() => {
                    let Some(msg) = msg else {
                        info!("All screen clients dropped");
                        break;
                    };
                    if self.handle_request(msg).is_break() {
                        break;
                    }
                }
                Some(joined) = self.mutation_task.join_next(), if !self.mutation_task.is_empty() => {
                    self.handle_mutated(joined);
                }
                Some(joined) = self.reload_tasks.join_next(), if !self.reload_tasks.is_empty() => {
                    self.handle_reloaded(joined);
                }
            }
        }

        let discarded = self.mutation_task.len() + self.reload_tasks.len();
        let dropped = self.queued_mutations.len();
        self.mutation_task.shutdown().await;
        self.reload_tasks.shutdown().await;
        info!(discarded, dropped, "ShoppingListScreen stopped");
    }

    /// Any request retires the current notice; it was shown with the snapshot
    /// that carried it. A snapshot read returns it one last time.
    fn handle_request(&mut self, msg: ScreenRequest) -> ControlFlow<()> {
        if let ScreenRequest::Snapshot { respond_to } = msg {
            let _ = respond_to.send(Ok(self.snapshot()));
            self.retire_notice();
            return ControlFlow::Continue(());
        }
        self.retire_notice();

        match msg {
            ScreenRequest::Enter { respond_to } => self.handle_enter(respond_to),
            ScreenRequest::AddProduct { form, respond_to } => self.handle_add_product(form, respond_to),
            ScreenRequest::Swipe {
                position,
                direction,
                respond_to,
            } => self.handle_swipe(position, direction, respond_to),
            ScreenRequest::DeleteAll { respond_to } => self.handle_delete_all(respond_to),
            ScreenRequest::Snapshot { .. } => {}
            ScreenRequest::Exit => {
                info!("ShoppingListScreen exiting");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn retire_notice(&mut self) {
        if self.notice.take().is_some() {
            self.publish();
        }
    }

    #[instrument(skip(self, respond_to))]
    fn handle_enter(&mut self, respond_to: ServiceResponse<(), ScreenError>) {
        if self.entered {
            debug!("Screen already entered");
        } else {
            info!("Entering shopping list screen");
            self.entered = true;
            self.reload();
            self.publish();
        }
        let _ = respond_to.send(Ok(()));
    }

    #[instrument(skip(self, form, respond_to))]
    fn handle_add_product(&mut self, form: ProductForm, respond_to: ServiceResponse<(), ScreenError>) {
        if !self.entered {
            let _ = respond_to.send(Err(ScreenError::NotEntered));
            return;
        }

        let product = match form.parse() {
            Ok(product) => product,
            Err(e) => {
                warn!(notice = %e, "Add form rejected");
                self.notice = Some(e.to_string());
                self.publish();
                let _ = respond_to.send(Err(e.into()));
                return;
            }
        };

        debug!(product_name = %product.name, quantity = product.quantity, "Adding product");
        self.mutate(Mutation::Add(product));
        self.publish();
        let _ = respond_to.send(Ok(()));
    }

    /// Resolves the swiped row to a product id against the rows as they are now,
    /// then deletes by identity. A row that vanished in the meantime turns into
    /// an idempotent no-op at the store.
    #[instrument(skip(self, respond_to))]
    fn handle_swipe(
        &mut self,
        position: usize,
        direction: SwipeDirection,
        respond_to: ServiceResponse<Option<ProductId>, ScreenError>,
    ) {
        if !self.entered {
            let _ = respond_to.send(Err(ScreenError::NotEntered));
            return;
        }
        if direction != SwipeDirection::Left {
            debug!("Ignoring swipe direction");
            let _ = respond_to.send(Ok(None));
            return;
        }

        let Some(product) = self.products.get(position).cloned() else {
            warn!(row_count = self.products.len(), "Swipe on a row that does not exist");
            let _ = respond_to.send(Err(ScreenError::NoSuchRow {
                position,
                row_count: self.products.len(),
            }));
            return;
        };

        let id = product.id;
        info!(product_id = %id, "Deleting swiped product");
        self.mutate(Mutation::Delete(product));
        self.publish();
        let _ = respond_to.send(Ok(Some(id)));
    }

    #[instrument(skip(self, respond_to))]
    fn handle_delete_all(&mut self, respond_to: ServiceResponse<(), ScreenError>) {
        if !self.entered {
            let _ = respond_to.send(Err(ScreenError::NotEntered));
            return;
        }

        info!(row_count = self.products.len(), "Deleting all products");
        self.mutate(Mutation::DeleteAll);
        self.publish();
        let _ = respond_to.send(Ok(()));
    }

    fn handle_mutated(&mut self, joined: Result<Result<(), StoreError>, JoinError>) {
        let kind = self.in_flight.take().unwrap_or("unknown");
        match joined {
            Ok(Ok(())) => {
                debug!(kind, "Mutation finished");
                self.reload();
            }
            Ok(Err(e)) => error!(kind, error = %e, "Mutation failed; keeping current rows"),
            Err(e) => error!(kind, error = %e, "Mutation task failed to complete"),
        }
        self.start_next_mutation();
        self.publish();
    }

    fn handle_reloaded(&mut self, joined: Result<(u64, Result<Vec<Product>, StoreError>), JoinError>) {
        let (ticket, result) = match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Reload task failed to complete");
                // Tickets are issued in order, so an empty set means the latest one is done too.
                if self.reload_tasks.is_empty() {
                    self.reloads.settle(self.reloads.latest());
                    self.publish();
                }
                return;
            }
        };

        if !self.reloads.is_latest(ticket) {
            debug!(ticket, latest = self.reloads.latest(), "Discarding stale reload");
            return;
        }
        self.reloads.settle(ticket);

        match result {
            Ok(products) => {
                self.products = products.into();
                self.adapter.submit(Arc::clone(&self.products));
                self.loaded = true;
                info!(ticket, row_count = self.adapter.row_count(), "Shopping list reloaded");
            }
            Err(e) => error!(ticket, error = %e, "Reload failed; keeping current rows"),
        }
        self.publish();
    }

    fn mutate(&mut self, mutation: Mutation) {
        self.queued_mutations.push_back(mutation);
        self.start_next_mutation();
    }

    fn start_next_mutation(&mut self) {
        if self.in_flight.is_some() {
            return;
        }
        let Some(mutation) = self.queued_mutations.pop_front() else {
            return;
        };

        let kind = mutation.kind();
        self.in_flight = Some(kind);
        let store = self.store.clone();
        self.mutation_task.spawn(
            async move {
                match mutation {
                    Mutation::Add(product) => store.insert_product(product).await.map(|_| ()),
                    Mutation::Delete(product) => store.delete_product(product).await,
                    Mutation::DeleteAll => store.delete_all_products().await,
                }
            }
            .instrument(debug_span!("store_mutation", kind)),
        );
    }

    fn reload(&mut self) {
        let ticket = self.reloads.issue();
        let store = self.store.clone();
        debug!(ticket, "Issuing reload");
        self.reload_tasks.spawn(
            async move { (ticket, store.get_all_products().await) }
                .instrument(debug_span!("store_reload", ticket)),
        );
    }

    fn state(&self) -> ScreenState {
        if self.in_flight.is_some() || !self.queued_mutations.is_empty() {
            ScreenState::Mutating
        } else if self.reloads.pending() {
            ScreenState::Loading
        } else if self.loaded {
            ScreenState::Loaded
        } else {
            ScreenState::Idle
        }
    }

    fn snapshot(&self) -> ScreenSnapshot {
        ScreenSnapshot {
            state: self.state(),
            rows: self.adapter.render(),
            notice: self.notice.clone(),
            generation: self.adapter.generation(),
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::task::JoinHandle;

    use super::*;
    use crate::adapter::Row;
    use crate::error::ValidationError;
    use crate::messages::StoreRequest;
    use crate::mock_framework::{
        create_mock_store_client, expect_delete, expect_delete_all, expect_get_all, expect_insert,
    };

    fn start_screen() -> (ScreenClient, mpsc::Receiver<StoreRequest>, JoinHandle<()>) {
        let (store, store_rx) = create_mock_store_client(10);
        let (screen, client) = ShoppingListScreen::new(10, store);
        let handle = tokio::spawn(screen.run());
        (client, store_rx, handle)
    }

    fn row(name: &str, quantity: &str) -> Row {
        Row {
            name_label: name.to_string(),
            quantity_label: quantity.to_string(),
        }
    }

    async fn entered_with(products: Vec<Product>) -> (ScreenClient, mpsc::Receiver<StoreRequest>, JoinHandle<()>) {
        let (client, mut store_rx, handle) = start_screen();
        client.enter().await.unwrap();
        let responder = expect_get_all(&mut store_rx).await.expect("Expected initial load");
        responder.send(Ok(products)).unwrap();
        let snapshot = client.settled().await.unwrap();
        assert_eq!(snapshot.state, ScreenState::Loaded);
        (client, store_rx, handle)
    }

    #[tokio::test]
    async fn enter_loads_rows_from_the_store() {
        let (client, mut store_rx, _handle) = start_screen();
        assert_eq!(client.snapshot().await.unwrap().state, ScreenState::Idle);

        client.enter().await.unwrap();
        assert_eq!(client.snapshot().await.unwrap().state, ScreenState::Loading);

        let responder = expect_get_all(&mut store_rx).await.expect("Expected GetAll");
        responder
            .send(Ok(vec![Product::new(ProductId(1), "Milk", 2)]))
            .unwrap();

        let snapshot = client.settled().await.unwrap();
        assert_eq!(snapshot.state, ScreenState::Loaded);
        assert_eq!(snapshot.rows, vec![row("Milk", "2X")]);
        assert_eq!(snapshot.generation, 1);
    }

    #[tokio::test]
    async fn entering_twice_loads_once() {
        let (client, mut store_rx, _handle) = entered_with(vec![]).await;
        client.enter().await.unwrap();
        assert!(store_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn stale_reload_is_discarded() {
        let (client, mut store_rx, _handle) = start_screen();
        client.enter().await.unwrap();
        let first = expect_get_all(&mut store_rx).await.expect("Expected first GetAll");

        client.delete_all().await.unwrap();
        let deleted = expect_delete_all(&mut store_rx).await.expect("Expected DeleteAll");
        deleted.send(Ok(())).unwrap();
        let second = expect_get_all(&mut store_rx).await.expect("Expected second GetAll");

        second.send(Ok(vec![])).unwrap();
        let snapshot = client.settled().await.unwrap();
        assert_eq!(snapshot.state, ScreenState::Loaded);
        assert!(snapshot.rows.is_empty());

        // The older reload resolves last and must not overwrite the newer one.
        first
            .send(Ok(vec![Product::new(ProductId(1), "Milk", 2)]))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let snapshot = client.snapshot().await.unwrap();
        assert!(snapshot.rows.is_empty());
        assert_eq!(snapshot.generation, 1);
    }

    #[tokio::test]
    async fn blank_form_shows_notice_without_store_call() {
        let (client, mut store_rx, _handle) = entered_with(vec![]).await;

        let err = client.add_product(ProductForm::new("Milk", " ")).await.unwrap_err();
        assert_eq!(err, ScreenError::Validation(ValidationError::BlankFields));

        let snapshot = client.snapshot().await.unwrap();
        assert_eq!(snapshot.notice.as_deref(), Some("Please fill in the fields"));
        assert_eq!(snapshot.state, ScreenState::Loaded);
        assert!(store_rx.try_recv().is_err());

        // Shown once; the next read no longer carries it.
        assert_eq!(client.snapshot().await.unwrap().notice, None);
    }

    #[tokio::test]
    async fn notice_clears_on_the_next_action() {
        let (client, mut store_rx, _handle) =
            entered_with(vec![Product::new(ProductId(1), "Milk", 2)]).await;

        client.add_product(ProductForm::new("", "")).await.unwrap_err();
        let err = client.swipe(5, SwipeDirection::Left).await.unwrap_err();
        assert_eq!(err, ScreenError::NoSuchRow { position: 5, row_count: 1 });

        let snapshot = client.settled().await.unwrap();
        assert_eq!(snapshot.notice, None);
        assert_eq!(snapshot.rows, vec![row("Milk", "2X")]);
        assert!(store_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn mutations_reach_the_store_in_order() {
        let (client, mut store_rx, _handle) = entered_with(vec![]).await;

        client.add_product(ProductForm::new("Milk", "2")).await.unwrap();
        client.delete_all().await.unwrap();

        let (payload, responder) = expect_insert(&mut store_rx).await.expect("Expected Insert");
        assert_eq!(payload.name, "Milk");
        // The delete-all waits for the insert to finish.
        assert!(store_rx.try_recv().is_err());
        assert_eq!(client.snapshot().await.unwrap().state, ScreenState::Mutating);
        responder.send(Ok(ProductId(1))).unwrap();

        // The reload for the insert and the queued delete-all go out together.
        let mut reload = None;
        let mut cleared = None;
        for _ in 0..2 {
            match store_rx.recv().await {
                Some(StoreRequest::GetAllProducts { respond_to }) => reload = Some(respond_to),
                Some(StoreRequest::DeleteAllProducts { respond_to }) => cleared = Some(respond_to),
                other => panic!("Unexpected store request: {other:?}"),
            }
        }
        cleared.expect("Expected DeleteAll").send(Ok(())).unwrap();
        let latest = expect_get_all(&mut store_rx).await.expect("Expected reload after DeleteAll");

        reload
            .expect("Expected reload after Insert")
            .send(Ok(vec![Product::new(ProductId(1), "Milk", 2)]))
            .unwrap();
        latest.send(Ok(vec![])).unwrap();

        let snapshot = client.settled().await.unwrap();
        assert_eq!(snapshot.state, ScreenState::Loaded);
        assert!(snapshot.rows.is_empty());
    }

    #[tokio::test]
    async fn failed_mutation_still_releases_the_queue() {
        let (client, mut store_rx, _handle) = entered_with(vec![]).await;

        client.add_product(ProductForm::new("Milk", "2")).await.unwrap();
        client.delete_all().await.unwrap();

        // Dropping the responder fails the insert without an answer.
        let (_, responder) = expect_insert(&mut store_rx).await.expect("Expected Insert");
        drop(responder);

        let responder = expect_delete_all(&mut store_rx).await.expect("Expected DeleteAll");
        responder.send(Ok(())).unwrap();
        let responder = expect_get_all(&mut store_rx).await.expect("Expected reload");
        responder.send(Ok(vec![])).unwrap();

        let snapshot = client.settled().await.unwrap();
        assert_eq!(snapshot.state, ScreenState::Loaded);
        assert!(store_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn non_positive_quantity_never_reaches_the_store() {
        let (client, mut store_rx, _handle) = entered_with(vec![]).await;

        for quantity in ["0", "-2"] {
            let err = client
                .add_product(ProductForm::new("Milk", quantity))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ScreenError::Validation(ValidationError::NonPositiveQuantity(_))
            ));
        }
        assert!(store_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn add_inserts_then_reloads() {
        let (client, mut store_rx, _handle) = entered_with(vec![]).await;

        client.add_product(ProductForm::new("Milk", "2")).await.unwrap();
        assert_eq!(client.snapshot().await.unwrap().state, ScreenState::Mutating);

        let (payload, responder) = expect_insert(&mut store_rx).await.expect("Expected Insert");
        assert_eq!(payload, NewProduct::new("Milk", 2));
        responder.send(Ok(ProductId(1))).unwrap();

        let responder = expect_get_all(&mut store_rx).await.expect("Expected reload");
        responder
            .send(Ok(vec![Product::new(ProductId(1), "Milk", 2)]))
            .unwrap();

        let snapshot = client.settled().await.unwrap();
        assert_eq!(snapshot.rows, vec![row("Milk", "2X")]);
        assert_eq!(snapshot.notice, None);
    }

    #[tokio::test]
    async fn swipe_deletes_by_identity() {
        let (client, mut store_rx, _handle) = entered_with(vec![
            Product::new(ProductId(4), "Milk", 2),
            Product::new(ProductId(9), "Bread", 1),
        ])
        .await;

        let target = client.swipe(1, SwipeDirection::Left).await.unwrap();
        assert_eq!(target, Some(ProductId(9)));

        let (product, responder) = expect_delete(&mut store_rx).await.expect("Expected Delete");
        assert_eq!(product.id, ProductId(9));
        responder.send(Ok(())).unwrap();

        let responder = expect_get_all(&mut store_rx).await.expect("Expected reload");
        responder
            .send(Ok(vec![Product::new(ProductId(4), "Milk", 2)]))
            .unwrap();
        assert_eq!(client.settled().await.unwrap().rows, vec![row("Milk", "2X")]);
    }

    #[tokio::test]
    async fn swipe_outside_rows_or_to_the_right_does_nothing() {
        let (client, mut store_rx, _handle) =
            entered_with(vec![Product::new(ProductId(1), "Milk", 2)]).await;

        let err = client.swipe(3, SwipeDirection::Left).await.unwrap_err();
        assert_eq!(err, ScreenError::NoSuchRow { position: 3, row_count: 1 });

        assert_eq!(client.swipe(0, SwipeDirection::Right).await.unwrap(), None);
        assert!(store_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_reload_keeps_last_good_rows() {
        let (client, mut store_rx, _handle) =
            entered_with(vec![Product::new(ProductId(1), "Milk", 2)]).await;

        client.delete_all().await.unwrap();
        let responder = expect_delete_all(&mut store_rx).await.expect("Expected DeleteAll");
        responder.send(Ok(())).unwrap();

        let responder = expect_get_all(&mut store_rx).await.expect("Expected reload");
        responder
            .send(Err(StoreError::Database("disk unavailable".to_string())))
            .unwrap();

        let snapshot = client.settled().await.unwrap();
        assert_eq!(snapshot.state, ScreenState::Loaded);
        assert_eq!(snapshot.rows, vec![row("Milk", "2X")]);
    }

    #[tokio::test]
    async fn failed_mutation_skips_the_reload() {
        let (client, mut store_rx, _handle) = entered_with(vec![]).await;

        client.add_product(ProductForm::new("Milk", "2")).await.unwrap();
        let (_, responder) = expect_insert(&mut store_rx).await.expect("Expected Insert");
        responder
            .send(Err(StoreError::Database("read-only".to_string())))
            .unwrap();

        let snapshot = client.settled().await.unwrap();
        assert_eq!(snapshot.state, ScreenState::Loaded);
        assert!(store_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn mutations_before_enter_are_rejected() {
        let (client, mut store_rx, _handle) = start_screen();

        assert_eq!(client.delete_all().await.unwrap_err(), ScreenError::NotEntered);
        assert_eq!(
            client.add_product(ProductForm::new("Milk", "2")).await.unwrap_err(),
            ScreenError::NotEntered
        );
        assert!(store_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn exit_discards_in_flight_results() {
        let (client, mut store_rx, handle) = start_screen();
        client.enter().await.unwrap();
        let pending = expect_get_all(&mut store_rx).await.expect("Expected GetAll");

        client.exit().await.unwrap();
        handle.await.unwrap();

        // Nobody is waiting for the answer any more.
        assert!(pending.send(Ok(vec![])).is_err());
        assert!(matches!(
            client.snapshot().await.unwrap_err(),
            ScreenError::ActorCommunicationError(_)
        ));
    }
}
