//! Storage collaborator traits
//!
//! The engine consumes durable storage through [`Datastore`]; it never
//! implements query execution itself. Implementations must honor the
//! atomicity notes on each method — submission and staff transitions
//! are multi-row writes that commit or fail as a unit, and the fanout
//! only fires after a successful commit.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use shared::models::{Cart, CartItem, MenuItem, Order, OrderEvent, OrderItem, OrderState, Table};

/// Storage-layer error. Converted into the engine's `AppError` at the
/// call sites.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable record storage consumed by the engine.
#[async_trait]
pub trait Datastore: Send + Sync {
    // ── Tables ──────────────────────────────────────────────────────

    async fn table_by_opaque_uid(&self, opaque_uid: &str) -> StoreResult<Option<Table>>;

    /// Provision a table. `opaque_uid` is unique; a duplicate is a
    /// `Conflict`.
    async fn insert_table(&self, table: &Table) -> StoreResult<()>;

    // ── Catalog ─────────────────────────────────────────────────────

    async fn menu_item(&self, item_id: &str) -> StoreResult<Option<MenuItem>>;

    async fn insert_menu_item(&self, item: &MenuItem) -> StoreResult<()>;

    // ── Carts ───────────────────────────────────────────────────────

    /// The authoritative open cart for a table (the most recently
    /// created one), if any.
    async fn open_cart(&self, table_id: i64) -> StoreResult<Option<Cart>>;

    /// Create a table's open cart. At most one open cart per table is a
    /// storage-level uniqueness constraint: losing a concurrent
    /// first-access race yields `Conflict`, and the caller re-fetches.
    async fn insert_cart(&self, cart: &Cart) -> StoreResult<()>;

    /// All items in a cart, any state, in insertion order.
    async fn cart_items(&self, cart_id: &str) -> StoreResult<Vec<CartItem>>;

    async fn insert_cart_item(&self, item: &CartItem) -> StoreResult<()>;

    // ── Orders ──────────────────────────────────────────────────────

    async fn order(&self, order_id: &str) -> StoreResult<Option<Order>>;

    /// Orders for the staff listing, optionally filtered by state,
    /// newest first.
    async fn orders_by_state(&self, state: Option<OrderState>) -> StoreResult<Vec<Order>>;

    async fn order_items(&self, order_id: &str) -> StoreResult<Vec<OrderItem>>;

    /// Append-only audit trail for one order, in append order.
    async fn order_events(&self, order_id: &str) -> StoreResult<Vec<OrderEvent>>;

    /// Create an order with its item snapshots and its first audit
    /// event, and move the consumed cart items to `Submitted` — all in
    /// one atomic write. If any part fails, none is observed.
    async fn create_order(
        &self,
        order: &Order,
        items: &[OrderItem],
        event: &OrderEvent,
        consumed_cart_item_ids: &[String],
    ) -> StoreResult<()>;

    /// Atomically move an order to `new_state` and append the audit
    /// event. Implementations re-check the transition against the
    /// current state inside the same atomic scope and answer `Conflict`
    /// if a concurrent transition got there first. Returns the updated
    /// order.
    async fn update_order_state(
        &self,
        order_id: &str,
        new_state: OrderState,
        event: &OrderEvent,
    ) -> StoreResult<Order>;
}
