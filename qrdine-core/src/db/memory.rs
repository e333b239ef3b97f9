//! In-memory reference `Datastore`
//!
//! Single `RwLock` over all record tables: every trait method takes the
//! lock once, so the multi-row operations are trivially atomic. Backs
//! the test suite and single-node embedding.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use shared::models::{
    Cart, CartItem, CartItemState, MenuItem, Order, OrderEvent, OrderItem, OrderState, Table,
};
use std::collections::HashMap;

use super::{Datastore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<i64, Table>,
    table_ids_by_uid: HashMap<String, i64>,
    menu_items: HashMap<String, MenuItem>,
    carts: HashMap<String, Cart>,
    open_cart_by_table: HashMap<i64, String>,
    cart_items: Vec<CartItem>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
    order_events: Vec<OrderEvent>,
    event_seq: u64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn table_by_opaque_uid(&self, opaque_uid: &str) -> StoreResult<Option<Table>> {
        let inner = self.inner.read();
        Ok(inner
            .table_ids_by_uid
            .get(opaque_uid)
            .and_then(|id| inner.tables.get(id))
            .cloned())
    }

    async fn insert_table(&self, table: &Table) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if inner.table_ids_by_uid.contains_key(&table.opaque_uid) {
            return Err(StoreError::Conflict(format!(
                "table opaque_uid {} already exists",
                table.opaque_uid
            )));
        }
        inner
            .table_ids_by_uid
            .insert(table.opaque_uid.clone(), table.id);
        inner.tables.insert(table.id, table.clone());
        Ok(())
    }

    async fn menu_item(&self, item_id: &str) -> StoreResult<Option<MenuItem>> {
        Ok(self.inner.read().menu_items.get(item_id).cloned())
    }

    async fn insert_menu_item(&self, item: &MenuItem) -> StoreResult<()> {
        self.inner
            .write()
            .menu_items
            .insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn open_cart(&self, table_id: i64) -> StoreResult<Option<Cart>> {
        let inner = self.inner.read();
        Ok(inner
            .open_cart_by_table
            .get(&table_id)
            .and_then(|id| inner.carts.get(id))
            .cloned())
    }

    async fn insert_cart(&self, cart: &Cart) -> StoreResult<()> {
        let mut inner = self.inner.write();
        // Uniqueness constraint: one open cart per table.
        if inner.open_cart_by_table.contains_key(&cart.table_id) {
            return Err(StoreError::Conflict(format!(
                "table {} already has an open cart",
                cart.table_id
            )));
        }
        inner
            .open_cart_by_table
            .insert(cart.table_id, cart.id.clone());
        inner.carts.insert(cart.id.clone(), cart.clone());
        Ok(())
    }

    async fn cart_items(&self, cart_id: &str) -> StoreResult<Vec<CartItem>> {
        Ok(self
            .inner
            .read()
            .cart_items
            .iter()
            .filter(|item| item.cart_id == cart_id)
            .cloned()
            .collect())
    }

    async fn insert_cart_item(&self, item: &CartItem) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if !inner.carts.contains_key(&item.cart_id) {
            return Err(StoreError::NotFound(format!("cart {}", item.cart_id)));
        }
        inner.cart_items.push(item.clone());
        Ok(())
    }

    async fn order(&self, order_id: &str) -> StoreResult<Option<Order>> {
        Ok(self
            .inner
            .read()
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .cloned())
    }

    async fn orders_by_state(&self, state: Option<OrderState>) -> StoreResult<Vec<Order>> {
        let inner = self.inner.read();
        let mut orders: Vec<Order> = inner
            .orders
            .iter()
            .filter(|o| state.is_none_or(|s| o.state == s))
            .cloned()
            .collect();
        // Newest first; insertion order already matches creation order,
        // so a stable sort keeps ties deterministic.
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn order_items(&self, order_id: &str) -> StoreResult<Vec<OrderItem>> {
        Ok(self
            .inner
            .read()
            .order_items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn order_events(&self, order_id: &str) -> StoreResult<Vec<OrderEvent>> {
        Ok(self
            .inner
            .read()
            .order_events
            .iter()
            .filter(|e| e.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn create_order(
        &self,
        order: &Order,
        items: &[OrderItem],
        event: &OrderEvent,
        consumed_cart_item_ids: &[String],
    ) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if inner.orders.iter().any(|o| o.id == order.id) {
            return Err(StoreError::Conflict(format!(
                "order {} already exists",
                order.id
            )));
        }

        inner.orders.push(order.clone());
        inner.order_items.extend(items.iter().cloned());

        inner.event_seq += 1;
        let mut event = event.clone();
        event.id = inner.event_seq;
        inner.order_events.push(event);

        let now = Utc::now();
        for cart_item in inner
            .cart_items
            .iter_mut()
            .filter(|i| consumed_cart_item_ids.contains(&i.id))
        {
            cart_item.state = CartItemState::Submitted;
            cart_item.updated_at = now;
        }
        Ok(())
    }

    async fn update_order_state(
        &self,
        order_id: &str,
        new_state: OrderState,
        event: &OrderEvent,
    ) -> StoreResult<Order> {
        let mut inner = self.inner.write();
        inner.event_seq += 1;
        let seq = inner.event_seq;

        let order = inner
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| StoreError::NotFound(format!("order {order_id}")))?;

        // Re-check under the write lock: a concurrent transition may
        // have moved the order since the caller validated.
        if !order.state.can_transition_to(new_state) {
            return Err(StoreError::Conflict(format!(
                "order {} is {} and cannot become {}",
                order_id, order.state, new_state
            )));
        }

        order.state = new_state;
        order.updated_at = Utc::now();
        let updated = order.clone();

        let mut event = event.clone();
        event.id = seq;
        inner.order_events.push(event);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(id: i64, uid: &str) -> Table {
        Table {
            id,
            name: format!("Table {id}"),
            opaque_uid: uid.to_string(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn open_cart_uniqueness_is_enforced() {
        let store = MemoryStore::new();
        store.insert_table(&table(1, "tbl_0000001a")).await.unwrap();

        let first = Cart::new(1);
        store.insert_cart(&first).await.unwrap();

        let second = Cart::new(1);
        assert!(matches!(
            store.insert_cart(&second).await,
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(store.open_cart(1).await.unwrap().unwrap().id, first.id);
    }

    #[tokio::test]
    async fn duplicate_opaque_uid_conflicts() {
        let store = MemoryStore::new();
        store.insert_table(&table(1, "tbl_0000001a")).await.unwrap();
        assert!(matches!(
            store.insert_table(&table(2, "tbl_0000001a")).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn event_sequence_is_monotonic() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let mk_order = |id: &str| Order {
            id: id.to_string(),
            table_id: 1,
            state: OrderState::Submitted,
            subtotal: Default::default(),
            tax: Default::default(),
            total: Default::default(),
            created_at: now,
            updated_at: now,
        };
        let event = |order_id: &str, action: &str| OrderEvent {
            id: 0,
            order_id: order_id.to_string(),
            order_item_id: None,
            actor: shared::models::Actor::Staff {
                user_id: "u1".into(),
            },
            action: action.to_string(),
            reason: None,
            created_at: now,
        };

        store
            .create_order(&mk_order("o1"), &[], &event("o1", "submitted"), &[])
            .await
            .unwrap();
        store
            .update_order_state("o1", OrderState::Accepted, &event("o1", "accepted"))
            .await
            .unwrap();

        let events = store.order_events("o1").await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].id < events[1].id);
    }
}
