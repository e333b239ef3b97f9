//! Entity models

mod cart;
mod menu;
mod order;
mod table;

pub use cart::{Cart, CartItem, CartItemState};
pub use menu::MenuItem;
pub use order::{Actor, Order, OrderEvent, OrderItem, OrderState};
pub use table::Table;
