use std::{error::Error, fmt::Debug};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{domain::OrderStatus, models::{CartItem, MenuItem, Order, OrderItemModel}, utils::error_fmt_chain};

mod memory;
mod postgres;

pub use memory::{FaultPoint, InMemoryGateway};
pub use postgres::PgStoreGateway;

// Error surfaced by any gateway operation. Every operation is a remote call
// that may fail on its own; callers decide whether to compensate or retry.
#[derive(Error)]
pub enum GatewayError{
    #[error("Menu item {0} does not exist")]
    NotFound(Uuid),
    #[error("Data store operation failed")]
    Unavailable(#[source] anyhow::Error)
}

impl Debug for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

// An order header joined with its line items
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItemModel>,
}

/// Request/response surface of the hosted data store.
///
/// No multi-operation transaction primitive is assumed: each method is an
/// independent unit of work, and multi-step state changes (checkout) are the
/// caller's job to compensate. The only sanctioned write paths for
/// `MenuItem::quantity_available` are [`conditional_decrement_stock`] and its
/// inverse [`restock`].
///
/// [`conditional_decrement_stock`]: StoreGateway::conditional_decrement_stock
/// [`restock`]: StoreGateway::restock
#[async_trait]
pub trait StoreGateway: Send + Sync {
    async fn read_menu_item(&self, id: Uuid) -> Result<MenuItem, GatewayError>;

    async fn list_menu_items(&self, page: i64, limit: i64) -> Result<Vec<MenuItem>, GatewayError>;

    async fn insert_menu_item(&self, item: MenuItem) -> Result<(), GatewayError>;

    /// Atomic compare-and-decrement: applies only while the current
    /// availability is still >= `amount`. Returns false when the guard fails,
    /// i.e. another checkout won the race.
    async fn conditional_decrement_stock(&self, id: Uuid, amount: i32) -> Result<bool, GatewayError>;

    /// Inverse of a reservation made through `conditional_decrement_stock`.
    /// Used only for compensation; never a general stock write.
    async fn restock(&self, id: Uuid, amount: i32) -> Result<(), GatewayError>;

    async fn insert_order(&self, order: Order) -> Result<(), GatewayError>;

    async fn insert_order_items(&self, items: Vec<OrderItemModel>) -> Result<(), GatewayError>;

    /// Removes an order header and any of its line items. Compensation path
    /// for a checkout that failed after the header was written.
    async fn delete_order(&self, order_id: Uuid) -> Result<(), GatewayError>;

    /// Lists orders with their line items, newest first. Staff see every
    /// user's orders (they manage fulfillment); students only their own.
    async fn orders_for_user(&self, user_id: Uuid, is_staff: bool, page: i64, limit: i64) -> Result<Vec<OrderWithItems>, GatewayError>;

    /// Conditional status update: applies only while the current status is an
    /// allowed predecessor of `target`, so transitions stay monotonic even
    /// under concurrent staff updates. Returns false if nothing matched.
    async fn advance_order_status(&self, order_id: Uuid, target: OrderStatus) -> Result<bool, GatewayError>;

    async fn cart_items_for_user(&self, user_id: Uuid) -> Result<Vec<CartItem>, GatewayError>;

    /// Upsert: an existing (user, item) line has its quantity incremented
    /// rather than a duplicate row created.
    async fn add_cart_line(&self, user_id: Uuid, menu_item_id: Uuid) -> Result<(), GatewayError>;

    /// Sets the quantity of a cart line; a quantity <= 0 deletes the line.
    async fn set_cart_quantity(&self, user_id: Uuid, menu_item_id: Uuid, quantity: i32) -> Result<(), GatewayError>;

    async fn delete_cart_items_for_user(&self, user_id: Uuid) -> Result<usize, GatewayError>;
}
