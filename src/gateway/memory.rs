use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    domain::OrderStatus,
    models::{CartItem, MenuItem, Order, OrderItemModel},
};

use super::{GatewayError, OrderWithItems, StoreGateway};

// Operations a test can make fail on their next invocation
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FaultPoint {
    ReadMenuItem,
    ListMenu,
    InsertMenuItem,
    DecrementStock,
    Restock,
    InsertOrder,
    InsertOrderItems,
    DeleteOrder,
    ListOrders,
    AdvanceStatus,
    ReadCart,
    WriteCart,
    ClearCart,
}

#[derive(Default)]
struct State {
    menu: HashMap<Uuid, MenuItem>,
    cart: Vec<CartItem>,
    orders: Vec<Order>,
    order_items: Vec<OrderItemModel>,
}

/// Mutex-guarded in-memory rendition of the hosted store.
///
/// Conditional decrements are atomic under the lock, which is exactly the
/// guarantee the remote store advertises for its compare-and-decrement. Faults
/// queued with [`fail_next`] make the matching operation fail once, so
/// compensation and retry paths can be exercised without a network.
///
/// [`fail_next`]: InMemoryGateway::fail_next
#[derive(Default)]
pub struct InMemoryGateway {
    state: Mutex<State>,
    faults: Mutex<Vec<FaultPoint>>,
    remote_calls: AtomicUsize,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_menu_item(&self, item: MenuItem) {
        self.state.lock().unwrap().menu.insert(item.id, item);
    }

    pub fn seed_cart_line(&self, line: CartItem) {
        self.state.lock().unwrap().cart.push(line);
    }

    // Queue a one-shot failure for the given operation
    pub fn fail_next(&self, point: FaultPoint) {
        self.faults.lock().unwrap().push(point);
    }

    pub fn remote_calls(&self) -> usize {
        self.remote_calls.load(Ordering::SeqCst)
    }

    pub fn menu_item(&self, id: Uuid) -> Option<MenuItem> {
        self.state.lock().unwrap().menu.get(&id).cloned()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.state.lock().unwrap().orders.clone()
    }

    pub fn order_items(&self) -> Vec<OrderItemModel> {
        self.state.lock().unwrap().order_items.clone()
    }

    pub fn cart_lines(&self, user_id: Uuid) -> Vec<CartItem> {
        self.state
            .lock()
            .unwrap()
            .cart
            .iter()
            .filter(|line| line.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn set_menu_price(&self, id: Uuid, price: f64) {
        if let Some(item) = self.state.lock().unwrap().menu.get_mut(&id) {
            item.price = price;
        }
    }

    fn begin_call(&self, point: FaultPoint) -> Result<(), GatewayError> {
        self.remote_calls.fetch_add(1, Ordering::SeqCst);

        let mut faults = self.faults.lock().unwrap();
        if let Some(pos) = faults.iter().position(|f| *f == point) {
            faults.remove(pos);
            return Err(GatewayError::Unavailable(anyhow::anyhow!(
                "Injected fault at {:?}",
                point
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl StoreGateway for InMemoryGateway {
    async fn read_menu_item(&self, id: Uuid) -> Result<MenuItem, GatewayError> {
        self.begin_call(FaultPoint::ReadMenuItem)?;

        self.state
            .lock()
            .unwrap()
            .menu
            .get(&id)
            .cloned()
            .ok_or(GatewayError::NotFound(id))
    }

    async fn list_menu_items(&self, page: i64, limit: i64) -> Result<Vec<MenuItem>, GatewayError> {
        self.begin_call(FaultPoint::ListMenu)?;

        let state = self.state.lock().unwrap();
        let mut items: Vec<MenuItem> = state.menu.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));

        let offset = ((page - 1) * limit).max(0) as usize;
        Ok(items.into_iter().skip(offset).take(limit.max(0) as usize).collect())
    }

    async fn insert_menu_item(&self, item: MenuItem) -> Result<(), GatewayError> {
        self.begin_call(FaultPoint::InsertMenuItem)?;

        self.state.lock().unwrap().menu.insert(item.id, item);
        Ok(())
    }

    async fn conditional_decrement_stock(&self, id: Uuid, amount: i32) -> Result<bool, GatewayError> {
        self.begin_call(FaultPoint::DecrementStock)?;

        let mut state = self.state.lock().unwrap();
        match state.menu.get_mut(&id) {
            Some(item) if item.quantity_available >= amount => {
                item.quantity_available -= amount;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn restock(&self, id: Uuid, amount: i32) -> Result<(), GatewayError> {
        self.begin_call(FaultPoint::Restock)?;

        if let Some(item) = self.state.lock().unwrap().menu.get_mut(&id) {
            item.quantity_available += amount;
        }
        Ok(())
    }

    async fn insert_order(&self, order: Order) -> Result<(), GatewayError> {
        self.begin_call(FaultPoint::InsertOrder)?;

        self.state.lock().unwrap().orders.push(order);
        Ok(())
    }

    async fn insert_order_items(&self, items: Vec<OrderItemModel>) -> Result<(), GatewayError> {
        self.begin_call(FaultPoint::InsertOrderItems)?;

        self.state.lock().unwrap().order_items.extend(items);
        Ok(())
    }

    async fn delete_order(&self, order_id: Uuid) -> Result<(), GatewayError> {
        self.begin_call(FaultPoint::DeleteOrder)?;

        let mut state = self.state.lock().unwrap();
        state.order_items.retain(|item| item.order_id != order_id);
        state.orders.retain(|order| order.id != order_id);
        Ok(())
    }

    async fn orders_for_user(&self, user_id: Uuid, is_staff: bool, page: i64, limit: i64) -> Result<Vec<OrderWithItems>, GatewayError> {
        self.begin_call(FaultPoint::ListOrders)?;

        let state = self.state.lock().unwrap();
        let mut order_rows: Vec<Order> = state
            .orders
            .iter()
            .filter(|order| is_staff || order.user_id == user_id)
            .cloned()
            .collect();
        order_rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let offset = ((page - 1) * limit).max(0) as usize;
        let ret = order_rows
            .into_iter()
            .skip(offset)
            .take(limit.max(0) as usize)
            .map(|order| {
                let items = state
                    .order_items
                    .iter()
                    .filter(|item| item.order_id == order.id)
                    .cloned()
                    .collect();
                OrderWithItems { order, items }
            })
            .collect();

        Ok(ret)
    }

    async fn advance_order_status(&self, order_id: Uuid, target: OrderStatus) -> Result<bool, GatewayError> {
        self.begin_call(FaultPoint::AdvanceStatus)?;

        let mut state = self.state.lock().unwrap();
        match state.orders.iter_mut().find(|order| order.id == order_id) {
            Some(order) => {
                let current = match OrderStatus::parse(&order.status) {
                    Some(status) => status,
                    None => return Ok(false),
                };

                if current.can_advance_to(target) {
                    order.status = target.as_str().to_string();
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            None => Ok(false),
        }
    }

    async fn cart_items_for_user(&self, user_id: Uuid) -> Result<Vec<CartItem>, GatewayError> {
        self.begin_call(FaultPoint::ReadCart)?;

        Ok(self.cart_lines(user_id))
    }

    async fn add_cart_line(&self, user_id: Uuid, menu_item_id: Uuid) -> Result<(), GatewayError> {
        self.begin_call(FaultPoint::WriteCart)?;

        let mut state = self.state.lock().unwrap();
        match state
            .cart
            .iter_mut()
            .find(|line| line.user_id == user_id && line.menu_item_id == menu_item_id)
        {
            Some(line) => line.quantity += 1,
            None => state.cart.push(CartItem {
                id: Uuid::new_v4(),
                user_id,
                menu_item_id,
                quantity: 1,
            }),
        }

        Ok(())
    }

    async fn set_cart_quantity(&self, user_id: Uuid, menu_item_id: Uuid, quantity: i32) -> Result<(), GatewayError> {
        self.begin_call(FaultPoint::WriteCart)?;

        let mut state = self.state.lock().unwrap();
        if quantity <= 0 {
            state
                .cart
                .retain(|line| !(line.user_id == user_id && line.menu_item_id == menu_item_id));
        } else if let Some(line) = state
            .cart
            .iter_mut()
            .find(|line| line.user_id == user_id && line.menu_item_id == menu_item_id)
        {
            line.quantity = quantity;
        }

        Ok(())
    }

    async fn delete_cart_items_for_user(&self, user_id: Uuid) -> Result<usize, GatewayError> {
        self.begin_call(FaultPoint::ClearCart)?;

        let mut state = self.state.lock().unwrap();
        let before = state.cart.len();
        state.cart.retain(|line| line.user_id != user_id);
        Ok(before - state.cart.len())
    }
}
