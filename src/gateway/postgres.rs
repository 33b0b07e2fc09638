use async_trait::async_trait;
use diesel::{Connection, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};
use uuid::Uuid;

use crate::{
    domain::OrderStatus,
    models::{CartItem, MenuItem, Order, OrderItemModel},
    schema::{cart_items, menu_items, order_items, orders},
    telemetry::spawn_blocking_with_tracing,
    utils::{get_pooled_connection, DbPool},
};

use super::{GatewayError, OrderWithItems, StoreGateway};

fn unavailable(e: impl Into<anyhow::Error>) -> GatewayError {
    GatewayError::Unavailable(e.into())
}

// Diesel-backed gateway. Every operation grabs its own pooled connection and
// runs on the blocking threadpool; there is no cross-operation transaction.
#[derive(Clone)]
pub struct PgStoreGateway {
    pool: DbPool,
}

impl PgStoreGateway {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<crate::utils::DbConnection, GatewayError> {
        get_pooled_connection(&self.pool).await.map_err(unavailable)
    }
}

#[async_trait]
impl StoreGateway for PgStoreGateway {
    #[tracing::instrument("Reading menu item", skip(self))]
    async fn read_menu_item(&self, id: Uuid) -> Result<MenuItem, GatewayError> {
        let mut conn = self.conn().await?;

        let item = spawn_blocking_with_tracing(move || {
            menu_items::table
                .find(id)
                .first::<MenuItem>(&mut conn)
                .optional()
        })
        .await
        .map_err(unavailable)?
        .map_err(unavailable)?;

        item.ok_or(GatewayError::NotFound(id))
    }

    #[tracing::instrument("Listing menu items", skip(self))]
    async fn list_menu_items(&self, page: i64, limit: i64) -> Result<Vec<MenuItem>, GatewayError> {
        let mut conn = self.conn().await?;
        let offset_value = (page - 1) * limit;

        spawn_blocking_with_tracing(move || {
            menu_items::table
                .order(menu_items::name.asc())
                .limit(limit)
                .offset(offset_value)
                .load::<MenuItem>(&mut conn)
        })
        .await
        .map_err(unavailable)?
        .map_err(unavailable)
    }

    #[tracing::instrument("Inserting menu item", skip(self, item))]
    async fn insert_menu_item(&self, item: MenuItem) -> Result<(), GatewayError> {
        let mut conn = self.conn().await?;

        spawn_blocking_with_tracing(move || {
            diesel::insert_into(menu_items::table)
                .values(item)
                .execute(&mut conn)
        })
        .await
        .map_err(unavailable)?
        .map_err(unavailable)?;

        Ok(())
    }

    #[tracing::instrument("Conditionally decrementing stock", skip(self))]
    async fn conditional_decrement_stock(&self, id: Uuid, amount: i32) -> Result<bool, GatewayError> {
        let mut conn = self.conn().await?;

        // The guard rides on the update itself: zero affected rows means the
        // pre-decrement availability was no longer >= amount.
        let affected_rows = spawn_blocking_with_tracing(move || {
            diesel::update(
                menu_items::table.filter(menu_items::id.eq(id))
            )
            .set(menu_items::quantity_available.eq(menu_items::quantity_available - amount))
            .filter(menu_items::quantity_available.ge(amount))
            .execute(&mut conn)
        })
        .await
        .map_err(unavailable)?
        .map_err(unavailable)?;

        Ok(affected_rows > 0)
    }

    #[tracing::instrument("Restoring reserved stock", skip(self))]
    async fn restock(&self, id: Uuid, amount: i32) -> Result<(), GatewayError> {
        let mut conn = self.conn().await?;

        spawn_blocking_with_tracing(move || {
            diesel::update(menu_items::table.filter(menu_items::id.eq(id)))
                .set(menu_items::quantity_available.eq(menu_items::quantity_available + amount))
                .execute(&mut conn)
        })
        .await
        .map_err(unavailable)?
        .map_err(unavailable)?;

        Ok(())
    }

    #[tracing::instrument("Inserting order header", skip(self, order))]
    async fn insert_order(&self, order: Order) -> Result<(), GatewayError> {
        let mut conn = self.conn().await?;

        spawn_blocking_with_tracing(move || {
            diesel::insert_into(orders::table)
                .values(order)
                .execute(&mut conn)
        })
        .await
        .map_err(unavailable)?
        .map_err(unavailable)?;

        Ok(())
    }

    #[tracing::instrument("Inserting order line items", skip(self, items))]
    async fn insert_order_items(&self, items: Vec<OrderItemModel>) -> Result<(), GatewayError> {
        let mut conn = self.conn().await?;

        spawn_blocking_with_tracing(move || {
            diesel::insert_into(order_items::table)
                .values(items)
                .execute(&mut conn)
        })
        .await
        .map_err(unavailable)?
        .map_err(unavailable)?;

        Ok(())
    }

    #[tracing::instrument("Deleting order", skip(self))]
    async fn delete_order(&self, order_id: Uuid) -> Result<(), GatewayError> {
        let mut conn = self.conn().await?;

        spawn_blocking_with_tracing(move || {
            conn.transaction::<(), diesel::result::Error, _>(|conn| {
                diesel::delete(order_items::table)
                    .filter(order_items::order_id.eq(order_id))
                    .execute(conn)?;

                diesel::delete(orders::table)
                    .filter(orders::id.eq(order_id))
                    .execute(conn)?;

                Ok(())
            })
        })
        .await
        .map_err(unavailable)?
        .map_err(unavailable)?;

        Ok(())
    }

    #[tracing::instrument("Getting orders with items", skip(self))]
    async fn orders_for_user(&self, user_id: Uuid, is_staff: bool, page: i64, limit: i64) -> Result<Vec<OrderWithItems>, GatewayError> {
        let mut conn = self.conn().await?;
        let offset_value = (page - 1) * limit;

        spawn_blocking_with_tracing(move || {
            conn.transaction::<Vec<OrderWithItems>, diesel::result::Error, _>(|conn| {
                let mut query = orders::table.into_boxed();

                if !is_staff {
                    query = query.filter(orders::user_id.eq(user_id));
                }

                let order_rows = query
                    .order(orders::created_at.desc())
                    .limit(limit)
                    .offset(offset_value)
                    .load::<Order>(conn)?;

                let mut ret = Vec::with_capacity(order_rows.len());
                for order in order_rows {
                    let items = order_items::table
                        .filter(order_items::order_id.eq(order.id))
                        .load::<OrderItemModel>(conn)?;

                    ret.push(OrderWithItems { order, items });
                }

                Ok(ret)
            })
        })
        .await
        .map_err(unavailable)?
        .map_err(unavailable)
    }

    #[tracing::instrument("Advancing order status", skip(self))]
    async fn advance_order_status(&self, order_id: Uuid, target: OrderStatus) -> Result<bool, GatewayError> {
        let mut conn = self.conn().await?;

        let predecessors: Vec<&'static str> = target
            .allowed_predecessors()
            .iter()
            .map(|s| s.as_str())
            .collect();

        let affected_rows = spawn_blocking_with_tracing(move || {
            diesel::update(
                orders::table
                    .filter(orders::id.eq(order_id))
                    .filter(orders::status.eq_any(predecessors))
            )
            .set(orders::status.eq(target.as_str()))
            .execute(&mut conn)
        })
        .await
        .map_err(unavailable)?
        .map_err(unavailable)?;

        Ok(affected_rows > 0)
    }

    #[tracing::instrument("Getting cart items", skip(self))]
    async fn cart_items_for_user(&self, user_id: Uuid) -> Result<Vec<CartItem>, GatewayError> {
        let mut conn = self.conn().await?;

        spawn_blocking_with_tracing(move || {
            cart_items::table
                .filter(cart_items::user_id.eq(user_id))
                .load::<CartItem>(&mut conn)
        })
        .await
        .map_err(unavailable)?
        .map_err(unavailable)
    }

    #[tracing::instrument("Adding cart line", skip(self))]
    async fn add_cart_line(&self, user_id: Uuid, menu_item_id: Uuid) -> Result<(), GatewayError> {
        let mut conn = self.conn().await?;

        let line = CartItem {
            id: Uuid::new_v4(),
            user_id,
            menu_item_id,
            quantity: 1,
        };

        spawn_blocking_with_tracing(move || {
            diesel::insert_into(cart_items::table)
                .values(&line)
                .on_conflict((cart_items::user_id, cart_items::menu_item_id))
                .do_update()
                .set(cart_items::quantity.eq(cart_items::quantity + 1))
                .execute(&mut conn)
        })
        .await
        .map_err(unavailable)?
        .map_err(unavailable)?;

        Ok(())
    }

    #[tracing::instrument("Setting cart quantity", skip(self))]
    async fn set_cart_quantity(&self, user_id: Uuid, menu_item_id: Uuid, quantity: i32) -> Result<(), GatewayError> {
        let mut conn = self.conn().await?;

        spawn_blocking_with_tracing(move || {
            if quantity <= 0 {
                diesel::delete(cart_items::table)
                    .filter(cart_items::user_id.eq(user_id))
                    .filter(cart_items::menu_item_id.eq(menu_item_id))
                    .execute(&mut conn)
            } else {
                diesel::update(
                    cart_items::table
                        .filter(cart_items::user_id.eq(user_id))
                        .filter(cart_items::menu_item_id.eq(menu_item_id))
                )
                .set(cart_items::quantity.eq(quantity))
                .execute(&mut conn)
            }
        })
        .await
        .map_err(unavailable)?
        .map_err(unavailable)?;

        Ok(())
    }

    #[tracing::instrument("Clearing cart", skip(self))]
    async fn delete_cart_items_for_user(&self, user_id: Uuid) -> Result<usize, GatewayError> {
        let mut conn = self.conn().await?;

        spawn_blocking_with_tracing(move || {
            diesel::delete(cart_items::table)
                .filter(cart_items::user_id.eq(user_id))
                .execute(&mut conn)
        })
        .await
        .map_err(unavailable)?
        .map_err(unavailable)
    }
}
