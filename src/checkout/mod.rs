use std::{error::Error, fmt::Debug, sync::Arc, time::Duration};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    configuration::CheckoutSettings,
    domain::{OrderStatus, PaymentStatus},
    gateway::{GatewayError, StoreGateway},
    models::{Order, OrderItemModel},
    utils::error_fmt_chain,
};

// Acting user, passed in explicitly; the coordinator never reads ambient
// session state
#[derive(Clone, Copy, Debug)]
pub struct Identity {
    pub user_id: Uuid,
}

// One cart line as handed to the coordinator. No price: unit prices are
// re-read from the store during validation, never taken from the caller.
#[derive(Deserialize, Clone, Copy, Debug)]
pub struct CheckoutLine {
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

#[derive(Serialize, Debug)]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItemModel>,
}

#[derive(Error)]
pub enum CheckoutError {
    #[error("Cannot check out an empty cart")]
    EmptyCart,
    #[error("No signed-in user for checkout")]
    AuthenticationRequired,
    #[error("Quantity must be positive for items: {0:?}")]
    InvalidQuantity(Vec<Uuid>),
    #[error("Not enough stock for items: {0:?}")]
    InsufficientStock(Vec<Uuid>),
    #[error("Lost the stock reservation race on item {0}")]
    StockRace(Uuid),
    #[error("Data store failure during checkout")]
    Persistence(#[from] anyhow::Error),
}

impl Debug for CheckoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl From<GatewayError> for CheckoutError {
    fn from(e: GatewayError) -> Self {
        CheckoutError::Persistence(anyhow::Error::new(e))
    }
}

impl CheckoutError {
    // Race losses and transient store failures may be retried; structural
    // errors surface immediately
    pub fn is_retryable(&self) -> bool {
        matches!(self, CheckoutError::StockRace(_) | CheckoutError::Persistence(_))
    }
}

impl ResponseError for CheckoutError {
    fn status_code(&self) -> StatusCode {
        match self {
            CheckoutError::EmptyCart | CheckoutError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
            CheckoutError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            CheckoutError::InsufficientStock(_) | CheckoutError::StockRace(_) => StatusCode::CONFLICT,
            CheckoutError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        let message = match self {
            CheckoutError::EmptyCart => "Your cart is empty".to_string(),
            CheckoutError::InvalidQuantity(items) => {
                format!("Requested quantity must be positive for items: {:?}", items)
            }
            CheckoutError::AuthenticationRequired => "You need to sign in to place an order".to_string(),
            CheckoutError::InsufficientStock(items) => {
                format!("Some items are out of stock: {:?}", items)
            }
            CheckoutError::StockRace(_) => "Some items sold out while placing your order, please try again".to_string(),
            CheckoutError::Persistence(_) => "Temporary problem placing your order, please try again".to_string(),
        };

        HttpResponse::build(self.status_code()).body(message)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_backoff: Duration::from_millis(100),
        }
    }
}

impl From<CheckoutSettings> for RetryPolicy {
    fn from(settings: CheckoutSettings) -> Self {
        RetryPolicy {
            max_attempts: settings.max_attempts.max(1),
            base_backoff: Duration::from_millis(settings.base_backoff_ms),
        }
    }
}

impl RetryPolicy {
    // Exponential backoff with jitter; attempt is 1-based
    fn backoff_for(&self, attempt: u32) -> Duration {
        let base = self.base_backoff * 2u32.saturating_pow(attempt.saturating_sub(1));
        let jitter_ms = if self.base_backoff.as_millis() > 0 {
            rand::thread_rng().gen_range(0..self.base_backoff.as_millis() as u64)
        } else {
            0
        };

        base + Duration::from_millis(jitter_ms)
    }
}

/// Converts a cart snapshot into a committed order, or fails leaving
/// inventory, orders and cart untouched.
///
/// The store offers no multi-table transaction, so the coordinator enforces
/// atomicity itself: stock is reserved through conditional decrements, and
/// any failure after reservation triggers compensation in reverse order of
/// application before the error is returned.
#[derive(Clone)]
pub struct OrderCoordinator {
    gateway: Arc<dyn StoreGateway>,
    policy: RetryPolicy,
}

impl OrderCoordinator {
    pub fn new(gateway: Arc<dyn StoreGateway>, policy: RetryPolicy) -> Self {
        Self { gateway, policy }
    }

    #[tracing::instrument(
        "Placing order",
        skip(self, lines)
    )]
    pub async fn place_order(
        &self,
        identity: Option<Identity>,
        lines: Vec<CheckoutLine>,
        payment_status: PaymentStatus,
    ) -> Result<PlacedOrder, CheckoutError> {
        let identity = identity.ok_or(CheckoutError::AuthenticationRequired)?;

        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        // A non-positive quantity would slip through the availability check
        // and turn the conditional decrement into an increment; reject it
        // before anything touches the store.
        let invalid: Vec<Uuid> = lines
            .iter()
            .filter(|line| line.quantity <= 0)
            .map(|line| line.menu_item_id)
            .collect();
        if !invalid.is_empty() {
            return Err(CheckoutError::InvalidQuantity(invalid));
        }

        // The transaction runs on its own task: tearing down the caller
        // (e.g. the HTTP request going away) must not abort a checkout
        // between reservation and commit.
        let coordinator = self.clone();
        tokio::spawn(async move {
            coordinator
                .place_order_with_retries(identity, lines, payment_status)
                .await
        })
        .await
        .map_err(|e| {
            CheckoutError::Persistence(
                anyhow::Error::new(e).context("Checkout task did not run to completion"),
            )
        })?
    }

    async fn place_order_with_retries(
        &self,
        identity: Identity,
        lines: Vec<CheckoutLine>,
        payment_status: PaymentStatus,
    ) -> Result<PlacedOrder, CheckoutError> {
        let mut attempt = 1;

        loop {
            match self.place_order_once(identity, &lines, payment_status).await {
                Ok(placed) => return Ok(placed),
                Err(err) if err.is_retryable() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.backoff_for(attempt);
                    tracing::warn!(
                        attempt,
                        "Checkout attempt failed, retrying in {:?}: {}",
                        delay,
                        err
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn place_order_once(
        &self,
        identity: Identity,
        lines: &[CheckoutLine],
        payment_status: PaymentStatus,
    ) -> Result<PlacedOrder, CheckoutError> {
        // Step 1: re-read availability and snapshot unit prices. An item that
        // no longer exists is as unfulfillable as one that ran out.
        let mut priced = Vec::with_capacity(lines.len());
        let mut short = Vec::new();

        for line in lines {
            match self.gateway.read_menu_item(line.menu_item_id).await {
                Ok(item) if item.quantity_available >= line.quantity => {
                    priced.push((*line, item.price));
                }
                Ok(item) => short.push(item.id),
                Err(GatewayError::NotFound(id)) => short.push(id),
                Err(e) => return Err(e.into()),
            }
        }

        if !short.is_empty() {
            return Err(CheckoutError::InsufficientStock(short));
        }

        // Step 2: reserve. The conditional decrement is the only defense
        // against two checkouts that both read sufficient stock in step 1.
        let mut reserved: Vec<(Uuid, i32)> = Vec::new();

        for (line, _) in &priced {
            match self
                .gateway
                .conditional_decrement_stock(line.menu_item_id, line.quantity)
                .await
            {
                Ok(true) => reserved.push((line.menu_item_id, line.quantity)),
                Ok(false) => {
                    self.release_reservations(&reserved).await;
                    return Err(CheckoutError::StockRace(line.menu_item_id));
                }
                Err(e) => {
                    self.release_reservations(&reserved).await;
                    return Err(e.into());
                }
            }
        }

        // Step 3: order header. The total comes from the prices validated in
        // step 1, never from the caller.
        let total_amount: f64 = priced
            .iter()
            .map(|(line, unit_price)| unit_price * f64::from(line.quantity))
            .sum();

        let order = Order {
            id: Uuid::new_v4(),
            user_id: identity.user_id,
            total_amount,
            status: OrderStatus::Pending.as_str().to_string(),
            payment_status: payment_status.as_str().to_string(),
            created_at: Utc::now(),
        };

        if let Err(e) = self.gateway.insert_order(order.clone()).await {
            self.release_reservations(&reserved).await;
            return Err(e.into());
        }

        // Step 4: line items, carrying price-at-purchase
        let items: Vec<OrderItemModel> = priced
            .iter()
            .map(|(line, unit_price)| OrderItemModel {
                id: Uuid::new_v4(),
                order_id: order.id,
                menu_item_id: line.menu_item_id,
                quantity: line.quantity,
                price: *unit_price,
            })
            .collect();

        if let Err(e) = self.gateway.insert_order_items(items.clone()).await {
            self.compensate(order.id, &reserved).await;
            return Err(e.into());
        }

        // Step 5: clear the cart. A failure here still unwinds the whole
        // attempt so no half-committed order stays visible.
        if let Err(e) = self.gateway.delete_cart_items_for_user(identity.user_id).await {
            self.compensate(order.id, &reserved).await;
            return Err(e.into());
        }

        Ok(PlacedOrder { order, items })
    }

    // Undo a partially applied attempt, in reverse order of application.
    // Compensation failures are logged; the caller sees the original error.
    async fn compensate(&self, order_id: Uuid, reserved: &[(Uuid, i32)]) {
        if let Err(e) = self.gateway.delete_order(order_id).await {
            tracing::error!("Failed to roll back order {}: {:?}", order_id, e);
        }

        self.release_reservations(reserved).await;
    }

    async fn release_reservations(&self, reserved: &[(Uuid, i32)]) {
        for (menu_item_id, amount) in reserved.iter().rev() {
            if let Err(e) = self.gateway.restock(*menu_item_id, *amount).await {
                tracing::error!(
                    "Failed to restore {} units of stock for {}: {:?}",
                    amount,
                    menu_item_id,
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_exponentially() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_backoff: Duration::from_millis(100),
        };

        let first = policy.backoff_for(1);
        let second = policy.backoff_for(2);
        let third = policy.backoff_for(3);

        assert!(first >= Duration::from_millis(100) && first < Duration::from_millis(200));
        assert!(second >= Duration::from_millis(200) && second < Duration::from_millis(300));
        assert!(third >= Duration::from_millis(400) && third < Duration::from_millis(500));
    }

    #[test]
    fn zero_base_backoff_is_allowed() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_backoff: Duration::ZERO,
        };

        assert_eq!(policy.backoff_for(1), Duration::ZERO);
        assert_eq!(policy.backoff_for(2), Duration::ZERO);
    }

    #[test]
    fn retryability_matches_the_taxonomy() {
        assert!(CheckoutError::StockRace(Uuid::new_v4()).is_retryable());
        assert!(CheckoutError::Persistence(anyhow::anyhow!("boom")).is_retryable());
        assert!(!CheckoutError::EmptyCart.is_retryable());
        assert!(!CheckoutError::AuthenticationRequired.is_retryable());
        assert!(!CheckoutError::InvalidQuantity(vec![Uuid::new_v4()]).is_retryable());
        assert!(!CheckoutError::InsufficientStock(vec![Uuid::new_v4()]).is_retryable());
    }
}
