use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    auth::extractors::IsUser,
    checkout::{CheckoutError, CheckoutLine, Identity, OrderCoordinator},
    domain::PaymentStatus,
    gateway::StoreGateway,
};

#[derive(Deserialize, Debug)]
pub struct CheckoutJson {
    pub payment_status: PaymentStatus
}

// Checkout takes the cart as currently stored, not as the client last saw it.
// A missing identity is handed to the coordinator so it surfaces as a typed
// authentication error rather than a silent no-op.
#[tracing::instrument(
    "Checking out cart",
    skip(gateway, coordinator, uid)
)]
pub async fn checkout(
    gateway: web::Data<dyn StoreGateway>,
    coordinator: web::Data<OrderCoordinator>,
    json: web::Json<CheckoutJson>,
    uid: Option<IsUser>
) -> Result<HttpResponse, CheckoutError> {
    let identity = uid.map(|u| Identity { user_id: u.0 });

    let lines: Vec<CheckoutLine> = match identity {
        Some(identity) => gateway
            .cart_items_for_user(identity.user_id)
            .await
            .map_err(CheckoutError::from)?
            .into_iter()
            .map(|line| CheckoutLine {
                menu_item_id: line.menu_item_id,
                quantity: line.quantity,
            })
            .collect(),
        None => Vec::new(),
    };

    let placed = coordinator
        .place_order(identity, lines, json.payment_status)
        .await?;

    Ok(HttpResponse::Ok().json(placed))
}
