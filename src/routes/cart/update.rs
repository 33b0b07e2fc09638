use actix_web::{error::ErrorInternalServerError, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::extractors::IsUser, gateway::StoreGateway};

#[derive(Deserialize, Debug)]
pub struct SetCartQuantityJson {
    pub menu_item_id: Uuid,
    pub quantity: i32
}

// A requested quantity <= 0 removes the line entirely
#[tracing::instrument(
    "Setting cart quantity",
    skip(gateway, uid)
)]
pub async fn update_cart_line(
    gateway: web::Data<dyn StoreGateway>,
    json: web::Json<SetCartQuantityJson>,
    uid: IsUser
) -> Result<HttpResponse, actix_web::Error> {
    gateway
        .set_cart_quantity(uid.0, json.menu_item_id, json.quantity)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().finish())
}
