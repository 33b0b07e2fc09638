use actix_web::{error::{ErrorInternalServerError, ErrorNotFound}, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::extractors::IsUser, gateway::{GatewayError, StoreGateway}};

#[derive(Deserialize, Debug)]
pub struct AddCartLineJson {
    pub menu_item_id: Uuid
}

// Adding an item the user already has in the cart increments the existing
// line instead of duplicating it
#[tracing::instrument(
    "Adding cart line",
    skip(gateway, uid)
)]
pub async fn post_cart_line(
    gateway: web::Data<dyn StoreGateway>,
    json: web::Json<AddCartLineJson>,
    uid: IsUser
) -> Result<HttpResponse, actix_web::Error> {
    // Confirm the item exists; availability itself is only checked at checkout
    match gateway.read_menu_item(json.menu_item_id).await {
        Ok(_) => {}
        Err(GatewayError::NotFound(id)) => {
            return Err(ErrorNotFound(format!("Menu item {} does not exist", id)))
        }
        Err(e) => return Err(ErrorInternalServerError(e)),
    }

    gateway
        .add_cart_line(uid.0, json.menu_item_id)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().finish())
}
