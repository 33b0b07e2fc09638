use actix_web::{error::ErrorInternalServerError, web, HttpResponse};

use crate::{auth::extractors::IsUser, gateway::StoreGateway};

#[tracing::instrument(
    "Getting cart contents",
    skip(gateway, uid)
)]
pub async fn get_cart(
    gateway: web::Data<dyn StoreGateway>,
    uid: IsUser
) -> Result<HttpResponse, actix_web::Error> {
    let lines = gateway
        .cart_items_for_user(uid.0)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(lines))
}
