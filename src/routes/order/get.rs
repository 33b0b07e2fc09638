use actix_web::{error::ErrorInternalServerError, web, HttpResponse};
use serde::Deserialize;

use crate::{auth::extractors::IsUser, gateway::StoreGateway};

#[derive(Deserialize, Debug)]
pub struct GetOrderQuery {
    pub page: i64,
    pub limit: i64
}

#[tracing::instrument(
    "Getting list of orders",
    skip(gateway, uid)
)]
pub async fn get_order(
    gateway: web::Data<dyn StoreGateway>,
    query: web::Query<GetOrderQuery>,
    uid: IsUser
) -> Result<HttpResponse, actix_web::Error> {
    let user_id = uid.0;
    let is_staff = uid.1;

    let orders = gateway
        .orders_for_user(user_id, is_staff, query.0.page, query.0.limit)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(orders))
}
