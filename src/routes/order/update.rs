use actix_web::{error::{ErrorConflict, ErrorInternalServerError}, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::extractors::IsStaff, domain::OrderStatus, gateway::StoreGateway};

#[derive(Deserialize, Debug)]
pub struct UpdateOrderStatusJson {
    pub order_id: Uuid,
    pub status: OrderStatus
}

#[tracing::instrument(
    "Updating order status",
    skip(gateway)
)]
pub async fn update_order(
    gateway: web::Data<dyn StoreGateway>,
    json: web::Json<UpdateOrderStatusJson>,
    _: IsStaff
) -> Result<HttpResponse, actix_web::Error> {
    let advanced = gateway
        .advance_order_status(json.order_id, json.status)
        .await
        .map_err(ErrorInternalServerError)?;

    if !advanced {
        // Either the order does not exist or the transition would go backward
        return Err(ErrorConflict(format!(
            "Order {} cannot move to status {}",
            json.order_id,
            json.status.as_str()
        )));
    }

    Ok(HttpResponse::Ok().finish())
}
