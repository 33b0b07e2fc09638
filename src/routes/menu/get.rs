use actix_web::{error::ErrorInternalServerError, web, HttpResponse};
use serde::Deserialize;

use crate::gateway::StoreGateway;

#[derive(Deserialize, Debug)]
pub struct GetMenuQuery {
    page: i64,
    limit: i64
}

#[tracing::instrument(
    "Getting menu items",
    skip(gateway)
)]
pub async fn get_menu(
    gateway: web::Data<dyn StoreGateway>,
    query: web::Query<GetMenuQuery>
) -> Result<HttpResponse, actix_web::Error> {
    let items = gateway
        .list_menu_items(query.0.page, query.0.limit)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(items))
}
