use actix_web::{error::{ErrorBadRequest, ErrorInternalServerError}, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::extractors::IsStaff, gateway::StoreGateway, models::MenuItem};

#[derive(Deserialize, Debug)]
pub struct MenuItemForm {
    name: String,
    description: String,
    price: f64,
    category: String,
    image_url: Option<String>,
    quantity_available: i32,
    canteen_name: String,
    rating: f64
}

#[tracing::instrument(
    "Posting menu item",
    skip(gateway, form)
)]
pub async fn post_menu_item(
    gateway: web::Data<dyn StoreGateway>,
    form: web::Json<MenuItemForm>,
    _: IsStaff
) -> Result<HttpResponse, actix_web::Error> {
    let form = form.into_inner();

    if form.price <= 0.0 {
        return Err(ErrorBadRequest("Price must be positive"));
    }
    if form.quantity_available < 0 {
        return Err(ErrorBadRequest("Available quantity cannot be negative"));
    }

    let item = MenuItem {
        id: Uuid::new_v4(),
        name: form.name,
        description: form.description,
        price: form.price,
        category: form.category,
        image_url: form.image_url,
        quantity_available: form.quantity_available,
        canteen_name: form.canteen_name,
        rating: form.rating
    };

    gateway
        .insert_menu_item(item.clone())
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(item))
}
