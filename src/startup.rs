use std::{net::TcpListener, sync::Arc};

use actix_web::{dev::Server, web, App, HttpServer};
use diesel::r2d2::ConnectionManager;
use r2d2::Pool;
use tracing_actix_web::TracingLogger;

use crate::{
    auth::jwt::Tokenizer,
    checkout::OrderCoordinator,
    configuration::Settings,
    gateway::{PgStoreGateway, StoreGateway},
    routes::{cart, health_check, menu, order},
    utils::DbPool,
};

pub struct Application{
    pub host: String,
    pub port: u16,
    pub server: Server
}

impl Application {
    pub fn new(settings: Settings) -> Result<Self, anyhow::Error>{
        let manager = ConnectionManager::new(settings.database.get_database_table_url());
        let pool: DbPool = Pool::builder().build_unchecked(manager);

        let gateway: Arc<dyn StoreGateway> = Arc::new(PgStoreGateway::new(pool));
        let coordinator = OrderCoordinator::new(gateway.clone(), settings.checkout.into());
        let tokenizer = Tokenizer::new(&settings.jwt);

        let listener = TcpListener::bind((settings.application.host.as_str(), settings.application.port))?;
        let port = listener.local_addr()?.port();
        let host = settings.application.host;

        let gateway_data: web::Data<dyn StoreGateway> = web::Data::from(gateway);

        let server = HttpServer::new(move || {
            App::new()
                .wrap(TracingLogger::default())
                .app_data(gateway_data.clone())
                .app_data(web::Data::new(coordinator.clone()))
                .app_data(web::Data::new(tokenizer.clone()))
                .route("/health", web::get().to(health_check))
                .route("/menu", web::get().to(menu::get_menu))
                .route("/staff/menu", web::post().to(menu::post_menu_item))
                .route("/user/cart", web::get().to(cart::get_cart))
                .route("/user/cart", web::post().to(cart::post_cart_line))
                .route("/user/cart", web::put().to(cart::update_cart_line))
                .route("/user/order", web::get().to(order::get_order))
                .route("/user/order/checkout", web::post().to(order::checkout))
                .route("/staff/order", web::put().to(order::update_order))
        })
        .listen(listener)?
        .run();

        Ok(Application{ host, port, server })
    }
}
