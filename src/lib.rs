pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
pub mod state;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::{AppConfig, StoreBackend};
pub use db::{create_pool, DbPool};
pub use state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Coffee Store API", version = "0.1.0"),
    paths(
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::get_product_by_sku,
        handlers::search::search,
        handlers::cart::get_cart,
        handlers::cart::cart_count,
        handlers::cart::add_item,
        handlers::cart::update_item,
        handlers::cart::remove_item,
        handlers::cart::clear_cart,
        handlers::checkout::checkout,
        handlers::orders::get_order,
        handlers::orders::list_orders,
        handlers::orders::update_order_status,
        handlers::admin::create_product,
        handlers::admin::update_product,
        handlers::admin::activity,
    ),
    tags(
        (name = "catalog", description = "Product browsing and search"),
        (name = "cart", description = "Session cart"),
        (name = "checkout", description = "Order placement"),
        (name = "orders", description = "Order confirmation"),
        (name = "admin", description = "Back-office operations"),
    )
)]
pub struct ApiDoc;

/// Registers every route. Shared by the server and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    use handlers::{admin, cart, checkout, orders, products, search};

    cfg.service(
        web::scope("/products")
            .route("", web::get().to(products::list_products))
            .route("/sku/{sku}", web::get().to(products::get_product_by_sku))
            .route("/{id}", web::get().to(products::get_product)),
    )
    .route("/search", web::get().to(search::search))
    .service(
        web::scope("/cart")
            .route("", web::get().to(cart::get_cart))
            .route("", web::delete().to(cart::clear_cart))
            .route("/count", web::get().to(cart::cart_count))
            .route("/items", web::post().to(cart::add_item))
            .route("/items/{product_id}", web::put().to(cart::update_item))
            .route("/items/{product_id}", web::delete().to(cart::remove_item)),
    )
    .route("/checkout", web::post().to(checkout::checkout))
    .route("/orders/{order_number}", web::get().to(orders::get_order))
    .service(
        web::scope("/admin")
            .route("/orders", web::get().to(orders::list_orders))
            .route(
                "/orders/{order_number}/status",
                web::put().to(orders::update_order_status),
            )
            .route("/products", web::post().to(admin::create_product))
            .route("/products/{sku}", web::put().to(admin::update_product))
            .route("/activity", web::get().to(admin::activity)),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let state = web::Data::new(state);
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
