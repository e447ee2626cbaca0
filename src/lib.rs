pub mod application;
pub mod auth;
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

pub use auth::JwtKeys;
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
    paths(
        handlers::checkout::checkout,
        handlers::checkout::tax_rate,
        handlers::checkout::validate_discount,
        handlers::stock_keys::create_key,
        handlers::stock_keys::bulk_create_keys,
        handlers::stock_keys::get_key,
        handlers::stock_keys::assign_key,
        handlers::stock_keys::update_key,
        handlers::stock_keys::delete_key,
        handlers::stock_keys::list_keys,
        handlers::orders::get_order,
        handlers::orders::list_orders,
        handlers::admin::product_stock,
        handlers::admin::restock,
        handlers::admin::create_discount,
        handlers::admin::set_discount_status,
    ),
    tags(
        (name = "checkout", description = "Cart checkout, tax lookup and discount checks"),
        (name = "stock-keys", description = "Game key inventory (admin)"),
        (name = "admin", description = "Orders, stock and discount codes (admin)"),
    )
)]
pub struct ApiDoc;

/// Registers every route. Expects `web::Data<AppState>` and
/// `web::Data<JwtKeys>` to be present on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    use handlers::{admin, checkout, orders, stock_keys};

    cfg.service(
        web::scope("/checkout")
            .route("", web::post().to(checkout::checkout))
            .route("/tax", web::get().to(checkout::tax_rate))
            .route("/validate-discount", web::get().to(checkout::validate_discount)),
    )
    .service(
        web::scope("/admin")
            .service(
                web::scope("/stock-keys")
                    .route("", web::post().to(stock_keys::create_key))
                    .route("", web::get().to(stock_keys::list_keys))
                    .route("/bulk", web::post().to(stock_keys::bulk_create_keys))
                    .route("/{id}", web::get().to(stock_keys::get_key))
                    .route("/{id}", web::put().to(stock_keys::update_key))
                    .route("/{id}", web::delete().to(stock_keys::delete_key))
                    .route("/{id}/assign", web::put().to(stock_keys::assign_key)),
            )
            .route("/orders", web::get().to(orders::list_orders))
            .route("/orders/{id}", web::get().to(orders::get_order))
            .route("/products/{id}/stock", web::get().to(admin::product_stock))
            .route("/products/{id}/restock", web::post().to(admin::restock))
            .route("/discount-codes", web::post().to(admin::create_discount))
            .route(
                "/discount-codes/{code}/status",
                web::put().to(admin::set_discount_status),
            ),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: web::Data<AppState>,
    keys: web::Data<JwtKeys>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(keys.clone())
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
