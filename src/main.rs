use std::sync::Arc;

use actix_web::web;
use dotenvy::dotenv;
use storefront::application::checkout_service::TaxPolicy;
use storefront::config::Settings;
use storefront::domain::ports::RateOracle;
use storefront::infrastructure::{DieselStore, FlatRateOracle, HttpRateOracle};
use storefront::{build_server, create_pool, run_migrations, AppState, JwtKeys};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let settings = Settings::from_env().map_err(std::io::Error::other)?;

    let pool = create_pool(&settings.database_url).map_err(std::io::Error::other)?;
    run_migrations(&pool).map_err(std::io::Error::other)?;

    let oracle: Arc<dyn RateOracle> = match &settings.rate_oracle_url {
        Some(url) => {
            log::info!("Using rate oracle at {url}");
            Arc::new(
                HttpRateOracle::new(url, settings.rate_oracle_timeout)
                    .map_err(std::io::Error::other)?,
            )
        }
        None => {
            log::warn!(
                "RATE_ORACLE_URL not set, charging the flat default rate {}",
                settings.default_tax_rate
            );
            Arc::new(FlatRateOracle::new(settings.default_tax_rate.clone()))
        }
    };

    let state = web::Data::new(AppState::new(
        Arc::new(DieselStore::new(pool)),
        oracle,
        TaxPolicy {
            default_rate: settings.default_tax_rate.clone(),
            timeout: settings.rate_oracle_timeout,
        },
    ));
    let keys = web::Data::new(JwtKeys::new(&settings.jwt_secret));

    log::info!("Starting server at http://{}:{}", settings.host, settings.port);

    build_server(state, keys, &settings.host, settings.port)?.await
}
