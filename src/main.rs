use coffee_store::{build_server, create_pool, run_migrations, AppConfig, AppState, StoreBackend};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("invalid configuration: {e}");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let state = match (config.backend, config.database_url.as_deref()) {
        (StoreBackend::Postgres, Some(url)) => {
            let pool = create_pool(url).map_err(std::io::Error::other)?;
            run_migrations(&pool).map_err(std::io::Error::other)?;
            AppState::postgres(pool, config.pricing)
        }
        _ => {
            log::warn!("using the in-memory store; data is lost on restart");
            AppState::in_memory(config.pricing)
        }
    };

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}
