use database::{
    cache::{Cache, CacheBackend},
    db::create_connection,
};
use log::info;
use migration::{Migrator, MigratorTrait};
use server::{
    app, auth::JwtKeys, config::AppConfig, state::AppState, utils::shutdown::shutdown_signal,
};
use std::net::SocketAddr;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = AppConfig::from_env().expect("Invalid configuration");
    if config.jwt_secret == AppConfig::DEFAULT_JWT_SECRET {
        log::warn!("JWT_SECRET is not set, using the development secret");
    }

    let db = create_connection(&config.database_url)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let backend =
        CacheBackend::connect(config.redis_url.as_deref(), config.redis_pool_size).await;
    info!("Cache backend: {}", backend.mode());
    let cache = Cache::new(backend, config.cache_ttl);

    let state = AppState::new(db, cache, JwtKeys::new(&config.jwt_secret))
        .with_trust_proxy(config.trust_proxy);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listener");
    info!("Running axum on http://{}", config.bind_addr);
    info!("Swagger UI at http://{}/swagger-ui", config.bind_addr);

    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");
}
