use crate::auth::JwtKeys;
use database::cache::Cache;
use sea_orm::DatabaseConnection;

/// Shared handles passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub cache: Cache,
    pub jwt: JwtKeys,
    /// Take the client address from `x-forwarded-for`; only safe behind a
    /// reverse proxy that overwrites the header
    pub trust_proxy: bool,
}

impl AppState {
    pub fn new(db: DatabaseConnection, cache: Cache, jwt: JwtKeys) -> Self {
        Self {
            db,
            cache,
            jwt,
            trust_proxy: false,
        }
    }

    pub fn with_trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }
}
