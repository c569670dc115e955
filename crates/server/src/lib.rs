pub mod auth;
pub mod config;
pub mod doc;
pub mod dtos;
pub mod error;
pub mod routes;
pub mod state;
pub mod utils;

use crate::{doc::ApiDoc, state::AppState};
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use routes::{admin, equipment, health, laboratory, reservation, root, user};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Routes mounted under `/api/v1`
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root::root))
        .route("/health", get(health::health))
        .route("/users/me", get(user::me))
        .route(
            "/laboratories",
            get(laboratory::list_laboratories).post(laboratory::create_laboratory),
        )
        .route(
            "/laboratories/{id}",
            get(laboratory::get_laboratory)
                .put(laboratory::update_laboratory)
                .delete(laboratory::delete_laboratory),
        )
        .route("/equipments", get(equipment::list_equipment))
        .route("/equipments/{id}", get(equipment::get_equipment))
        .route("/equipments/{id}/time-slots", get(equipment::list_time_slots))
        .route("/admin/equipments", post(admin::create_equipment))
        .route(
            "/admin/equipments/{id}",
            put(admin::update_equipment).delete(admin::delete_equipment),
        )
        .route("/admin/equipments/{id}/time-slots", post(admin::create_time_slot))
        .route("/admin/time-slots/{id}", delete(admin::deactivate_time_slot))
        .route(
            "/reservations",
            get(reservation::list_reservations).post(reservation::create_reservation),
        )
        .route("/reservations/{id}/review", put(reservation::review_reservation))
        .route("/reservations/{id}/cancel", post(reservation::cancel_reservation))
}

/// The complete application: API, Swagger UI and response compression
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(ServiceBuilder::new().layer(CompressionLayer::new()))
        .with_state(state)
}
