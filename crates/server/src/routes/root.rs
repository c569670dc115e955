use axum::http::StatusCode;

/// Simple endpoint that returns "OK" when the service is running properly
#[utoipa::path(
    get,
    path = "/api/v1",
    responses(
        (status = 200, description = "Service is running", content_type = "text/plain", body = String)
    ),
    tag = "Health"
)]
pub async fn root() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
