use crate::{
    auth::CurrentUser,
    dtos::{ApiResponse, user::UserResponse},
    error::{ApiResult, ErrorBody},
    state::AppState,
};
use axum::{Json, extract::State};
use database::services::user::UserService;

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "User no longer exists", body = ErrorBody)
    ),
    security(("jwt" = [])),
    tag = "Users"
)]
pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let profile =
        UserService::get_profile(&state.db, user.claims.user_type, &user.claims.user_id).await?;

    Ok(Json(ApiResponse::ok(profile.into())))
}
