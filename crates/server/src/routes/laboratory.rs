use crate::{
    auth::{AdminUser, CurrentUser},
    dtos::{
        ApiResponse,
        laboratory::{CreateLaboratoryRequest, LaboratoryResponse, UpdateLaboratoryRequest},
    },
    error::{ApiResult, ErrorBody},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use database::services::laboratory::LaboratoryService;

/// List all laboratories
#[utoipa::path(
    get,
    path = "/api/v1/laboratories",
    responses(
        (status = 200, description = "Laboratories", body = ApiResponse<Vec<LaboratoryResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("jwt" = [])),
    tag = "Laboratories"
)]
pub async fn list_laboratories(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<LaboratoryResponse>>>> {
    let labs = LaboratoryService::list_laboratories(&state.db, &state.cache).await?;
    Ok(Json(ApiResponse::ok(
        labs.into_iter().map(Into::into).collect(),
    )))
}

/// Get a laboratory by ID
#[utoipa::path(
    get,
    path = "/api/v1/laboratories/{id}",
    params(("id" = i32, Path, description = "Laboratory ID")),
    responses(
        (status = 200, description = "Laboratory found", body = ApiResponse<LaboratoryResponse>),
        (status = 404, description = "Laboratory not found", body = ErrorBody)
    ),
    security(("jwt" = [])),
    tag = "Laboratories"
)]
pub async fn get_laboratory(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<LaboratoryResponse>>> {
    let lab = LaboratoryService::get_laboratory(&state.db, &state.cache, id).await?;
    Ok(Json(ApiResponse::ok(lab.into())))
}

/// Create a laboratory
#[utoipa::path(
    post,
    path = "/api/v1/laboratories",
    request_body = CreateLaboratoryRequest,
    responses(
        (status = 201, description = "Laboratory created", body = ApiResponse<LaboratoryResponse>),
        (status = 403, description = "Not an admin", body = ErrorBody),
        (status = 422, description = "Name already taken", body = ErrorBody)
    ),
    security(("jwt" = [])),
    tag = "Laboratories"
)]
pub async fn create_laboratory(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateLaboratoryRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<LaboratoryResponse>>)> {
    let lab = LaboratoryService::create_laboratory(
        &state.db,
        &state.cache,
        &admin.context(),
        request.into(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::created(lab.into()))))
}

/// Update a laboratory. Renaming rewrites the laboratory name stored on its
/// students.
#[utoipa::path(
    put,
    path = "/api/v1/laboratories/{id}",
    params(("id" = i32, Path, description = "Laboratory ID")),
    request_body = UpdateLaboratoryRequest,
    responses(
        (status = 200, description = "Laboratory updated", body = ApiResponse<LaboratoryResponse>),
        (status = 404, description = "Laboratory not found", body = ErrorBody),
        (status = 422, description = "Name already taken", body = ErrorBody)
    ),
    security(("jwt" = [])),
    tag = "Laboratories"
)]
pub async fn update_laboratory(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateLaboratoryRequest>,
) -> ApiResult<Json<ApiResponse<LaboratoryResponse>>> {
    let lab = LaboratoryService::update_laboratory(
        &state.db,
        &state.cache,
        &admin.context(),
        id,
        request.into(),
    )
    .await?;

    Ok(Json(ApiResponse::ok(lab.into())))
}

/// Delete a laboratory nothing refers to
#[utoipa::path(
    delete,
    path = "/api/v1/laboratories/{id}",
    params(("id" = i32, Path, description = "Laboratory ID")),
    responses(
        (status = 200, description = "Laboratory deleted"),
        (status = 404, description = "Laboratory not found", body = ErrorBody),
        (status = 422, description = "Still referenced; `data` holds the blocking count", body = ErrorBody)
    ),
    security(("jwt" = [])),
    tag = "Laboratories"
)]
pub async fn delete_laboratory(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<()>>> {
    LaboratoryService::delete_laboratory(&state.db, &state.cache, &admin.context(), id).await?;
    Ok(Json(ApiResponse::message("deleted")))
}
