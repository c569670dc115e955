use crate::{
    auth::AdminUser,
    dtos::{
        ApiResponse,
        equipment::{
            CreateEquipmentRequest, CreateTimeSlotRequest, EquipmentResponse, TimeSlotResponse,
            UpdateEquipmentRequest,
        },
    },
    error::{ApiResult, ErrorBody},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use database::services::{equipment::EquipmentService, time_slot::TimeSlotService};

/// Create a piece of equipment
#[utoipa::path(
    post,
    path = "/api/v1/admin/equipments",
    request_body = CreateEquipmentRequest,
    responses(
        (status = 201, description = "Equipment created", body = ApiResponse<EquipmentResponse>),
        (status = 403, description = "Not an admin", body = ErrorBody),
        (status = 422, description = "Missing or unknown laboratory", body = ErrorBody)
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateEquipmentRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<EquipmentResponse>>)> {
    let equipment = EquipmentService::create_equipment(
        &state.db,
        &state.cache,
        &admin.context(),
        request.into(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::created(equipment.into()))))
}

/// Update a piece of equipment
#[utoipa::path(
    put,
    path = "/api/v1/admin/equipments/{id}",
    params(("id" = i64, Path, description = "Equipment ID")),
    request_body = UpdateEquipmentRequest,
    responses(
        (status = 200, description = "Equipment updated", body = ApiResponse<EquipmentResponse>),
        (status = 404, description = "Equipment not found", body = ErrorBody),
        (status = 422, description = "Missing or unknown laboratory", body = ErrorBody)
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn update_equipment(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateEquipmentRequest>,
) -> ApiResult<Json<ApiResponse<EquipmentResponse>>> {
    let equipment = EquipmentService::update_equipment(
        &state.db,
        &state.cache,
        &admin.context(),
        id,
        request.into(),
    )
    .await?;

    Ok(Json(ApiResponse::ok(equipment.into())))
}

/// Delete a piece of equipment and its time slots
#[utoipa::path(
    delete,
    path = "/api/v1/admin/equipments/{id}",
    params(("id" = i64, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment deleted"),
        (status = 404, description = "Equipment not found", body = ErrorBody),
        (status = 422, description = "Reservations still reference it", body = ErrorBody)
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn delete_equipment(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiResponse<()>>> {
    EquipmentService::delete_equipment(&state.db, &state.cache, &admin.context(), id).await?;
    Ok(Json(ApiResponse::message("deleted")))
}

/// Open a bookable time slot on a piece of equipment
#[utoipa::path(
    post,
    path = "/api/v1/admin/equipments/{id}/time-slots",
    params(("id" = i64, Path, description = "Equipment ID")),
    request_body = CreateTimeSlotRequest,
    responses(
        (status = 201, description = "Time slot created", body = ApiResponse<TimeSlotResponse>),
        (status = 404, description = "Equipment not found", body = ErrorBody),
        (status = 422, description = "Empty or overlapping slot", body = ErrorBody)
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn create_time_slot(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    Json(request): Json<CreateTimeSlotRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<TimeSlotResponse>>)> {
    let slot = TimeSlotService::create_time_slot(
        &state.db,
        &state.cache,
        &admin.context(),
        id,
        request.into(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::created(slot.into()))))
}

/// Close a time slot for booking
#[utoipa::path(
    delete,
    path = "/api/v1/admin/time-slots/{id}",
    params(("id" = i64, Path, description = "Time slot ID")),
    responses(
        (status = 200, description = "Time slot closed", body = ApiResponse<TimeSlotResponse>),
        (status = 404, description = "Time slot not found", body = ErrorBody)
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn deactivate_time_slot(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiResponse<TimeSlotResponse>>> {
    let slot =
        TimeSlotService::deactivate_time_slot(&state.db, &state.cache, &admin.context(), id)
            .await?;

    Ok(Json(ApiResponse::ok(slot.into())))
}
