use crate::{
    auth::CurrentUser,
    dtos::{
        ApiResponse,
        equipment::{
            EquipmentQueryParams, EquipmentResponse, PaginatedEquipmentResponse,
            TimeSlotQueryParams, TimeSlotResponse,
        },
    },
    error::{ApiResult, ErrorBody},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use database::services::{equipment::EquipmentService, time_slot::TimeSlotService};

/// Get paginated list of equipment
#[utoipa::path(
    get,
    path = "/api/v1/equipments",
    params(EquipmentQueryParams),
    responses(
        (status = 200, description = "Equipment page", body = ApiResponse<PaginatedEquipmentResponse>),
        (status = 400, description = "Invalid query parameters")
    ),
    security(("jwt" = [])),
    tag = "Equipment"
)]
pub async fn list_equipment(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<EquipmentQueryParams>,
) -> ApiResult<Json<ApiResponse<PaginatedEquipmentResponse>>> {
    let page = EquipmentService::list_equipment(&state.db, &state.cache, params.into()).await?;
    Ok(Json(ApiResponse::ok(page.into())))
}

/// Get a piece of equipment by ID
#[utoipa::path(
    get,
    path = "/api/v1/equipments/{id}",
    params(("id" = i64, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment found", body = ApiResponse<EquipmentResponse>),
        (status = 404, description = "Equipment not found", body = ErrorBody)
    ),
    security(("jwt" = [])),
    tag = "Equipment"
)]
pub async fn get_equipment(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiResponse<EquipmentResponse>>> {
    let equipment = EquipmentService::get_equipment(&state.db, &state.cache, id).await?;
    Ok(Json(ApiResponse::ok(equipment.into())))
}

/// List the time slots of a piece of equipment
#[utoipa::path(
    get,
    path = "/api/v1/equipments/{id}/time-slots",
    params(("id" = i64, Path, description = "Equipment ID"), TimeSlotQueryParams),
    responses(
        (status = 200, description = "Time slots ordered by start", body = ApiResponse<Vec<TimeSlotResponse>>),
        (status = 404, description = "Equipment not found", body = ErrorBody)
    ),
    security(("jwt" = [])),
    tag = "Equipment"
)]
pub async fn list_time_slots(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
    Query(params): Query<TimeSlotQueryParams>,
) -> ApiResult<Json<ApiResponse<Vec<TimeSlotResponse>>>> {
    let slots = TimeSlotService::list_time_slots(&state.db, id, params.active_only).await?;
    Ok(Json(ApiResponse::ok(
        slots.into_iter().map(Into::into).collect(),
    )))
}
