use crate::{
    auth::CurrentUser,
    dtos::{
        ApiResponse,
        reservation::{
            CreateReservationRequest, ReservationQueryParams, ReservationResponse,
            ReviewReservationRequest,
        },
    },
    error::{ApiResult, ErrorBody},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use database::services::reservation::ReservationService;

/// Reservations visible to the caller
#[utoipa::path(
    get,
    path = "/api/v1/reservations",
    params(ReservationQueryParams),
    responses(
        (status = 200, description = "Reservations, newest first", body = ApiResponse<Vec<ReservationResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("jwt" = [])),
    tag = "Reservations"
)]
pub async fn list_reservations(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ReservationQueryParams>,
) -> ApiResult<Json<ApiResponse<Vec<ReservationResponse>>>> {
    let reservations =
        ReservationService::list_reservations(&state.db, &user.context(), params.status).await?;

    Ok(Json(ApiResponse::ok(
        reservations.into_iter().map(Into::into).collect(),
    )))
}

/// Request a piece of equipment, optionally claiming one of its time slots
#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation pending review", body = ApiResponse<ReservationResponse>),
        (status = 403, description = "Caller is not a student", body = ErrorBody),
        (status = 422, description = "Slot taken or equipment unavailable", body = ErrorBody)
    ),
    security(("jwt" = [])),
    tag = "Reservations"
)]
pub async fn create_reservation(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateReservationRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ReservationResponse>>)> {
    let reservation = ReservationService::create_reservation(
        &state.db,
        &state.cache,
        &user.context(),
        request.into(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::created(reservation.into()))))
}

/// Approve or reject a pending reservation
#[utoipa::path(
    put,
    path = "/api/v1/reservations/{id}/review",
    params(("id" = i64, Path, description = "Reservation ID")),
    request_body = ReviewReservationRequest,
    responses(
        (status = 200, description = "Reservation reviewed", body = ApiResponse<ReservationResponse>),
        (status = 403, description = "Caller is not the approving teacher", body = ErrorBody),
        (status = 404, description = "Reservation not found", body = ErrorBody),
        (status = 422, description = "Reservation already processed", body = ErrorBody)
    ),
    security(("jwt" = [])),
    tag = "Reservations"
)]
pub async fn review_reservation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<ReviewReservationRequest>,
) -> ApiResult<Json<ApiResponse<ReservationResponse>>> {
    let reservation = ReservationService::review_reservation(
        &state.db,
        &state.cache,
        &user.context(),
        id,
        request.decision,
        request.remark,
    )
    .await?;

    Ok(Json(ApiResponse::ok(reservation.into())))
}

/// Cancel one of the caller's reservations
#[utoipa::path(
    post,
    path = "/api/v1/reservations/{id}/cancel",
    params(("id" = i64, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation cancelled", body = ApiResponse<ReservationResponse>),
        (status = 403, description = "Reservation belongs to someone else", body = ErrorBody),
        (status = 404, description = "Reservation not found", body = ErrorBody),
        (status = 422, description = "Reservation already closed", body = ErrorBody)
    ),
    security(("jwt" = [])),
    tag = "Reservations"
)]
pub async fn cancel_reservation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiResponse<ReservationResponse>>> {
    let reservation =
        ReservationService::cancel_reservation(&state.db, &state.cache, &user.context(), id)
            .await?;

    Ok(Json(ApiResponse::ok(reservation.into())))
}
