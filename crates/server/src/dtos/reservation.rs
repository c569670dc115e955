use chrono::NaiveDateTime;
use database::{
    entities::reservations,
    services::reservation::{NewReservation, ReviewDecision},
};
use models::reservation_status::ReservationStatus;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, ToSchema)]
pub struct ReservationResponse {
    pub id: i64,
    pub student_id: String,
    pub teacher_id: String,
    pub equip_id: i64,
    pub slot_id: Option<i64>,
    #[schema(value_type = String, example = "pending")]
    pub status: ReservationStatus,
    pub apply_time: NaiveDateTime,
    pub review_time: Option<NaiveDateTime>,
    pub remark: Option<String>,
}

impl From<reservations::Model> for ReservationResponse {
    fn from(model: reservations::Model) -> Self {
        Self {
            id: model.id,
            student_id: model.student_id,
            teacher_id: model.teacher_id,
            equip_id: model.equip_id,
            slot_id: model.slot_id,
            status: model.status,
            apply_time: model.apply_time,
            review_time: model.review_time,
            remark: model.remark,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReservationRequest {
    pub equip_id: i64,
    pub slot_id: Option<i64>,
    pub teacher_id: Option<String>,
    pub remark: Option<String>,
}

impl From<CreateReservationRequest> for NewReservation {
    fn from(request: CreateReservationRequest) -> Self {
        Self {
            equip_id: request.equip_id,
            slot_id: request.slot_id,
            teacher_id: request.teacher_id,
            remark: request.remark,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewReservationRequest {
    #[schema(value_type = String, example = "approve")]
    pub decision: ReviewDecision,
    pub remark: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReservationQueryParams {
    #[param(value_type = Option<String>)]
    pub status: Option<ReservationStatus>,
}
