use chrono::NaiveDateTime;
use database::{
    entities::{equipment, time_slots},
    services::{
        equipment::{EquipmentChanges, EquipmentPage, EquipmentQuery, NewEquipment},
        time_slot::NewTimeSlot,
    },
};
use models::equipment::{EquipmentCategory, EquipmentStatus};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, ToSchema)]
pub struct EquipmentResponse {
    pub id: i64,
    pub name: String,
    pub lab_id: Option<i32>,
    #[schema(value_type = i32, example = 2)]
    pub category: EquipmentCategory,
    #[schema(value_type = i32, example = 1)]
    pub status: EquipmentStatus,
    pub next_avail_time: Option<NaiveDateTime>,
}

impl From<equipment::Model> for EquipmentResponse {
    fn from(model: equipment::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            lab_id: model.lab_id,
            category: model.category,
            status: model.status,
            next_avail_time: model.next_avail_time,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedEquipmentResponse {
    pub items: Vec<EquipmentResponse>,
    pub pagination: PaginationMeta,
}

impl From<EquipmentPage> for PaginatedEquipmentResponse {
    fn from(page: EquipmentPage) -> Self {
        let total_pages = page.total_items.div_ceil(page.per_page);
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            pagination: PaginationMeta {
                page: page.page,
                per_page: page.per_page,
                total_pages,
                total_items: page.total_items,
                has_next: page.page < total_pages,
                has_prev: page.page > 1,
            },
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EquipmentQueryParams {
    pub lab_id: Option<i32>,
    #[param(value_type = Option<i32>)]
    pub category: Option<EquipmentCategory>,
    #[param(value_type = Option<i32>)]
    pub status: Option<EquipmentStatus>,
    pub keyword: Option<String>,

    #[serde(default = "default_page")]
    pub page: u64,

    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

impl From<EquipmentQueryParams> for EquipmentQuery {
    fn from(params: EquipmentQueryParams) -> Self {
        Self {
            lab_id: params.lab_id,
            category: params.category,
            status: params.status,
            keyword: params.keyword,
            page: params.page,
            per_page: params.per_page,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEquipmentRequest {
    pub name: String,
    pub lab_id: Option<i32>,
    #[schema(value_type = i32, example = 2)]
    pub category: EquipmentCategory,
    #[schema(value_type = Option<i32>)]
    pub status: Option<EquipmentStatus>,
}

impl From<CreateEquipmentRequest> for NewEquipment {
    fn from(request: CreateEquipmentRequest) -> Self {
        Self {
            name: request.name,
            lab_id: request.lab_id,
            category: request.category,
            status: request.status,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEquipmentRequest {
    pub name: Option<String>,
    pub lab_id: Option<i32>,
    #[schema(value_type = Option<i32>)]
    pub category: Option<EquipmentCategory>,
    #[schema(value_type = Option<i32>)]
    pub status: Option<EquipmentStatus>,
}

impl From<UpdateEquipmentRequest> for EquipmentChanges {
    fn from(request: UpdateEquipmentRequest) -> Self {
        Self {
            name: request.name,
            lab_id: request.lab_id,
            category: request.category,
            status: request.status,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TimeSlotResponse {
    pub id: i64,
    pub equip_id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub is_active: bool,
}

impl From<time_slots::Model> for TimeSlotResponse {
    fn from(slot: time_slots::Model) -> Self {
        Self {
            id: slot.id,
            equip_id: slot.equip_id,
            start_time: slot.start_time,
            end_time: slot.end_time,
            is_active: slot.is_active,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTimeSlotRequest {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

impl From<CreateTimeSlotRequest> for NewTimeSlot {
    fn from(request: CreateTimeSlotRequest) -> Self {
        Self {
            start_time: request.start_time,
            end_time: request.end_time,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TimeSlotQueryParams {
    /// Only slots still open for booking
    #[serde(default)]
    pub active_only: bool,
}
