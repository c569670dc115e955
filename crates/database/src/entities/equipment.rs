use models::equipment::{EquipmentCategory, EquipmentStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "equipment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub lab_id: Option<i32>, // None for college-wide equipment
    pub category: EquipmentCategory,
    pub status: EquipmentStatus,
    /// Start of the nearest open time slot, maintained by `Propagator`
    pub next_avail_time: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::laboratories::Entity",
        from = "Column::LabId",
        to = "super::laboratories::Column::Id"
    )]
    Laboratory,
    #[sea_orm(has_many = "super::time_slots::Entity")]
    TimeSlots,
    #[sea_orm(has_many = "super::reservations::Entity")]
    Reservations,
}

impl Related<super::laboratories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Laboratory.def()
    }
}

impl Related<super::time_slots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TimeSlots.def()
    }
}

impl Related<super::reservations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
