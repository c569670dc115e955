use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub dept: String,
    pub lab_id: Option<i32>,
    pub t_id: Option<String>, // Advisor
    /// Copy of the referenced laboratory's name. Only written through
    /// `Propagator`, never directly.
    pub lab_name: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::laboratories::Entity",
        from = "Column::LabId",
        to = "super::laboratories::Column::Id"
    )]
    Laboratory,
    #[sea_orm(
        belongs_to = "super::teachers::Entity",
        from = "Column::TId",
        to = "super::teachers::Column::Id"
    )]
    Advisor,
    #[sea_orm(has_many = "super::reservations::Entity")]
    Reservations,
}

impl Related<super::laboratories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Laboratory.def()
    }
}

impl Related<super::teachers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Advisor.def()
    }
}

impl Related<super::reservations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
