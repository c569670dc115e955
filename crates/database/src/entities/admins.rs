use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admins")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub manage_scope: Option<i32>, // Laboratory the admin is responsible for
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::laboratories::Entity",
        from = "Column::ManageScope",
        to = "super::laboratories::Column::Id"
    )]
    Laboratory,
}

impl Related<super::laboratories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Laboratory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
