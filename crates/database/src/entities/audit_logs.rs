use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only record of every mutation
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub operator_id: String,
    pub action_time: DateTime,
    pub action_type: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub detail: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
