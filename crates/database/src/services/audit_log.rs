use crate::{context::RequestContext, entities::audit_logs};
use models::audit_action::AuditAction;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

pub struct AuditLogService;

impl AuditLogService {
    /// Appends an audit record on `conn`, normally the transaction of the
    /// mutation being recorded
    pub async fn record<C: ConnectionTrait>(
        conn: &C,
        ctx: &RequestContext,
        action: AuditAction,
        detail: impl Into<String>,
    ) -> Result<audit_logs::Model, DbErr> {
        audit_logs::ActiveModel {
            operator_id: Set(ctx.operator_id.clone()),
            action_time: Set(super::now()),
            action_type: Set(action.to_string()),
            detail: Set(Some(detail.into())),
            ip_address: Set(ctx.ip_address.clone()),
            ..Default::default()
        }
        .insert(conn)
        .await
    }

    /// Most recent records of one operator, newest first
    pub async fn list_for_operator<C: ConnectionTrait>(
        conn: &C,
        operator_id: &str,
        limit: u64,
    ) -> Result<Vec<audit_logs::Model>, DbErr> {
        audit_logs::Entity::find()
            .filter(audit_logs::Column::OperatorId.eq(operator_id))
            .order_by_desc(audit_logs::Column::ActionTime)
            .order_by_desc(audit_logs::Column::Id)
            .limit(limit)
            .all(conn)
            .await
    }
}
