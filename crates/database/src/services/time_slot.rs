use crate::{
    cache::Cache,
    context::RequestContext,
    entities::{reservations, time_slots},
    error::{ServiceError, ServiceResult},
    services::{audit_log::AuditLogService, equipment::EquipmentService, propagation::Propagator},
};
use chrono::NaiveDateTime;
use models::{audit_action::AuditAction, reservation_status::ReservationStatus};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::Expr,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTimeSlot {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

pub struct TimeSlotService;

impl TimeSlotService {
    pub async fn list_time_slots(
        db: &DatabaseConnection,
        equip_id: i64,
        active_only: bool,
    ) -> ServiceResult<Vec<time_slots::Model>> {
        EquipmentService::find_equipment(db, equip_id).await?;

        let mut query = time_slots::Entity::find()
            .filter(time_slots::Column::EquipId.eq(equip_id))
            .order_by_asc(time_slots::Column::StartTime);
        if active_only {
            query = query.filter(time_slots::Column::IsActive.eq(true));
        }

        Ok(query.all(db).await?)
    }

    /// Opens a bookable slot on a piece of equipment. The slot must not
    /// overlap any other active slot of the same equipment.
    pub async fn create_time_slot(
        db: &DatabaseConnection,
        cache: &Cache,
        ctx: &RequestContext,
        equip_id: i64,
        input: NewTimeSlot,
    ) -> ServiceResult<time_slots::Model> {
        if input.start_time >= input.end_time {
            return Err(ServiceError::validation(
                "time slot must end after it starts",
                json!({ "field": "end_time" }),
            ));
        }

        let txn = db.begin().await?;
        EquipmentService::find_equipment(&txn, equip_id).await?;

        if let Some(existing) =
            Self::find_overlapping(&txn, equip_id, input.start_time, input.end_time, None).await?
        {
            return Err(ServiceError::validation(
                format!("time slot overlaps active slot {}", existing.id),
                json!({ "field": "start_time", "conflict": existing.id }),
            ));
        }
        if let Some(held) =
            Self::find_held_overlapping(&txn, equip_id, input.start_time, input.end_time).await?
        {
            return Err(ServiceError::validation(
                format!("time slot overlaps slot {held}, which is already reserved"),
                json!({ "field": "start_time", "conflict": held }),
            ));
        }

        let slot = time_slots::ActiveModel {
            equip_id: Set(equip_id),
            start_time: Set(input.start_time),
            end_time: Set(input.end_time),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        Propagator::refresh_next_avail_time(&txn, equip_id, super::now()).await?;
        AuditLogService::record(
            &txn,
            ctx,
            AuditAction::SlotCreate,
            format!(
                "opened slot {} on equipment {equip_id}: {} - {}",
                slot.id, slot.start_time, slot.end_time
            ),
        )
        .await?;
        txn.commit().await?;

        cache.invalidate(&EquipmentService::detail_key(equip_id)).await;
        Ok(slot)
    }

    /// Closes a slot for booking. Reservations already holding it keep their
    /// reference.
    pub async fn deactivate_time_slot(
        db: &DatabaseConnection,
        cache: &Cache,
        ctx: &RequestContext,
        slot_id: i64,
    ) -> ServiceResult<time_slots::Model> {
        let txn = db.begin().await?;
        let slot = Self::find_time_slot(&txn, slot_id).await?;
        if !slot.is_active {
            return Ok(slot);
        }

        let equip_id = slot.equip_id;
        let mut active: time_slots::ActiveModel = slot.into();
        active.is_active = Set(false);
        let updated = active.update(&txn).await?;

        Propagator::refresh_next_avail_time(&txn, equip_id, super::now()).await?;
        AuditLogService::record(
            &txn,
            ctx,
            AuditAction::SlotDeactivate,
            format!("closed slot {slot_id} on equipment {equip_id}"),
        )
        .await?;
        txn.commit().await?;

        cache.invalidate(&EquipmentService::detail_key(equip_id)).await;
        Ok(updated)
    }

    pub(crate) async fn find_time_slot<C: ConnectionTrait>(
        conn: &C,
        slot_id: i64,
    ) -> ServiceResult<time_slots::Model> {
        time_slots::Entity::find_by_id(slot_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("time slot {slot_id} does not exist")))
    }

    /// Marks an active slot as taken. Returns `false` when the slot was
    /// already inactive, in which case nothing is written.
    pub(crate) async fn claim<C: ConnectionTrait>(conn: &C, slot_id: i64) -> Result<bool, DbErr> {
        let result = time_slots::Entity::update_many()
            .col_expr(time_slots::Column::IsActive, Expr::value(false))
            .filter(time_slots::Column::Id.eq(slot_id))
            .filter(time_slots::Column::IsActive.eq(true))
            .exec(conn)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Reopens a slot freed by a rejected or cancelled reservation, unless an
    /// active slot has since been opened over the same period. Returns whether
    /// the slot was reopened.
    pub(crate) async fn release<C: ConnectionTrait>(conn: &C, slot_id: i64) -> Result<bool, DbErr> {
        let Some(slot) = time_slots::Entity::find_by_id(slot_id).one(conn).await? else {
            return Ok(false);
        };
        if slot.is_active {
            return Ok(false);
        }

        let overlapping =
            Self::find_overlapping(conn, slot.equip_id, slot.start_time, slot.end_time, Some(slot.id))
                .await?;
        if let Some(other) = overlapping {
            log::info!("not reopening slot {slot_id}, active slot {} overlaps it", other.id);
            return Ok(false);
        }

        time_slots::Entity::update_many()
            .col_expr(time_slots::Column::IsActive, Expr::value(true))
            .filter(time_slots::Column::Id.eq(slot_id))
            .exec(conn)
            .await?;

        Ok(true)
    }

    /// First slot overlapping the window that a live reservation still holds
    async fn find_held_overlapping<C: ConnectionTrait>(
        conn: &C,
        equip_id: i64,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Result<Option<i64>, DbErr> {
        let slot_ids: Vec<i64> = time_slots::Entity::find()
            .filter(time_slots::Column::EquipId.eq(equip_id))
            .filter(time_slots::Column::IsActive.eq(false))
            .filter(time_slots::Column::StartTime.lt(end_time))
            .filter(time_slots::Column::EndTime.gt(start_time))
            .all(conn)
            .await?
            .into_iter()
            .map(|slot| slot.id)
            .collect();
        if slot_ids.is_empty() {
            return Ok(None);
        }

        let held = reservations::Entity::find()
            .filter(reservations::Column::SlotId.is_in(slot_ids))
            .filter(
                reservations::Column::Status
                    .is_in([ReservationStatus::Pending, ReservationStatus::Approved]),
            )
            .order_by_asc(reservations::Column::SlotId)
            .one(conn)
            .await?;

        Ok(held.and_then(|reservation| reservation.slot_id))
    }

    async fn find_overlapping<C: ConnectionTrait>(
        conn: &C,
        equip_id: i64,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        except: Option<i64>,
    ) -> Result<Option<time_slots::Model>, DbErr> {
        let mut query = time_slots::Entity::find()
            .filter(time_slots::Column::EquipId.eq(equip_id))
            .filter(time_slots::Column::IsActive.eq(true))
            .filter(time_slots::Column::StartTime.lt(end_time))
            .filter(time_slots::Column::EndTime.gt(start_time));
        if let Some(slot_id) = except {
            query = query.filter(time_slots::Column::Id.ne(slot_id));
        }

        query.one(conn).await
    }
}
