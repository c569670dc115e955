use crate::{
    cache::Cache,
    context::RequestContext,
    entities::{reservations, students, teachers},
    error::{ServiceError, ServiceResult},
    services::{
        audit_log::AuditLogService, equipment::EquipmentService, propagation::Propagator,
        time_slot::TimeSlotService,
    },
};
use models::{audit_action::AuditAction, reservation_status::ReservationStatus, user_type::UserType};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReservation {
    pub equip_id: i64,
    pub slot_id: Option<i64>,
    /// Approving teacher; defaults to the student's advisor
    pub teacher_id: Option<String>,
    pub remark: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

pub struct ReservationService;

impl ReservationService {
    /// Files a pending reservation for the calling student. When a slot is
    /// given it is claimed in the same transaction; a slot that is already
    /// taken fails the request.
    pub async fn create_reservation(
        db: &DatabaseConnection,
        cache: &Cache,
        ctx: &RequestContext,
        input: NewReservation,
    ) -> ServiceResult<reservations::Model> {
        if ctx.user_type != UserType::Student {
            return Err(ServiceError::forbidden("only students can make reservations"));
        }

        let txn = db.begin().await?;

        let student = students::Entity::find_by_id(ctx.operator_id.as_str())
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!("student {} does not exist", ctx.operator_id))
            })?;

        let equipment = EquipmentService::find_equipment(&txn, input.equip_id).await?;
        if !equipment.status.is_reservable() {
            return Err(ServiceError::validation(
                format!("equipment {} is not available for reservation", equipment.id),
                json!({ "field": "equip_id" }),
            ));
        }

        let teacher_id = Self::resolve_approver(&txn, &student, input.teacher_id).await?;

        if let Some(slot_id) = input.slot_id {
            let slot = TimeSlotService::find_time_slot(&txn, slot_id).await?;
            if slot.equip_id != equipment.id {
                return Err(ServiceError::validation(
                    format!("time slot {slot_id} does not belong to equipment {}", equipment.id),
                    json!({ "field": "slot_id" }),
                ));
            }

            if !TimeSlotService::claim(&txn, slot_id).await? {
                return Err(ServiceError::validation(
                    format!("time slot {slot_id} is no longer available"),
                    json!({ "field": "slot_id" }),
                ));
            }
            Propagator::refresh_next_avail_time(&txn, equipment.id, super::now()).await?;
        }

        let reservation = reservations::ActiveModel {
            student_id: Set(student.id),
            teacher_id: Set(teacher_id),
            equip_id: Set(equipment.id),
            slot_id: Set(input.slot_id),
            status: Set(ReservationStatus::Pending),
            apply_time: Set(super::now()),
            review_time: Set(None),
            remark: Set(input.remark),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        AuditLogService::record(
            &txn,
            ctx,
            AuditAction::ReservationCreate,
            format!(
                "reservation {} on equipment {} slot {:?}",
                reservation.id, reservation.equip_id, reservation.slot_id
            ),
        )
        .await?;
        txn.commit().await?;

        if reservation.slot_id.is_some() {
            cache.invalidate(&EquipmentService::detail_key(reservation.equip_id)).await;
        }
        Ok(reservation)
    }

    /// Approves or rejects a pending reservation. Only the approving teacher
    /// may review; rejection releases the slot.
    pub async fn review_reservation(
        db: &DatabaseConnection,
        cache: &Cache,
        ctx: &RequestContext,
        reservation_id: i64,
        decision: ReviewDecision,
        remark: Option<String>,
    ) -> ServiceResult<reservations::Model> {
        let txn = db.begin().await?;
        let reservation = Self::find_reservation(&txn, reservation_id).await?;

        if ctx.user_type != UserType::Teacher || reservation.teacher_id != ctx.operator_id {
            return Err(ServiceError::forbidden(format!(
                "reservation {reservation_id} is not assigned to {}",
                ctx.operator_id
            )));
        }
        if !reservation.status.is_reviewable() {
            return Err(ServiceError::validation(
                format!("reservation {reservation_id} has already been processed"),
                json!({ "field": "status" }),
            ));
        }

        let (status, action) = match decision {
            ReviewDecision::Approve => (ReservationStatus::Approved, AuditAction::ReservationApprove),
            ReviewDecision::Reject => (ReservationStatus::Rejected, AuditAction::ReservationReject),
        };

        let mut active: reservations::ActiveModel = reservation.into();
        active.status = Set(status);
        active.review_time = Set(Some(super::now()));
        if remark.is_some() {
            active.remark = Set(remark);
        }
        let updated = active.update(&txn).await?;

        let released = match decision {
            ReviewDecision::Reject => Self::release_slot(&txn, &updated).await?,
            ReviewDecision::Approve => false,
        };

        AuditLogService::record(
            &txn,
            ctx,
            action,
            format!("reviewed reservation {reservation_id}: {decision:?}"),
        )
        .await?;
        txn.commit().await?;

        if released {
            cache.invalidate(&EquipmentService::detail_key(updated.equip_id)).await;
        }
        Ok(updated)
    }

    /// Withdraws a live reservation on behalf of the student who made it and
    /// releases its slot
    pub async fn cancel_reservation(
        db: &DatabaseConnection,
        cache: &Cache,
        ctx: &RequestContext,
        reservation_id: i64,
    ) -> ServiceResult<reservations::Model> {
        let txn = db.begin().await?;
        let reservation = Self::find_reservation(&txn, reservation_id).await?;

        if reservation.student_id != ctx.operator_id {
            return Err(ServiceError::forbidden(format!(
                "reservation {reservation_id} does not belong to {}",
                ctx.operator_id
            )));
        }
        if !reservation.status.is_live() {
            return Err(ServiceError::validation(
                format!("reservation {reservation_id} can no longer be cancelled"),
                json!({ "field": "status" }),
            ));
        }

        let mut active: reservations::ActiveModel = reservation.into();
        active.status = Set(ReservationStatus::Cancelled);
        let updated = active.update(&txn).await?;

        let released = Self::release_slot(&txn, &updated).await?;
        AuditLogService::record(
            &txn,
            ctx,
            AuditAction::ReservationCancel,
            format!("cancelled reservation {reservation_id}"),
        )
        .await?;
        txn.commit().await?;

        if released {
            cache.invalidate(&EquipmentService::detail_key(updated.equip_id)).await;
        }
        Ok(updated)
    }

    /// Reservations visible to the caller: students see their own, teachers
    /// the ones they approve, admins all of them. Newest first.
    pub async fn list_reservations(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        status: Option<ReservationStatus>,
    ) -> ServiceResult<Vec<reservations::Model>> {
        let mut query = reservations::Entity::find()
            .order_by_desc(reservations::Column::ApplyTime)
            .order_by_desc(reservations::Column::Id);

        query = match ctx.user_type {
            UserType::Student => {
                query.filter(reservations::Column::StudentId.eq(ctx.operator_id.as_str()))
            }
            UserType::Teacher => {
                query.filter(reservations::Column::TeacherId.eq(ctx.operator_id.as_str()))
            }
            UserType::Admin => query,
        };
        if let Some(status) = status {
            query = query.filter(reservations::Column::Status.eq(status));
        }

        Ok(query.all(db).await?)
    }

    async fn find_reservation(
        txn: &DatabaseTransaction,
        reservation_id: i64,
    ) -> ServiceResult<reservations::Model> {
        reservations::Entity::find_by_id(reservation_id)
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!("reservation {reservation_id} does not exist"))
            })
    }

    async fn resolve_approver(
        txn: &DatabaseTransaction,
        student: &students::Model,
        requested: Option<String>,
    ) -> ServiceResult<String> {
        let Some(teacher_id) = requested.or_else(|| student.t_id.clone()) else {
            return Err(ServiceError::validation(
                "no approving teacher given and the student has no advisor",
                json!({ "field": "teacher_id" }),
            ));
        };

        if teachers::Entity::find_by_id(teacher_id.as_str())
            .one(txn)
            .await?
            .is_none()
        {
            return Err(ServiceError::validation(
                format!("teacher {teacher_id} does not exist"),
                json!({ "field": "teacher_id" }),
            ));
        }

        Ok(teacher_id)
    }

    /// Returns whether the slot was reopened and `next_avail_time` refreshed
    async fn release_slot(
        txn: &DatabaseTransaction,
        reservation: &reservations::Model,
    ) -> ServiceResult<bool> {
        let Some(slot_id) = reservation.slot_id else {
            return Ok(false);
        };

        if !TimeSlotService::release(txn, slot_id).await? {
            return Ok(false);
        }
        Propagator::refresh_next_avail_time(txn, reservation.equip_id, super::now()).await?;
        Ok(true)
    }
}
