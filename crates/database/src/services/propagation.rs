//! Keeps denormalized columns in line with their source of truth.
//!
//! Each function here is the only writer of its column and must run on the
//! same transaction that changed the source, so no reader ever sees the copy
//! and the source disagree.

use crate::entities::{equipment, students, time_slots};
use chrono::NaiveDateTime;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, prelude::Expr,
};

pub struct Propagator;

impl Propagator {
    /// Copies a laboratory's name onto every student that references it, as a
    /// single bulk statement. Returns the number of student rows written.
    pub async fn propagate_lab_name<C: ConnectionTrait>(
        conn: &C,
        lab_id: i32,
        lab_name: &str,
    ) -> Result<u64, DbErr> {
        let result = students::Entity::update_many()
            .col_expr(students::Column::LabName, Expr::value(lab_name))
            .filter(students::Column::LabId.eq(lab_id))
            .exec(conn)
            .await?;

        log::debug!(
            "propagated lab name {lab_name:?} to {} students of lab {lab_id}",
            result.rows_affected
        );
        Ok(result.rows_affected)
    }

    /// Recomputes `equipment.next_avail_time` as the start of the earliest
    /// active slot that has not ended by `now`
    pub async fn refresh_next_avail_time<C: ConnectionTrait>(
        conn: &C,
        equip_id: i64,
        now: NaiveDateTime,
    ) -> Result<Option<NaiveDateTime>, DbErr> {
        let next = time_slots::Entity::find()
            .filter(time_slots::Column::EquipId.eq(equip_id))
            .filter(time_slots::Column::IsActive.eq(true))
            .filter(time_slots::Column::EndTime.gt(now))
            .order_by_asc(time_slots::Column::StartTime)
            .one(conn)
            .await?
            .map(|slot| slot.start_time);

        equipment::Entity::update_many()
            .col_expr(equipment::Column::NextAvailTime, Expr::value(next))
            .filter(equipment::Column::Id.eq(equip_id))
            .exec(conn)
            .await?;

        Ok(next)
    }
}
