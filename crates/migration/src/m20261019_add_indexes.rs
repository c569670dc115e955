use sea_orm_migration::prelude::*;

use crate::m20261019_create_all_tables::{
    AuditLogs, Equipment, Reservations, Students, Teachers, TimeSlots,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (index name, table, columns)
type IndexSpec = (&'static str, DynIden, Vec<DynIden>);

fn index_specs() -> Vec<IndexSpec> {
    vec![
        // Student lookups by laboratory drive the lab_name propagation
        ("idx_student_lab_id", Students::Table.into_iden(), vec![Students::LabId.into_iden()]),
        ("idx_student_t_id", Students::Table.into_iden(), vec![Students::TId.into_iden()]),
        (
            "idx_student_lab_t",
            Students::Table.into_iden(),
            vec![Students::LabId.into_iden(), Students::TId.into_iden()],
        ),
        ("idx_teacher_lab_id", Teachers::Table.into_iden(), vec![Teachers::LabId.into_iden()]),
        ("idx_equipment_lab_id", Equipment::Table.into_iden(), vec![Equipment::LabId.into_iden()]),
        ("idx_equipment_status", Equipment::Table.into_iden(), vec![Equipment::Status.into_iden()]),
        (
            "idx_equipment_category",
            Equipment::Table.into_iden(),
            vec![Equipment::Category.into_iden()],
        ),
        (
            "idx_equipment_lab_status",
            Equipment::Table.into_iden(),
            vec![Equipment::LabId.into_iden(), Equipment::Status.into_iden()],
        ),
        // Keyword search on equipment names
        ("idx_equipment_name", Equipment::Table.into_iden(), vec![Equipment::Name.into_iden()]),
        ("idx_timeslot_equip_id", TimeSlots::Table.into_iden(), vec![TimeSlots::EquipId.into_iden()]),
        (
            "idx_timeslot_is_active",
            TimeSlots::Table.into_iden(),
            vec![TimeSlots::IsActive.into_iden()],
        ),
        (
            "idx_timeslot_equip_active",
            TimeSlots::Table.into_iden(),
            vec![TimeSlots::EquipId.into_iden(), TimeSlots::IsActive.into_iden()],
        ),
        (
            "idx_reservation_equip_id",
            Reservations::Table.into_iden(),
            vec![Reservations::EquipId.into_iden()],
        ),
        (
            "idx_reservation_student_id",
            Reservations::Table.into_iden(),
            vec![Reservations::StudentId.into_iden()],
        ),
        (
            "idx_reservation_teacher_id",
            Reservations::Table.into_iden(),
            vec![Reservations::TeacherId.into_iden()],
        ),
        (
            "idx_reservation_status",
            Reservations::Table.into_iden(),
            vec![Reservations::Status.into_iden()],
        ),
        (
            "idx_reservation_apply_time",
            Reservations::Table.into_iden(),
            vec![Reservations::ApplyTime.into_iden()],
        ),
        (
            "idx_reservation_equip_status",
            Reservations::Table.into_iden(),
            vec![Reservations::EquipId.into_iden(), Reservations::Status.into_iden()],
        ),
        (
            "idx_reservation_student_status",
            Reservations::Table.into_iden(),
            vec![Reservations::StudentId.into_iden(), Reservations::Status.into_iden()],
        ),
        (
            "idx_reservation_teacher_status",
            Reservations::Table.into_iden(),
            vec![Reservations::TeacherId.into_iden(), Reservations::Status.into_iden()],
        ),
        (
            "idx_auditlog_operator_id",
            AuditLogs::Table.into_iden(),
            vec![AuditLogs::OperatorId.into_iden()],
        ),
        (
            "idx_auditlog_action_time",
            AuditLogs::Table.into_iden(),
            vec![AuditLogs::ActionTime.into_iden()],
        ),
        (
            "idx_auditlog_action_type",
            AuditLogs::Table.into_iden(),
            vec![AuditLogs::ActionType.into_iden()],
        ),
        (
            "idx_auditlog_operator_time",
            AuditLogs::Table.into_iden(),
            vec![AuditLogs::OperatorId.into_iden(), AuditLogs::ActionTime.into_iden()],
        ),
    ]
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, columns) in index_specs() {
            let mut index = Index::create();
            index.name(name).table(table).if_not_exists();
            for column in columns {
                index.col(column);
            }

            manager.create_index(index.to_owned()).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, _) in index_specs().into_iter().rev() {
            manager
                .drop_index(Index::drop().name(name).table(table).to_owned())
                .await?;
        }

        Ok(())
    }
}
