use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create laboratories table
        manager
            .create_table(
                Table::create()
                    .table(Laboratories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Laboratories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Laboratories::Name)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Laboratories::Location).string_len(100))
                    .to_owned(),
            )
            .await?;

        // Create teachers table
        manager
            .create_table(
                Table::create()
                    .table(Teachers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Teachers::Id)
                            .string_len(10)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Teachers::Name).string_len(50).not_null())
                    .col(ColumnDef::new(Teachers::Dept).string_len(50))
                    .col(ColumnDef::new(Teachers::LabId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-teachers-lab_id")
                            .from(Teachers::Table, Teachers::LabId)
                            .to(Laboratories::Table, Laboratories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Create students table
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::Id)
                            .string_len(10)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Students::Name).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Students::Dept)
                            .string_len(50)
                            .not_null()
                            .default("本院"),
                    )
                    .col(ColumnDef::new(Students::LabId).integer())
                    .col(ColumnDef::new(Students::TId).string_len(10))
                    // Copy of laboratories.name, rewritten on every rename
                    .col(ColumnDef::new(Students::LabName).string_len(50))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-students-lab_id")
                            .from(Students::Table, Students::LabId)
                            .to(Laboratories::Table, Laboratories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-students-t_id")
                            .from(Students::Table, Students::TId)
                            .to(Teachers::Table, Teachers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create admins table
        manager
            .create_table(
                Table::create()
                    .table(Admins::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Admins::Id)
                            .string_len(10)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Admins::Name).string_len(20).not_null())
                    .col(ColumnDef::new(Admins::ManageScope).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-admins-manage_scope")
                            .from(Admins::Table, Admins::ManageScope)
                            .to(Laboratories::Table, Laboratories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create equipment table
        manager
            .create_table(
                Table::create()
                    .table(Equipment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Equipment::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Equipment::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Equipment::LabId).integer())
                    .col(ColumnDef::new(Equipment::Category).integer().not_null())
                    .col(
                        ColumnDef::new(Equipment::Status)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    // Earliest upcoming active time slot, recomputed on slot changes
                    .col(ColumnDef::new(Equipment::NextAvailTime).date_time())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-equipment-lab_id")
                            .from(Equipment::Table, Equipment::LabId)
                            .to(Laboratories::Table, Laboratories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Create time_slots table, owned by equipment
        manager
            .create_table(
                Table::create()
                    .table(TimeSlots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TimeSlots::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TimeSlots::EquipId).big_integer().not_null())
                    .col(ColumnDef::new(TimeSlots::StartTime).date_time().not_null())
                    .col(ColumnDef::new(TimeSlots::EndTime).date_time().not_null())
                    .col(
                        ColumnDef::new(TimeSlots::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-time_slots-equip_id")
                            .from(TimeSlots::Table, TimeSlots::EquipId)
                            .to(Equipment::Table, Equipment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create reservations table
        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reservations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Reservations::StudentId)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::TeacherId)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reservations::EquipId).big_integer().not_null())
                    .col(ColumnDef::new(Reservations::SlotId).big_integer())
                    .col(
                        ColumnDef::new(Reservations::Status)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Reservations::ApplyTime).date_time().not_null())
                    .col(ColumnDef::new(Reservations::ReviewTime).date_time())
                    .col(ColumnDef::new(Reservations::Remark).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reservations-student_id")
                            .from(Reservations::Table, Reservations::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reservations-teacher_id")
                            .from(Reservations::Table, Reservations::TeacherId)
                            .to(Teachers::Table, Teachers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reservations-equip_id")
                            .from(Reservations::Table, Reservations::EquipId)
                            .to(Equipment::Table, Equipment::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reservations-slot_id")
                            .from(Reservations::Table, Reservations::SlotId)
                            .to(TimeSlots::Table, TimeSlots::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create audit_logs table (append-only)
        manager
            .create_table(
                Table::create()
                    .table(AuditLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AuditLogs::OperatorId)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AuditLogs::ActionTime).date_time().not_null())
                    .col(
                        ColumnDef::new(AuditLogs::ActionType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AuditLogs::Detail).text())
                    .col(ColumnDef::new(AuditLogs::IpAddress).string_len(45))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order due to foreign key constraints
        manager
            .drop_table(Table::drop().table(AuditLogs::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TimeSlots::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Equipment::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Admins::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Teachers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Laboratories::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
pub(crate) enum Laboratories {
    Table,
    Id,
    Name,
    Location,
}

#[derive(Iden)]
pub(crate) enum Teachers {
    Table,
    Id,
    Name,
    Dept,
    LabId,
}

#[derive(Iden)]
pub(crate) enum Students {
    Table,
    Id,
    Name,
    Dept,
    LabId,
    TId,
    LabName,
}

#[derive(Iden)]
pub(crate) enum Admins {
    Table,
    Id,
    Name,
    ManageScope,
}

#[derive(Iden)]
pub(crate) enum Equipment {
    Table,
    Id,
    Name,
    LabId,
    Category,
    Status,
    NextAvailTime,
}

#[derive(Iden)]
pub(crate) enum TimeSlots {
    Table,
    Id,
    EquipId,
    StartTime,
    EndTime,
    IsActive,
}

#[derive(Iden)]
pub(crate) enum Reservations {
    Table,
    Id,
    StudentId,
    TeacherId,
    EquipId,
    SlotId,
    Status,
    ApplyTime,
    ReviewTime,
    Remark,
}

#[derive(Iden)]
pub(crate) enum AuditLogs {
    Table,
    Id,
    OperatorId,
    ActionTime,
    ActionType,
    Detail,
    IpAddress,
}
