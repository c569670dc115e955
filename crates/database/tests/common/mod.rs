#![allow(dead_code)]

use chrono::{Duration, NaiveDateTime, Timelike, Utc};
use database::{
    cache::Cache,
    context::RequestContext,
    entities::{equipment, laboratories, students, teachers},
    services::{
        equipment::{EquipmentService, NewEquipment},
        laboratory::{LaboratoryService, NewLaboratory},
        time_slot::{NewTimeSlot, TimeSlotService},
        user::{NewStudent, UserService},
    },
};
use migration::{Migrator, MigratorTrait};
use models::{equipment::EquipmentCategory, user_type::UserType};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectOptions, Database, DatabaseConnection,
};

/// Fresh in-memory database with all migrations applied. A single pooled
/// connection keeps the in-memory database alive for the whole test.
pub async fn setup() -> (DatabaseConnection, Cache) {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);

    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    (db, Cache::local())
}

pub fn admin() -> RequestContext {
    RequestContext::new("admin", UserType::Admin)
}

pub fn student(id: &str) -> RequestContext {
    RequestContext::new(id, UserType::Student)
}

pub fn teacher(id: &str) -> RequestContext {
    RequestContext::new(id, UserType::Teacher)
}

/// Whole-second time `hours` from now, so values survive a database round trip
pub fn hours_from_now(hours: i64) -> NaiveDateTime {
    (Utc::now().naive_utc() + Duration::hours(hours))
        .with_nanosecond(0)
        .unwrap()
}

pub async fn create_lab(db: &DatabaseConnection, cache: &Cache, name: &str) -> laboratories::Model {
    LaboratoryService::create_laboratory(
        db,
        cache,
        &admin(),
        NewLaboratory {
            name: name.to_string(),
            location: Some("Building A".to_string()),
        },
    )
    .await
    .unwrap()
}

pub async fn create_teacher(db: &DatabaseConnection, id: &str, lab_id: i32) -> teachers::Model {
    teachers::ActiveModel {
        id: Set(id.to_string()),
        name: Set(format!("Teacher {id}")),
        dept: Set(None),
        lab_id: Set(lab_id),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_student(
    db: &DatabaseConnection,
    id: &str,
    lab_id: Option<i32>,
    t_id: Option<&str>,
) -> students::Model {
    UserService::create_student(
        db,
        &admin(),
        NewStudent {
            id: id.to_string(),
            name: format!("Student {id}"),
            dept: None,
            lab_id,
            t_id: t_id.map(str::to_string),
        },
    )
    .await
    .unwrap()
}

pub async fn create_equipment(
    db: &DatabaseConnection,
    cache: &Cache,
    lab_id: i32,
    name: &str,
) -> equipment::Model {
    EquipmentService::create_equipment(
        db,
        cache,
        &admin(),
        NewEquipment {
            name: name.to_string(),
            lab_id: Some(lab_id),
            category: EquipmentCategory::Lab,
            status: None,
        },
    )
    .await
    .unwrap()
}

pub async fn open_slot(
    db: &DatabaseConnection,
    cache: &Cache,
    equip_id: i64,
    start_hours: i64,
    end_hours: i64,
) -> database::entities::time_slots::Model {
    TimeSlotService::create_time_slot(
        db,
        cache,
        &admin(),
        equip_id,
        NewTimeSlot {
            start_time: hours_from_now(start_hours),
            end_time: hours_from_now(end_hours),
        },
    )
    .await
    .unwrap()
}
