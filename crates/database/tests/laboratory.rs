mod common;

use common::{admin, create_equipment, create_lab, create_student, create_teacher, setup};
use database::{
    entities::{laboratories, students},
    error::ServiceError,
    services::{
        audit_log::AuditLogService,
        laboratory::{LaboratoryChanges, LaboratoryService, NewLaboratory},
        user::UserService,
    },
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, prelude::Expr};
use serde_json::json;

#[tokio::test]
async fn test_rename_propagates_to_students() {
    let (db, cache) = setup().await;
    let physics = create_lab(&db, &cache, "Physics").await;
    let chemistry = create_lab(&db, &cache, "Chemistry").await;
    create_student(&db, "S1", Some(physics.id), None).await;
    create_student(&db, "S2", Some(physics.id), None).await;
    create_student(&db, "S3", Some(chemistry.id), None).await;

    let renamed = LaboratoryService::rename_laboratory(&db, &cache, &admin(), physics.id, "Optics")
        .await
        .unwrap();
    assert_eq!(renamed.name, "Optics");

    for id in ["S1", "S2"] {
        let student = UserService::get_student(&db, id).await.unwrap();
        assert_eq!(student.lab_name.as_deref(), Some("Optics"));
    }
    let other = UserService::get_student(&db, "S3").await.unwrap();
    assert_eq!(other.lab_name.as_deref(), Some("Chemistry"));

    let audit = AuditLogService::list_for_operator(&db, "admin", 1).await.unwrap();
    assert_eq!(audit[0].action_type, "lab_update");
}

#[tokio::test]
async fn test_rename_to_taken_name_changes_nothing() {
    let (db, cache) = setup().await;
    let physics = create_lab(&db, &cache, "Physics").await;
    create_lab(&db, &cache, "Chemistry").await;
    create_student(&db, "S1", Some(physics.id), None).await;

    let err = LaboratoryService::rename_laboratory(&db, &cache, &admin(), physics.id, "Chemistry")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation { .. }));
    assert_eq!(err.payload(), Some(&json!({"field": "name"})));

    let lab = laboratories::Entity::find_by_id(physics.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(lab.name, "Physics");
    let student = UserService::get_student(&db, "S1").await.unwrap();
    assert_eq!(student.lab_name.as_deref(), Some("Physics"));
}

#[tokio::test]
async fn test_same_name_update_skips_propagation() {
    let (db, cache) = setup().await;
    let physics = create_lab(&db, &cache, "Physics").await;
    create_student(&db, "S1", Some(physics.id), None).await;

    // Simulate drift so a propagation would be visible
    students::Entity::update_many()
        .col_expr(students::Column::LabName, Expr::value("stale"))
        .filter(students::Column::Id.eq("S1"))
        .exec(&db)
        .await
        .unwrap();

    let updated = LaboratoryService::update_laboratory(
        &db,
        &cache,
        &admin(),
        physics.id,
        LaboratoryChanges {
            name: Some("Physics".to_string()),
            location: Some("Building B".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.location.as_deref(), Some("Building B"));
    let student = UserService::get_student(&db, "S1").await.unwrap();
    assert_eq!(student.lab_name.as_deref(), Some("stale"));
}

#[tokio::test]
async fn test_create_rejects_duplicate_name() {
    let (db, cache) = setup().await;
    create_lab(&db, &cache, "Physics").await;

    let err = LaboratoryService::create_laboratory(
        &db,
        &cache,
        &admin(),
        NewLaboratory {
            name: "Physics".to_string(),
            location: None,
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.payload(), Some(&json!({"field": "name"})));
}

#[tokio::test]
async fn test_delete_guard_reports_blocking_counts() {
    let (db, cache) = setup().await;
    let physics = create_lab(&db, &cache, "Physics").await;
    create_student(&db, "S1", Some(physics.id), None).await;
    create_student(&db, "S2", Some(physics.id), None).await;

    let err = LaboratoryService::delete_laboratory(&db, &cache, &admin(), physics.id)
        .await
        .unwrap_err();
    assert_eq!(err.payload(), Some(&json!({"students": 2})));

    for id in ["S1", "S2"] {
        UserService::assign_student_lab(&db, &admin(), id, None)
            .await
            .unwrap();
    }
    create_teacher(&db, "T1", physics.id).await;

    let err = LaboratoryService::delete_laboratory(&db, &cache, &admin(), physics.id)
        .await
        .unwrap_err();
    assert_eq!(err.payload(), Some(&json!({"teachers": 1})));
}

#[tokio::test]
async fn test_delete_guard_counts_equipment() {
    let (db, cache) = setup().await;
    let physics = create_lab(&db, &cache, "Physics").await;
    create_equipment(&db, &cache, physics.id, "Oscilloscope").await;

    let err = LaboratoryService::delete_laboratory(&db, &cache, &admin(), physics.id)
        .await
        .unwrap_err();
    assert_eq!(err.payload(), Some(&json!({"equipment": 1})));
}

#[tokio::test]
async fn test_delete_unreferenced_lab() {
    let (db, cache) = setup().await;
    let physics = create_lab(&db, &cache, "Physics").await;

    LaboratoryService::delete_laboratory(&db, &cache, &admin(), physics.id)
        .await
        .unwrap();

    let err = LaboratoryService::get_laboratory(&db, &cache, physics.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = LaboratoryService::delete_laboratory(&db, &cache, &admin(), physics.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_detail_is_fresh_after_update() {
    let (db, cache) = setup().await;
    let physics = create_lab(&db, &cache, "Physics").await;

    let before = LaboratoryService::get_laboratory(&db, &cache, physics.id)
        .await
        .unwrap();
    assert_eq!(before.name, "Physics");

    LaboratoryService::rename_laboratory(&db, &cache, &admin(), physics.id, "Optics")
        .await
        .unwrap();

    let after = LaboratoryService::get_laboratory(&db, &cache, physics.id)
        .await
        .unwrap();
    assert_eq!(after.name, "Optics");
}

#[tokio::test]
async fn test_list_may_lag_until_ttl() {
    let (db, cache) = setup().await;
    create_lab(&db, &cache, "Physics").await;

    let first = LaboratoryService::list_laboratories(&db, &cache).await.unwrap();
    create_lab(&db, &cache, "Chemistry").await;
    let second = LaboratoryService::list_laboratories(&db, &cache).await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second, first);
}
