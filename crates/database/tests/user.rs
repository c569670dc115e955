mod common;

use common::{admin, create_lab, create_student, create_teacher, setup};
use database::{
    error::ServiceError,
    services::{
        audit_log::AuditLogService,
        seed::{SEED_ADMIN_ID, SEED_LAB_NAME, SEED_STUDENT_ID, SEED_TEACHER_ID, SeedService},
        user::{DEFAULT_DEPT, NewStudent, UserProfile, UserService},
    },
};
use models::user_type::UserType;
use serde_json::json;

#[tokio::test]
async fn test_create_student_copies_lab_name() {
    let (db, cache) = setup().await;
    let physics = create_lab(&db, &cache, "Physics").await;
    create_teacher(&db, "T1", physics.id).await;

    let student = create_student(&db, "S1", Some(physics.id), Some("T1")).await;
    assert_eq!(student.lab_name.as_deref(), Some("Physics"));
    assert_eq!(student.dept, DEFAULT_DEPT);

    let audit = AuditLogService::list_for_operator(&db, "admin", 1).await.unwrap();
    assert_eq!(audit[0].action_type, "student_create");
}

#[tokio::test]
async fn test_create_student_validates_references() {
    let (db, _cache) = setup().await;

    let err = UserService::create_student(
        &db,
        &admin(),
        NewStudent {
            id: "S1".to_string(),
            name: "Student".to_string(),
            dept: None,
            lab_id: Some(404),
            t_id: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.payload(), Some(&json!({"field": "lab_id"})));

    let err = UserService::create_student(
        &db,
        &admin(),
        NewStudent {
            id: "S1".to_string(),
            name: "Student".to_string(),
            dept: None,
            lab_id: None,
            t_id: Some("T404".to_string()),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.payload(), Some(&json!({"field": "t_id"})));
}

#[tokio::test]
async fn test_assign_lab_updates_lab_name() {
    let (db, cache) = setup().await;
    let physics = create_lab(&db, &cache, "Physics").await;
    let chemistry = create_lab(&db, &cache, "Chemistry").await;
    create_student(&db, "S1", Some(physics.id), None).await;

    let moved = UserService::assign_student_lab(&db, &admin(), "S1", Some(chemistry.id))
        .await
        .unwrap();
    assert_eq!(moved.lab_id, Some(chemistry.id));
    assert_eq!(moved.lab_name.as_deref(), Some("Chemistry"));

    let detached = UserService::assign_student_lab(&db, &admin(), "S1", None)
        .await
        .unwrap();
    assert_eq!(detached.lab_id, None);
    assert_eq!(detached.lab_name, None);
}

#[tokio::test]
async fn test_profile_lookup_by_role() {
    let (db, cache) = setup().await;
    let physics = create_lab(&db, &cache, "Physics").await;
    create_teacher(&db, "T1", physics.id).await;

    let profile = UserService::get_profile(&db, UserType::Teacher, "T1")
        .await
        .unwrap();
    assert!(matches!(profile, UserProfile::Teacher(_)));
    assert_eq!(profile.lab_id(), Some(physics.id));

    let err = UserService::get_profile(&db, UserType::Student, "T1")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_seed_is_idempotent() {
    let (db, _cache) = setup().await;

    let first = SeedService::init_users(&db).await.unwrap();
    assert!(first.users.iter().all(|user| user.created));

    let second = SeedService::init_users(&db).await.unwrap();
    assert_eq!(second.lab_id, first.lab_id);
    assert!(second.users.iter().all(|user| !user.created));

    let student = UserService::get_student(&db, SEED_STUDENT_ID).await.unwrap();
    assert_eq!(student.lab_name.as_deref(), Some(SEED_LAB_NAME));
    assert_eq!(student.t_id.as_deref(), Some(SEED_TEACHER_ID));

    let admin = UserService::get_admin(&db, SEED_ADMIN_ID).await.unwrap();
    assert_eq!(admin.manage_scope, Some(first.lab_id));
}
