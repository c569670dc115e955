use crate::{
    context::RequestContext,
    entities::{admins, students, teachers},
    error::{ServiceError, ServiceResult},
    services::{audit_log::AuditLogService, laboratory::LaboratoryService},
};
use models::{audit_action::AuditAction, user_type::UserType};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, DatabaseConnection, EntityTrait,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Department assigned when none is given
pub const DEFAULT_DEPT: &str = "本院";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudent {
    pub id: String,
    pub name: String,
    pub dept: Option<String>,
    pub lab_id: Option<i32>,
    pub t_id: Option<String>,
}

/// Profile of an authenticated user, whichever table it lives in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "user_type", rename_all = "snake_case")]
pub enum UserProfile {
    Student(students::Model),
    Teacher(teachers::Model),
    Admin(admins::Model),
}

impl UserProfile {
    pub fn user_type(&self) -> UserType {
        match self {
            Self::Student(_) => UserType::Student,
            Self::Teacher(_) => UserType::Teacher,
            Self::Admin(_) => UserType::Admin,
        }
    }

    /// The laboratory the user belongs to or manages
    pub fn lab_id(&self) -> Option<i32> {
        match self {
            Self::Student(student) => student.lab_id,
            Self::Teacher(teacher) => Some(teacher.lab_id),
            Self::Admin(admin) => admin.manage_scope,
        }
    }
}

pub struct UserService;

impl UserService {
    pub async fn get_student<C: ConnectionTrait>(
        conn: &C,
        student_id: &str,
    ) -> ServiceResult<students::Model> {
        students::Entity::find_by_id(student_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("student {student_id} does not exist")))
    }

    pub async fn get_teacher<C: ConnectionTrait>(
        conn: &C,
        teacher_id: &str,
    ) -> ServiceResult<teachers::Model> {
        teachers::Entity::find_by_id(teacher_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("teacher {teacher_id} does not exist")))
    }

    pub async fn get_admin<C: ConnectionTrait>(
        conn: &C,
        admin_id: &str,
    ) -> ServiceResult<admins::Model> {
        admins::Entity::find_by_id(admin_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("admin {admin_id} does not exist")))
    }

    pub async fn get_profile<C: ConnectionTrait>(
        conn: &C,
        user_type: UserType,
        user_id: &str,
    ) -> ServiceResult<UserProfile> {
        Ok(match user_type {
            UserType::Student => UserProfile::Student(Self::get_student(conn, user_id).await?),
            UserType::Teacher => UserProfile::Teacher(Self::get_teacher(conn, user_id).await?),
            UserType::Admin => UserProfile::Admin(Self::get_admin(conn, user_id).await?),
        })
    }

    /// Creates a student, copying the laboratory's current name into
    /// `lab_name`
    pub async fn create_student(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        input: NewStudent,
    ) -> ServiceResult<students::Model> {
        let txn = db.begin().await?;

        if students::Entity::find_by_id(input.id.as_str())
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(ServiceError::validation(
                format!("student {} already exists", input.id),
                json!({ "field": "id" }),
            ));
        }

        let lab_name = match input.lab_id {
            Some(lab_id) => Some(Self::lab_name_for(&txn, lab_id).await?),
            None => None,
        };
        if let Some(t_id) = &input.t_id {
            match Self::get_teacher(&txn, t_id).await {
                Ok(_) => {}
                Err(ServiceError::NotFound(message)) => {
                    return Err(ServiceError::validation(message, json!({ "field": "t_id" })));
                }
                Err(e) => return Err(e),
            }
        }

        let student = students::ActiveModel {
            id: Set(input.id),
            name: Set(input.name),
            dept: Set(input.dept.unwrap_or_else(|| DEFAULT_DEPT.to_string())),
            lab_id: Set(input.lab_id),
            t_id: Set(input.t_id),
            lab_name: Set(lab_name),
        }
        .insert(&txn)
        .await?;

        AuditLogService::record(
            &txn,
            ctx,
            AuditAction::StudentCreate,
            format!("created student {} ({})", student.id, student.name),
        )
        .await?;
        txn.commit().await?;

        Ok(student)
    }

    /// Moves a student to another laboratory, or out of any, keeping
    /// `lab_name` in step
    pub async fn assign_student_lab(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        student_id: &str,
        lab_id: Option<i32>,
    ) -> ServiceResult<students::Model> {
        let txn = db.begin().await?;
        let student = Self::get_student(&txn, student_id).await?;

        let lab_name = match lab_id {
            Some(lab_id) => Some(Self::lab_name_for(&txn, lab_id).await?),
            None => None,
        };

        let mut active: students::ActiveModel = student.into();
        active.lab_id = Set(lab_id);
        active.lab_name = Set(lab_name);
        let updated = active.update(&txn).await?;

        AuditLogService::record(
            &txn,
            ctx,
            AuditAction::StudentAssignLab,
            format!("moved student {student_id} to laboratory {lab_id:?}"),
        )
        .await?;
        txn.commit().await?;

        Ok(updated)
    }

    async fn lab_name_for<C: ConnectionTrait>(conn: &C, lab_id: i32) -> ServiceResult<String> {
        match LaboratoryService::find_laboratory(conn, lab_id).await {
            Ok(lab) => Ok(lab.name),
            Err(ServiceError::NotFound(message)) => Err(ServiceError::validation(
                message,
                json!({ "field": "lab_id" }),
            )),
            Err(e) => Err(e),
        }
    }
}
