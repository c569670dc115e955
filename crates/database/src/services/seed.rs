//! Development fixtures: one laboratory and one user of each role.

use crate::{
    entities::{admins, laboratories, students, teachers},
    error::ServiceResult,
    services::user::DEFAULT_DEPT,
};
use models::user_type::UserType;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    TransactionTrait,
};

pub const SEED_LAB_NAME: &str = "L1";
pub const SEED_STUDENT_ID: &str = "2023001";
pub const SEED_TEACHER_ID: &str = "T001";
pub const SEED_ADMIN_ID: &str = "admin";

#[derive(Debug, Clone, PartialEq)]
pub struct SeedUser {
    pub id: String,
    pub user_type: UserType,
    pub lab_id: Option<i32>,
    /// `false` when the user already existed
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeedReport {
    pub lab_id: i32,
    pub users: Vec<SeedUser>,
}

pub struct SeedService;

impl SeedService {
    /// Creates the seed laboratory and users, skipping any that already
    /// exist. Safe to run repeatedly.
    pub async fn init_users(db: &DatabaseConnection) -> ServiceResult<SeedReport> {
        let txn = db.begin().await?;

        let existing_lab = laboratories::Entity::find()
            .filter(laboratories::Column::Name.eq(SEED_LAB_NAME))
            .one(&txn)
            .await?;
        let lab = match existing_lab {
            Some(lab) => lab,
            None => {
                laboratories::ActiveModel {
                    name: Set(SEED_LAB_NAME.to_string()),
                    location: Set(None),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
        };

        let mut users = Vec::with_capacity(3);

        let teacher_created = teachers::Entity::find_by_id(SEED_TEACHER_ID)
            .one(&txn)
            .await?
            .is_none();
        if teacher_created {
            teachers::ActiveModel {
                id: Set(SEED_TEACHER_ID.to_string()),
                name: Set("Teacher One".to_string()),
                dept: Set(Some(DEFAULT_DEPT.to_string())),
                lab_id: Set(lab.id),
            }
            .insert(&txn)
            .await?;
        }
        users.push(SeedUser {
            id: SEED_TEACHER_ID.to_string(),
            user_type: UserType::Teacher,
            lab_id: Some(lab.id),
            created: teacher_created,
        });

        let student_created = students::Entity::find_by_id(SEED_STUDENT_ID)
            .one(&txn)
            .await?
            .is_none();
        if student_created {
            students::ActiveModel {
                id: Set(SEED_STUDENT_ID.to_string()),
                name: Set("Student One".to_string()),
                dept: Set(DEFAULT_DEPT.to_string()),
                lab_id: Set(Some(lab.id)),
                t_id: Set(Some(SEED_TEACHER_ID.to_string())),
                lab_name: Set(Some(lab.name.clone())),
            }
            .insert(&txn)
            .await?;
        }
        users.push(SeedUser {
            id: SEED_STUDENT_ID.to_string(),
            user_type: UserType::Student,
            lab_id: Some(lab.id),
            created: student_created,
        });

        let admin_created = admins::Entity::find_by_id(SEED_ADMIN_ID)
            .one(&txn)
            .await?
            .is_none();
        if admin_created {
            admins::ActiveModel {
                id: Set(SEED_ADMIN_ID.to_string()),
                name: Set("Administrator".to_string()),
                manage_scope: Set(Some(lab.id)),
            }
            .insert(&txn)
            .await?;
        }
        users.push(SeedUser {
            id: SEED_ADMIN_ID.to_string(),
            user_type: UserType::Admin,
            lab_id: Some(lab.id),
            created: admin_created,
        });

        txn.commit().await?;

        for user in users.iter().filter(|user| user.created) {
            log::info!("seeded {} {}", user.user_type, user.id);
        }

        Ok(SeedReport {
            lab_id: lab.id,
            users,
        })
    }
}
