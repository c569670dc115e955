use crate::{
    cache::{Cache, CacheKey},
    context::RequestContext,
    entities::{equipment, laboratories, students, teachers},
    error::{ServiceError, ServiceResult},
    services::{audit_log::AuditLogService, propagation::Propagator},
};
use models::audit_action::AuditAction;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewLaboratory {
    pub name: String,
    pub location: Option<String>,
}

/// Fields to change; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaboratoryChanges {
    pub name: Option<String>,
    pub location: Option<String>,
}

pub struct LaboratoryService;

impl LaboratoryService {
    const ENTITY: &'static str = "laboratory";

    pub fn detail_key(lab_id: i32) -> CacheKey {
        CacheKey::detail(Self::ENTITY, lab_id)
    }

    pub async fn list_laboratories(
        db: &DatabaseConnection,
        cache: &Cache,
    ) -> ServiceResult<Vec<laboratories::Model>> {
        let key = CacheKey::operation(Self::ENTITY, "list");
        cache
            .get_or_compute(&key, || async {
                laboratories::Entity::find()
                    .order_by_asc(laboratories::Column::Id)
                    .all(db)
                    .await
                    .map_err(ServiceError::from)
            })
            .await
    }

    pub async fn get_laboratory(
        db: &DatabaseConnection,
        cache: &Cache,
        lab_id: i32,
    ) -> ServiceResult<laboratories::Model> {
        cache
            .get_or_compute(&Self::detail_key(lab_id), || Self::find_laboratory(db, lab_id))
            .await
    }

    pub async fn create_laboratory(
        db: &DatabaseConnection,
        cache: &Cache,
        ctx: &RequestContext,
        input: NewLaboratory,
    ) -> ServiceResult<laboratories::Model> {
        let txn = db.begin().await?;

        Self::ensure_name_available(&txn, &input.name, None).await?;

        let lab = laboratories::ActiveModel {
            name: Set(input.name),
            location: Set(input.location),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(Self::name_conflict)?;

        AuditLogService::record(
            &txn,
            ctx,
            AuditAction::LabCreate,
            format!("created laboratory {} ({})", lab.id, lab.name),
        )
        .await?;
        txn.commit().await?;

        cache.invalidate(&Self::detail_key(lab.id)).await;
        Ok(lab)
    }

    /// Updates a laboratory. A name change is propagated to the `lab_name` of
    /// every student of the laboratory in the same transaction; setting the
    /// current name again skips propagation entirely.
    pub async fn update_laboratory(
        db: &DatabaseConnection,
        cache: &Cache,
        ctx: &RequestContext,
        lab_id: i32,
        changes: LaboratoryChanges,
    ) -> ServiceResult<laboratories::Model> {
        let txn = db.begin().await?;
        let lab = Self::find_laboratory(&txn, lab_id).await?;

        let new_name = changes.name.filter(|name| *name != lab.name);
        if let Some(name) = &new_name {
            Self::ensure_name_available(&txn, name, Some(lab_id)).await?;
        }

        let mut active: laboratories::ActiveModel = lab.clone().into();
        if let Some(name) = &new_name {
            active.name = Set(name.clone());
        }
        if let Some(location) = changes.location {
            active.location = Set(Some(location));
        }

        if !active.is_changed() {
            log::debug!("update of laboratory {lab_id} changes nothing");
            return Ok(lab);
        }

        let updated = active.update(&txn).await.map_err(Self::name_conflict)?;

        let detail = match &new_name {
            Some(name) => {
                let students = Propagator::propagate_lab_name(&txn, lab_id, name).await?;
                format!(
                    "renamed laboratory {lab_id} from {:?} to {name:?}, {students} students updated",
                    lab.name
                )
            }
            None => format!("updated laboratory {lab_id}"),
        };

        AuditLogService::record(&txn, ctx, AuditAction::LabUpdate, detail).await?;
        txn.commit().await?;

        cache.invalidate(&Self::detail_key(lab_id)).await;
        Ok(updated)
    }

    /// Renames a laboratory, see [`LaboratoryService::update_laboratory`]
    pub async fn rename_laboratory(
        db: &DatabaseConnection,
        cache: &Cache,
        ctx: &RequestContext,
        lab_id: i32,
        new_name: impl Into<String>,
    ) -> ServiceResult<laboratories::Model> {
        let changes = LaboratoryChanges {
            name: Some(new_name.into()),
            location: None,
        };
        Self::update_laboratory(db, cache, ctx, lab_id, changes).await
    }

    /// Deletes a laboratory nothing refers to. Refuses, with the blocking
    /// count in the payload, while students, teachers or equipment still
    /// reference it.
    pub async fn delete_laboratory(
        db: &DatabaseConnection,
        cache: &Cache,
        ctx: &RequestContext,
        lab_id: i32,
    ) -> ServiceResult<()> {
        let txn = db.begin().await?;
        let lab = Self::find_laboratory(&txn, lab_id).await?;

        let student_count = students::Entity::find()
            .filter(students::Column::LabId.eq(lab_id))
            .count(&txn)
            .await?;
        if student_count > 0 {
            return Err(ServiceError::validation(
                format!("cannot delete laboratory, {student_count} students still belong to it"),
                json!({ "students": student_count }),
            ));
        }

        let teacher_count = teachers::Entity::find()
            .filter(teachers::Column::LabId.eq(lab_id))
            .count(&txn)
            .await?;
        if teacher_count > 0 {
            return Err(ServiceError::validation(
                format!("cannot delete laboratory, {teacher_count} teachers still belong to it"),
                json!({ "teachers": teacher_count }),
            ));
        }

        let equipment_count = equipment::Entity::find()
            .filter(equipment::Column::LabId.eq(lab_id))
            .count(&txn)
            .await?;
        if equipment_count > 0 {
            return Err(ServiceError::validation(
                format!("cannot delete laboratory, it still owns {equipment_count} equipment"),
                json!({ "equipment": equipment_count }),
            ));
        }

        laboratories::Entity::delete_by_id(lab_id).exec(&txn).await?;
        AuditLogService::record(
            &txn,
            ctx,
            AuditAction::LabDelete,
            format!("deleted laboratory {lab_id} ({})", lab.name),
        )
        .await?;
        txn.commit().await?;

        cache.invalidate(&Self::detail_key(lab_id)).await;
        Ok(())
    }

    pub(crate) async fn find_laboratory<C: ConnectionTrait>(
        conn: &C,
        lab_id: i32,
    ) -> ServiceResult<laboratories::Model> {
        laboratories::Entity::find_by_id(lab_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("laboratory {lab_id} does not exist")))
    }

    /// A concurrent writer can take the name after the availability check;
    /// the unique index then rejects the write
    fn name_conflict(err: DbErr) -> ServiceError {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                log::debug!("laboratory name taken concurrently: {detail}");
                Self::name_taken()
            }
            _ => err.into(),
        }
    }

    fn name_taken() -> ServiceError {
        ServiceError::validation("laboratory name already exists", json!({ "field": "name" }))
    }

    /// Fails when another laboratory already uses `name`
    async fn ensure_name_available<C: ConnectionTrait>(
        conn: &C,
        name: &str,
        except: Option<i32>,
    ) -> ServiceResult<()> {
        let mut query =
            laboratories::Entity::find().filter(laboratories::Column::Name.eq(name));
        if let Some(lab_id) = except {
            query = query.filter(laboratories::Column::Id.ne(lab_id));
        }

        if query.one(conn).await?.is_some() {
            return Err(Self::name_taken());
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        entities::laboratories, error::ServiceError, services::laboratory::LaboratoryService,
    };
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectOptions, Database, DbErr};
    use serde_json::json;

    fn lab(name: &str) -> laboratories::ActiveModel {
        laboratories::ActiveModel {
            name: Set(name.to_string()),
            location: Set(None),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_unique_violation_maps_to_name_validation() {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        lab("Optics").insert(&db).await.unwrap();
        // skips the availability check, as a racing writer effectively does
        let raced = lab("Optics").insert(&db).await.unwrap_err();

        let err = LaboratoryService::name_conflict(raced);
        assert!(matches!(err, ServiceError::Validation { .. }));
        assert_eq!(err.payload(), Some(&json!({ "field": "name" })));
    }

    #[test]
    fn test_other_database_errors_pass_through() {
        let err = LaboratoryService::name_conflict(DbErr::Custom("disk full".to_string()));
        assert!(matches!(err, ServiceError::Database(_)));
    }
}
