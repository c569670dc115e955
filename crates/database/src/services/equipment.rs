use crate::{
    cache::{Cache, CacheKey},
    context::RequestContext,
    entities::{equipment, reservations, time_slots},
    error::{ServiceError, ServiceResult},
    services::{
        audit_log::AuditLogService, laboratory::LaboratoryService, propagation::Propagator,
    },
};
use models::{
    audit_action::AuditAction,
    equipment::{EquipmentCategory, EquipmentStatus},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEquipment {
    pub name: String,
    pub lab_id: Option<i32>,
    pub category: EquipmentCategory,
    pub status: Option<EquipmentStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquipmentChanges {
    pub name: Option<String>,
    pub lab_id: Option<i32>,
    pub category: Option<EquipmentCategory>,
    pub status: Option<EquipmentStatus>,
}

/// Filters and pagination for the equipment list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentQuery {
    pub lab_id: Option<i32>,
    pub category: Option<EquipmentCategory>,
    pub status: Option<EquipmentStatus>,
    pub keyword: Option<String>,
    pub page: u64,
    pub per_page: u64,
}

impl Default for EquipmentQuery {
    fn default() -> Self {
        Self {
            lab_id: None,
            category: None,
            status: None,
            keyword: None,
            page: 1,
            per_page: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentPage {
    pub items: Vec<equipment::Model>,
    pub total_items: u64,
    pub page: u64,
    pub per_page: u64,
}

pub struct EquipmentService;

impl EquipmentService {
    const ENTITY: &'static str = "equipment";

    pub fn detail_key(equip_id: i64) -> CacheKey {
        CacheKey::detail(Self::ENTITY, equip_id)
    }

    /// Paginated, filtered list. Served from cache and allowed to lag writes
    /// by up to the cache TTL.
    pub async fn list_equipment(
        db: &DatabaseConnection,
        cache: &Cache,
        query: EquipmentQuery,
    ) -> ServiceResult<EquipmentPage> {
        let page = query.page.max(1);
        let per_page = query.per_page.clamp(1, 100);

        let key = CacheKey::operation(Self::ENTITY, "list")
            .arg("lab_id", query.lab_id)
            .arg("category", query.category)
            .arg("status", query.status)
            .arg("keyword", &query.keyword)
            .arg("page", page)
            .arg("per_page", per_page);

        cache
            .get_or_compute(&key, || async {
                let mut condition = Condition::all();
                if let Some(lab_id) = query.lab_id {
                    condition = condition.add(equipment::Column::LabId.eq(lab_id));
                }
                if let Some(category) = query.category {
                    condition = condition.add(equipment::Column::Category.eq(category));
                }
                if let Some(status) = query.status {
                    condition = condition.add(equipment::Column::Status.eq(status));
                }
                if let Some(keyword) = query.keyword.as_deref().filter(|k| !k.is_empty()) {
                    condition = condition.add(equipment::Column::Name.contains(keyword));
                }

                let select = equipment::Entity::find()
                    .filter(condition)
                    .order_by_asc(equipment::Column::Id);

                let paginator = select.clone().paginate(db, per_page);
                let (total_items, items) = futures::try_join!(
                    select.count(db),
                    paginator.fetch_page(page - 1), // SeaORM uses 0-based pages
                )?;

                Ok::<_, ServiceError>(EquipmentPage {
                    items,
                    total_items,
                    page,
                    per_page,
                })
            })
            .await
    }

    /// Detail view. A `next_avail_time` already in the past may point at a
    /// slot that has since ended, so it is recomputed before caching.
    pub async fn get_equipment(
        db: &DatabaseConnection,
        cache: &Cache,
        equip_id: i64,
    ) -> ServiceResult<equipment::Model> {
        cache
            .get_or_compute(&Self::detail_key(equip_id), || async move {
                let mut found = Self::find_equipment(db, equip_id).await?;
                let now = super::now();
                if found.next_avail_time.is_some_and(|next| next <= now) {
                    found.next_avail_time =
                        Propagator::refresh_next_avail_time(db, equip_id, now).await?;
                }
                Ok::<_, ServiceError>(found)
            })
            .await
    }

    pub async fn create_equipment(
        db: &DatabaseConnection,
        cache: &Cache,
        ctx: &RequestContext,
        input: NewEquipment,
    ) -> ServiceResult<equipment::Model> {
        let txn = db.begin().await?;

        Self::validate_ownership(&txn, input.category, input.lab_id).await?;

        let created = equipment::ActiveModel {
            name: Set(input.name),
            lab_id: Set(input.lab_id),
            category: Set(input.category),
            status: Set(input.status.unwrap_or_default()),
            next_avail_time: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        AuditLogService::record(
            &txn,
            ctx,
            AuditAction::EquipmentCreate,
            format!("created equipment {} ({})", created.id, created.name),
        )
        .await?;
        txn.commit().await?;

        cache.invalidate(&Self::detail_key(created.id)).await;
        Ok(created)
    }

    pub async fn update_equipment(
        db: &DatabaseConnection,
        cache: &Cache,
        ctx: &RequestContext,
        equip_id: i64,
        changes: EquipmentChanges,
    ) -> ServiceResult<equipment::Model> {
        let txn = db.begin().await?;
        let current = Self::find_equipment(&txn, equip_id).await?;

        let category = changes.category.unwrap_or(current.category);
        let lab_id = changes.lab_id.or(current.lab_id);
        Self::validate_ownership(&txn, category, lab_id).await?;

        let mut active: equipment::ActiveModel = current.clone().into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if changes.lab_id.is_some() {
            active.lab_id = Set(lab_id);
        }
        if let Some(category) = changes.category {
            active.category = Set(category);
        }
        if let Some(status) = changes.status {
            active.status = Set(status);
        }

        if !active.is_changed() {
            return Ok(current);
        }

        let updated = active.update(&txn).await?;
        AuditLogService::record(
            &txn,
            ctx,
            AuditAction::EquipmentUpdate,
            format!("updated equipment {equip_id}"),
        )
        .await?;
        txn.commit().await?;

        cache.invalidate(&Self::detail_key(equip_id)).await;
        Ok(updated)
    }

    /// Deletes equipment together with its time slots. Refuses while any
    /// reservation still references it.
    pub async fn delete_equipment(
        db: &DatabaseConnection,
        cache: &Cache,
        ctx: &RequestContext,
        equip_id: i64,
    ) -> ServiceResult<()> {
        let txn = db.begin().await?;
        let current = Self::find_equipment(&txn, equip_id).await?;

        let reservation_count = reservations::Entity::find()
            .filter(reservations::Column::EquipId.eq(equip_id))
            .count(&txn)
            .await?;
        if reservation_count > 0 {
            return Err(ServiceError::validation(
                format!("cannot delete equipment, {reservation_count} reservations reference it"),
                json!({ "reservations": reservation_count }),
            ));
        }

        let slots = time_slots::Entity::delete_many()
            .filter(time_slots::Column::EquipId.eq(equip_id))
            .exec(&txn)
            .await?;
        equipment::Entity::delete_by_id(equip_id).exec(&txn).await?;

        AuditLogService::record(
            &txn,
            ctx,
            AuditAction::EquipmentDelete,
            format!(
                "deleted equipment {equip_id} ({}) and {} time slots",
                current.name, slots.rows_affected
            ),
        )
        .await?;
        txn.commit().await?;

        cache.invalidate(&Self::detail_key(equip_id)).await;
        Ok(())
    }

    pub(crate) async fn find_equipment<C: ConnectionTrait>(
        conn: &C,
        equip_id: i64,
    ) -> ServiceResult<equipment::Model> {
        equipment::Entity::find_by_id(equip_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("equipment {equip_id} does not exist")))
    }

    /// Lab-owned equipment needs a laboratory, and any referenced laboratory
    /// must exist
    async fn validate_ownership<C: ConnectionTrait>(
        conn: &C,
        category: EquipmentCategory,
        lab_id: Option<i32>,
    ) -> ServiceResult<()> {
        match lab_id {
            Some(lab_id) => match LaboratoryService::find_laboratory(conn, lab_id).await {
                Ok(_) => Ok(()),
                Err(ServiceError::NotFound(message)) => Err(ServiceError::validation(
                    message,
                    json!({ "field": "lab_id" }),
                )),
                Err(e) => Err(e),
            },
            None if category.requires_lab() => Err(ServiceError::validation(
                "lab-owned equipment must belong to a laboratory",
                json!({ "field": "lab_id" }),
            )),
            None => Ok(()),
        }
    }
}
