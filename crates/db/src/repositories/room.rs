//! Relational room inventory (PostgreSQL via SeaORM).
//!
//! Consistency scope: the database. `set_room_statuses` runs in one
//! transaction, so a batch either lands completely or not at all.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use innkeep_core::calendar::DateRange;
use innkeep_core::repository::{RepoResult, RepositoryError, RoomRepository};
use innkeep_core::room::{Room, RoomBlock, RoomCategory, RoomStatus, RoomStatusChange};
use innkeep_shared::types::{RoomBlockId, RoomCategoryId, RoomId, TenantId};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::warn;

use crate::entities::{room_blocks, room_categories, rooms};

fn backend(err: DbErr) -> RepositoryError {
    RepositoryError::Backend(err.to_string())
}

fn corrupt(entity: &'static str, id: impl std::fmt::Display, detail: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Backend(format!("invalid stored {entity} {id}: {detail}"))
}

fn to_u32(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn room_from_model(model: rooms::Model) -> RepoResult<Room> {
    let status = model
        .status
        .parse::<RoomStatus>()
        .map_err(|e: String| corrupt("room", model.id, e))?;
    let extensions = serde_json::from_value(model.extensions).map_err(|e| corrupt("room", model.id, e))?;
    Ok(Room {
        id: RoomId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        number: model.number,
        category_id: RoomCategoryId::from_uuid(model.category_id),
        capacity: to_u32(model.capacity),
        status,
        extensions,
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn category_from_model(model: room_categories::Model) -> RoomCategory {
    RoomCategory {
        id: RoomCategoryId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        name: model.name,
        base_capacity: to_u32(model.base_capacity),
        description: model.description,
    }
}

fn block_from_model(model: room_blocks::Model) -> RepoResult<RoomBlock> {
    let dates = DateRange::new(model.start_date, model.end_date).map_err(|e| corrupt("room_block", model.id, e))?;
    Ok(RoomBlock {
        id: RoomBlockId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        room_id: RoomId::from_uuid(model.room_id),
        dates,
        reason: model.reason,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

/// Room repository backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct SeaRoomRepository {
    db: DatabaseConnection,
}

impl SeaRoomRepository {
    /// Creates a new room repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoomRepository for SeaRoomRepository {
    async fn get_room(&self, tenant_id: TenantId, room_id: RoomId) -> RepoResult<Option<Room>> {
        rooms::Entity::find_by_id(room_id.into_inner())
            .filter(rooms::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(backend)?
            .map(room_from_model)
            .transpose()
    }

    async fn list_rooms(&self, tenant_id: TenantId, category_id: Option<RoomCategoryId>) -> RepoResult<Vec<Room>> {
        let mut query = rooms::Entity::find().filter(rooms::Column::TenantId.eq(tenant_id.into_inner()));
        if let Some(category_id) = category_id {
            query = query.filter(rooms::Column::CategoryId.eq(category_id.into_inner()));
        }
        query
            .order_by_asc(rooms::Column::Number)
            .all(&self.db)
            .await
            .map_err(backend)?
            .into_iter()
            .map(room_from_model)
            .collect()
    }

    async fn get_category(
        &self,
        tenant_id: TenantId,
        category_id: RoomCategoryId,
    ) -> RepoResult<Option<RoomCategory>> {
        let model = room_categories::Entity::find_by_id(category_id.into_inner())
            .filter(room_categories::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(backend)?;
        Ok(model.map(category_from_model))
    }

    async fn list_categories(&self, tenant_id: TenantId) -> RepoResult<Vec<RoomCategory>> {
        let models = room_categories::Entity::find()
            .filter(room_categories::Column::TenantId.eq(tenant_id.into_inner()))
            .order_by_asc(room_categories::Column::Name)
            .all(&self.db)
            .await
            .map_err(backend)?;
        Ok(models.into_iter().map(category_from_model).collect())
    }

    async fn list_blocks(&self, tenant_id: TenantId, room_id: RoomId) -> RepoResult<Vec<RoomBlock>> {
        room_blocks::Entity::find()
            .filter(room_blocks::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(room_blocks::Column::RoomId.eq(room_id.into_inner()))
            .order_by_asc(room_blocks::Column::StartDate)
            .all(&self.db)
            .await
            .map_err(backend)?
            .into_iter()
            .map(block_from_model)
            .collect()
    }

    async fn set_room_statuses(
        &self,
        tenant_id: TenantId,
        changes: &[RoomStatusChange],
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let txn = self.db.begin().await.map_err(backend)?;
        for change in changes {
            let result = rooms::Entity::update_many()
                .col_expr(rooms::Column::Status, Expr::value(change.status.as_str()))
                .col_expr(rooms::Column::UpdatedAt, Expr::value(at))
                .filter(rooms::Column::Id.eq(change.room_id.into_inner()))
                .filter(rooms::Column::TenantId.eq(tenant_id.into_inner()))
                .exec(&txn)
                .await
                .map_err(backend)?;
            if result.rows_affected == 0 {
                warn!(%tenant_id, room_id = %change.room_id, "room status batch rolled back: unknown room");
                txn.rollback().await.map_err(backend)?;
                return Err(RepositoryError::not_found("room", change.room_id));
            }
        }
        txn.commit().await.map_err(backend)
    }

    async fn upsert_room(&self, room: Room) -> RepoResult<Room> {
        let extensions = serde_json::to_value(&room.extensions).map_err(|e| corrupt("room", room.id, e))?;
        let model = rooms::ActiveModel {
            id: Set(room.id.into_inner()),
            tenant_id: Set(room.tenant_id.into_inner()),
            number: Set(room.number.clone()),
            category_id: Set(room.category_id.into_inner()),
            capacity: Set(to_i32(room.capacity)),
            status: Set(room.status.as_str().to_string()),
            extensions: Set(extensions),
            updated_at: Set(room.updated_at.into()),
        };
        rooms::Entity::insert(model)
            .on_conflict(
                OnConflict::column(rooms::Column::Id)
                    .update_columns([
                        rooms::Column::Number,
                        rooms::Column::CategoryId,
                        rooms::Column::Capacity,
                        rooms::Column::Status,
                        rooms::Column::Extensions,
                        rooms::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(backend)?;
        Ok(room)
    }

    async fn upsert_category(&self, category: RoomCategory) -> RepoResult<RoomCategory> {
        let model = room_categories::ActiveModel {
            id: Set(category.id.into_inner()),
            tenant_id: Set(category.tenant_id.into_inner()),
            name: Set(category.name.clone()),
            base_capacity: Set(to_i32(category.base_capacity)),
            description: Set(category.description.clone()),
        };
        room_categories::Entity::insert(model)
            .on_conflict(
                OnConflict::column(room_categories::Column::Id)
                    .update_columns([
                        room_categories::Column::Name,
                        room_categories::Column::BaseCapacity,
                        room_categories::Column::Description,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(backend)?;
        Ok(category)
    }

    async fn insert_block(&self, block: RoomBlock) -> RepoResult<RoomBlock> {
        let model = room_blocks::ActiveModel {
            id: Set(block.id.into_inner()),
            tenant_id: Set(block.tenant_id.into_inner()),
            room_id: Set(block.room_id.into_inner()),
            start_date: Set(block.dates.start()),
            end_date: Set(block.dates.end()),
            reason: Set(block.reason.clone()),
            created_at: Set(block.created_at.into()),
        };
        room_blocks::Entity::insert(model)
            .exec(&self.db)
            .await
            .map_err(backend)?;
        Ok(block)
    }
}
