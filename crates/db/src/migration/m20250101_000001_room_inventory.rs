//! Room inventory migration.
//!
//! Creates room categories, rooms and maintenance blocks. Every table carries
//! `tenant_id` and every lookup index leads with it.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ROOM_CATEGORIES_SQL).await?;
        db.execute_unprepared(ROOMS_SQL).await?;
        db.execute_unprepared(ROOM_BLOCKS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS room_blocks CASCADE;
             DROP TABLE IF EXISTS rooms CASCADE;
             DROP TABLE IF EXISTS room_categories CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const ROOM_CATEGORIES_SQL: &str = r"
CREATE TABLE room_categories (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    name VARCHAR(120) NOT NULL,
    base_capacity INTEGER NOT NULL DEFAULT 2,
    description TEXT,
    CONSTRAINT chk_category_capacity CHECK (base_capacity > 0)
);

CREATE UNIQUE INDEX idx_room_categories_name ON room_categories(tenant_id, lower(name));
";

const ROOMS_SQL: &str = r"
CREATE TABLE rooms (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    number VARCHAR(20) NOT NULL,
    category_id UUID NOT NULL REFERENCES room_categories(id) ON DELETE RESTRICT,
    capacity INTEGER NOT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'clean',
    extensions JSONB NOT NULL DEFAULT '{}'::jsonb,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_room_capacity CHECK (capacity > 0),
    CONSTRAINT chk_room_status CHECK (status IN ('clean', 'occupied', 'dirty', 'out_of_order'))
);

CREATE UNIQUE INDEX idx_rooms_number ON rooms(tenant_id, number);
CREATE INDEX idx_rooms_category ON rooms(tenant_id, category_id);
";

const ROOM_BLOCKS_SQL: &str = r"
CREATE TABLE room_blocks (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    room_id UUID NOT NULL REFERENCES rooms(id) ON DELETE CASCADE,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    reason TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_block_range CHECK (end_date > start_date)
);

CREATE INDEX idx_room_blocks_room ON room_blocks(tenant_id, room_id, start_date);
";
