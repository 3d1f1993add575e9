//! Storage backends for Innkeep.
//!
//! This crate provides:
//! - [`DocumentStore`], a tenant-partitioned in-memory document store that
//!   implements every storage port of `innkeep-core`
//! - [`SeaRoomRepository`], the PostgreSQL room inventory (`SeaORM`)
//! - Database migrations for the relational tables

pub mod document;
pub mod entities;
pub mod migration;
pub mod repositories;

pub use document::DocumentStore;
pub use repositories::SeaRoomRepository;

use std::sync::Arc;

use innkeep_core::Repositories;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str, max_connections: u32, min_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    options
        .max_connections(max_connections)
        .min_connections(min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}

/// Document-store repositories with the room inventory served from
/// PostgreSQL when a connection is given.
#[must_use]
pub fn repositories(store: &Arc<DocumentStore>, relational: Option<DatabaseConnection>) -> Repositories {
    let mut repos = store.repositories();
    if let Some(db) = relational {
        repos.rooms = Arc::new(SeaRoomRepository::new(db));
    }
    repos
}
