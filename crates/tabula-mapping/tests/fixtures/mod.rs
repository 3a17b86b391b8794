//! Entity fixtures for mapping integration tests
//!
//! A small hierarchy that exercises every annotation placement:
//! - `Auditable` (root) declares an annotated `createdAt` field and an
//!   annotated `getVersion` accessor
//! - `BaseEntity` declares the annotated primary key
//! - `User` declares the table, its indexes and its own columns

#![allow(dead_code)]

use std::sync::Arc;
use tabula_core::{HostType, SqlDialect, StorageKind, TableMetadata};
use tabula_entity::{
    Column, EntityType, FieldDecl, Id, Index, JoinColumn, MethodDecl, Table, TypeOverride,
};

/// Root ancestor with audit columns
pub fn auditable() -> Arc<EntityType> {
    EntityType::builder("Auditable")
        .property_with(
            FieldDecl::new("createdAt", HostType::DateTime)
                .annotate(Column::named("created_at").with_nullable(false).with_updatable(false)),
        )
        .method(MethodDecl::getter("version", HostType::I32).annotate(Column::named("row_version")))
        .method(MethodDecl::setter("version", HostType::I32))
        .build()
}

/// Middle ancestor declaring the primary key
pub fn base_entity() -> Arc<EntityType> {
    EntityType::builder("BaseEntity")
        .extends(auditable())
        .property_with(FieldDecl::new("id", HostType::I64).annotate(Id).annotate(Column::default()))
        .build()
}

/// Leaf entity mapped to `users`
pub fn user() -> Arc<EntityType> {
    EntityType::builder("User")
        .extends(base_entity())
        .annotate(
            Table::named("users")
                .with_index(Index::new("id,name desc"))
                .with_index(Index::new("email").with_name("uk_users_email").with_unique(true))
                .with_index(Index::new("created_at DESC, missing_column")),
        )
        .property_with(
            FieldDecl::new("name", HostType::String).annotate(Column::named("user_name").with_length(64)),
        )
        .property_with(
            FieldDecl::new("email", HostType::String).annotate(Column::default().with_nullable(false)),
        )
        .property_with(
            FieldDecl::new("balance", HostType::Decimal)
                .annotate(Column::default().with_precision(12, 2))
                .annotate(TypeOverride::storage(StorageKind::Decimal).with_codec("json")),
        )
        .property_with(
            FieldDecl::new("lastLogin", HostType::Timestamp)
                .annotate(Column::named("last_login"))
                .annotate(TypeOverride::storage(StorageKind::Timestamp).with_codec("json")),
        )
        .property_with(
            FieldDecl::new("bio", HostType::String).annotate(Column::default().with_table("user_profiles")),
        )
        .property_with(
            FieldDecl::new("manager", HostType::Entity("User".to_string()))
                .annotate(JoinColumn::named("manager_id").referencing("id")),
        )
        .property("nickname", HostType::String)
        .build()
}

/// Empty `users` table for a dialect
pub fn users_table(dialect: SqlDialect) -> TableMetadata {
    TableMetadata::new("users", Arc::new(dialect))
}
