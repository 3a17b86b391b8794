//! Column metadata from column annotations
//!
//! Resolves one property's column: name, constraints, data type, codec and
//! primary-key flag. Columns owned by another table only produce a
//! table-qualified mapping entry.

use crate::error::MappingError;
use crate::registry::TypeRegistry;
use std::sync::Arc;
use tabula_core::mapping::qualified_key;
use tabula_core::{
    CodecPolicy, ColumnMetadata, DataType, DateTimeCodec, HostType, MappingConfig,
    MappingRegistry, NumberValueCodec, SharedCodec, TableSchema,
};
use tabula_entity::{AnnotationResolver, Column, EntityType, Id, PropertyDescriptor, TypeOverride};

/// Builds column metadata for the properties of one entity
#[derive(Debug)]
pub struct ColumnBuilder<'r> {
    registry: &'r TypeRegistry,
    config: &'r MappingConfig,
    resolver: AnnotationResolver,
}

impl<'r> ColumnBuilder<'r> {
    pub fn new(registry: &'r TypeRegistry, config: &'r MappingConfig) -> Self {
        Self {
            registry,
            config,
            resolver: AnnotationResolver::new(),
        }
    }

    /// Resolve the column of an annotated property
    ///
    /// Registers the property's mapping and returns the populated column,
    /// or `None` when the column belongs to another table. The column is not
    /// added to the table; that is left to the caller once it is complete.
    pub fn build<'a, T>(
        &self,
        entity: &'a EntityType,
        property: &PropertyDescriptor<'a>,
        annotation: &Column,
        table: &T,
        mapping: &mut dyn MappingRegistry,
    ) -> Result<Option<ColumnMetadata>, MappingError>
    where
        T: TableSchema + ?Sized,
    {
        if let Some(owner) = annotation.table().filter(|owner| *owner != table.name()) {
            let column_name = annotation.name().unwrap_or(&property.name);
            let key = qualified_key(owner, column_name);
            tracing::debug!(property = %property.name, key = %key, "column belongs to another table");
            mapping.add_mapping(&key, &property.name);
            return Ok(None);
        }

        let column_name = annotation.name().unwrap_or(&property.name).to_string();
        mapping.add_mapping(&column_name, &property.name);

        let mut column = match table.column(&column_name) {
            Some(existing) => existing.clone(),
            None => table.new_column(),
        };

        let host_type = property.host_type.clone();
        column.name = column_name;
        column.alias = Some(property.name.clone());
        column.host_type = Some(host_type.clone());
        column.length = annotation.length;
        column.precision = annotation.precision;
        column.scale = annotation.scale;
        column.not_null = !annotation.nullable;
        column.updatable = annotation.updatable;
        if let Some(definition) = annotation.column_definition() {
            column.column_definition = Some(definition.to_string());
        }

        let dialect = table.dialect();
        let mut explicit_codec = false;
        if let Some(type_override) = self.resolver.resolve::<TypeOverride>(entity, property) {
            explicit_codec = self.apply_type_override(&mut column, type_override)?;
        } else if column.data_type.is_none() {
            if let Some(kind) = dialect.storage_kind_for(&host_type) {
                column.set_storage_kind(kind, Some(host_type.clone()));
            }
        }
        column.sql_type = dialect.create_column_data_type(&column);
        if column.sql_type.is_none() {
            tracing::warn!(
                column = %column.name,
                host_type = %host_type,
                dialect = dialect.name(),
                "no SQL type could be materialized"
            );
        }

        if self.resolver.resolve::<Id>(entity, property).is_some() {
            column.primary_key = true;
        }

        if !explicit_codec || self.config.codec_policy == CodecPolicy::Overwrite {
            if let Some(codec) = self.default_codec(&host_type) {
                column.value_codec = Some(codec);
            }
        }

        tracing::debug!(
            column = %column.name,
            property = %property.name,
            sql_type = column.sql_type.as_deref().unwrap_or("-"),
            codec = column.codec_name().unwrap_or("-"),
            primary_key = column.primary_key,
            "resolved column"
        );

        Ok(Some(column))
    }

    /// Apply a type override; returns whether an explicit codec was set
    fn apply_type_override(
        &self,
        column: &mut ColumnMetadata,
        type_override: &TypeOverride,
    ) -> Result<bool, MappingError> {
        let mut explicit_codec = false;
        if let Some(codec_id) = type_override.codec() {
            column.value_codec = Some(self.registry.instantiate_codec(codec_id)?);
            explicit_codec = true;
        }

        column.data_type = Some(if let Some(type_name) = type_override.data_type() {
            self.registry.instantiate_data_type(type_name)?
        } else if let Some(type_id) = type_override.type_id() {
            DataType::custom(type_id, type_id, type_override.storage_kind)
        } else {
            DataType::storage(type_override.storage_kind, column.host_type.clone())
        });

        Ok(explicit_codec)
    }

    /// Codec implied by the host type
    fn default_codec(&self, host_type: &HostType) -> Option<SharedCodec> {
        if host_type.is_temporal() {
            Some(Arc::new(DateTimeCodec::new(
                self.config.date_time_pattern.clone(),
                host_type.clone(),
            )))
        } else if host_type.is_numeric() {
            Some(Arc::new(NumberValueCodec::new(host_type.clone())))
        } else {
            None
        }
    }
}
