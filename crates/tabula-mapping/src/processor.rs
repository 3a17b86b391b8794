//! Entity-to-table mapping pass
//!
//! One pass maps one entity type onto one table: index declarations become
//! index metadata, annotated properties become columns, and every resolved
//! column key is recorded in the entity's column mapping, which is attached
//! to the table when the pass ends.

use crate::column::ColumnBuilder;
use crate::error::MappingError;
use crate::index::IndexBuilder;
use crate::registry::TypeRegistry;
use tabula_core::{EntityColumnMapping, ErrorPolicy, MappingConfig, TableSchema};
use tabula_entity::{
    properties, AnnotationResolver, Column, EntityType, JoinColumn, JoinColumns,
    PropertyDescriptor, Table,
};

/// Relation column annotation found on a property
#[derive(Debug, Clone, Copy)]
pub enum RelationColumn<'a> {
    Single(&'a JoinColumn),
    Repeated(&'a JoinColumns),
}

/// Maps an entity type onto a table
pub struct EntityTableProcessor<'a, T: TableSchema + ?Sized> {
    entity: &'a EntityType,
    table: &'a mut T,
    mapping: EntityColumnMapping,
    columns: ColumnBuilder<'a>,
    config: &'a MappingConfig,
    resolver: AnnotationResolver,
}

impl<'a, T: TableSchema + ?Sized> EntityTableProcessor<'a, T> {
    pub fn new(
        entity: &'a EntityType,
        table: &'a mut T,
        registry: &'a TypeRegistry,
        config: &'a MappingConfig,
    ) -> Self {
        let mapping = EntityColumnMapping::new(entity.name(), table.name());
        Self {
            entity,
            table,
            mapping,
            columns: ColumnBuilder::new(registry, config),
            config,
            resolver: AnnotationResolver::new(),
        }
    }

    /// Run the pass
    ///
    /// The mapping is attached to the table even when the pass fails, so
    /// callers can inspect how far it got. A property that fails never
    /// registers its column.
    pub fn process(mut self) -> Result<(), MappingError> {
        tracing::debug!(entity = self.entity.name(), table = self.table.name(), "mapping entity");

        self.process_indexes();
        let result = self.process_properties();

        tracing::debug!(
            entity = self.entity.name(),
            mapped = self.mapping.len(),
            ok = result.is_ok(),
            "mapped entity"
        );

        self.table.attach_mapping(self.mapping);
        result
    }

    fn process_indexes(&mut self) {
        let Some(table_annotation) = self.entity.class_annotation::<Table>() else {
            return;
        };

        let mut builder = IndexBuilder::new();
        for declaration in &table_annotation.indexes {
            let index = builder.build(self.table.name(), declaration);
            tracing::debug!(index = %index.name, columns = ?index.column_names(), "registered index");
            self.table.add_index(index);
        }
    }

    fn process_properties(&mut self) -> Result<(), MappingError> {
        let mut failures = Vec::new();

        for property in properties(self.entity) {
            if let Err(err) = self.process_property(&property) {
                let err = err.in_property(self.entity.name(), &property.name);
                match self.config.error_policy {
                    ErrorPolicy::FailFast => return Err(err),
                    ErrorPolicy::Collect => {
                        tracing::debug!(error = %err, "property failed, continuing");
                        failures.push(err);
                    }
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(MappingError::Collected(failures))
        }
    }

    fn process_property(&mut self, property: &PropertyDescriptor<'a>) -> Result<(), MappingError> {
        if let Some(annotation) = self.resolver.resolve::<Column>(self.entity, property) {
            let column = self.columns.build(
                self.entity,
                property,
                annotation,
                &*self.table,
                &mut self.mapping,
            )?;
            if let Some(column) = column {
                self.table.add_column(column);
            }
        }

        if let Some(repeated) = self.resolver.resolve::<JoinColumns>(self.entity, property) {
            self.handle_relation_column(property, RelationColumn::Repeated(repeated));
        }
        if let Some(single) = self.resolver.resolve::<JoinColumn>(self.entity, property) {
            self.handle_relation_column(property, RelationColumn::Single(single));
        }

        Ok(())
    }

    /// Extension point for relation wiring; relation columns are detected
    /// but produce no metadata yet.
    fn handle_relation_column(&mut self, property: &PropertyDescriptor<'a>, relation: RelationColumn<'a>) {
        let count = match relation {
            RelationColumn::Single(_) => 1,
            RelationColumn::Repeated(columns) => columns.columns.len(),
        };
        tracing::debug!(property = %property.name, join_columns = count, "relation columns detected");
    }
}

/// Map an entity type onto a table
pub fn process<T: TableSchema + ?Sized>(
    entity: &EntityType,
    table: &mut T,
    registry: &TypeRegistry,
    config: &MappingConfig,
) -> Result<(), MappingError> {
    EntityTableProcessor::new(entity, table, registry, config).process()
}

/// Table name declared on an entity, or the entity name
pub fn table_name(entity: &EntityType) -> String {
    entity
        .class_annotation::<Table>()
        .and_then(Table::name)
        .unwrap_or_else(|| entity.name())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tabula_core::{SqlDialect, TableMetadata};
    use tabula_entity::{FieldDecl, Index, TypeOverride};
    use tabula_core::HostType;

    fn table(name: &str) -> TableMetadata {
        TableMetadata::new(name, Arc::new(SqlDialect::ansi()))
    }

    #[test]
    fn unannotated_properties_are_skipped() {
        let entity = EntityType::builder("Note")
            .property_with(FieldDecl::new("id", HostType::I64).annotate(Column::default()))
            .property("transient", HostType::String)
            .build();

        let mut t = table("notes");
        process(&entity, &mut t, &TypeRegistry::new(), &MappingConfig::default()).unwrap();

        assert_eq!(t.column_names(), vec!["id"]);
        assert_eq!(t.mapping_for("Note").unwrap().len(), 1);
    }

    #[test]
    fn entity_without_table_annotation_has_no_indexes() {
        let entity = EntityType::builder("Note").build();
        let mut t = table("notes");
        process(&entity, &mut t, &TypeRegistry::new(), &MappingConfig::default()).unwrap();

        assert!(t.indexes().is_empty());
        assert!(t.mapping_for("Note").unwrap().is_empty());
    }

    #[test]
    fn table_name_prefers_annotation() {
        let named = EntityType::builder("User").annotate(Table::named("users")).build();
        let unnamed = EntityType::builder("Audit").annotate(Table::default().with_index(Index::new("id"))).build();

        assert_eq!(table_name(&named), "users");
        assert_eq!(table_name(&unnamed), "Audit");
    }

    #[test]
    fn join_columns_are_a_no_op() {
        let entity = EntityType::builder("Order")
            .property_with(
                FieldDecl::new("customer", HostType::Entity("Customer".into()))
                    .annotate(JoinColumn::named("customer_id").referencing("id")),
            )
            .property_with(
                FieldDecl::new("owner", HostType::Entity("User".into())).annotate(JoinColumns {
                    columns: vec![JoinColumn::named("owner_id"), JoinColumn::named("owner_tenant")],
                }),
            )
            .build();

        let mut t = table("orders");
        process(&entity, &mut t, &TypeRegistry::new(), &MappingConfig::default()).unwrap();

        assert!(t.columns().is_empty());
        assert!(t.mapping_for("Order").unwrap().is_empty());
    }

    #[test]
    fn fail_fast_stops_at_first_error() {
        let entity = EntityType::builder("Doc")
            .property_with(
                FieldDecl::new("a", HostType::String)
                    .annotate(Column::default())
                    .annotate(TypeOverride::default().with_codec("missing")),
            )
            .property_with(FieldDecl::new("b", HostType::String).annotate(Column::default()))
            .build();

        let mut t = table("docs");
        let err = process(&entity, &mut t, &TypeRegistry::new(), &MappingConfig::default()).unwrap_err();

        assert!(matches!(err, MappingError::Property { ref property, .. } if property == "a"));
        assert!(err.is_configuration());
        assert!(t.columns().is_empty());
        assert_eq!(t.mapping_for("Doc").unwrap().property_for_column("a"), Some("a"));
    }

    #[test]
    fn collect_policy_maps_remaining_properties() {
        let entity = EntityType::builder("Doc")
            .property_with(
                FieldDecl::new("a", HostType::String)
                    .annotate(Column::default())
                    .annotate(TypeOverride::default().with_data_type("missing")),
            )
            .property_with(FieldDecl::new("b", HostType::String).annotate(Column::default()))
            .property_with(
                FieldDecl::new("c", HostType::String)
                    .annotate(Column::default())
                    .annotate(TypeOverride::default().with_codec("missing")),
            )
            .build();

        let config = MappingConfig::default().with_error_policy(ErrorPolicy::Collect);
        let mut t = table("docs");
        let err = process(&entity, &mut t, &TypeRegistry::new(), &config).unwrap_err();

        match err {
            MappingError::Collected(errors) => assert_eq!(errors.len(), 2),
            other => panic!("Expected collected errors, got {:?}", other),
        }
        assert_eq!(t.column_names(), vec!["b"]);
    }
}
