//! Annotation resolution
//!
//! Finds the annotation of a requested kind that applies to a property.
//! Precedence, first match wins:
//!
//! 1. the read accessor
//! 2. the write accessor
//! 3. a field of the same name declared on the entity; when such a field
//!    exists its annotation (or lack of one) replaces the accessor result
//! 4. otherwise the superclass, recursively; at the root of the hierarchy
//!    the accessor result stands
//!
//! An accessor without the annotation defers to the same-signature method
//! visible from its declaring entity's superclass.

use crate::annotation::{Annotation, AnnotationKind, AnnotationType, HasAnnotations};
use crate::introspect::PropertyDescriptor;
use crate::model::{EntityType, MethodRef};

/// Resolves property annotations across accessors, fields and ancestors
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationResolver;

impl AnnotationResolver {
    pub fn new() -> Self {
        Self
    }

    /// Typed annotation applying to a property
    pub fn resolve<'a, A: AnnotationType>(
        &self,
        entity: &'a EntityType,
        property: &PropertyDescriptor<'a>,
    ) -> Option<&'a A> {
        self.resolve_kind(entity, property, A::KIND)
            .and_then(A::extract)
    }

    /// Annotation of a kind applying to a property
    pub fn resolve_kind<'a>(
        &self,
        entity: &'a EntityType,
        property: &PropertyDescriptor<'a>,
        kind: AnnotationKind,
    ) -> Option<&'a Annotation> {
        let from_accessors = property
            .read
            .and_then(|read| self.resolve_on_method(read, kind))
            .or_else(|| {
                property
                    .write
                    .and_then(|write| self.resolve_on_method(write, kind))
            });

        let found = Self::resolve_on_field(entity, &property.name, kind, from_accessors);

        tracing::trace!(
            entity = entity.name(),
            property = %property.name,
            kind = %kind,
            found = found.is_some(),
            "resolved annotation"
        );

        found
    }

    /// Field lookup walking up the hierarchy
    fn resolve_on_field<'a>(
        entity: &'a EntityType,
        property: &str,
        kind: AnnotationKind,
        from_accessors: Option<&'a Annotation>,
    ) -> Option<&'a Annotation> {
        if let Some(field) = entity.declared_field(property) {
            return field.annotation_of_kind(kind);
        }

        match entity.superclass() {
            Some(parent) => Self::resolve_on_field(parent, property, kind, from_accessors),
            None => from_accessors,
        }
    }

    /// Method lookup deferring to the overridden method in the superclass
    pub fn resolve_on_method<'a>(
        &self,
        method: MethodRef<'a>,
        kind: AnnotationKind,
    ) -> Option<&'a Annotation> {
        if let Some(annotation) = method.method.annotation_of_kind(kind) {
            return Some(annotation);
        }

        let parent = method.declaring.superclass()?;
        let overridden = parent.find_method(&method.method.name, &method.method.params)?;
        self.resolve_on_method(overridden, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Column, Id};
    use crate::introspect::property;
    use crate::model::{FieldDecl, MethodDecl};
    use std::sync::Arc;
    use tabula_core::HostType;

    fn column_name<'a>(entity: &'a EntityType, name: &str) -> Option<&'a str> {
        let prop = property(entity, name).expect("property exists");
        AnnotationResolver::new()
            .resolve::<Column>(entity, &prop)
            .and_then(|c| c.name())
    }

    #[test]
    fn read_accessor_annotation() {
        let entity = EntityType::builder("User")
            .method(MethodDecl::getter("name", HostType::String).annotate(Column::named("from_getter")))
            .method(MethodDecl::setter("name", HostType::String).annotate(Column::named("from_setter")))
            .build();

        assert_eq!(column_name(&entity, "name"), Some("from_getter"));
    }

    #[test]
    fn write_accessor_used_when_read_has_none() {
        let entity = EntityType::builder("User")
            .method(MethodDecl::getter("name", HostType::String))
            .method(MethodDecl::setter("name", HostType::String).annotate(Column::named("from_setter")))
            .build();

        assert_eq!(column_name(&entity, "name"), Some("from_setter"));
    }

    #[test]
    fn field_annotation_wins_over_accessor() {
        let entity = EntityType::builder("User")
            .field(FieldDecl::new("name", HostType::String).annotate(Column::named("from_field")))
            .method(MethodDecl::getter("name", HostType::String).annotate(Column::named("from_getter")))
            .build();

        assert_eq!(column_name(&entity, "name"), Some("from_field"));
    }

    #[test]
    fn unannotated_field_hides_accessor_annotation() {
        let entity = EntityType::builder("User")
            .field(FieldDecl::new("name", HostType::String))
            .method(MethodDecl::getter("name", HostType::String).annotate(Column::named("from_getter")))
            .build();

        assert_eq!(column_name(&entity, "name"), None);
    }

    #[test]
    fn root_ancestor_field_found_through_three_levels() {
        let root = EntityType::builder("Root")
            .property_with(FieldDecl::new("id", HostType::I64).annotate(Column::named("pk")))
            .build();
        let middle = EntityType::builder("Middle").extends(root).build();
        let leaf = EntityType::builder("Leaf").extends(middle).build();

        assert_eq!(column_name(&leaf, "id"), Some("pk"));
    }

    #[test]
    fn nearest_declared_field_stops_the_walk() {
        let root = EntityType::builder("Root")
            .property_with(FieldDecl::new("id", HostType::I64).annotate(Id))
            .build();
        let leaf = EntityType::builder("Leaf")
            .extends(root)
            .field(FieldDecl::new("id", HostType::I64))
            .build();

        let prop = property(&leaf, "id").unwrap();
        assert!(AnnotationResolver::new().resolve::<Id>(&leaf, &prop).is_none());
    }

    #[test]
    fn accessor_defers_to_overridden_method() {
        let root = EntityType::builder("Root")
            .method(MethodDecl::getter("code", HostType::String).annotate(Column::named("root_code")))
            .build();
        let middle = EntityType::builder("Middle").extends(root).build();
        let leaf = EntityType::builder("Leaf")
            .extends(middle)
            .method(MethodDecl::getter("code", HostType::String))
            .build();

        let prop = property(&leaf, "code").unwrap();
        assert_eq!(prop.read.unwrap().declaring.name(), "Leaf");
        assert_eq!(column_name(&leaf, "code"), Some("root_code"));
    }

    #[test]
    fn absent_everywhere() {
        let root: Arc<EntityType> = EntityType::builder("Root").property("id", HostType::I64).build();
        let leaf = EntityType::builder("Leaf").extends(root).build();

        assert_eq!(column_name(&leaf, "id"), None);
    }
}
