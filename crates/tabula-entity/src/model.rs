//! Structural entity model
//!
//! An [`EntityType`] describes a data-model class: its declared fields, its
//! methods (accessors among them), class-level annotations and an optional
//! superclass. Entities are immutable once built and shared as `Arc`.

use crate::annotation::{Annotation, AnnotationType, Annotations, HasAnnotations};
use std::sync::Arc;
use tabula_core::HostType;

/// A declared storage field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub host_type: HostType,
    pub annotations: Annotations,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, host_type: HostType) -> Self {
        Self {
            name: name.into(),
            host_type,
            annotations: Annotations::new(),
        }
    }

    pub fn annotate(mut self, annotation: impl Into<Annotation>) -> Self {
        self.annotations.push(annotation);
        self
    }
}

impl HasAnnotations for FieldDecl {
    fn annotations(&self) -> &Annotations {
        &self.annotations
    }
}

/// A declared method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<HostType>,
    pub returns: Option<HostType>,
    pub annotations: Annotations,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>, params: Vec<HostType>, returns: Option<HostType>) -> Self {
        Self {
            name: name.into(),
            params,
            returns,
            annotations: Annotations::new(),
        }
    }

    /// `get<Property>() -> host_type`
    pub fn getter(property: &str, host_type: HostType) -> Self {
        Self::new(format!("get{}", capitalize(property)), Vec::new(), Some(host_type))
    }

    /// `is<Property>() -> bool`
    pub fn bool_getter(property: &str) -> Self {
        Self::new(format!("is{}", capitalize(property)), Vec::new(), Some(HostType::Bool))
    }

    /// `set<Property>(host_type)`
    pub fn setter(property: &str, host_type: HostType) -> Self {
        Self::new(format!("set{}", capitalize(property)), vec![host_type], None)
    }

    pub fn annotate(mut self, annotation: impl Into<Annotation>) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Same name and parameter types
    pub fn same_signature(&self, name: &str, params: &[HostType]) -> bool {
        self.name == name && self.params == params
    }
}

impl HasAnnotations for MethodDecl {
    fn annotations(&self) -> &Annotations {
        &self.annotations
    }
}

/// A method together with the entity that declares it
#[derive(Debug, Clone, Copy)]
pub struct MethodRef<'a> {
    pub declaring: &'a EntityType,
    pub method: &'a MethodDecl,
}

impl<'a> MethodRef<'a> {
    pub fn name(&self) -> &'a str {
        &self.method.name
    }
}

/// A data-model class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityType {
    name: String,
    superclass: Option<Arc<EntityType>>,
    annotations: Annotations,
    fields: Vec<FieldDecl>,
    methods: Vec<MethodDecl>,
}

impl EntityType {
    /// Start building an entity
    pub fn builder(name: impl Into<String>) -> EntityBuilder {
        EntityBuilder {
            entity: EntityType {
                name: name.into(),
                superclass: None,
                annotations: Annotations::new(),
                fields: Vec::new(),
                methods: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct superclass; `None` at the root of the hierarchy
    pub fn superclass(&self) -> Option<&EntityType> {
        self.superclass.as_deref()
    }

    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    pub fn methods(&self) -> &[MethodDecl] {
        &self.methods
    }

    /// Field declared on this entity itself
    pub fn declared_field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Method declared on this entity itself
    pub fn declared_method(&self, name: &str, params: &[HostType]) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.same_signature(name, params))
    }

    /// Method declared here or inherited, nearest declaration first
    pub fn find_method(&self, name: &str, params: &[HostType]) -> Option<MethodRef<'_>> {
        self.hierarchy().find_map(|entity| {
            entity
                .declared_method(name, params)
                .map(|method| MethodRef { declaring: entity, method })
        })
    }

    /// This entity followed by its ancestors
    pub fn hierarchy(&self) -> impl Iterator<Item = &EntityType> {
        std::iter::successors(Some(self), |e| e.superclass())
    }

    /// Class-level annotation, inherited from ancestors when not declared here
    pub fn class_annotation<A: AnnotationType>(&self) -> Option<&A> {
        self.hierarchy().find_map(|e| e.annotation::<A>())
    }
}

impl HasAnnotations for EntityType {
    fn annotations(&self) -> &Annotations {
        &self.annotations
    }
}

/// Builder for [`EntityType`]
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    entity: EntityType,
}

impl EntityBuilder {
    /// Set the superclass
    pub fn extends(mut self, parent: Arc<EntityType>) -> Self {
        self.entity.superclass = Some(parent);
        self
    }

    /// Attach a class-level annotation
    pub fn annotate(mut self, annotation: impl Into<Annotation>) -> Self {
        self.entity.annotations.push(annotation);
        self
    }

    pub fn field(mut self, field: FieldDecl) -> Self {
        self.entity.fields.push(field);
        self
    }

    pub fn method(mut self, method: MethodDecl) -> Self {
        self.entity.methods.push(method);
        self
    }

    /// Declare a field with a getter and a setter
    pub fn property(self, name: &str, host_type: HostType) -> Self {
        self.property_with(FieldDecl::new(name, host_type))
    }

    /// Declare an annotated field with a getter and a setter
    pub fn property_with(self, field: FieldDecl) -> Self {
        let getter = MethodDecl::getter(&field.name, field.host_type.clone());
        let setter = MethodDecl::setter(&field.name, field.host_type.clone());
        self.field(field).method(getter).method(setter)
    }

    pub fn build(self) -> Arc<EntityType> {
        Arc::new(self.entity)
    }
}

/// Upper-case the first character
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-case the first character unless the first two are both upper-case
/// (`URL` stays `URL`, `Name` becomes `name`)
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    if let Some(second) = chars.clone().next() {
        if first.is_uppercase() && second.is_uppercase() {
            return name.to_string();
        }
    }
    first.to_lowercase().chain(chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Table;

    #[test]
    fn name_case_helpers() {
        assert_eq!(capitalize("createdAt"), "CreatedAt");
        assert_eq!(decapitalize("CreatedAt"), "createdAt");
        assert_eq!(decapitalize("URL"), "URL");
        assert_eq!(decapitalize("X"), "x");
        assert_eq!(decapitalize(""), "");
    }

    #[test]
    fn property_declares_accessors() {
        let entity = EntityType::builder("User").property("name", HostType::String).build();

        assert!(entity.declared_field("name").is_some());
        assert!(entity.declared_method("getName", &[]).is_some());
        assert!(entity.declared_method("setName", &[HostType::String]).is_some());
        assert!(entity.declared_method("setName", &[HostType::I32]).is_none());
    }

    #[test]
    fn find_method_walks_hierarchy() {
        let base = EntityType::builder("Base").property("id", HostType::I64).build();
        let user = EntityType::builder("User").extends(base).build();

        let found = user.find_method("getId", &[]).unwrap();
        assert_eq!(found.declaring.name(), "Base");
        assert!(user.declared_method("getId", &[]).is_none());
    }

    #[test]
    fn class_annotation_is_inherited() {
        let base = EntityType::builder("Base").annotate(Table::named("base_table")).build();
        let user = EntityType::builder("User").extends(base).build();

        assert_eq!(user.class_annotation::<Table>().and_then(|t| t.name()), Some("base_table"));
        assert_eq!(user.hierarchy().map(|e| e.name()).collect::<Vec<_>>(), vec!["User", "Base"]);
    }
}
