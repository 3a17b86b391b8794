//! Entity model and annotation resolution
//!
//! This crate handles:
//! - The structural description of entity types (fields, methods, superclass)
//! - Mapping annotations and typed lookups
//! - Deriving properties from accessor methods
//! - Resolving the annotation that applies to a property
//! - Loading entity documents (TOML/JSON)

pub mod annotation;
pub mod model;
pub mod introspect;
pub mod resolver;
pub mod document;

pub use annotation::{
    Annotation, AnnotationKind, AnnotationType, Annotations, Column, HasAnnotations, Id, Index,
    JoinColumn, JoinColumns, Table, TypeOverride,
};
pub use model::{EntityBuilder, EntityType, FieldDecl, MethodDecl, MethodRef};
pub use introspect::{properties, property, PropertyDescriptor};
pub use resolver::AnnotationResolver;
pub use document::{DocumentError, EntityCatalog, EntityDocument, EntityDef, MemberDef, MethodDef};
