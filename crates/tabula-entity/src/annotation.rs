//! Mapping annotations
//!
//! Annotations are attached to entity types, fields and methods. Each kind
//! is a variant of [`Annotation`]; typed lookups go through
//! [`AnnotationType`].

use serde::{Deserialize, Serialize};
use std::fmt;
use tabula_core::StorageKind;

/// Table declaration on an entity type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name; defaults to the entity name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Declared indexes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<Index>,
}

impl Table {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            indexes: Vec::new(),
        }
    }

    /// Add an index declaration
    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Explicit, non-empty table name
    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }
}

/// Index declaration inside a [`Table`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name; generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Comma-separated columns, each optionally followed by `asc` or `desc`
    pub column_list: String,

    /// Enforce uniqueness
    #[serde(default)]
    pub unique: bool,
}

impl Index {
    pub fn new(column_list: impl Into<String>) -> Self {
        Self {
            name: None,
            column_list: column_list.into(),
            unique: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Explicit, non-empty index name
    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }
}

/// Column declaration on a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Column {
    /// Column name; defaults to the property name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Owning table when the column lives in another table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    pub length: u32,
    pub precision: u32,
    pub scale: u32,
    pub nullable: bool,
    pub updatable: bool,
    pub insertable: bool,
    pub unique: bool,

    /// Raw SQL column definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_definition: Option<String>,
}

impl Default for Column {
    fn default() -> Self {
        Self {
            name: None,
            table: None,
            length: 255,
            precision: 0,
            scale: 0,
            nullable: true,
            updatable: true,
            insertable: true,
            unique: false,
            column_definition: None,
        }
    }
}

impl Column {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    pub fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_updatable(mut self, updatable: bool) -> Self {
        self.updatable = updatable;
        self
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.column_definition = Some(definition.into());
        self
    }

    /// Explicit, non-empty column name
    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    /// Explicit, non-empty owning table
    pub fn table(&self) -> Option<&str> {
        non_empty(&self.table)
    }

    /// Explicit, non-empty raw definition
    pub fn column_definition(&self) -> Option<&str> {
        non_empty(&self.column_definition)
    }
}

/// Type override on a property
///
/// `codec` and `data_type` name factories in the type registry; absence
/// means "no override".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,

    /// Custom type identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_id: Option<String>,

    /// Storage kind paired with `type_id`, or used alone
    pub storage_kind: StorageKind,
}

impl TypeOverride {
    pub fn storage(kind: StorageKind) -> Self {
        Self {
            storage_kind: kind,
            ..Self::default()
        }
    }

    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = Some(codec.into());
        self
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    pub fn with_type_id(mut self, type_id: impl Into<String>) -> Self {
        self.type_id = Some(type_id.into());
        self
    }

    pub fn codec(&self) -> Option<&str> {
        non_empty(&self.codec)
    }

    pub fn data_type(&self) -> Option<&str> {
        non_empty(&self.data_type)
    }

    pub fn type_id(&self) -> Option<&str> {
        non_empty(&self.type_id)
    }
}

/// Primary key marker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Id;

/// Relation column declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinColumn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub referenced_column: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

impl JoinColumn {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn referencing(mut self, column: impl Into<String>) -> Self {
        self.referenced_column = Some(column.into());
        self
    }
}

/// Repeated relation column declarations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinColumns {
    pub columns: Vec<JoinColumn>,
}

/// Discriminant of an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Table,
    Column,
    Type,
    Id,
    JoinColumn,
    JoinColumns,
}

impl AnnotationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Column => "column",
            Self::Type => "type",
            Self::Id => "id",
            Self::JoinColumn => "join_column",
            Self::JoinColumns => "join_columns",
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Any mapping annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
    Table(Table),
    Column(Column),
    Type(TypeOverride),
    Id,
    JoinColumn(JoinColumn),
    JoinColumns(JoinColumns),
}

impl Annotation {
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Self::Table(_) => AnnotationKind::Table,
            Self::Column(_) => AnnotationKind::Column,
            Self::Type(_) => AnnotationKind::Type,
            Self::Id => AnnotationKind::Id,
            Self::JoinColumn(_) => AnnotationKind::JoinColumn,
            Self::JoinColumns(_) => AnnotationKind::JoinColumns,
        }
    }
}

impl From<Table> for Annotation {
    fn from(value: Table) -> Self {
        Self::Table(value)
    }
}

impl From<Column> for Annotation {
    fn from(value: Column) -> Self {
        Self::Column(value)
    }
}

impl From<TypeOverride> for Annotation {
    fn from(value: TypeOverride) -> Self {
        Self::Type(value)
    }
}

impl From<Id> for Annotation {
    fn from(_: Id) -> Self {
        Self::Id
    }
}

impl From<JoinColumn> for Annotation {
    fn from(value: JoinColumn) -> Self {
        Self::JoinColumn(value)
    }
}

impl From<JoinColumns> for Annotation {
    fn from(value: JoinColumns) -> Self {
        Self::JoinColumns(value)
    }
}

/// An annotation payload type that can be looked up by kind
pub trait AnnotationType: Sized + 'static {
    const KIND: AnnotationKind;

    /// Borrow the payload if the annotation is of this kind
    fn extract(annotation: &Annotation) -> Option<&Self>;
}

macro_rules! annotation_type {
    ($ty:ident, $kind:ident) => {
        impl AnnotationType for $ty {
            const KIND: AnnotationKind = AnnotationKind::$kind;

            fn extract(annotation: &Annotation) -> Option<&Self> {
                match annotation {
                    Annotation::$kind(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

annotation_type!(Table, Table);
annotation_type!(Column, Column);
annotation_type!(TypeOverride, Type);
annotation_type!(JoinColumn, JoinColumn);
annotation_type!(JoinColumns, JoinColumns);

impl AnnotationType for Id {
    const KIND: AnnotationKind = AnnotationKind::Id;

    fn extract(annotation: &Annotation) -> Option<&Self> {
        match annotation {
            Annotation::Id => Some(&Id),
            _ => None,
        }
    }
}

/// Annotations attached to one member
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations(Vec<Annotation>);

impl Annotations {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Attach an annotation; a later annotation of the same kind replaces it
    pub fn push(&mut self, annotation: impl Into<Annotation>) {
        let annotation = annotation.into();
        let kind = annotation.kind();
        match self.0.iter_mut().find(|a| a.kind() == kind) {
            Some(existing) => *existing = annotation,
            None => self.0.push(annotation),
        }
    }

    /// Annotation of the given kind
    pub fn of_kind(&self, kind: AnnotationKind) -> Option<&Annotation> {
        self.0.iter().find(|a| a.kind() == kind)
    }

    /// Typed annotation lookup
    pub fn get<A: AnnotationType>(&self) -> Option<&A> {
        self.of_kind(A::KIND).and_then(A::extract)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Annotation> for Annotations {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        let mut annotations = Self::new();
        for annotation in iter {
            annotations.push(annotation);
        }
        annotations
    }
}

/// A member that carries annotations
pub trait HasAnnotations {
    fn annotations(&self) -> &Annotations;

    /// Typed annotation declared directly on this member
    fn annotation<A: AnnotationType>(&self) -> Option<&A> {
        self.annotations().get::<A>()
    }

    /// Annotation of a kind declared directly on this member
    fn annotation_of_kind(&self, kind: AnnotationKind) -> Option<&Annotation> {
        self.annotations().of_kind(kind)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_defaults() {
        let column = Column::default();
        assert_eq!(column.length, 255);
        assert!(column.nullable);
        assert!(column.updatable);
        assert_eq!(column.name(), None);
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let column = Column {
            name: Some(String::new()),
            table: Some(String::new()),
            ..Column::default()
        };
        assert_eq!(column.name(), None);
        assert_eq!(column.table(), None);
        assert_eq!(TypeOverride::default().with_codec("").codec(), None);
    }

    #[test]
    fn typed_lookup() {
        let annotations: Annotations = vec![
            Annotation::Id,
            Annotation::Column(Column::named("user_id")),
        ]
        .into_iter()
        .collect();

        assert!(annotations.get::<Id>().is_some());
        assert_eq!(annotations.get::<Column>().and_then(|c| c.name()), Some("user_id"));
        assert!(annotations.get::<TypeOverride>().is_none());
    }

    #[test]
    fn push_replaces_same_kind() {
        let mut annotations = Annotations::new();
        annotations.push(Column::named("a"));
        annotations.push(Column::named("b"));

        assert_eq!(annotations.iter().count(), 1);
        assert_eq!(annotations.get::<Column>().and_then(|c| c.name()), Some("b"));
    }

    #[test]
    fn tagged_deserialization() {
        let annotations: Vec<Annotation> = serde_json::from_str(
            r#"[
                {"kind": "id"},
                {"kind": "column", "name": "email", "nullable": false},
                {"kind": "type", "type_id": "jsonb", "storage_kind": "OTHER"},
                {"kind": "join_columns", "columns": [{"name": "owner_id"}]}
            ]"#,
        )
        .unwrap();

        assert_eq!(annotations[0], Annotation::Id);
        match &annotations[1] {
            Annotation::Column(column) => {
                assert_eq!(column.name(), Some("email"));
                assert!(!column.nullable);
                assert_eq!(column.length, 255);
            }
            other => panic!("Expected column, got {:?}", other),
        }
        assert_eq!(annotations[2].kind(), AnnotationKind::Type);
        assert_eq!(annotations[3].kind(), AnnotationKind::JoinColumns);
    }
}
