//! Table, column and index metadata

use crate::codec::SharedCodec;
use crate::data_type::{DataType, StorageKind};
use crate::dialect::Dialect;
use crate::host_type::HostType;
use crate::mapping::EntityColumnMapping;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Sort direction of an index column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexSort {
    #[default]
    Asc,
    Desc,
}

impl IndexSort {
    /// Parse a sort token; anything but `desc` (case-insensitive) is ascending
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some(t) if t.eq_ignore_ascii_case("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }
}

impl fmt::Display for IndexSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// A column participating in an index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexColumn {
    /// Column name
    pub column: String,

    /// Sort direction
    #[serde(default)]
    pub sort: IndexSort,
}

impl IndexColumn {
    pub fn new(column: impl Into<String>, sort: IndexSort) -> Self {
        Self {
            column: column.into(),
            sort,
        }
    }
}

/// Index metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Index name
    pub name: String,

    /// Whether the index enforces uniqueness
    pub unique: bool,

    /// Ordered index columns
    pub columns: Vec<IndexColumn>,
}

impl IndexMetadata {
    /// Create an empty, non-unique index
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unique: false,
            columns: Vec::new(),
        }
    }

    /// Set uniqueness
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Column names in index order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.column.as_str()).collect()
    }
}

/// Resolved metadata for one column
#[derive(Debug, Clone, Serialize)]
pub struct ColumnMetadata {
    /// Column name, unique within the table
    pub name: String,

    /// Name of the property this column was resolved from
    pub alias: Option<String>,

    /// Host value type of the property
    pub host_type: Option<HostType>,

    /// Declared length (character types)
    pub length: u32,

    /// Declared precision (numeric types)
    pub precision: u32,

    /// Declared scale (numeric types)
    pub scale: u32,

    /// Column rejects NULL
    pub not_null: bool,

    /// Column may be written by updates
    pub updatable: bool,

    /// Raw column definition text overriding the dialect
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_definition: Option<String>,

    /// Part of the primary key
    pub primary_key: bool,

    /// Assigned data type
    pub data_type: Option<DataType>,

    /// SQL type text materialized by the dialect
    pub sql_type: Option<String>,

    /// Codec translating between host and stored values
    #[serde(rename = "codec", serialize_with = "serialize_codec")]
    pub value_codec: Option<SharedCodec>,
}

fn serialize_codec<S: Serializer>(codec: &Option<SharedCodec>, serializer: S) -> Result<S::Ok, S::Error> {
    match codec {
        Some(codec) => serializer.serialize_some(codec.name()),
        None => serializer.serialize_none(),
    }
}

impl ColumnMetadata {
    /// Create an empty nullable, updatable column
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            host_type: None,
            length: 0,
            precision: 0,
            scale: 0,
            not_null: false,
            updatable: true,
            column_definition: None,
            primary_key: false,
            data_type: None,
            sql_type: None,
            value_codec: None,
        }
    }

    /// Assign a data type derived from a storage kind
    pub fn set_storage_kind(&mut self, kind: StorageKind, host_type: Option<HostType>) {
        self.data_type = Some(DataType::storage(kind, host_type));
    }

    /// Storage kind of the assigned data type
    pub fn storage_kind(&self) -> Option<StorageKind> {
        self.data_type.as_ref().map(|t| t.storage_kind)
    }

    /// Name of the assigned codec
    pub fn codec_name(&self) -> Option<&str> {
        self.value_codec.as_deref().map(|c| c.name())
    }
}

/// Schema container populated by a mapping pass
pub trait TableSchema {
    /// Table name
    fn name(&self) -> &str;

    /// Dialect used to materialize column types
    fn dialect(&self) -> Arc<dyn Dialect>;

    /// Look up an existing column by name
    fn column(&self, name: &str) -> Option<&ColumnMetadata>;

    /// Create a fresh column, not yet registered
    fn new_column(&self) -> ColumnMetadata;

    /// Register a column, replacing any column with the same name
    fn add_column(&mut self, column: ColumnMetadata);

    /// Register an index, replacing any index with the same name
    fn add_index(&mut self, index: IndexMetadata);

    /// Attach an entity column mapping
    fn attach_mapping(&mut self, mapping: EntityColumnMapping);
}

/// Metadata of one relational table
#[derive(Debug, Clone, Serialize)]
pub struct TableMetadata {
    /// Table name
    pub name: String,

    /// Ordered columns
    columns: Vec<ColumnMetadata>,

    /// Declared indexes
    indexes: Vec<IndexMetadata>,

    /// Entity mappings attached by mapping passes
    mappings: Vec<EntityColumnMapping>,

    #[serde(skip)]
    dialect: Arc<dyn Dialect>,
}

impl TableMetadata {
    /// Create an empty table
    pub fn new(name: impl Into<String>, dialect: Arc<dyn Dialect>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            mappings: Vec::new(),
            dialect,
        }
    }

    /// Columns in registration order
    pub fn columns(&self) -> &[ColumnMetadata] {
        &self.columns
    }

    /// Declared indexes
    pub fn indexes(&self) -> &[IndexMetadata] {
        &self.indexes
    }

    /// Find an index by name
    pub fn index(&self, name: &str) -> Option<&IndexMetadata> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Attached entity mappings
    pub fn mappings(&self) -> &[EntityColumnMapping] {
        &self.mappings
    }

    /// Mapping attached for an entity
    pub fn mapping_for(&self, entity: &str) -> Option<&EntityColumnMapping> {
        self.mappings.iter().find(|m| m.entity() == entity)
    }

    /// Column names in registration order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Primary key columns
    pub fn primary_key(&self) -> Vec<&ColumnMetadata> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }
}

impl TableSchema for TableMetadata {
    fn name(&self) -> &str {
        &self.name
    }

    fn dialect(&self) -> Arc<dyn Dialect> {
        Arc::clone(&self.dialect)
    }

    fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn new_column(&self) -> ColumnMetadata {
        ColumnMetadata::new("")
    }

    fn add_column(&mut self, column: ColumnMetadata) {
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }

    fn add_index(&mut self, index: IndexMetadata) {
        match self.indexes.iter_mut().find(|i| i.name == index.name) {
            Some(existing) => *existing = index,
            None => self.indexes.push(index),
        }
    }

    fn attach_mapping(&mut self, mapping: EntityColumnMapping) {
        match self.mappings.iter_mut().find(|m| m.entity() == mapping.entity()) {
            Some(existing) => *existing = mapping,
            None => self.mappings.push(mapping),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SqlDialect;

    fn table() -> TableMetadata {
        TableMetadata::new("users", Arc::new(SqlDialect::postgres()))
    }

    #[test]
    fn sort_token_parsing() {
        assert_eq!(IndexSort::from_token(Some("DESC")), IndexSort::Desc);
        assert_eq!(IndexSort::from_token(Some("asc")), IndexSort::Asc);
        assert_eq!(IndexSort::from_token(Some("sideways")), IndexSort::Asc);
        assert_eq!(IndexSort::from_token(None), IndexSort::Asc);
    }

    #[test]
    fn add_column_replaces_same_name() {
        let mut table = table();
        table.add_column(ColumnMetadata::new("id"));
        table.add_column(ColumnMetadata::new("name"));

        let mut id = table.column("id").cloned().unwrap();
        id.primary_key = true;
        table.add_column(id);

        assert_eq!(table.column_names(), vec!["id", "name"]);
        assert_eq!(table.primary_key().len(), 1);
    }

    #[test]
    fn add_index_replaces_same_name() {
        let mut table = table();
        table.add_index(IndexMetadata::new("users_idx_0"));
        table.add_index(IndexMetadata::new("users_idx_0").with_unique(true));

        assert_eq!(table.indexes().len(), 1);
        assert!(table.index("users_idx_0").unwrap().unique);
    }

    #[test]
    fn new_column_defaults() {
        let column = table().new_column();
        assert!(column.updatable);
        assert!(!column.not_null);
        assert!(!column.primary_key);
        assert!(column.data_type.is_none());
    }

    #[test]
    fn column_serializes_codec_name() {
        let mut column = ColumnMetadata::new("created_at");
        column.value_codec = Some(Arc::new(crate::codec::JsonCodec));

        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["codec"], "json");
        assert!(json.get("column_definition").is_none());
    }
}
