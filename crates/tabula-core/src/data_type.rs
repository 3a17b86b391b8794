//! Storage kinds and column data types

use crate::host_type::HostType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Low-level relational storage classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StorageKind {
    Boolean,
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Float,
    Double,
    Numeric,
    Decimal,
    Char,
    Varchar,
    Nvarchar,
    LongVarchar,
    Clob,
    Binary,
    Varbinary,
    LongVarbinary,
    Blob,
    Date,
    Time,
    Timestamp,
    Other,
}

impl StorageKind {
    /// Every storage kind, in declaration order
    pub const ALL: [StorageKind; 24] = [
        Self::Boolean,
        Self::Bit,
        Self::TinyInt,
        Self::SmallInt,
        Self::Integer,
        Self::BigInt,
        Self::Real,
        Self::Float,
        Self::Double,
        Self::Numeric,
        Self::Decimal,
        Self::Char,
        Self::Varchar,
        Self::Nvarchar,
        Self::LongVarchar,
        Self::Clob,
        Self::Binary,
        Self::Varbinary,
        Self::LongVarbinary,
        Self::Blob,
        Self::Date,
        Self::Time,
        Self::Timestamp,
        Self::Other,
    ];

    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::Bit => "BIT",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Real => "REAL",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Numeric => "NUMERIC",
            Self::Decimal => "DECIMAL",
            Self::Char => "CHAR",
            Self::Varchar => "VARCHAR",
            Self::Nvarchar => "NVARCHAR",
            Self::LongVarchar => "LONGVARCHAR",
            Self::Clob => "CLOB",
            Self::Binary => "BINARY",
            Self::Varbinary => "VARBINARY",
            Self::LongVarbinary => "LONGVARBINARY",
            Self::Blob => "BLOB",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Other => "OTHER",
        }
    }
}

impl Default for StorageKind {
    fn default() -> Self {
        Self::Varchar
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error parsing a storage kind name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown storage kind: '{0}'")]
pub struct ParseStorageKindError(pub String);

impl TryFrom<String> for StorageKind {
    type Error = ParseStorageKindError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StorageKind> for String {
    fn from(value: StorageKind) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for StorageKind {
    type Err = ParseStorageKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', "");
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ParseStorageKindError(s.to_string()))
    }
}

/// Resolved data type of a column
///
/// Storage data types are keyed by the lower-case storage kind name. Custom
/// data types carry their own identifier, which dialects may know a template
/// for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataType {
    /// Identifier used for dialect lookups
    pub id: String,

    /// Display name
    pub name: String,

    /// Low-level storage kind
    pub storage_kind: StorageKind,

    /// Host type this data type was derived for, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_type: Option<HostType>,
}

impl DataType {
    /// Data type derived purely from a storage kind and host type
    pub fn storage(storage_kind: StorageKind, host_type: Option<HostType>) -> Self {
        let id = storage_kind.as_str().to_lowercase();
        Self {
            name: id.clone(),
            id,
            storage_kind,
            host_type,
        }
    }

    /// Custom data type with its own identifier
    pub fn custom(id: impl Into<String>, name: impl Into<String>, storage_kind: StorageKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            storage_kind,
            host_type: None,
        }
    }

    /// Whether this type was created from a custom identifier
    pub fn is_custom(&self) -> bool {
        !self.id.eq_ignore_ascii_case(self.storage_kind.as_str())
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
