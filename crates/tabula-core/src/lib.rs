//! Tabula Core
//!
//! Table metadata model shared by the mapping crates: host types, storage
//! kinds, value codecs, dialects and the entity column mapping.

pub mod host_type;
pub mod data_type;
pub mod codec;
pub mod metadata;
pub mod dialect;
pub mod mapping;
pub mod config;

pub use host_type::{HostType, ParseHostTypeError};
pub use data_type::{DataType, StorageKind, ParseStorageKindError};
pub use codec::{ValueCodec, SharedCodec, CodecError, DateTimeCodec, NumberValueCodec, JsonCodec, DEFAULT_DATE_TIME_PATTERN};
pub use metadata::{TableMetadata, TableSchema, ColumnMetadata, IndexMetadata, IndexColumn, IndexSort};
pub use dialect::{Dialect, SqlDialect, TypeTemplate};
pub use mapping::{EntityColumnMapping, MappingRegistry};
pub use config::{MappingConfig, DialectConfig, CodecPolicy, ErrorPolicy, ConfigError};
