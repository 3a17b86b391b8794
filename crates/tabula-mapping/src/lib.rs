//! Entity-to-table metadata mapping
//!
//! Resolves table metadata from an annotated entity type: index metadata
//! from the table declaration, and for every annotated property a column
//! with its data type, value codec and primary-key flag.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tabula_core::{MappingConfig, SqlDialect, TableMetadata};
//! use tabula_mapping::{process, table_name, TypeRegistry};
//!
//! let mut table = TableMetadata::new(table_name(&entity), Arc::new(SqlDialect::postgres()));
//! process(&entity, &mut table, &TypeRegistry::with_builtins(), &MappingConfig::default())?;
//! ```

pub mod error;
pub mod registry;
pub mod index;
pub mod column;
pub mod processor;

pub use error::MappingError;
pub use registry::TypeRegistry;
pub use index::{parse_column_list, IndexBuilder};
pub use column::ColumnBuilder;
pub use processor::{process, table_name, EntityTableProcessor, RelationColumn};
