//! Index metadata from table-level index declarations

use tabula_core::{IndexColumn, IndexMetadata, IndexSort};
use tabula_entity::Index;

/// Builds index metadata for one mapping pass
///
/// Unnamed indexes are numbered `<table>_idx_<n>`, counting from zero
/// within the pass.
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    sequence: usize,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build metadata for one declaration
    pub fn build(&mut self, table_name: &str, index: &Index) -> IndexMetadata {
        let name = match index.name() {
            Some(name) => name.to_string(),
            None => {
                let name = format!("{}_idx_{}", table_name, self.sequence);
                self.sequence += 1;
                name
            }
        };

        let mut metadata = IndexMetadata::new(name).with_unique(index.unique);
        metadata.columns = parse_column_list(&index.column_list);
        metadata
    }
}

/// Parse `"id,name desc"` into ordered index columns
///
/// Each comma-separated entry is a column name optionally followed by a
/// sort token; only `desc` (any case) sorts descending. Empty entries are
/// skipped.
pub fn parse_column_list(column_list: &str) -> Vec<IndexColumn> {
    column_list.split(',')
        .filter_map(|entry| {
            let mut tokens = entry.split_whitespace();
            let column = tokens.next()?;
            Some(IndexColumn::new(column, IndexSort::from_token(tokens.next())))
        })
        .collect()
}
