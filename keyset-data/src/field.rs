use crate::error::DataError;

/// Maps a logical, user-facing field name to its physical location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Logical name. Also the name written into cursors.
    pub key: String,
    /// Physical relation or alias.
    pub table: String,
    pub column: String,
    /// SQL type bound cursor values are cast to in seek predicates, e.g. `uuid`.
    ///
    /// Values are always bound as text; set this for non-text columns on
    /// databases that do not coerce implicitly (Postgres).
    pub cast: Option<String>,
}

impl FieldDescriptor {
    pub fn new(key: &str, table: &str, column: &str) -> Self {
        Self {
            key: key.to_string(),
            table: table.to_string(),
            column: column.to_string(),
            cast: None,
        }
    }

    pub fn with_cast(mut self, sql_type: &str) -> Self {
        self.cast = Some(sql_type.to_string());
        self
    }

    /// The qualified column reference, `table.column`.
    pub fn expr(&self) -> String {
        format!("{}.{}", self.table, self.column)
    }

    /// Reject descriptors whose table or column would not render as a plain identifier.
    pub fn validate(&self) -> Result<(), DataError> {
        for (kind, ident) in [("table", &self.table), ("column", &self.column)] {
            if !is_valid_identifier(ident) {
                return Err(DataError::internal(format!(
                    "field '{}' has an invalid {kind} identifier: {ident}",
                    self.key
                )));
            }
        }
        if let Some(sql_type) = &self.cast {
            if !is_valid_type_name(sql_type) {
                return Err(DataError::internal(format!(
                    "field '{}' has an invalid cast type: {sql_type}",
                    self.key
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn is_ascending(self) -> bool {
        matches!(self, SortDirection::Ascending)
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Turns a column reference into the SQL expression actually ordered and compared on.
pub type SortTransform = fn(&str) -> String;

/// Number of `/`-separated segments in a path column, for hierarchy-depth ordering.
///
/// `a` has depth 1, `a/b/c` has depth 3. The `CAST` gives the expression
/// integer affinity so string-bound cursor values compare numerically.
pub fn path_depth(column: &str) -> String {
    format!("CAST(LENGTH({column}) - LENGTH(REPLACE({column}, '/', '')) + 1 AS INTEGER)")
}

fn is_valid_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `bigint`, `timestamp with time zone`, `numeric(10, 2)`.
fn is_valid_type_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ' ' | '(' | ')' | ','))
}
