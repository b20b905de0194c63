//! A fluent SELECT builder rendering parameterized SQL.
//!
//! ```ignore
//! let stmt = QueryBuilder::new("groups")
//!     .where_eq("groups.parent_id", "42")
//!     .where_like("groups.name", "eng%")
//!     .order_by("groups.id", SortDirection::Ascending)
//!     .limit(10)
//!     .build_select("groups.*");
//! ```
//!
//! All bind values are strings. Seek terms may wrap their placeholder in a `CAST`
//! for databases that do not coerce text during comparison.

use crate::field::SortDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Generic SQL using `?` placeholders, no row-value comparisons.
    #[default]
    Generic,
    Sqlite,
    MySql,
    /// `$1, $2, ...` placeholders.
    Postgres,
}

impl Dialect {
    fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Generic | Dialect::Sqlite | Dialect::MySql => "?".to_string(),
        }
    }

    /// Whether `(a, b) > (x, y)` is understood natively.
    pub fn supports_row_values(self) -> bool {
        !matches!(self, Dialect::Generic)
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "generic" => Ok(Dialect::Generic),
            "sqlite" => Ok(Dialect::Sqlite),
            "mysql" => Ok(Dialect::MySql),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            other => Err(format!(
                "unknown dialect '{other}' (expected generic, sqlite, mysql or postgres)"
            )),
        }
    }
}

/// Strict comparison used by seek predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Greater,
    Less,
}

impl Comparison {
    fn as_sql(self) -> &'static str {
        match self {
            Comparison::Greater => ">",
            Comparison::Less => "<",
        }
    }
}

/// One column of a seek predicate and the cursor value it is compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeekTerm {
    pub expr: String,
    pub value: String,
    /// Renders the placeholder as `CAST(? AS <type>)`.
    pub cast: Option<String>,
}

impl SeekTerm {
    pub fn new(expr: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            value: value.into(),
            cast: None,
        }
    }

    pub fn with_cast(mut self, sql_type: impl Into<String>) -> Self {
        self.cast = Some(sql_type.into());
        self
    }
}

/// Rendered SQL plus its positional bind values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    conditions: Vec<Condition>,
    order: Vec<(String, SortDirection)>,
    limit_val: Option<u64>,
    dialect: Dialect,
}

#[derive(Debug, Clone)]
enum Condition {
    Eq(String, String),
    NotEq(String, String),
    Like(String, String),
    Gt(String, String),
    Lt(String, String),
    In(String, Vec<String>),
    IsNull(String),
    IsNotNull(String),
    Seek {
        terms: Vec<SeekTerm>,
        cmp: Comparison,
        native: bool,
    },
}

impl QueryBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            conditions: Vec::new(),
            order: Vec::new(),
            limit_val: None,
            dialect: Dialect::Generic,
        }
    }

    pub fn new_with_dialect(table: &str, dialect: Dialect) -> Self {
        Self::new(table).dialect(dialect)
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn get_dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn where_eq(mut self, column: &str, value: &str) -> Self {
        self.conditions
            .push(Condition::Eq(column.to_string(), value.to_string()));
        self
    }

    pub fn where_not_eq(mut self, column: &str, value: &str) -> Self {
        self.conditions
            .push(Condition::NotEq(column.to_string(), value.to_string()));
        self
    }

    pub fn where_like(mut self, column: &str, pattern: &str) -> Self {
        self.conditions
            .push(Condition::Like(column.to_string(), pattern.to_string()));
        self
    }

    pub fn where_gt(mut self, column: &str, value: &str) -> Self {
        self.conditions
            .push(Condition::Gt(column.to_string(), value.to_string()));
        self
    }

    pub fn where_lt(mut self, column: &str, value: &str) -> Self {
        self.conditions
            .push(Condition::Lt(column.to_string(), value.to_string()));
        self
    }

    pub fn where_in(mut self, column: &str, values: &[&str]) -> Self {
        self.conditions.push(Condition::In(
            column.to_string(),
            values.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn where_null(mut self, column: &str) -> Self {
        self.conditions.push(Condition::IsNull(column.to_string()));
        self
    }

    pub fn where_not_null(mut self, column: &str) -> Self {
        self.conditions
            .push(Condition::IsNotNull(column.to_string()));
        self
    }

    /// Lexicographic comparison of the terms' expressions against their values.
    ///
    /// With `native` the predicate renders as `(e1, e2) > (?, ?)`; otherwise it
    /// expands to `(e1 > ? OR (e1 = ? AND e2 > ?))`. `terms` must not be empty.
    pub fn where_seek(mut self, terms: Vec<SeekTerm>, cmp: Comparison, native: bool) -> Self {
        debug_assert!(!terms.is_empty());
        self.conditions.push(Condition::Seek { terms, cmp, native });
        self
    }

    /// Append an ordering term. Terms apply in insertion order.
    pub fn order_by(mut self, expr: &str, direction: SortDirection) -> Self {
        self.order.push((expr.to_string(), direction));
        self
    }

    /// Drop all ordering terms.
    pub fn clear_order(mut self) -> Self {
        self.order.clear();
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_val = Some(limit);
        self
    }

    pub fn get_limit(&self) -> Option<u64> {
        self.limit_val
    }

    /// Build a SELECT statement. `columns` is rendered verbatim (e.g. `"*"`).
    pub fn build_select(&self, columns: &str) -> Statement {
        let mut sql = format!("SELECT {columns} FROM {}", self.table);
        let mut params = Vec::new();
        self.append_where(&mut sql, &mut params);
        self.append_order(&mut sql);
        if let Some(limit) = self.limit_val {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        Statement { sql, params }
    }

    /// Build a COUNT over the same filters, ignoring ordering, seek predicates and limit.
    pub fn build_count(&self) -> Statement {
        let mut filters = self.clone();
        filters
            .conditions
            .retain(|c| !matches!(c, Condition::Seek { .. }));
        let mut sql = format!("SELECT COUNT(*) FROM {}", self.table);
        let mut params = Vec::new();
        filters.append_where(&mut sql, &mut params);
        Statement { sql, params }
    }

    fn append_where(&self, sql: &mut String, params: &mut Vec<String>) {
        if self.conditions.is_empty() {
            return;
        }
        sql.push_str(" WHERE ");
        let clauses: Vec<String> = self
            .conditions
            .iter()
            .map(|cond| self.render_condition(cond, params))
            .collect();
        sql.push_str(&clauses.join(" AND "));
    }

    fn bind(&self, params: &mut Vec<String>, value: &str) -> String {
        params.push(value.to_string());
        self.dialect.placeholder(params.len())
    }

    fn bind_term(&self, params: &mut Vec<String>, term: &SeekTerm) -> String {
        let placeholder = self.bind(params, &term.value);
        match &term.cast {
            Some(sql_type) => format!("CAST({placeholder} AS {sql_type})"),
            None => placeholder,
        }
    }

    fn render_condition(&self, cond: &Condition, params: &mut Vec<String>) -> String {
        match cond {
            Condition::Eq(col, val) => format!("{col} = {}", self.bind(params, val)),
            Condition::NotEq(col, val) => format!("{col} != {}", self.bind(params, val)),
            Condition::Like(col, pat) => format!("{col} LIKE {}", self.bind(params, pat)),
            Condition::Gt(col, val) => format!("{col} > {}", self.bind(params, val)),
            Condition::Lt(col, val) => format!("{col} < {}", self.bind(params, val)),
            Condition::In(col, vals) => {
                let placeholders: Vec<_> = vals.iter().map(|v| self.bind(params, v)).collect();
                format!("{col} IN ({})", placeholders.join(", "))
            }
            Condition::IsNull(col) => format!("{col} IS NULL"),
            Condition::IsNotNull(col) => format!("{col} IS NOT NULL"),
            Condition::Seek { terms, cmp, native } => {
                self.render_seek(terms, *cmp, *native, params)
            }
        }
    }

    fn render_seek(
        &self,
        terms: &[SeekTerm],
        cmp: Comparison,
        native: bool,
        params: &mut Vec<String>,
    ) -> String {
        let op = cmp.as_sql();
        if let [term] = terms {
            return format!("{} {op} {}", term.expr, self.bind_term(params, term));
        }
        if native {
            let exprs: Vec<_> = terms.iter().map(|t| t.expr.as_str()).collect();
            let placeholders: Vec<_> = terms.iter().map(|t| self.bind_term(params, t)).collect();
            return format!("({}) {op} ({})", exprs.join(", "), placeholders.join(", "));
        }

        // e1 > v1 OR (e1 = v1 AND e2 > v2) OR ...
        let mut branches = Vec::with_capacity(terms.len());
        for (i, last) in terms.iter().enumerate() {
            let mut parts = Vec::with_capacity(i + 1);
            for term in &terms[..i] {
                parts.push(format!("{} = {}", term.expr, self.bind_term(params, term)));
            }
            parts.push(format!("{} {op} {}", last.expr, self.bind_term(params, last)));
            if parts.len() == 1 {
                branches.push(parts.remove(0));
            } else {
                branches.push(format!("({})", parts.join(" AND ")));
            }
        }
        format!("({})", branches.join(" OR "))
    }

    fn append_order(&self, sql: &mut String) {
        if self.order.is_empty() {
            return;
        }
        sql.push_str(" ORDER BY ");
        let clauses: Vec<_> = self
            .order
            .iter()
            .map(|(expr, dir)| format!("{expr} {}", dir.as_sql()))
            .collect();
        sql.push_str(&clauses.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_select() {
        let stmt = QueryBuilder::new("users").build_select("*");
        assert_eq!(stmt.sql, "SELECT * FROM users");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_complex_query() {
        let stmt = QueryBuilder::new("users")
            .where_eq("status", "active")
            .where_like("name", "%alice%")
            .where_null("deleted_at")
            .order_by("id", SortDirection::Ascending)
            .limit(10)
            .build_select("id, name");
        assert_eq!(
            stmt.sql,
            "SELECT id, name FROM users WHERE status = ? AND name LIKE ? AND deleted_at IS NULL ORDER BY id ASC LIMIT 10"
        );
        assert_eq!(stmt.params, vec!["active", "%alice%"]);
    }

    #[test]
    fn test_postgres_placeholders() {
        let stmt = QueryBuilder::new_with_dialect("users", Dialect::Postgres)
            .where_eq("status", "active")
            .where_in("role", &["admin", "user"])
            .build_select("*");
        assert_eq!(
            stmt.sql,
            "SELECT * FROM users WHERE status = $1 AND role IN ($2, $3)"
        );
        assert_eq!(stmt.params, vec!["active", "admin", "user"]);
    }

    #[test]
    fn test_seek_single_column() {
        let stmt = QueryBuilder::new("g")
            .where_seek(vec![SeekTerm::new("g.id", "5")], Comparison::Greater, true)
            .build_select("*");
        assert_eq!(stmt.sql, "SELECT * FROM g WHERE g.id > ?");
        assert_eq!(stmt.params, vec!["5"]);
    }

    #[test]
    fn test_seek_native_row_values() {
        let stmt = QueryBuilder::new_with_dialect("g", Dialect::Postgres)
            .where_eq("g.kind", "team")
            .where_seek(
                vec![SeekTerm::new("g.created_at", "2024"), SeekTerm::new("g.id", "9")],
                Comparison::Less,
                true,
            )
            .build_select("*");
        assert_eq!(
            stmt.sql,
            "SELECT * FROM g WHERE g.kind = $1 AND (g.created_at, g.id) < ($2, $3)"
        );
        assert_eq!(stmt.params, vec!["team", "2024", "9"]);
    }

    #[test]
    fn test_seek_expanded_form() {
        let stmt = QueryBuilder::new_with_dialect("g", Dialect::Postgres)
            .where_seek(
                vec![SeekTerm::new("g.created_at", "2024"), SeekTerm::new("g.id", "9")],
                Comparison::Greater,
                false,
            )
            .build_select("*");
        assert_eq!(
            stmt.sql,
            "SELECT * FROM g WHERE (g.created_at > $1 OR (g.created_at = $2 AND g.id > $3))"
        );
        assert_eq!(stmt.params, vec!["2024", "2024", "9"]);
    }

    #[test]
    fn test_seek_casts_bound_values() {
        let terms = vec![
            SeekTerm::new("g.created_at", "2024-01-01T00:00:00Z").with_cast("timestamptz"),
            SeekTerm::new("g.id", "0b9e2f6a-52c4-4d7e-9d0a-1d5f0c3a7e11").with_cast("uuid"),
        ];
        let native = QueryBuilder::new_with_dialect("g", Dialect::Postgres)
            .where_seek(terms.clone(), Comparison::Greater, true)
            .build_select("*");
        assert_eq!(
            native.sql,
            "SELECT * FROM g WHERE (g.created_at, g.id) > (CAST($1 AS timestamptz), CAST($2 AS uuid))"
        );

        let expanded = QueryBuilder::new_with_dialect("g", Dialect::Postgres)
            .where_seek(terms, Comparison::Greater, false)
            .build_select("*");
        assert_eq!(
            expanded.sql,
            "SELECT * FROM g WHERE (g.created_at > CAST($1 AS timestamptz) OR (g.created_at = CAST($2 AS timestamptz) AND g.id > CAST($3 AS uuid)))"
        );
        assert_eq!(expanded.params.len(), 3);
    }

    #[test]
    fn test_count_ignores_seek_order_and_limit() {
        let stmt = QueryBuilder::new("g")
            .where_eq("g.kind", "team")
            .where_seek(vec![SeekTerm::new("g.id", "5")], Comparison::Greater, true)
            .order_by("g.id", SortDirection::Descending)
            .limit(3)
            .build_count();
        assert_eq!(stmt.sql, "SELECT COUNT(*) FROM g WHERE g.kind = ?");
        assert_eq!(stmt.params, vec!["team"]);
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert!("oracle".parse::<Dialect>().is_err());
        assert!(!Dialect::Generic.supports_row_values());
        assert!(Dialect::Sqlite.supports_row_values());
    }
}
