//! Turns a base query plus pagination options into the over-fetching seek query.

use crate::config::PaginationConfig;
use crate::cursor::Cursor;
use crate::error::DataError;
use crate::field::{FieldDescriptor, SortDirection};
use crate::options::{FetchDirection, PaginationOptions};
use crate::page::{finalize, CursorFields, Page};
use crate::query::{Comparison, QueryBuilder, SeekTerm, Statement};
use crate::sort::SortSpec;

/// The effective query for one page request, plus everything the finalizer needs.
#[derive(Debug, Clone)]
pub struct PlannedQuery {
    query: QueryBuilder,
    direction: SortDirection,
    reversed: bool,
    requested: Option<u32>,
    had_after: bool,
    had_before: bool,
    fields: CursorFields,
}

impl PlannedQuery {
    pub fn query(&self) -> &QueryBuilder {
        &self.query
    }

    /// Render the SELECT for the given column list.
    pub fn statement(&self, columns: &str) -> Statement {
        self.query.build_select(columns)
    }

    /// Physical direction of the query, which differs from the sort's when `last` is used.
    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn was_reversed(&self) -> bool {
        self.reversed
    }

    /// The page size asked for, without the sentinel row.
    pub fn requested(&self) -> Option<u32> {
        self.requested
    }

    pub fn had_after(&self) -> bool {
        self.had_after
    }

    pub fn had_before(&self) -> bool {
        self.had_before
    }

    pub fn cursor_fields(&self) -> &CursorFields {
        &self.fields
    }

    /// Trim, reorder and flag the rows scanned from this query.
    pub fn finalize<T>(&self, records: Vec<T>) -> Page<T> {
        finalize(
            records,
            self.requested,
            self.reversed,
            self.had_after,
            self.had_before,
            self.fields.clone(),
        )
    }
}

/// Build the seek query for one page.
///
/// Ordering is always `sort, tiebreaker` in the same direction, so the pair
/// is a strict total order. `after`/`before` cursors become seek predicates on
/// that pair, `last` flips the physical direction, and the limit asks for one
/// extra row so the finalizer can tell whether more data exists.
///
/// The configured dialect replaces the base query's, so placeholders and the
/// row-value decision always follow `config`.
pub fn plan(
    base: QueryBuilder,
    tiebreaker: &FieldDescriptor,
    sort: &SortSpec,
    options: &PaginationOptions,
    config: &PaginationConfig,
) -> Result<PlannedQuery, DataError> {
    let window = options.validate(config)?;
    tiebreaker.validate()?;
    sort.field.validate()?;

    let fields = CursorFields::new(sort, tiebreaker);
    let canonical = sort.direction;
    let reversed = window.direction == FetchDirection::Backward;
    let direction = if reversed {
        canonical.reversed()
    } else {
        canonical
    };

    // (expression, cast) per ordering column
    let mut columns = vec![(sort.expr(), sort.field.cast.clone())];
    if fields.tiebreaker_key.is_some() {
        columns.push((tiebreaker.expr(), tiebreaker.cast.clone()));
    }

    let mut query = base.dialect(config.dialect).clear_order();
    for (expr, _) in &columns {
        query = query.order_by(expr, direction);
    }

    let native = config.native_row_values();
    let (after_cmp, before_cmp) = if canonical.is_ascending() {
        (Comparison::Greater, Comparison::Less)
    } else {
        (Comparison::Less, Comparison::Greater)
    };

    if let Some(token) = &options.after {
        let values = seek_values(&Cursor::decode(token)?, &fields)?;
        query = query.where_seek(seek_terms(&columns, values), after_cmp, native);
    }
    if let Some(token) = &options.before {
        let values = seek_values(&Cursor::decode(token)?, &fields)?;
        query = query.where_seek(seek_terms(&columns, values), before_cmp, native);
    }

    if let Some(count) = window.count {
        query = query.limit(u64::from(count) + 1);
    }

    tracing::debug!(
        table = query.table(),
        dialect = ?config.dialect,
        sort = %fields.sort_key,
        direction = direction.as_sql(),
        reversed,
        limit = ?query.get_limit(),
        after = options.after.is_some(),
        before = options.before.is_some(),
        "Planned paginated query"
    );

    Ok(PlannedQuery {
        query,
        direction,
        reversed,
        requested: window.count,
        had_after: options.after.is_some(),
        had_before: options.before.is_some(),
        fields,
    })
}

fn seek_terms(columns: &[(String, Option<String>)], values: Vec<String>) -> Vec<SeekTerm> {
    columns
        .iter()
        .zip(values)
        .map(|((expr, cast), value)| SeekTerm {
            expr: expr.clone(),
            value,
            cast: cast.clone(),
        })
        .collect()
}

/// Values to compare against, checked against the fields this query sorts on.
fn seek_values(cursor: &Cursor, fields: &CursorFields) -> Result<Vec<String>, DataError> {
    if cursor.primary.name != fields.sort_key {
        return Err(DataError::invalid(format!(
            "cursor was issued for sort field '{}', not '{}'",
            cursor.primary.name, fields.sort_key
        )));
    }
    let mut values = vec![cursor.primary.value.clone()];

    if let Some(key) = &fields.tiebreaker_key {
        match &cursor.secondary {
            Some(secondary) if &secondary.name == key => values.push(secondary.value.clone()),
            Some(secondary) => {
                return Err(DataError::invalid(format!(
                    "cursor tiebreaker field '{}' does not match '{key}'",
                    secondary.name
                )))
            }
            None => {
                return Err(DataError::invalid(format!(
                    "cursor for non-unique sort field '{}' is missing its '{key}' tiebreaker",
                    fields.sort_key
                )))
            }
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::CursorField;
    use crate::error::ErrorKind;
    use crate::field::path_depth;
    use crate::query::Dialect;

    fn id() -> FieldDescriptor {
        FieldDescriptor::new("id", "groups", "id")
    }

    fn by_created(direction: SortDirection) -> SortSpec {
        SortSpec::new(
            FieldDescriptor::new("created_at", "groups", "created_at"),
            direction,
        )
    }

    fn created_cursor(at: &str, id: &str) -> String {
        Cursor::new(
            CursorField::new("created_at", at),
            Some(CursorField::new("id", id)),
        )
        .encode()
    }

    fn base() -> QueryBuilder {
        QueryBuilder::new("groups")
    }

    fn sqlite() -> PaginationConfig {
        PaginationConfig::default().with_dialect(Dialect::Sqlite)
    }

    #[test]
    fn test_first_page_orders_with_tiebreaker_and_overfetches() {
        let planned = plan(
            base(),
            &id(),
            &by_created(SortDirection::Ascending),
            &PaginationOptions::first(4),
            &PaginationConfig::default(),
        )
        .unwrap();
        let stmt = planned.statement("*");
        assert_eq!(
            stmt.sql,
            "SELECT * FROM groups ORDER BY groups.created_at ASC, groups.id ASC LIMIT 5"
        );
        assert!(!planned.was_reversed());
        assert_eq!(planned.requested(), Some(4));
    }

    #[test]
    fn test_default_sort_is_single_term() {
        let planned = plan(
            base(),
            &id(),
            &SortSpec::by_tiebreaker(&id()),
            &PaginationOptions::first(2),
            &PaginationConfig::default(),
        )
        .unwrap();
        assert_eq!(
            planned.statement("*").sql,
            "SELECT * FROM groups ORDER BY groups.id ASC LIMIT 3"
        );
    }

    #[test]
    fn test_after_expanded_for_generic_dialect() {
        let planned = plan(
            base().where_eq("groups.kind", "team"),
            &id(),
            &by_created(SortDirection::Ascending),
            &PaginationOptions::first(4).after(created_cursor("t4", "4")),
            &PaginationConfig::default(),
        )
        .unwrap();
        let stmt = planned.statement("*");
        assert_eq!(
            stmt.sql,
            "SELECT * FROM groups WHERE groups.kind = ? AND (groups.created_at > ? OR (groups.created_at = ? AND groups.id > ?)) ORDER BY groups.created_at ASC, groups.id ASC LIMIT 5"
        );
        assert_eq!(stmt.params, vec!["team", "t4", "t4", "4"]);
    }

    #[test]
    fn test_after_native_row_values() {
        let planned = plan(
            QueryBuilder::new_with_dialect("groups", Dialect::Sqlite),
            &id(),
            &by_created(SortDirection::Descending),
            &PaginationOptions::first(4).after(created_cursor("t4", "4")),
            &sqlite(),
        )
        .unwrap();
        assert_eq!(
            planned.statement("*").sql,
            "SELECT * FROM groups WHERE (groups.created_at, groups.id) < (?, ?) ORDER BY groups.created_at DESC, groups.id DESC LIMIT 5"
        );
    }

    #[test]
    fn test_configured_dialect_overrides_base() {
        let postgres = PaginationConfig::default().with_dialect(Dialect::Postgres);
        let planned = plan(
            base().where_eq("groups.kind", "team"),
            &id(),
            &by_created(SortDirection::Ascending),
            &PaginationOptions::first(4).after(created_cursor("t4", "4")),
            &postgres,
        )
        .unwrap();
        assert_eq!(planned.query().get_dialect(), Dialect::Postgres);
        let stmt = planned.statement("*");
        assert_eq!(
            stmt.sql,
            "SELECT * FROM groups WHERE groups.kind = $1 AND (groups.created_at, groups.id) > ($2, $3) ORDER BY groups.created_at ASC, groups.id ASC LIMIT 5"
        );
        assert_eq!(stmt.params, vec!["team", "t4", "4"]);

        // a Postgres-built base under a generic config falls back to the expanded form
        let planned = plan(
            QueryBuilder::new_with_dialect("groups", Dialect::Postgres),
            &id(),
            &by_created(SortDirection::Ascending),
            &PaginationOptions::first(4).after(created_cursor("t4", "4")),
            &PaginationConfig::default(),
        )
        .unwrap();
        assert!(planned
            .statement("*")
            .sql
            .contains("(groups.created_at > ? OR (groups.created_at = ? AND groups.id > ?))"));
    }

    #[test]
    fn test_field_casts_wrap_seek_placeholders() {
        let id = id().with_cast("uuid");
        let created = SortSpec::new(
            FieldDescriptor::new("created_at", "groups", "created_at").with_cast("timestamptz"),
            SortDirection::Descending,
        );
        let planned = plan(
            base(),
            &id,
            &created,
            &PaginationOptions::last(2).before(created_cursor("2024-01-01T00:00:00Z", "a1")),
            &PaginationConfig::default().with_dialect(Dialect::Postgres),
        )
        .unwrap();
        assert_eq!(
            planned.statement("*").sql,
            "SELECT * FROM groups WHERE (groups.created_at, groups.id) > (CAST($1 AS timestamptz), CAST($2 AS uuid)) ORDER BY groups.created_at ASC, groups.id ASC LIMIT 3"
        );

        let bad = plan(
            base(),
            &FieldDescriptor::new("id", "groups", "id").with_cast("uuid; --"),
            &SortSpec::by_tiebreaker(&id),
            &PaginationOptions::first(1),
            &PaginationConfig::default(),
        )
        .unwrap_err();
        assert_eq!(bad.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_row_values_can_be_disabled() {
        let planned = plan(
            QueryBuilder::new_with_dialect("groups", Dialect::Sqlite),
            &id(),
            &by_created(SortDirection::Ascending),
            &PaginationOptions::first(1).after(created_cursor("t", "1")),
            &sqlite().with_row_values(false),
        )
        .unwrap();
        assert!(planned.statement("*").sql.contains(" OR "));
    }

    #[test]
    fn test_last_flips_direction_and_before_inverts() {
        let planned = plan(
            QueryBuilder::new_with_dialect("groups", Dialect::Sqlite),
            &id(),
            &by_created(SortDirection::Ascending),
            &PaginationOptions::last(3).before(created_cursor("t9", "9")),
            &sqlite(),
        )
        .unwrap();
        assert!(planned.was_reversed());
        assert_eq!(planned.direction(), SortDirection::Descending);
        assert_eq!(
            planned.statement("*").sql,
            "SELECT * FROM groups WHERE (groups.created_at, groups.id) < (?, ?) ORDER BY groups.created_at DESC, groups.id DESC LIMIT 4"
        );
    }

    #[test]
    fn test_transform_used_in_order_and_seek() {
        let depth = SortSpec::new(
            FieldDescriptor::new("group_level", "groups", "full_path"),
            SortDirection::Ascending,
        )
        .with_transform(path_depth);
        let cursor = Cursor::new(
            CursorField::new("group_level", "2"),
            Some(CursorField::new("id", "7")),
        );
        let planned = plan(
            base(),
            &id(),
            &depth,
            &PaginationOptions::first(10).after(cursor.encode()),
            &PaginationConfig::default(),
        )
        .unwrap();
        let sql = planned.statement("*").sql;
        let expr = path_depth("groups.full_path");
        assert!(sql.contains(&format!("({expr} > ? OR ({expr} = ? AND groups.id > ?))")));
        assert!(sql.contains(&format!("ORDER BY {expr} ASC, groups.id ASC")));
    }

    #[test]
    fn test_base_order_is_replaced() {
        let planned = plan(
            base().order_by("groups.name", SortDirection::Descending),
            &id(),
            &SortSpec::by_tiebreaker(&id()),
            &PaginationOptions::new(),
            &PaginationConfig::default(),
        )
        .unwrap();
        assert_eq!(planned.statement("*").sql, "SELECT * FROM groups ORDER BY groups.id ASC");
        assert_eq!(planned.requested(), None);
    }

    #[test]
    fn test_cursor_mismatches_are_invalid() {
        let sort = by_created(SortDirection::Ascending);
        let wrong_field = Cursor::new(CursorField::new("name", "x"), Some(CursorField::new("id", "1")));
        let missing_secondary = Cursor::new(CursorField::new("created_at", "x"), None);
        let wrong_secondary = Cursor::new(
            CursorField::new("created_at", "x"),
            Some(CursorField::new("uuid", "1")),
        );
        for cursor in [wrong_field, missing_secondary, wrong_secondary] {
            let err = plan(
                base(),
                &id(),
                &sort,
                &PaginationOptions::first(1).after(cursor.encode()),
                &PaginationConfig::default(),
            )
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Invalid);
        }

        let err = plan(
            base(),
            &id(),
            &sort,
            &PaginationOptions::first(1).before("garbage!"),
            &PaginationConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn test_first_and_last_rejected() {
        let options = PaginationOptions {
            first: Some(1),
            last: Some(1),
            ..Default::default()
        };
        let err = plan(base(), &id(), &SortSpec::by_tiebreaker(&id()), &options, &PaginationConfig::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn test_bad_descriptor_is_internal() {
        let sort = SortSpec::new(FieldDescriptor::new("x", "groups", "a b"), SortDirection::Ascending);
        let err = plan(base(), &id(), &sort, &PaginationOptions::first(1), &PaginationConfig::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
