use crate::field::FieldDescriptor;
use crate::paginatable::CursorPaginatable;
use crate::query::{Dialect, QueryBuilder};
use crate::sort::SortRegistry;

/// A listable database entity: where it lives, how it is identified and how it may be sorted.
///
/// # Example
///
/// ```ignore
/// impl Entity for Group {
///     fn table_name() -> &'static str { "groups" }
///     fn id_column() -> &'static str { "id" }
///     fn columns() -> &'static [&'static str] { &["id", "full_path", "created_at"] }
///     fn sorts() -> SortRegistry {
///         SortRegistry::new()
///             .field("FULL_PATH", FieldDescriptor::new("full_path", "groups", "full_path"))
///     }
/// }
/// ```
pub trait Entity: CursorPaginatable + Send + Sync + Unpin + 'static {
    fn table_name() -> &'static str;
    fn id_column() -> &'static str;
    fn columns() -> &'static [&'static str];

    /// The entity's accepted sort keys.
    fn sorts() -> SortRegistry;

    /// The unique identifier, used as the tiebreaker for every sort.
    fn id_field() -> FieldDescriptor {
        FieldDescriptor::new("id", Self::table_name(), Self::id_column())
    }

    /// Qualified column list for `SELECT`.
    fn select_list() -> String {
        Self::columns()
            .iter()
            .map(|c| format!("{}.{c}", Self::table_name()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// An unfiltered query over the entity's table.
    fn query(dialect: Dialect) -> QueryBuilder {
        QueryBuilder::new_with_dialect(Self::table_name(), dialect)
    }
}
