//! # keyset-data
//!
//! Database-agnostic keyset (cursor) pagination.
//!
//! A list request flows through these pieces:
//!
//! 1. the entity module builds a filtered [`QueryBuilder`] and resolves the
//!    caller's sort key through its [`SortRegistry`];
//! 2. [`plan`] adds ordering, seek predicates for `after`/`before` and a
//!    one-row over-fetch;
//! 3. a backend (see `keyset-data-sqlx`) runs the statement and the entity
//!    scans rows into its own records;
//! 4. [`PlannedQuery::finalize`] trims the sentinel row, restores canonical
//!    order and computes [`PageInfo`].
//!
//! Records implement [`CursorPaginatable`] so cursors can be built for any of
//! them without entity-specific code in the engine.

pub mod config;
pub mod cursor;
pub mod entity;
pub mod error;
pub mod field;
pub mod options;
pub mod page;
pub mod paginatable;
pub mod planner;
pub mod query;
pub mod sort;

pub use config::PaginationConfig;
pub use cursor::{Cursor, CursorField};
pub use entity::Entity;
pub use error::{DataError, ErrorKind};
pub use field::{path_depth, FieldDescriptor, SortDirection, SortTransform};
pub use options::{FetchDirection, PageWindow, PaginationOptions};
pub use page::{finalize, CursorFields, Edge, Page, PageInfo};
pub use paginatable::CursorPaginatable;
pub use planner::{plan, PlannedQuery};
pub use query::{Comparison, Dialect, QueryBuilder, SeekTerm, Statement};
pub use sort::{SortRegistry, SortSpec};

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        Cursor, CursorPaginatable, DataError, Entity, FieldDescriptor, Page, PageInfo,
        PaginationConfig, PaginationOptions, QueryBuilder, SortDirection, SortRegistry, SortSpec,
    };
}
