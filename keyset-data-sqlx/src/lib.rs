//! # keyset-data-sqlx: SQLx backend for keyset pagination
//!
//! Runs the statements planned by [`keyset_data`] through
//! [SQLx](https://github.com/launchbadge/sqlx).
//!
//! | Item | Description |
//! |------|-------------|
//! | [`execute`] | Start a planned statement on any `sqlx::Executor` and get a [`RowIterator`] |
//! | [`RowIterator`] | Forward-only rows with cooperative cancellation, closed on every exit path |
//! | [`SqlxRepository`] | Plan, execute, scan (`sqlx::FromRow`) and finalize in one call |
//! | [`SqlxErrorExt`] | Convert `sqlx::Error` into `DataError` (`.into_data_error()`) |
//!
//! # Feature flags
//!
//! | Feature    | Driver |
//! |------------|--------|
//! | `sqlite`   | SQLite via `sqlx/sqlite` |
//! | `postgres` | PostgreSQL via `sqlx/postgres` |
//! | `mysql`    | MySQL via `sqlx/mysql` |
//!
//! # Cancellation
//!
//! Every call takes a `tokio_util::sync::CancellationToken`. Cancelling it
//! makes the next [`RowIterator::next`] return `DataError::Cancelled` and
//! drops the in-flight query. Nothing is retried.
//!
//! # Transactions
//!
//! [`SqlxRepository::find_page_in`] and [`execute`] accept any executor, so a
//! page can be read inside an already open transaction:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let page = repo.find_page_in(&cancel, &mut *tx, base, None, &opts).await?;
//! tx.commit().await?;
//! ```

pub mod error;
pub mod executor;
pub mod repository;

pub use error::{SqlxErrorExt, SqlxResult};
pub use executor::{execute, scan_row, RowIterator};
pub use repository::SqlxRepository;

/// Re-exports of the most commonly used types from both `keyset-data` and this crate.
pub mod prelude {
    pub use crate::{execute, RowIterator, SqlxErrorExt, SqlxRepository};
    pub use keyset_data::prelude::*;
}
