//! Test harness for keyset pagination.
//!
//! - [`TestDb`]: an in-memory SQLite database with the sample tables.
//! - [`fixtures`]: two sample entity modules, groups and runs, the way an
//!   application would write them.
//! - [`walk_forward`] / [`walk_backward`]: follow cursors until the data runs out.

mod db;
pub mod fixtures;
mod walk;

pub use db::{init_test_tracing, TestDb, TEST_CONFIG};
pub use walk::{flatten, walk_backward, walk_forward, MAX_PAGES};
