use keyset_data::{DataError, Entity, Page, PaginationOptions, QueryBuilder};
use keyset_data_sqlx::SqlxRepository;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Sqlite};
use tokio_util::sync::CancellationToken;

/// Upper bound on pages per walk, so a paging bug fails instead of looping.
pub const MAX_PAGES: usize = 10_000;

/// Follow `after` cursors from the first page until `has_next_page` is false.
pub async fn walk_forward<T>(
    repo: &SqlxRepository<T, Sqlite>,
    base: &QueryBuilder,
    sort: Option<&str>,
    page_size: i64,
) -> Result<Vec<Page<T>>, DataError>
where
    T: Entity + for<'r> FromRow<'r, SqliteRow>,
{
    let cancel = CancellationToken::new();
    let mut pages = Vec::new();
    let mut options = PaginationOptions::first(page_size);

    while pages.len() < MAX_PAGES {
        let page = repo.find_page(&cancel, base.clone(), sort, &options).await?;
        let next = match (page.page_info.has_next_page, page.end_cursor()?) {
            (true, Some(cursor)) => Some(cursor),
            _ => None,
        };
        pages.push(page);
        match next {
            Some(cursor) => options = PaginationOptions::first(page_size).after(cursor),
            None => return Ok(pages),
        }
    }
    Err(DataError::internal("forward walk did not terminate"))
}

/// Follow `before` cursors from the last page until `has_previous_page` is false.
///
/// Pages are returned in fetch order, i.e. last page first.
pub async fn walk_backward<T>(
    repo: &SqlxRepository<T, Sqlite>,
    base: &QueryBuilder,
    sort: Option<&str>,
    page_size: i64,
) -> Result<Vec<Page<T>>, DataError>
where
    T: Entity + for<'r> FromRow<'r, SqliteRow>,
{
    let cancel = CancellationToken::new();
    let mut pages = Vec::new();
    let mut options = PaginationOptions::last(page_size);

    while pages.len() < MAX_PAGES {
        let page = repo.find_page(&cancel, base.clone(), sort, &options).await?;
        let prev = match (page.page_info.has_previous_page, page.start_cursor()?) {
            (true, Some(cursor)) => Some(cursor),
            _ => None,
        };
        pages.push(page);
        match prev {
            Some(cursor) => options = PaginationOptions::last(page_size).before(cursor),
            None => return Ok(pages),
        }
    }
    Err(DataError::internal("backward walk did not terminate"))
}

/// Concatenate page items in canonical order. Backward walks must be reversed first.
pub fn flatten<T>(pages: Vec<Page<T>>) -> Vec<T> {
    pages.into_iter().flat_map(|p| p.items).collect()
}
