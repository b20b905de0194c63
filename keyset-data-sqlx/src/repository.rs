use std::marker::PhantomData;

use keyset_data::{plan, DataError, Entity, Page, PaginationConfig, PaginationOptions, QueryBuilder, SortSpec};
use sqlx::{ColumnIndex, Database, Decode, Encode, Executor, FromRow, IntoArguments, Pool, Row, Type};
use tokio_util::sync::CancellationToken;

use crate::executor::{execute, scan_row};

/// Paginated list access for one entity type over an `sqlx::Pool<DB>`.
///
/// # Example
///
/// ```ignore
/// let repo = SqlxRepository::<Group, Sqlite>::new(pool.clone(), config);
/// let base = repo.query().where_like("groups.full_path", "eng/%");
/// let page = repo
///     .find_page(&cancel, base, Some("FULL_PATH_ASC"), &PaginationOptions::first(20))
///     .await?;
/// let next = page.end_cursor()?;
/// ```
pub struct SqlxRepository<T, DB: Database> {
    pool: Pool<DB>,
    config: PaginationConfig,
    _marker: PhantomData<T>,
}

impl<T, DB: Database> SqlxRepository<T, DB> {
    pub fn new(pool: Pool<DB>, config: PaginationConfig) -> Self {
        Self {
            pool,
            config,
            _marker: PhantomData,
        }
    }

    /// Get the underlying pool reference.
    pub fn pool(&self) -> &Pool<DB> {
        &self.pool
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }
}

impl<T, DB> SqlxRepository<T, DB>
where
    T: Entity + for<'r> FromRow<'r, DB::Row>,
    DB: Database,
    String: for<'q> Encode<'q, DB> + Type<DB>,
    for<'q> <DB as Database>::Arguments<'q>: IntoArguments<'q, DB>,
    for<'c> &'c mut <DB as Database>::Connection: Executor<'c, Database = DB>,
{
    /// An unfiltered query over `T`'s table in the configured dialect.
    pub fn query(&self) -> QueryBuilder {
        T::query(self.config.dialect)
    }

    /// Resolve a sort key against `T`'s registry, defaulting to the identifier.
    pub fn resolve_sort(&self, sort: Option<&str>) -> Result<SortSpec, DataError> {
        T::sorts().resolve(sort, &T::id_field())
    }

    /// One page of `base`, sorted by `sort`.
    pub async fn find_page(
        &self,
        cancel: &CancellationToken,
        base: QueryBuilder,
        sort: Option<&str>,
        options: &PaginationOptions,
    ) -> Result<Page<T>, DataError> {
        self.find_page_in(cancel, &self.pool, base, sort, options)
            .await
    }

    /// Like [`SqlxRepository::find_page`], on an explicit executor such as a transaction.
    pub async fn find_page_in<'c, E>(
        &self,
        cancel: &CancellationToken,
        executor: E,
        base: QueryBuilder,
        sort: Option<&str>,
        options: &PaginationOptions,
    ) -> Result<Page<T>, DataError>
    where
        E: Executor<'c, Database = DB>,
    {
        let sort = self.resolve_sort(sort)?;
        let planned = plan(base, &T::id_field(), &sort, options, &self.config)?;
        let statement = planned.statement(&T::select_list());

        let records = execute(cancel, executor, &statement)
            .scan_all(|row| scan_row::<T, _>(row))
            .await?;
        Ok(planned.finalize(records))
    }

    /// Number of rows matching `base`'s filters. Separate from has-more detection.
    pub async fn count(
        &self,
        cancel: &CancellationToken,
        base: &QueryBuilder,
    ) -> Result<u64, DataError>
    where
        i64: for<'r> Decode<'r, DB> + Type<DB>,
        usize: ColumnIndex<DB::Row>,
    {
        let statement = base.build_count();
        let counts = execute(cancel, &self.pool, &statement)
            .scan_all(|row| {
                row.try_get::<i64, _>(0)
                    .map_err(crate::error::SqlxErrorExt::into_data_error)
            })
            .await?;
        let total = counts
            .first()
            .copied()
            .ok_or_else(|| DataError::internal("COUNT(*) returned no row"))?;
        u64::try_from(total).map_err(|_| DataError::internal(format!("negative row count {total}")))
    }

    /// [`SqlxRepository::find_page`] plus the total number of matching rows.
    pub async fn find_page_with_total(
        &self,
        cancel: &CancellationToken,
        base: QueryBuilder,
        sort: Option<&str>,
        options: &PaginationOptions,
    ) -> Result<Page<T>, DataError>
    where
        i64: for<'r> Decode<'r, DB> + Type<DB>,
        usize: ColumnIndex<DB::Row>,
    {
        let total = self.count(cancel, &base).await?;
        let page = self.find_page(cancel, base, sort, options).await?;
        Ok(page.with_total_count(total))
    }
}

impl<T, DB: Database> Clone for SqlxRepository<T, DB> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            config: self.config,
            _marker: PhantomData,
        }
    }
}
