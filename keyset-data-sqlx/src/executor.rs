//! Runs a planned statement and hands rows back one at a time.

use futures_core::stream::BoxStream;
use futures_util::StreamExt;
use keyset_data::{DataError, Statement};
use sqlx::{Database, Encode, Executor, FromRow, IntoArguments, Type};
use tokio_util::sync::CancellationToken;

use crate::error::SqlxErrorExt;

/// Forward-only iterator over the rows of one paginated query.
///
/// The underlying stream is released as soon as it is exhausted, fails, is
/// cancelled, or the caller calls [`RowIterator::close`] or drops the iterator.
pub struct RowIterator<'e, DB: Database> {
    stream: Option<BoxStream<'e, Result<DB::Row, sqlx::Error>>>,
    cancel: CancellationToken,
    rows: usize,
}

impl<'e, DB: Database> RowIterator<'e, DB> {
    /// Next row, `None` once the result set is exhausted or the iterator is closed.
    ///
    /// After the token is cancelled this returns `DataError::Cancelled` and closes.
    pub async fn next(&mut self) -> Option<Result<DB::Row, DataError>> {
        let stream = self.stream.as_mut()?;

        let item = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(DataError::Cancelled),
            item = stream.next() => match item {
                Some(Ok(row)) => Ok(Some(row)),
                Some(Err(e)) => Err(e.into_data_error()),
                None => Ok(None),
            },
        };

        match item {
            Ok(Some(row)) => {
                self.rows += 1;
                Some(Ok(row))
            }
            Ok(None) => {
                self.close();
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, rows = self.rows, "Paginated query failed");
                self.close();
                Some(Err(e))
            }
        }
    }

    /// Map every remaining row through `scan`, closing on the first error.
    pub async fn scan_all<T, F>(mut self, mut scan: F) -> Result<Vec<T>, DataError>
    where
        F: FnMut(&DB::Row) -> Result<T, DataError>,
    {
        let mut records = Vec::new();
        while let Some(row) = self.next().await {
            let row = row?;
            match scan(&row) {
                Ok(record) => records.push(record),
                Err(e) => {
                    self.close();
                    return Err(e);
                }
            }
        }
        Ok(records)
    }

    /// Release the underlying stream. Idempotent.
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            tracing::trace!(rows = self.rows, "Row iterator closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    /// Rows handed out so far.
    pub fn rows_read(&self) -> usize {
        self.rows
    }
}

/// Start `statement` on `executor`: a pool, a connection, or an open transaction.
///
/// Nothing is retried; driver errors surface unchanged from [`RowIterator::next`].
pub fn execute<'e, 'c: 'e, DB, E>(
    cancel: &CancellationToken,
    executor: E,
    statement: &'e Statement,
) -> RowIterator<'e, DB>
where
    DB: Database,
    E: 'e + Executor<'c, Database = DB>,
    String: for<'q> Encode<'q, DB> + Type<DB>,
    for<'q> <DB as Database>::Arguments<'q>: IntoArguments<'q, DB>,
{
    tracing::debug!(params = statement.params.len(), "Executing paginated query");
    tracing::trace!(sql = %statement.sql, "Paginated query text");

    let mut query = sqlx::query::<DB>(&statement.sql);
    for param in &statement.params {
        query = query.bind(param.clone());
    }

    RowIterator {
        stream: Some(query.fetch(executor)),
        cancel: cancel.clone(),
        rows: 0,
    }
}

/// Decode one row into a record through its `sqlx::FromRow` impl.
pub fn scan_row<T, R>(row: &R) -> Result<T, DataError>
where
    R: sqlx::Row,
    T: for<'r> FromRow<'r, R>,
{
    T::from_row(row).map_err(SqlxErrorExt::into_data_error)
}
