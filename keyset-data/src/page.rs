use serde::Serialize;

use crate::cursor::{Cursor, CursorField};
use crate::error::DataError;
use crate::field::FieldDescriptor;
use crate::paginatable::CursorPaginatable;
use crate::sort::SortSpec;

/// Names of the fields a cursor is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorFields {
    pub sort_key: String,
    /// `None` when the sort field is the tiebreaker itself.
    pub tiebreaker_key: Option<String>,
}

impl CursorFields {
    pub fn new(sort: &SortSpec, tiebreaker: &FieldDescriptor) -> Self {
        let tiebreaker_key = if sort.field.key == tiebreaker.key {
            None
        } else {
            Some(tiebreaker.key.clone())
        };
        Self {
            sort_key: sort.field.key.clone(),
            tiebreaker_key,
        }
    }

    /// Build the cursor pointing at `record`.
    pub fn cursor<R: CursorPaginatable + ?Sized>(&self, record: &R) -> Result<Cursor, DataError> {
        let primary = field_of(record, &self.sort_key)?;
        let secondary = match &self.tiebreaker_key {
            Some(key) => Some(field_of(record, key)?),
            None => None,
        };
        Ok(Cursor::new(primary, secondary))
    }
}

fn field_of<R: CursorPaginatable + ?Sized>(record: &R, key: &str) -> Result<CursorField, DataError> {
    record
        .cursor_value(key)
        .map(|value| CursorField::new(key, value))
        .ok_or_else(|| DataError::internal(format!("record does not expose cursor field '{key}'")))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    #[serde(skip)]
    fields: CursorFields,
}

impl PageInfo {
    pub fn new(has_next_page: bool, has_previous_page: bool, fields: CursorFields) -> Self {
        Self {
            has_next_page,
            has_previous_page,
            fields,
        }
    }

    /// Cursor for any record of the result set.
    pub fn cursor<R: CursorPaginatable + ?Sized>(&self, record: &R) -> Result<Cursor, DataError> {
        self.fields.cursor(record)
    }

    /// Encoded cursor for any record of the result set.
    pub fn encoded_cursor<R: CursorPaginatable + ?Sized>(
        &self,
        record: &R,
    ) -> Result<String, DataError> {
        self.cursor(record).map(|c| c.encode())
    }

    pub fn cursor_fields(&self) -> &CursorFields {
        &self.fields
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page_info: PageInfo,
    pub items: Vec<T>,
    /// Only filled when explicitly requested; never used to detect further pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

/// An item paired with its own cursor.
#[derive(Debug, Clone, Serialize)]
pub struct Edge<T> {
    pub cursor: String,
    pub node: T,
}

impl<T> Page<T> {
    pub fn with_total_count(mut self, total: u64) -> Self {
        self.total_count = Some(total);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: CursorPaginatable> Page<T> {
    /// Cursor of the first item, to page backward with `before`.
    pub fn start_cursor(&self) -> Result<Option<String>, DataError> {
        self.items
            .first()
            .map(|item| self.page_info.encoded_cursor(item))
            .transpose()
    }

    /// Cursor of the last item, to page forward with `after`.
    pub fn end_cursor(&self) -> Result<Option<String>, DataError> {
        self.items
            .last()
            .map(|item| self.page_info.encoded_cursor(item))
            .transpose()
    }

    /// Pair every item with its encoded cursor, for Relay-style connections.
    pub fn into_edges(self) -> Result<Vec<Edge<T>>, DataError> {
        let page_info = self.page_info;
        self.items
            .into_iter()
            .map(|node| {
                Ok(Edge {
                    cursor: page_info.encoded_cursor(&node)?,
                    node,
                })
            })
            .collect()
    }
}

/// Turn the over-fetched, possibly reversed rows of a query into a page.
///
/// - more than `requested` rows: the last one is the sentinel, it is dropped
///   and the flag for the fetch direction is set;
/// - `reversed`: the rows were fetched from the far end and are put back in
///   canonical order;
/// - the flag for the other direction is set whenever any cursor was supplied.
pub fn finalize<T>(
    mut records: Vec<T>,
    requested: Option<u32>,
    reversed: bool,
    had_after: bool,
    had_before: bool,
    fields: CursorFields,
) -> Page<T> {
    let more = match requested {
        Some(n) if records.len() > n as usize => {
            records.truncate(n as usize);
            true
        }
        _ => false,
    };
    if reversed {
        records.reverse();
    }

    let had_cursor = had_after || had_before;
    let (has_next_page, has_previous_page) = if reversed {
        (had_cursor, more)
    } else {
        (more, had_cursor)
    };

    tracing::trace!(
        items = records.len(),
        has_next_page,
        has_previous_page,
        "Page finalized"
    );

    Page {
        page_info: PageInfo::new(has_next_page, has_previous_page, fields),
        items: records,
        total_count: None,
    }
}
