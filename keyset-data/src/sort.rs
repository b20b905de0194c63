use std::collections::BTreeMap;

use crate::error::DataError;
use crate::field::{FieldDescriptor, SortDirection, SortTransform};

/// A resolved sort: which field, which way, and an optional computed expression.
#[derive(Debug, Clone)]
pub struct SortSpec {
    pub field: FieldDescriptor,
    pub direction: SortDirection,
    pub transform: Option<SortTransform>,
}

impl SortSpec {
    pub fn new(field: FieldDescriptor, direction: SortDirection) -> Self {
        Self {
            field,
            direction,
            transform: None,
        }
    }

    pub fn with_transform(mut self, transform: SortTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// The expression used in `ORDER BY` and in the seek predicate.
    pub fn expr(&self) -> String {
        let column = self.field.expr();
        match self.transform {
            Some(transform) => transform(&column),
            None => column,
        }
    }

    /// Default ordering: the tiebreaker itself, ascending.
    pub fn by_tiebreaker(tiebreaker: &FieldDescriptor) -> Self {
        Self::new(tiebreaker.clone(), SortDirection::Ascending)
    }
}

/// The closed set of sort keys an entity accepts.
///
/// Built by each entity module and passed in at call time; there is no
/// process-wide registry.
///
/// ```ignore
/// let sorts = SortRegistry::new()
///     .field("FULL_PATH", FieldDescriptor::new("full_path", "groups", "full_path"))
///     .field("UPDATED_AT", FieldDescriptor::new("updated_at", "groups", "updated_at"));
/// // registers FULL_PATH_ASC, FULL_PATH_DESC, UPDATED_AT_ASC, UPDATED_AT_DESC
/// ```
#[derive(Debug, Clone, Default)]
pub struct SortRegistry {
    entries: BTreeMap<String, SortSpec>,
}

impl SortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single sort key.
    pub fn register(mut self, name: &str, spec: SortSpec) -> Self {
        self.entries.insert(name.to_string(), spec);
        self
    }

    /// Register `{logical}_ASC` and `{logical}_DESC` for one field.
    pub fn field(self, logical: &str, field: FieldDescriptor) -> Self {
        self.register(
            &format!("{logical}_ASC"),
            SortSpec::new(field.clone(), SortDirection::Ascending),
        )
        .register(
            &format!("{logical}_DESC"),
            SortSpec::new(field, SortDirection::Descending),
        )
    }

    /// Like [`SortRegistry::field`], ordering on a computed expression.
    pub fn field_with_transform(
        self,
        logical: &str,
        field: FieldDescriptor,
        transform: SortTransform,
    ) -> Self {
        self.register(
            &format!("{logical}_ASC"),
            SortSpec::new(field.clone(), SortDirection::Ascending).with_transform(transform),
        )
        .register(
            &format!("{logical}_DESC"),
            SortSpec::new(field, SortDirection::Descending).with_transform(transform),
        )
    }

    pub fn get(&self, name: &str) -> Option<&SortSpec> {
        self.entries.get(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Resolve a caller's sort selection.
    ///
    /// No selection means ascending by the tiebreaker. An unknown key is an
    /// `Internal` error: the binding layer should only ever pass keys it got
    /// from this registry.
    pub fn resolve(
        &self,
        name: Option<&str>,
        tiebreaker: &FieldDescriptor,
    ) -> Result<SortSpec, DataError> {
        match name {
            None => Ok(SortSpec::by_tiebreaker(tiebreaker)),
            Some(name) => self.get(name).cloned().ok_or_else(|| {
                DataError::internal(format!("unrecognized sort key '{name}'"))
            }),
        }
    }
}
