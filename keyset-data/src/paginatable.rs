/// The one capability a record needs to take part in cursor pagination.
///
/// The engine asks for the sort field and the identifier field by their
/// logical names (the `key` of their [`FieldDescriptor`](crate::FieldDescriptor)).
/// Values must compare in SQL the same way the database compares the column
/// (or the transformed expression, for computed sorts).
///
/// ```ignore
/// impl CursorPaginatable for Group {
///     fn cursor_value(&self, field: &str) -> Option<String> {
///         match field {
///             "id" => Some(self.id.clone()),
///             "full_path" => Some(self.full_path.clone()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait CursorPaginatable {
    fn cursor_value(&self, field: &str) -> Option<String>;
}

impl<T: CursorPaginatable + ?Sized> CursorPaginatable for &T {
    fn cursor_value(&self, field: &str) -> Option<String> {
        (**self).cursor_value(field)
    }
}
