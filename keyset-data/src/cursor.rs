//! Opaque pagination tokens.
//!
//! A cursor is a base64-encoded JSON array of strings:
//! `[sortName, sortValue]` or `[sortName, sortValue, idName, idValue]`.
//! Clients persist tokens across requests, so this layout must not change.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::DataError;

/// One `(name, value)` pair of a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorField {
    pub name: String,
    pub value: String,
}

impl CursorField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A page boundary: the sort-field value and, unless the sort field is the
/// unique identifier, the identifier value of the same row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub primary: CursorField,
    pub secondary: Option<CursorField>,
}

impl Cursor {
    pub fn new(primary: CursorField, secondary: Option<CursorField>) -> Self {
        Self { primary, secondary }
    }

    pub fn encode(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.primary.name, &self.primary.value];
        if let Some(secondary) = &self.secondary {
            parts.push(&secondary.name);
            parts.push(&secondary.value);
        }
        let json = serde_json::to_string(&parts).expect("a string array always serializes to JSON");
        STANDARD.encode(json)
    }

    pub fn decode(token: &str) -> Result<Self, DataError> {
        let bytes = STANDARD
            .decode(token.trim())
            .map_err(|e| DataError::invalid(format!("cursor is not valid base64: {e}")))?;
        let parts: Vec<String> = serde_json::from_slice(&bytes)
            .map_err(|e| DataError::invalid(format!("cursor is not a string array: {e}")))?;

        let mut parts = parts.into_iter();
        match (parts.next(), parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(value), None, None, None) => {
                Ok(Cursor::new(CursorField { name, value }, None))
            }
            (Some(name), Some(value), Some(sname), Some(svalue), None) => Ok(Cursor::new(
                CursorField { name, value },
                Some(CursorField {
                    name: sname,
                    value: svalue,
                }),
            )),
            _ => Err(DataError::invalid(
                "cursor must contain exactly 2 or 4 elements",
            )),
        }
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

impl std::str::FromStr for Cursor {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cursor::decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn b64(s: &str) -> String {
        STANDARD.encode(s)
    }

    #[test]
    fn test_encode_layout() {
        let cursor = Cursor::new(
            CursorField::new("created_at", "2024-01-01"),
            Some(CursorField::new("id", "7")),
        );
        assert_eq!(cursor.encode(), b64(r#"["created_at","2024-01-01","id","7"]"#));

        let single = Cursor::new(CursorField::new("id", "7"), None);
        assert_eq!(single.encode(), b64(r#"["id","7"]"#));

        let blank = Cursor::new(CursorField::new("", ""), None);
        assert_eq!(blank.encode(), b64(r#"["",""]"#));
        assert_eq!(Cursor::decode(&blank.encode()).unwrap(), blank);
    }

    #[test]
    fn test_decode_two_and_four() {
        let c = Cursor::decode(&b64(r#"["id","42"]"#)).unwrap();
        assert_eq!(c.primary, CursorField::new("id", "42"));
        assert!(c.secondary.is_none());

        let c: Cursor = b64(r#"["full_path","a/b","id","x"]"#).parse().unwrap();
        assert_eq!(c.primary.value, "a/b");
        assert_eq!(c.secondary, Some(CursorField::new("id", "x")));
    }

    #[test]
    fn test_decode_rejects_wrong_arity() {
        for json in [r#"[]"#, r#"["id"]"#, r#"["a","b","c"]"#, r#"["a","b","c","d","e"]"#] {
            let err = Cursor::decode(&b64(json)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Invalid, "{json}");
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(Cursor::decode("%%%not-base64").unwrap_err().kind(), ErrorKind::Invalid);
        assert_eq!(Cursor::decode(&b64("not json")).unwrap_err().kind(), ErrorKind::Invalid);
        assert_eq!(
            Cursor::decode(&b64(r#"{"id":"1"}"#)).unwrap_err().kind(),
            ErrorKind::Invalid
        );
        assert_eq!(
            Cursor::decode(&b64(r#"["id", 1]"#)).unwrap_err().kind(),
            ErrorKind::Invalid
        );
    }

    #[test]
    fn test_values_with_separators_survive() {
        let cursor = Cursor::new(
            CursorField::new("name", "a,\"b\"/c\u{e9}"),
            Some(CursorField::new("id", "")),
        );
        assert_eq!(Cursor::decode(&cursor.to_string()).unwrap(), cursor);
    }
}
