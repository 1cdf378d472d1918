//! Structural validation of book request bodies.
//!
//! The body is checked against [`BOOK_SCHEMA`] as raw JSON before anything is
//! deserialized, so every violation is reported at once and values are never
//! coerced (`"320"` is a string, not an integer).

use serde_json::{Map, Value};

use super::models::Book;

/// Primitive JSON type a field must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    /// JSON integer that fits a PostgreSQL `INTEGER` column
    Integer,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldType,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldType) -> Self {
        Self { name, kind }
    }

    fn check(&self, value: &Value) -> Option<String> {
        let type_error = || format!("instance.{} is not of a type(s) {}", self.name, self.kind.as_str());

        match self.kind {
            FieldType::String if value.is_string() => None,
            FieldType::Integer if value.is_i64() || value.is_u64() => {
                // u64 values beyond i64 are necessarily too large
                let n = value.as_i64().unwrap_or(i64::MAX);
                if n > i64::from(i32::MAX) {
                    Some(format!(
                        "instance.{} must be less than or equal to {}",
                        self.name,
                        i32::MAX
                    ))
                } else if n < i64::from(i32::MIN) {
                    Some(format!(
                        "instance.{} must be greater than or equal to {}",
                        self.name,
                        i32::MIN
                    ))
                } else {
                    None
                }
            }
            _ => Some(type_error()),
        }
    }
}

/// Every property is required; no others are allowed.
pub const BOOK_SCHEMA: &[FieldSpec] = &[
    FieldSpec::new("isbn", FieldType::String),
    FieldSpec::new("amazon_url", FieldType::String),
    FieldSpec::new("author", FieldType::String),
    FieldSpec::new("language", FieldType::String),
    FieldSpec::new("pages", FieldType::Integer),
    FieldSpec::new("publisher", FieldType::String),
    FieldSpec::new("title", FieldType::String),
    FieldSpec::new("year", FieldType::Integer),
];

/// Validate a create/update body and build the typed [`Book`].
///
/// On failure returns one human-readable message per violated constraint:
/// missing properties first, then type errors, both in schema order, then
/// unexpected properties in key order.
pub fn validate_book(body: &Value) -> Result<Book, Vec<String>> {
    let Some(object) = body.as_object() else {
        return Err(vec!["instance is not of a type(s) object".to_string()]);
    };

    let violations = collect_violations(object);
    if !violations.is_empty() {
        return Err(violations);
    }

    serde_json::from_value(body.clone()).map_err(|e| vec![format!("instance {}", e)])
}

/// Violation for a PUT body whose isbn differs from the one in its path.
///
/// Only meaningful once the body has passed [`validate_book`]; the caller
/// decides whether a missing row outranks it.
pub fn isbn_mismatch(path_isbn: &str, book: &Book) -> Option<String> {
    (book.isbn != path_isbn).then(|| format!("instance.isbn must match the isbn in the path '{}'", path_isbn))
}

fn collect_violations(object: &Map<String, Value>) -> Vec<String> {
    let missing = BOOK_SCHEMA
        .iter()
        .filter(|field| !object.contains_key(field.name))
        .map(|field| format!("instance requires property \"{}\"", field.name));

    let mistyped = BOOK_SCHEMA
        .iter()
        .filter_map(|field| object.get(field.name).and_then(|value| field.check(value)));

    let additional = object
        .keys()
        .filter(|key| !BOOK_SCHEMA.iter().any(|field| field.name == key.as_str()))
        .map(|key| format!("instance is not allowed to have the additional property \"{}\"", key));

    missing.chain(mistyped).chain(additional).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn atomic_habits() -> Value {
        json!({
            "isbn": "0735211299",
            "amazon_url": "https://www.amazon.com/gp/product/0735211299",
            "author": "James Clear",
            "language": "english",
            "pages": 320,
            "publisher": "Avery",
            "title": "Atomic Habits",
            "year": 2018
        })
    }

    #[test]
    fn accepts_well_typed_book() {
        let book = validate_book(&atomic_habits()).unwrap();
        assert_eq!(book.isbn, "0735211299");
        assert_eq!(book.pages, 320);
        assert_eq!(book.year, 2018);
    }

    #[test]
    fn numeric_string_is_not_coerced() {
        let mut body = atomic_habits();
        body["pages"] = json!("320");

        assert_eq!(
            validate_book(&body).unwrap_err(),
            vec!["instance.pages is not of a type(s) integer"]
        );
    }

    #[test]
    fn collects_every_violation() {
        let body = json!({
            "isbn": 735211299,
            "amazon_url": "https://a.co/x",
            "language": "english",
            "pages": 320.5,
            "publisher": null,
            "title": "Atomic Habits",
            "year": "2018",
            "subtitle": "extra"
        });

        assert_eq!(
            validate_book(&body).unwrap_err(),
            vec![
                "instance requires property \"author\"",
                "instance.isbn is not of a type(s) string",
                "instance.pages is not of a type(s) integer",
                "instance.publisher is not of a type(s) string",
                "instance.year is not of a type(s) integer",
                "instance is not allowed to have the additional property \"subtitle\"",
            ]
        );
    }

    #[test]
    fn rejects_integers_outside_column_range() {
        let mut body = atomic_habits();
        body["pages"] = json!(3_000_000_000u64);
        body["year"] = json!(-3_000_000_000i64);

        assert_eq!(
            validate_book(&body).unwrap_err(),
            vec![
                "instance.pages must be less than or equal to 2147483647",
                "instance.year must be greater than or equal to -2147483648",
            ]
        );
    }

    #[test]
    fn rejects_non_object_body() {
        assert_eq!(
            validate_book(&json!([1, 2])).unwrap_err(),
            vec!["instance is not of a type(s) object"]
        );
    }

    #[test]
    fn empty_object_reports_every_required_field() {
        let violations = validate_book(&json!({})).unwrap_err();
        assert_eq!(violations.len(), BOOK_SCHEMA.len());
        assert_eq!(violations[0], "instance requires property \"isbn\"");
    }

    #[test]
    fn update_requires_matching_isbn() {
        let book = validate_book(&atomic_habits()).unwrap();
        assert_eq!(isbn_mismatch("0735211299", &book), None);

        assert_eq!(
            isbn_mismatch("0691161518", &book).as_deref(),
            Some("instance.isbn must match the isbn in the path '0691161518'")
        );
    }

    #[test]
    fn fractional_number_is_not_an_integer() {
        let mut body = atomic_habits();
        body["pages"] = json!(264.0);

        assert_eq!(
            validate_book(&body).unwrap_err(),
            vec!["instance.pages is not of a type(s) integer"]
        );
    }
}
