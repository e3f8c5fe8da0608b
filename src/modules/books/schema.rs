use crate::utils::validation::FieldRule;

/// Field rules for book payloads. `isbn` is only accepted on create.
pub const BOOK_SCHEMA: &[FieldRule] = &[
    FieldRule::text("isbn").immutable(),
    FieldRule::text("amazon_url"),
    FieldRule::text("author"),
    FieldRule::text("language"),
    FieldRule::integer("pages", Some(0)),
    FieldRule::text("publisher"),
    FieldRule::text("title"),
    FieldRule::integer("year", None),
];
