//! Airtable `filterByFormula` construction.
//!
//! Predicates are assembled as values and rendered once, so caller-supplied
//! strings only ever appear inside escaped string literals.

use std::fmt;

/// A filter predicate understood by Airtable's formula language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    /// `RECORD_ID() = '<id>'`
    RecordIdEq(String),
    /// `{field} = '<value>'`
    FieldEq { field: String, value: String },
    /// `{field} = TRUE()`
    IsTrue(String),
    /// `AND(a, b, ...)`
    And(Vec<Formula>),
    /// `OR(a, b, ...)`
    Or(Vec<Formula>),
}

impl Formula {
    pub fn record_id_eq(id: impl Into<String>) -> Self {
        Formula::RecordIdEq(id.into())
    }

    pub fn field_eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Formula::FieldEq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_true(field: impl Into<String>) -> Self {
        Formula::IsTrue(field.into())
    }

    pub fn and(terms: impl IntoIterator<Item = Formula>) -> Self {
        Formula::And(terms.into_iter().collect())
    }

    pub fn or(terms: impl IntoIterator<Item = Formula>) -> Self {
        Formula::Or(terms.into_iter().collect())
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::RecordIdEq(id) => write!(f, "RECORD_ID() = {}", quote(id)),
            Formula::FieldEq { field, value } => write!(f, "{{{}}} = {}", field, quote(value)),
            Formula::IsTrue(field) => write!(f, "{{{}}} = TRUE()", field),
            Formula::And(terms) => write_call(f, "AND", terms),
            Formula::Or(terms) => write_call(f, "OR", terms),
        }
    }
}

fn write_call(f: &mut fmt::Formatter<'_>, name: &str, terms: &[Formula]) -> fmt::Result {
    // A single-term AND/OR is just the term
    if let [only] = terms {
        return write!(f, "{}", only);
    }
    write!(f, "{}(", name)?;
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", term)?;
    }
    write!(f, ")")
}

/// Render `value` as a single-quoted formula string literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}
