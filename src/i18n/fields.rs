//! Picking the right variant of a bilingual (`*_en` / `*_pt`) field.

use serde_json::{Map, Value};

use crate::i18n::Language;

/// Read access to a record's text fields by their schema name.
pub trait FieldLookup {
    fn field(&self, name: &str) -> Option<&str>;
}

impl FieldLookup for Map<String, Value> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }
}

/// Return `<field>_<lang>` from `record`, falling back to the canonical
/// (English) variant when the localized value is missing or empty.
pub fn localized_field<'a, R>(record: &'a R, field: &str, language: Language) -> Option<&'a str>
where
    R: FieldLookup + ?Sized,
{
    let localized = record
        .field(&language.field_name(field))
        .filter(|value| !value.is_empty());

    localized.or_else(|| record.field(&Language::canonical().field_name(field)))
}
