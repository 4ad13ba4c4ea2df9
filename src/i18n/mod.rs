//! Internationalization (i18n) for the bilingual (English/Portuguese) site.
//!
//! # Architecture
//!
//! - `registry`: The supported languages and their switcher labels
//! - `language`: `Language`, a code known to be in the registry
//! - `resolve`: Request locale resolution (path prefix, `Accept-Language`, default)
//! - `fields`: Selecting `*_en` / `*_pt` record fields with English fallback
//! - `catalog`: UI message dictionaries with `{name}` substitution
//!
//! There is no process-wide "current locale": the resolved [`Language`] is
//! passed explicitly to whatever renders the response.
//!
//! # Example
//!
//! ```rust,ignore
//! use temple_reunion::i18n::{localized_field, resolve_locale, Language};
//!
//! let language = resolve_locale("/pt/news", Some("en-US"), Language::ENGLISH);
//! let title = localized_field(&news_item, "title", language);
//! ```

mod catalog;
mod fields;
mod language;
mod registry;
mod resolve;

pub use catalog::{interpolate, Catalog};
pub use fields::{localized_field, FieldLookup};
pub use language::Language;
pub use registry::LanguageConfig;
pub use resolve::{locale_from_accept_language, locale_from_path, preferred_languages, resolve_locale};
