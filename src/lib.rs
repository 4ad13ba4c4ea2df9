// Library exports for binaries and integration tests
pub mod airtable;
pub mod api;
pub mod config;
pub mod error;
pub mod i18n;
pub mod models;
pub mod security;
pub mod store;
