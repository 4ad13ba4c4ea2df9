//! Airtable REST access: record listing, creation and partial updates, plus
//! the formula builder used for `filterByFormula`.

mod client;
mod formula;

pub use client::{
    AirtableClient, AirtableError, Direction, ListQuery, RawRecord, RecordPage, Sort,
};
pub use formula::{quote, Formula};

/// Tables as provisioned in the platform-config, content and users bases
pub const SITES_TABLE: &str = "Sites";
pub const NEWS_TABLE: &str = "News";
pub const EVENT_TABLE: &str = "Event";
pub const MEMBERS_TABLE: &str = "Members";
pub const APPLICATIONS_TABLE: &str = "Applications";
