//! Typed access to the site's Airtable bases.

mod locks;

pub use locks::{KeyGuard, KeyedLocks};

use chrono::{SecondsFormat, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::airtable::{
    AirtableClient, AirtableError, Formula, ListQuery, RawRecord, APPLICATIONS_TABLE,
    EVENT_TABLE, MEMBERS_TABLE, NEWS_TABLE, SITES_TABLE,
};
use crate::config::Config;
use crate::error::StoreError;
use crate::models::{
    Application, ApplicationStatus, EventDetails, Member, NewApplication, NewMember, NewsItem,
    SiteConfig,
};

/// Default and maximum number of news items per page (Airtable's page cap)
pub const DEFAULT_NEWS_LIMIT: u32 = 100;

/// The three Airtable bases backing the site
#[derive(Debug, Clone)]
pub struct Bases {
    pub platform_config: String,
    pub content: String,
    pub users: String,
}

impl Bases {
    pub fn from_config(config: &Config) -> Self {
        Self {
            platform_config: config.platform_config_base_id.clone(),
            content: config.content_base_id.clone(),
            users: config.users_base_id.clone(),
        }
    }
}

/// Options for [`RecordStore::get_news`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsQuery {
    /// `Some(true)` restricts to featured items; otherwise unfiltered
    pub featured: Option<bool>,
    /// Page size, capped at 100; absent or 0 means 100
    pub limit: Option<u32>,
    /// 1-based page number (default 1)
    pub page: Option<u32>,
}

pub struct RecordStore {
    client: AirtableClient,
    bases: Bases,
    member_locks: KeyedLocks<(String, String)>,
}

impl RecordStore {
    pub fn new(client: AirtableClient, bases: Bases) -> Self {
        Self {
            client,
            bases,
            member_locks: KeyedLocks::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(AirtableClient::from_config(config), Bases::from_config(config))
    }

    /// Fetch the site's configuration record.
    pub async fn get_site_config(&self, site_id: &str) -> Result<SiteConfig, StoreError> {
        const OP: &str = "get_site_config";

        let query = ListQuery::new().filter(Formula::record_id_eq(site_id));
        let page = self
            .client
            .list_records(&self.bases.platform_config, SITES_TABLE, &query)
            .await
            .map_err(remote(OP))?;

        if page.records.len() > 1 {
            warn!(
                "{} matched {} site records for {}, using the first",
                OP,
                page.records.len(),
                site_id
            );
        }

        match page.records.into_iter().next() {
            Some(record) => decode(OP, record),
            None => {
                warn!("Site with ID {} not found", site_id);
                Err(StoreError::NotFound {
                    entity: "Site",
                    id: site_id.to_string(),
                })
            }
        }
    }

    /// Fetch one page of news for a site, newest first.
    ///
    /// Page `n` is reached by following Airtable's offset cursor `n - 1`
    /// times with `pageSize = limit`; a page past the end is empty.
    pub async fn get_news(
        &self,
        site_id: &str,
        query: &NewsQuery,
    ) -> Result<Vec<NewsItem>, StoreError> {
        const OP: &str = "get_news";

        // 0 means the default; larger values are capped at Airtable's page size
        let limit = match query.limit {
            None | Some(0) => DEFAULT_NEWS_LIMIT,
            Some(limit) => limit.min(DEFAULT_NEWS_LIMIT),
        };
        let page = query.page.unwrap_or(1);
        if page == 0 {
            return Err(StoreError::Validation("page numbers start at 1".to_string()));
        }

        let mut filter = Formula::field_eq("siteId", site_id);
        if query.featured == Some(true) {
            filter = Formula::and([filter, Formula::is_true("featured")]);
        }

        let mut list = ListQuery::new()
            .filter(filter)
            .sort_desc("publishDate")
            .page_size(limit);
        let mut current = 1;

        let records = loop {
            let result = self
                .client
                .list_records(&self.bases.content, NEWS_TABLE, &list)
                .await
                .map_err(remote(OP))?;

            if current == page {
                break result.records;
            }
            match result.offset {
                Some(offset) => {
                    list = list.offset(offset);
                    current += 1;
                }
                None => break Vec::new(),
            }
        };

        let mut items: Vec<NewsItem> = decode_all(OP, records)?;
        // Airtable sorts already; keep the order guaranteed for undated rows too
        items.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
        items.truncate(limit as usize);

        Ok(items)
    }

    /// Fetch the event for a site, matched by record ID or `siteId` field.
    pub async fn get_event_details(
        &self,
        site_id: &str,
    ) -> Result<Option<EventDetails>, StoreError> {
        const OP: &str = "get_event_details";

        let filter = Formula::or([
            Formula::record_id_eq(site_id),
            Formula::field_eq("siteId", site_id),
        ]);
        let page = self
            .client
            .list_records(&self.bases.content, EVENT_TABLE, &ListQuery::new().filter(filter))
            .await
            .map_err(remote(OP))?;

        if page.records.len() > 1 {
            warn!(
                "{} matched {} event records for {}, using the first",
                OP,
                page.records.len(),
                site_id
            );
        }

        page.records
            .into_iter()
            .next()
            .map(|record| decode(OP, record))
            .transpose()
    }

    /// Update the member with this email on this site, or create one.
    ///
    /// Calls for the same `(siteId, email)` are serialized within this
    /// process. Separate processes can still race and create duplicates.
    pub async fn upsert_member(&self, member: &NewMember) -> Result<Member, StoreError> {
        const OP: &str = "upsert_member";

        let email = member.email.trim();
        if email.is_empty() {
            return Err(StoreError::Validation("member email is required".to_string()));
        }

        let _guard = self
            .member_locks
            .lock((member.site_id.clone(), email.to_string()))
            .await;

        let filter = Formula::and([
            Formula::field_eq("siteId", &member.site_id),
            Formula::field_eq("email", email),
        ]);
        let existing = self
            .client
            .list_records(
                &self.bases.users,
                MEMBERS_TABLE,
                &ListQuery::new().filter(filter).max_records(1),
            )
            .await
            .map_err(remote(OP))?;

        let mut fields = to_fields(member)?;
        fields.insert("email".to_string(), Value::String(email.to_string()));

        let record = match existing.records.first() {
            Some(found) => {
                info!("Updating member {} ({})", found.id, email);
                self.client
                    .update_record(&self.bases.users, MEMBERS_TABLE, &found.id, fields)
                    .await
            }
            None => {
                info!("Creating member {}", email);
                fields.insert("createdAt".to_string(), Value::String(now()));
                self.client
                    .create_record(&self.bases.users, MEMBERS_TABLE, fields)
                    .await
            }
        }
        .map_err(remote(OP))?;

        decode(OP, record)
    }

    /// Create a fund application. `status` is always `new` and
    /// `submittedDate` is always the current time.
    pub async fn submit_application(
        &self,
        application: &NewApplication,
    ) -> Result<Application, StoreError> {
        const OP: &str = "submit_application";

        if application.member_email.trim().is_empty() {
            return Err(StoreError::Validation("memberEmail is required".to_string()));
        }
        if application.request_amount <= Decimal::ZERO {
            return Err(StoreError::Validation(
                "requestAmount must be greater than zero".to_string(),
            ));
        }

        let mut application = application.clone();
        application.request_amount = application
            .request_amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        let mut fields = to_fields(&application)?;
        fields.insert("submittedDate".to_string(), Value::String(now()));
        fields.insert(
            "status".to_string(),
            serde_json::to_value(ApplicationStatus::New).map_err(encode)?,
        );

        let record = self
            .client
            .create_record(&self.bases.users, APPLICATIONS_TABLE, fields)
            .await
            .map_err(remote(OP))?;

        info!("Application {} submitted by {}", record.id, application.member_email);
        decode(OP, record)
    }

    /// All applications a member has submitted on a site.
    pub async fn get_member_applications(
        &self,
        site_id: &str,
        member_email: &str,
    ) -> Result<Vec<Application>, StoreError> {
        const OP: &str = "get_member_applications";

        if member_email.trim().is_empty() {
            return Err(StoreError::Validation("memberEmail is required".to_string()));
        }

        let filter = Formula::and([
            Formula::field_eq("siteId", site_id),
            Formula::field_eq("memberEmail", member_email.trim()),
        ]);
        let page = self
            .client
            .list_records(&self.bases.users, APPLICATIONS_TABLE, &ListQuery::new().filter(filter))
            .await
            .map_err(remote(OP))?;

        decode_all(OP, page.records)
    }
}

fn remote(operation: &'static str) -> impl FnOnce(AirtableError) -> StoreError {
    move |source| {
        error!("Error in {}: {}", operation, source);
        StoreError::Remote { operation, source }
    }
}

fn encode(err: serde_json::Error) -> StoreError {
    StoreError::Validation(format!("could not encode fields: {}", err))
}

fn decode<T: DeserializeOwned>(operation: &'static str, record: RawRecord) -> Result<T, StoreError> {
    record.into_entity().map_err(remote(operation))
}

fn decode_all<T: DeserializeOwned>(
    operation: &'static str,
    records: Vec<RawRecord>,
) -> Result<Vec<T>, StoreError> {
    records
        .into_iter()
        .map(|record| decode(operation, record))
        .collect()
}

fn to_fields<T: Serialize>(value: &T) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(value).map_err(encode)? {
        Value::Object(fields) => Ok(fields),
        other => Err(StoreError::Validation(format!(
            "expected an object of fields, got {}",
            other
        ))),
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
