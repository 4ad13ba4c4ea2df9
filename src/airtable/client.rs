use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::formula::Formula;
use crate::config::Config;

/// Errors raised while talking to the Airtable REST API
#[derive(Debug, thiserror::Error)]
pub enum AirtableError {
    #[error("request to Airtable failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Airtable API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("failed to decode Airtable record: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A record exactly as Airtable returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(rename = "createdTime", default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
}

impl RawRecord {
    /// Flatten into `{ id, ...fields }`. The record identity wins over a field
    /// that happens to be called `id`.
    pub fn normalize(self) -> Value {
        let mut object = self.fields;
        object.insert("id".to_string(), Value::String(self.id));
        Value::Object(object)
    }

    /// Normalize and decode into a typed entity.
    pub fn into_entity<T: DeserializeOwned>(self) -> Result<T, AirtableError> {
        Ok(serde_json::from_value(self.normalize())?)
    }
}

/// One page of a list response
#[derive(Debug, Clone, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub records: Vec<RawRecord>,
    /// Cursor for the next page; absent on the last page
    #[serde(default)]
    pub offset: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: Direction,
}

/// Parameters for a "list records" call
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub filter: Option<Formula>,
    pub sort: Vec<Sort>,
    pub max_records: Option<u32>,
    pub page_size: Option<u32>,
    pub offset: Option<String>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, formula: Formula) -> Self {
        self.filter = Some(formula);
        self
    }

    pub fn sort_desc(mut self, field: &str) -> Self {
        self.sort.push(Sort {
            field: field.to_string(),
            direction: Direction::Desc,
        });
        self
    }

    pub fn max_records(mut self, max: u32) -> Self {
        self.max_records = Some(max);
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn offset(mut self, offset: impl Into<String>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    /// Render as Airtable query-string parameters
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(filter) = &self.filter {
            params.push(("filterByFormula".to_string(), filter.to_string()));
        }
        for (i, sort) in self.sort.iter().enumerate() {
            params.push((format!("sort[{}][field]", i), sort.field.clone()));
            params.push((
                format!("sort[{}][direction]", i),
                sort.direction.as_str().to_string(),
            ));
        }
        if let Some(max) = self.max_records {
            params.push(("maxRecords".to_string(), max.to_string()));
        }
        if let Some(size) = self.page_size {
            params.push(("pageSize".to_string(), size.to_string()));
        }
        if let Some(offset) = &self.offset {
            params.push(("offset".to_string(), offset.clone()));
        }

        params
    }
}

/// Thin typed wrapper over the Airtable REST API
#[derive(Debug, Clone)]
pub struct AirtableClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl AirtableClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.airtable_api_url, &config.airtable_token)
    }

    fn table_url(&self, base: &str, table: &str) -> String {
        format!("{}/{}/{}", self.api_url, base, table)
    }

    /// Fetch a single page of records
    pub async fn list_records(
        &self,
        base: &str,
        table: &str,
        query: &ListQuery,
    ) -> Result<RecordPage, AirtableError> {
        let params = query.to_params();
        debug!("Listing {} records with {:?}", table, params);

        let response = self
            .http
            .get(self.table_url(base, table))
            .bearer_auth(&self.token)
            .query(&params)
            .send()
            .await?;

        read_json(response).await
    }

    pub async fn create_record(
        &self,
        base: &str,
        table: &str,
        fields: Map<String, Value>,
    ) -> Result<RawRecord, AirtableError> {
        debug!("Creating {} record", table);

        let response = self
            .http
            .post(self.table_url(base, table))
            .bearer_auth(&self.token)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;

        read_json(response).await
    }

    /// Partial update: fields not present in `fields` are left untouched
    pub async fn update_record(
        &self,
        base: &str,
        table: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<RawRecord, AirtableError> {
        debug!("Updating {} record {}", table, id);

        let response = self
            .http
            .patch(format!("{}/{}", self.table_url(base, table), id))
            .bearer_auth(&self.token)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;

        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AirtableError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(AirtableError::Api {
            status,
            message: error_message(&body),
        });
    }

    Ok(serde_json::from_str(&body)?)
}

/// Pull a readable message out of Airtable's error envelope.
///
/// Airtable answers either `{"error": {"type": .., "message": ..}}` or
/// `{"error": "NOT_FOUND"}`; anything else is returned verbatim.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    match value.get("error") {
        Some(Value::String(kind)) => kind.clone(),
        Some(Value::Object(error)) => {
            let kind = error.get("type").and_then(Value::as_str).unwrap_or("UNKNOWN");
            match error.get("message").and_then(Value::as_str) {
                Some(message) => format!("{}: {}", kind, message),
                None => kind.to_string(),
            }
        }
        _ => body.to_string(),
    }
}
