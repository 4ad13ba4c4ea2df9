//! Typed records for the Sites, News, Event, Members and Applications tables.
//!
//! Field names follow the Airtable schema. Airtable omits empty cells and
//! unchecked checkboxes, so nearly every field has a default. Fields a type
//! does not model are kept in `extra`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::i18n::FieldLookup;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Countdown,
    News,
    Fundraising,
    Applications,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub id: String,
    #[serde(default)]
    pub site_name: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub default_language: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SiteConfig {
    pub fn has_feature(&self, feature: &Feature) -> bool {
        self.features.contains(feature)
    }
}

/// An Airtable attachment cell entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub filename: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    #[serde(default)]
    pub site_id: String,
    #[serde(rename = "title_en", default)]
    pub title_en: String,
    #[serde(rename = "title_pt", default, skip_serializing_if = "Option::is_none")]
    pub title_pt: Option<String>,
    #[serde(rename = "content_en", default)]
    pub content_en: String,
    #[serde(rename = "content_pt", default, skip_serializing_if = "Option::is_none")]
    pub content_pt: Option<String>,
    #[serde(default)]
    pub publish_date: Option<NaiveDate>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image: Vec<Attachment>,
    #[serde(default)]
    pub slug: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldLookup for NewsItem {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "title_en" => Some(&self.title_en),
            "title_pt" => self.title_pt.as_deref(),
            "content_en" => Some(&self.content_en),
            "content_pt" => self.content_pt.as_deref(),
            "slug" => Some(&self.slug),
            _ => self.extra.field(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub id: String,
    #[serde(default)]
    pub site_id: String,
    #[serde(rename = "name_en", default)]
    pub name_en: String,
    #[serde(rename = "name_pt", default, skip_serializing_if = "Option::is_none")]
    pub name_pt: Option<String>,
    #[serde(rename = "description_en", default)]
    pub description_en: String,
    #[serde(rename = "description_pt", default, skip_serializing_if = "Option::is_none")]
    pub description_pt: Option<String>,
    #[serde(default)]
    pub event_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: String,
    /// `"lat,lng"` as typed into Airtable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventDetails {
    /// Parse `coordinates` into `(latitude, longitude)`
    pub fn lat_lng(&self) -> Option<(f64, f64)> {
        let (lat, lng) = self.coordinates.as_deref()?.split_once(',')?;
        let lat: f64 = lat.trim().parse().ok()?;
        let lng: f64 = lng.trim().parse().ok()?;
        if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) {
            Some((lat, lng))
        } else {
            None
        }
    }
}

impl FieldLookup for EventDetails {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "name_en" => Some(&self.name_en),
            "name_pt" => self.name_pt.as_deref(),
            "description_en" => Some(&self.description_en),
            "description_pt" => self.description_pt.as_deref(),
            "location" => Some(&self.location),
            _ => self.extra.field(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Member,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub site_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Input for [`crate::store::RecordStore::upsert_member`]. Only the fields
/// present are written, so an update never clears existing cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    #[serde(default)]
    pub site_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApplicationStatus {
    #[default]
    New,
    UnderReview,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    #[serde(default)]
    pub site_id: String,
    #[serde(default)]
    pub member_email: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub request_amount: Option<Decimal>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub submitted_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub approved_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Input for [`crate::store::RecordStore::submit_application`]. Unmodelled
/// fields pass through to Airtable, except `status` and `submittedDate`
/// which the store always stamps itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    #[serde(default)]
    pub site_id: String,
    pub member_email: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub request_amount: Decimal,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airtable::RawRecord;
    use serde_json::json;

    fn raw(id: &str, fields: Value) -> RawRecord {
        RawRecord {
            id: id.to_string(),
            fields: fields.as_object().cloned().unwrap_or_default(),
            created_time: None,
        }
    }

    // ==================== SiteConfig Tests ====================

    #[test]
    fn test_site_config_from_record() {
        let site: SiteConfig = raw(
            "recSite1",
            json!({
                "siteName": "Temple Reunion",
                "domain": "templereunion.com",
                "languages": ["en", "pt"],
                "defaultLanguage": "pt",
                "active": true,
                "createdAt": "2024-01-15T10:30:00.000Z",
                "features": ["countdown", "news", "merch"]
            }),
        )
        .into_entity()
        .expect("Should decode site");

        assert_eq!(site.id, "recSite1");
        assert_eq!(site.site_name, "Temple Reunion");
        assert_eq!(site.languages, vec!["en", "pt"]);
        assert_eq!(site.default_language.as_deref(), Some("pt"));
        assert!(site.active);
        assert!(site.created_at.is_some());
        assert!(site.has_feature(&Feature::Countdown));
        assert!(!site.has_feature(&Feature::Fundraising));
        assert!(site.has_feature(&Feature::Other("merch".to_string())));
    }

    #[test]
    fn test_site_config_unchecked_active_defaults_false() {
        let site: SiteConfig = raw("recSite1", json!({"siteName": "X"}))
            .into_entity()
            .unwrap();
        assert!(!site.active);
        assert!(site.features.is_empty());
    }

    // ==================== NewsItem Tests ====================

    #[test]
    fn test_news_item_keeps_unknown_fields() {
        let item: NewsItem = raw(
            "recNews1",
            json!({
                "siteId": "recSite1",
                "title_en": "Temple Reunion Announced",
                "content_en": "Join us",
                "publishDate": "2024-03-01",
                "slug": "temple-reunion-announced",
                "author": "Board"
            }),
        )
        .into_entity()
        .unwrap();

        assert_eq!(item.title_en, "Temple Reunion Announced");
        assert!(item.title_pt.is_none());
        assert!(!item.featured);
        assert_eq!(item.publish_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(item.extra["author"], "Board");
        assert_eq!(item.field("author"), Some("Board"));
    }

    #[test]
    fn test_news_item_with_image() {
        let item: NewsItem = raw(
            "recNews1",
            json!({
                "title_en": "Photos",
                "image": [{"id": "att1", "url": "https://dl.airtable.com/a.jpg",
                           "filename": "a.jpg", "type": "image/jpeg", "width": 800}]
            }),
        )
        .into_entity()
        .unwrap();

        assert_eq!(item.image.len(), 1);
        assert_eq!(item.image[0].mime_type.as_deref(), Some("image/jpeg"));
        assert_eq!(item.image[0].extra["width"], 800);
    }

    #[test]
    fn test_news_item_serializes_schema_names() {
        let item: NewsItem = raw("recNews1", json!({"title_en": "A", "siteId": "s"}))
            .into_entity()
            .unwrap();
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["title_en"], "A");
        assert_eq!(value["siteId"], "s");
        assert!(value.get("title_pt").is_none());
    }

    // ==================== EventDetails Tests ====================

    #[test]
    fn test_event_lat_lng() {
        let event: EventDetails = raw(
            "recEvent1",
            json!({"name_en": "Reunion", "coordinates": "-23.550520,-46.633308"}),
        )
        .into_entity()
        .unwrap();

        let (lat, lng) = event.lat_lng().expect("Should parse coordinates");
        assert!((lat + 23.550520).abs() < 1e-9);
        assert!((lng + 46.633308).abs() < 1e-9);
    }

    #[test]
    fn test_event_bad_coordinates() {
        let mut event: EventDetails = raw("recEvent1", json!({})).into_entity().unwrap();
        assert!(event.lat_lng().is_none());

        event.coordinates = Some("somewhere".to_string());
        assert!(event.lat_lng().is_none());

        event.coordinates = Some("95.0,10.0".to_string());
        assert!(event.lat_lng().is_none());
    }

    // ==================== Member / Application Tests ====================

    #[test]
    fn test_member_role_values() {
        let member: Member = raw(
            "recMember1",
            json!({"email": "a@x.com", "role": "editor", "approved": true}),
        )
        .into_entity()
        .unwrap();
        assert_eq!(member.role, Some(Role::Editor));
        assert!(member.approved);
    }

    #[test]
    fn test_new_member_skips_absent_fields() {
        let member = NewMember {
            site_id: "recSite1".to_string(),
            email: "a@x.com".to_string(),
            name: None,
            approved: None,
            role: Some(Role::Member),
        };
        let value = serde_json::to_value(&member).unwrap();
        assert_eq!(value, json!({"siteId": "recSite1", "email": "a@x.com", "role": "member"}));
    }

    #[test]
    fn test_application_status_names() {
        assert_eq!(serde_json::to_value(ApplicationStatus::New).unwrap(), "new");
        assert_eq!(
            serde_json::to_value(ApplicationStatus::UnderReview).unwrap(),
            "underReview"
        );
        assert_eq!(ApplicationStatus::default(), ApplicationStatus::New);
    }

    #[test]
    fn test_application_amount_is_number() {
        let application: Application = raw(
            "recApp1",
            json!({"memberEmail": "a@x.com", "requestAmount": 150.5, "status": "underReview"}),
        )
        .into_entity()
        .unwrap();

        assert_eq!(application.request_amount.map(|a| a.round_dp(2)), Some(Decimal::new(15050, 2)));
        assert_eq!(application.status, ApplicationStatus::UnderReview);

        let value = serde_json::to_value(&application).unwrap();
        assert!(value["requestAmount"].is_number());
    }

    #[test]
    fn test_new_application_passes_extra_fields() {
        let input: NewApplication = serde_json::from_value(json!({
            "memberEmail": "a@x.com",
            "requestAmount": 20,
            "reason": "Travel",
            "phone": "555"
        }))
        .unwrap();

        assert_eq!(input.request_amount, Decimal::new(20, 0));
        assert_eq!(input.extra["phone"], "555");
    }
}
