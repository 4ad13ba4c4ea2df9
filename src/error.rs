use crate::airtable::AirtableError;

/// Failures surfaced by [`crate::store::RecordStore`]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{operation} failed: {source}")]
    Remote {
        operation: &'static str,
        #[source]
        source: AirtableError,
    },

    #[error("invalid input: {0}")]
    Validation(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
