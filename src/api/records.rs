//! Generic CRUD client for one records collection.
//!
//! The wire lists a collection as an id-keyed object so the server gets O(1)
//! lookup; locally we need ordered iteration plus the id on every record for
//! later mutations and joins, so list responses are normalized into
//! `Vec<Record<F>>` here and nowhere else.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{send_checked, ApiConfig, ApiError, FieldsBody};
use crate::types::Record;

// ============================================================================
// Wire types
// ============================================================================

/// One record as it appears in an id-keyed list response (id is the map key).
#[derive(Debug, Deserialize)]
pub(crate) struct WireRecord<F> {
    createdat: String,
    #[serde(default)]
    updatedat: Option<String>,
    fields: F,
}

/// A single-record (detail) response; here the id is an `id` member.
#[derive(Debug, Deserialize)]
struct WireDetail<F> {
    id: String,
    createdat: String,
    #[serde(default)]
    updatedat: Option<String>,
    fields: F,
}

/// Merge map keys into the records and impose a deterministic order.
/// JSON object order carries no meaning, so display order must not depend
/// on it: sort by creation time, record id as tie-breaker.
pub(crate) fn from_wire_map<F>(map: HashMap<String, WireRecord<F>>) -> Vec<Record<F>> {
    let mut records: Vec<Record<F>> = map
        .into_iter()
        .map(|(record_id, wire)| Record {
            record_id,
            createdat: wire.createdat,
            updatedat: wire.updatedat,
            fields: wire.fields,
        })
        .collect();
    records.sort_by(|a, b| {
        a.createdat
            .cmp(&b.createdat)
            .then_with(|| a.record_id.cmp(&b.record_id))
    });
    records
}

// ============================================================================
// Client
// ============================================================================

/// CRUD access to one collection, typed over its fields shape `F`.
pub struct RecordsClient<F> {
    http: reqwest::Client,
    config: Arc<ApiConfig>,
    app_id: String,
    _fields: PhantomData<F>,
}

impl<F> RecordsClient<F>
where
    F: Serialize + DeserializeOwned,
{
    pub fn new(config: Arc<ApiConfig>, app_id: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            app_id: app_id.to_string(),
            _fields: PhantomData,
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    fn collection_url(&self) -> String {
        format!("{}/apps/{}/records", self.config.base_url, self.app_id)
    }

    fn record_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url(), id)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        send_checked(request, self.config.api_key.as_deref()).await
    }

    /// Fetch the whole collection, normalized and deterministically ordered.
    pub async fn list_all(&self) -> Result<Vec<Record<F>>, ApiError> {
        let resp = self.send(self.http.get(self.collection_url())).await?;
        let wire: HashMap<String, WireRecord<F>> = resp.json().await?;
        Ok(from_wire_map(wire))
    }

    /// Fetch one record by id.
    pub async fn get(&self, id: &str) -> Result<Record<F>, ApiError> {
        let resp = self.send(self.http.get(self.record_url(id))).await?;
        let detail: WireDetail<F> = resp.json().await?;
        Ok(Record {
            record_id: detail.id,
            createdat: detail.createdat,
            updatedat: detail.updatedat,
            fields: detail.fields,
        })
    }

    /// Create a record; the server assigns the record id. Returns the
    /// server's representation as-is.
    pub async fn create(&self, fields: &F) -> Result<serde_json::Value, ApiError> {
        let resp = self
            .send(
                self.http
                    .post(self.collection_url())
                    .json(&FieldsBody { fields }),
            )
            .await?;
        Ok(resp.json().await?)
    }

    /// Partial update: only set `Option` members serialize, and the server
    /// merges into the stored fields rather than replacing them.
    pub async fn update(&self, id: &str, fields: &F) -> Result<serde_json::Value, ApiError> {
        let resp = self
            .send(
                self.http
                    .patch(self.record_url(id))
                    .json(&FieldsBody { fields }),
            )
            .await?;
        Ok(resp.json().await?)
    }

    /// Delete a record. Delete responses are not guaranteed to carry a body,
    /// so any 2xx status is success and the body is ignored.
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        self.send(self.http.delete(self.record_url(id))).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EmployeeFields, Role, ShiftFields, ShiftType};

    #[test]
    fn test_list_normalization_merges_ids() {
        let json = r##"{
            "64a3f0c2d1e4b5a69788c0e1": {
                "createdat": "2025-01-02T08:30:00",
                "updatedat": null,
                "fields": {"name": "Anna", "role": "manager"}
            },
            "64a3f0c2d1e4b5a69788c0e2": {
                "createdat": "2025-01-03T09:00:00",
                "fields": {"name": "Ben", "role": "employee", "color": "#0891b2"}
            }
        }"##;

        let wire: HashMap<String, WireRecord<EmployeeFields>> =
            serde_json::from_str(json).unwrap();
        let records = from_wire_map(wire);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record_id, "64a3f0c2d1e4b5a69788c0e1");
        assert_eq!(records[0].fields.role, Some(Role::Manager));
        assert_eq!(records[1].fields.color.as_deref(), Some("#0891b2"));
    }

    #[test]
    fn test_list_order_is_deterministic() {
        // Same records regardless of map insertion order: sorted by
        // createdat, then record_id.
        let json = r#"{
            "ffffffffffffffffffffffff": {"createdat": "2025-01-05T00:00:00", "fields": {}},
            "aaaaaaaaaaaaaaaaaaaaaaaa": {"createdat": "2025-01-01T00:00:00", "fields": {}},
            "bbbbbbbbbbbbbbbbbbbbbbbb": {"createdat": "2025-01-01T00:00:00", "fields": {}}
        }"#;

        let wire: HashMap<String, WireRecord<ShiftFields>> = serde_json::from_str(json).unwrap();
        let ids: Vec<String> = from_wire_map(wire)
            .into_iter()
            .map(|r| r.record_id)
            .collect();

        assert_eq!(
            ids,
            vec![
                "aaaaaaaaaaaaaaaaaaaaaaaa",
                "bbbbbbbbbbbbbbbbbbbbbbbb",
                "ffffffffffffffffffffffff"
            ]
        );
    }

    #[test]
    fn test_detail_response_parsing() {
        let json = r#"{
            "id": "64a3f0c2d1e4b5a69788c0e3",
            "createdat": "2025-01-06T07:00:00",
            "updatedat": "2025-01-07T10:00:00",
            "fields": {
                "date": "2025-01-06",
                "employee": "https://my.living-apps.de/rest/apps/aaaaaaaaaaaaaaaaaaaaaaaa/records/64a3f0c2d1e4b5a69788c0e1",
                "shift_type": "frueh"
            }
        }"#;

        let detail: WireDetail<ShiftFields> = serde_json::from_str(json).unwrap();
        assert_eq!(detail.id, "64a3f0c2d1e4b5a69788c0e3");
        assert_eq!(detail.updatedat.as_deref(), Some("2025-01-07T10:00:00"));
        assert_eq!(detail.fields.shift_type, Some(ShiftType::Frueh));
        assert_eq!(detail.fields.date.as_deref(), Some("2025-01-06"));
    }
}
