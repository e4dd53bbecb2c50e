//! Record schema and JSON projection.
//!
//! Projects raw Kafka payloads onto the fixed user-record shape. Records
//! that fail to parse or are missing a required field yield an error the
//! pipeline counts and drops; they never abort the stream.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProjectionError;

/// A user-created event as stored in Cassandra.
///
/// Eleven required fields plus `dob`, which the upstream producer includes
/// but which is absent from older payloads, so it stays optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub address: String,
    pub postcode: String,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub dob: Option<String>,
    pub registered_date: String,
    pub phone: String,
    pub picture: String,
}

impl UserRecord {
    /// The required projected column names, in declaration order.
    pub const COLUMNS: [&'static str; 11] = [
        "id",
        "first_name",
        "last_name",
        "gender",
        "address",
        "postcode",
        "email",
        "username",
        "registered_date",
        "phone",
        "picture",
    ];

    /// Display name used in per-record insert logging.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Project a raw payload onto the record schema.
///
/// Unknown keys are ignored; missing required keys and malformed JSON are
/// reported as a [`ProjectionError`].
pub fn project(payload: &[u8]) -> Result<UserRecord, ProjectionError> {
    serde_json::from_slice(payload).map_err(|e| ProjectionError::Decode {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> serde_json::Value {
        serde_json::json!({
            "id": "8e64bd67-3e3e-47e7-ae7a-b5f618fb7b29",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "gender": "female",
            "address": "12 Analytical Way, London",
            "postcode": "N1 9GU",
            "email": "ada@example.com",
            "username": "adal",
            "dob": "1815-12-10T00:00:00.000Z",
            "registered_date": "2024-03-01T09:30:00.000Z",
            "phone": "020-7946-0000",
            "picture": "https://example.com/ada.jpg",
        })
    }

    #[test]
    fn test_columns_are_eleven() {
        assert_eq!(UserRecord::COLUMNS.len(), 11);
        assert_eq!(UserRecord::COLUMNS[0], "id");
        assert_eq!(UserRecord::COLUMNS[5], "postcode");
        assert_eq!(UserRecord::COLUMNS[10], "picture");
    }

    #[test]
    fn test_project_complete_payload() {
        let payload = serde_json::to_vec(&sample_json()).unwrap();
        let record = project(&payload).unwrap();

        assert_eq!(
            record.id,
            "8e64bd67-3e3e-47e7-ae7a-b5f618fb7b29".parse::<Uuid>().unwrap()
        );
        assert_eq!(record.first_name, "Ada");
        assert_eq!(record.last_name, "Lovelace");
        assert_eq!(record.postcode, "N1 9GU");
        assert_eq!(record.dob.as_deref(), Some("1815-12-10T00:00:00.000Z"));
        assert_eq!(record.picture, "https://example.com/ada.jpg");
    }

    #[test]
    fn test_project_without_dob() {
        let mut value = sample_json();
        value.as_object_mut().unwrap().remove("dob");
        let payload = serde_json::to_vec(&value).unwrap();

        let record = project(&payload).unwrap();
        assert!(record.dob.is_none());
    }

    #[test]
    fn test_project_missing_required_key_is_error() {
        let mut value = sample_json();
        value.as_object_mut().unwrap().remove("email");
        let payload = serde_json::to_vec(&value).unwrap();

        let err = project(&payload).unwrap_err();
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn test_project_extra_keys_ignored() {
        let mut value = sample_json();
        value
            .as_object_mut()
            .unwrap()
            .insert("nat".to_string(), serde_json::json!("GB"));
        let payload = serde_json::to_vec(&value).unwrap();

        assert!(project(&payload).is_ok());
    }

    #[test]
    fn test_project_malformed_json_is_error() {
        assert!(project(b"not json at all").is_err());
    }

    #[test]
    fn test_project_invalid_uuid_is_error() {
        let mut value = sample_json();
        value
            .as_object_mut()
            .unwrap()
            .insert("id".to_string(), serde_json::json!("not-a-uuid"));
        let payload = serde_json::to_vec(&value).unwrap();

        assert!(project(&payload).is_err());
    }

    #[test]
    fn test_full_name() {
        let payload = serde_json::to_vec(&sample_json()).unwrap();
        let record = project(&payload).unwrap();
        assert_eq!(record.full_name(), "Ada Lovelace");
    }
}
