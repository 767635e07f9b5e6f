//! Recognition service abstraction and its response payload.
//!
//! Defines the [`RecognitionService`] trait plus the typed shape of the
//! service's JSON answer. Field names match the wire format exactly.

pub mod http;

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::error::SubmitError;
use crate::form::UploadFile;

/// Message used when the service says `status: false` without explaining why.
const DEFAULT_REJECTION: &str = "Failed to extract results from the image.";

/// Top-level response of the recognition endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrResponse {
    pub status: bool,
    #[serde(default)]
    pub data: Option<OcrData>,
    /// Present on `status: false` responses.
    #[serde(default)]
    pub error: Option<String>,
}

impl OcrResponse {
    /// Parse and validate a raw response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, SubmitError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// The extracted data, or a rejection when the service reported failure.
    pub fn into_data(self) -> Result<OcrData, SubmitError> {
        match (self.status, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(SubmitError::Rejected {
                message: self
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| DEFAULT_REJECTION.to_string()),
            }),
        }
    }
}

/// Extracted sections. Each one is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OcrData {
    #[serde(default)]
    pub output_image_url: Option<String>,
    #[serde(default)]
    pub election_type: Option<String>,
    #[serde(default)]
    pub pu_reg_info_results: Option<SectionMap>,
    #[serde(default)]
    pub political_parties_vote_results: Option<SectionMap>,
    #[serde(default)]
    pub pu_data_results: Option<SectionMap>,
}

/// A scalar extracted for one field of a section.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
    Null,
}

impl FieldValue {
    /// Display text, or `None` when the value is empty, zero, false or null.
    pub fn display(&self) -> Option<String> {
        match self {
            Self::Text(s) if !s.is_empty() => Some(s.clone()),
            Self::Number(n) if !is_zero(n) => Some(n.to_string()),
            Self::Bool(true) => Some("true".to_string()),
            _ => None,
        }
    }
}

fn is_zero(n: &serde_json::Number) -> bool {
    n.as_f64().map(|f| f == 0.0 || f.is_nan()).unwrap_or(false)
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(Self::Text(s)),
            serde_json::Value::Number(n) => Ok(Self::Number(n)),
            serde_json::Value::Bool(b) => Ok(Self::Bool(b)),
            serde_json::Value::Null => Ok(Self::Null),
            other => Err(de::Error::custom(format!(
                "expected a scalar section value, found {}",
                other
            ))),
        }
    }
}

/// Field name to value mapping, kept in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionMap(Vec<(String, FieldValue)>);

impl SectionMap {
    #[cfg(test)]
    pub fn new(entries: Vec<(String, FieldValue)>) -> Self {
        Self(entries)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'de> Deserialize<'de> for SectionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SectionMapVisitor;

        impl<'de> Visitor<'de> for SectionMapVisitor {
            type Value = SectionMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of field names to scalar values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SectionMap, A::Error> {
                let mut entries: Vec<(String, FieldValue)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));

                // A repeated key keeps its first position and takes the last value
                while let Some((key, value)) = access.next_entry::<String, FieldValue>()? {
                    match entries.iter_mut().find(|(k, _)| *k == key) {
                        Some(entry) => entry.1 = value,
                        None => entries.push((key, value)),
                    }
                }

                Ok(SectionMap(entries))
            }
        }

        deserializer.deserialize_map(SectionMapVisitor)
    }
}

/// Async trait implemented by each way of reaching the recognition service.
#[async_trait::async_trait]
pub trait RecognitionService: Send + Sync {
    fn name(&self) -> &str;
    async fn recognize(&self, file: &UploadFile) -> Result<OcrResponse, SubmitError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_map_keeps_document_order() {
        let json = r#"{"status": true, "data": {"political_parties_vote_results": {"PDP": "12", "APC": "40", "LP": "7"}}}"#;
        let resp = OcrResponse::from_slice(json.as_bytes()).unwrap();
        let parties = resp.data.unwrap().political_parties_vote_results.unwrap();
        let keys: Vec<&str> = parties.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["PDP", "APC", "LP"]);
    }

    #[test]
    fn test_duplicate_key_keeps_position_takes_last_value() {
        let map: SectionMap = serde_json::from_str(r#"{"A": "1", "B": "2", "A": "3"}"#).unwrap();
        let entries: Vec<(&str, &FieldValue)> = map.iter().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], ("A", &FieldValue::Text("3".to_string())));
    }

    #[test]
    fn test_nested_values_are_rejected() {
        let json = r#"{"status": true, "data": {"pu_data_results": {"x": {"nested": 1}}}}"#;
        let err = OcrResponse::from_slice(json.as_bytes()).unwrap_err();
        assert!(matches!(err, SubmitError::InvalidPayload(_)));
    }

    #[test]
    fn test_missing_status_is_invalid() {
        let err = OcrResponse::from_slice(br#"{"data": {}}"#).unwrap_err();
        assert!(matches!(err, SubmitError::InvalidPayload(_)));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let json = r#"{"status": true, "data": {"output_image_url": "u", "raw_ocr_results": {"texts": ["a"]}}}"#;
        let data = OcrResponse::from_slice(json.as_bytes()).unwrap().into_data().unwrap();
        assert_eq!(data.output_image_url.as_deref(), Some("u"));
        assert!(data.election_type.is_none());
    }

    #[test]
    fn test_status_false_is_rejection() {
        let resp = OcrResponse::from_slice(br#"{"status": false, "error": "An error occurred: boom"}"#).unwrap();
        match resp.into_data() {
            Err(SubmitError::Rejected { message }) => assert_eq!(message, "An error occurred: boom"),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_status_true_without_data_is_rejection() {
        let resp = OcrResponse::from_slice(br#"{"status": true}"#).unwrap();
        assert!(matches!(resp.into_data(), Err(SubmitError::Rejected { .. })));
    }

    #[test]
    fn test_field_value_display_treats_falsy_as_missing() {
        assert_eq!(FieldValue::Text("500".into()).display().as_deref(), Some("500"));
        assert_eq!(FieldValue::Text(String::new()).display(), None);
        assert_eq!(FieldValue::Number(120.into()).display().as_deref(), Some("120"));
        assert_eq!(FieldValue::Number(0.into()).display(), None);
        assert_eq!(FieldValue::Bool(false).display(), None);
        assert_eq!(FieldValue::Null.display(), None);
    }
}
