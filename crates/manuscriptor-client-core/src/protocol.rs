//! Wire format shared with the manuscriptor service.
//!
//! Frames are JSON objects whose `payload` is itself a JSON document carried
//! as a string. The envelope and the payload are encoded and decoded in two
//! separate steps; collapsing them would break compatibility with the
//! service, which treats `payload` as opaque text.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Request types understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    FetchScript,
    FetchBatch,
    BlockSents,
    GetStats,
    ListBatches,
    ListScripts,
    ListFilters,
}

impl RequestKind {
    pub const ALL: [RequestKind; 7] = [
        Self::FetchScript,
        Self::FetchBatch,
        Self::BlockSents,
        Self::GetStats,
        Self::ListBatches,
        Self::ListScripts,
        Self::ListFilters,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FetchScript => "fetch_script",
            Self::FetchBatch => "fetch_batch",
            Self::BlockSents => "block_sents",
            Self::GetStats => "get_stats",
            Self::ListBatches => "list_batches",
            Self::ListScripts => "list_scripts",
            Self::ListFilters => "list_filters",
        }
    }
}

/// Response types the shell recognizes. Anything else is reported as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    DbStats,
    Filters,
    Batches,
    Scripts,
    FetchedScript,
    FetchedBatch,
    BlockedSents,
    ServerError,
    KeepAlive,
}

impl ResponseKind {
    pub const ALL: [ResponseKind; 9] = [
        Self::DbStats,
        Self::Filters,
        Self::Batches,
        Self::Scripts,
        Self::FetchedScript,
        Self::FetchedBatch,
        Self::BlockedSents,
        Self::ServerError,
        Self::KeepAlive,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DbStats => "db_stats",
            Self::Filters => "filters",
            Self::Batches => "batches",
            Self::Scripts => "scripts",
            Self::FetchedScript => "fetched_script",
            Self::FetchedBatch => "fetched_batch",
            Self::BlockedSents => "blocked_sents",
            Self::ServerError => "server_error",
            Self::KeepAlive => "keep_alive",
        }
    }

    #[must_use]
    pub fn from_wire(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub client_id: String,
    pub message_type: RequestKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl RequestEnvelope {
    pub fn to_wire(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Inbound frame. The service echoes `client_id` and always writes `payload`
/// and `error`, empty when unused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub message_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    pub fn from_wire(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    #[must_use]
    pub fn kind(&self) -> Option<ResponseKind> {
        ResponseKind::from_wire(&self.message_type)
    }

    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref().filter(|payload| !payload.is_empty())
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref().filter(|error| !error.is_empty())
    }
}

pub fn encode_payload<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

pub fn decode_payload<T: DeserializeOwned>(raw: &str) -> Result<T> {
    Ok(serde_json::from_str(raw)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchTarget {
    Batch,
    Script,
}

/// Paginated fetch of one named batch or script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub target: FetchTarget,
    pub page_size: u32,
    pub page_number: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScriptOptions {
    #[serde(default)]
    pub script_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScriptSummary {
    #[serde(default)]
    pub options: ScriptOptions,
    #[serde(default)]
    pub output_size: i64,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BatchSummary {
    #[serde(default)]
    pub batch_name: String,
    #[serde(default)]
    pub output_size: i64,
    #[serde(default)]
    pub timestamp: String,
}

/// Filter entry as listed by the service. Older services send bare names,
/// current ones send `{name, desc, args, example}` objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDescriptor(pub String);

impl FilterDescriptor {
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(name) => Self(name.clone()),
            Value::Object(fields) => match fields.get("name").and_then(Value::as_str) {
                Some(name) => Self(name.to_string()),
                None => Self(value.to_string()),
            },
            other => Self(other.to_string()),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.0
    }
}

pub type StatsMap = Map<String, Value>;

/// Decoded list entry plus the compact JSON of the whole item, which backs
/// the detail row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem<T> {
    pub summary: T,
    pub raw: String,
}

/// A JSON array of items; `null` (an empty listing on the service side)
/// decodes as no items.
fn decode_array(payload: &str) -> Result<Vec<Value>> {
    let values: Option<Vec<Value>> = decode_payload(payload)?;
    Ok(values.unwrap_or_default())
}

pub fn decode_items<T: DeserializeOwned>(payload: &str) -> Result<Vec<ListItem<T>>> {
    decode_array(payload)?
        .into_iter()
        .map(|value| -> Result<ListItem<T>> {
            let raw = value.to_string();
            let summary = serde_json::from_value(value)?;
            Ok(ListItem { summary, raw })
        })
        .collect()
}

pub fn decode_filters(payload: &str) -> Result<Vec<FilterDescriptor>> {
    Ok(decode_array(payload)?
        .iter()
        .map(FilterDescriptor::from_value)
        .collect())
}

pub fn decode_stats(payload: &str) -> Result<StatsMap> {
    decode_payload(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_envelope_omits_absent_payload() {
        let envelope = RequestEnvelope {
            client_id: "abc".to_string(),
            message_type: RequestKind::GetStats,
            payload: None,
        };
        let raw = envelope.to_wire().expect("encode");
        assert_eq!(raw, r#"{"client_id":"abc","message_type":"get_stats"}"#);
    }

    #[test]
    fn request_kind_serde_matches_wire_names() {
        for kind in RequestKind::ALL {
            let encoded = serde_json::to_value(kind).expect("encode kind");
            assert_eq!(encoded, json!(kind.as_str()));
        }
    }

    #[test]
    fn response_kind_round_trips_every_recognized_name() {
        for kind in ResponseKind::ALL {
            assert_eq!(ResponseKind::from_wire(kind.as_str()), Some(kind));
        }
        assert_eq!(ResponseKind::from_wire("bogus"), None);
        assert_eq!(ResponseKind::from_wire("DB_STATS"), None);
    }

    #[test]
    fn response_envelope_treats_empty_strings_as_absent() {
        let envelope = ResponseEnvelope::from_wire(
            r#"{"client_id":"abc","message_type":"keep_alive","payload":"","error":""}"#,
        )
        .expect("decode");
        assert_eq!(envelope.kind(), Some(ResponseKind::KeepAlive));
        assert_eq!(envelope.payload(), None);
        assert_eq!(envelope.error(), None);
        assert_eq!(envelope.client_id.as_deref(), Some("abc"));
    }

    #[test]
    fn fetch_request_uses_type_key() {
        let request = FetchRequest {
            name: "b1".to_string(),
            target: FetchTarget::Batch,
            page_size: 5,
            page_number: 2,
        };
        let value = serde_json::to_value(&request).expect("encode");
        assert_eq!(
            value,
            json!({"name": "b1", "type": "batch", "page_size": 5, "page_number": 2})
        );
    }

    #[test]
    fn decode_items_keeps_raw_item_text() {
        let payload = json!([{
            "options": {"script_name": "s1", "mode": "rand"},
            "output_size": 10,
            "timestamp": "t1",
            "input_size": 99
        }])
        .to_string();
        let items: Vec<ListItem<ScriptSummary>> = decode_items(&payload).expect("decode");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].summary.options.script_name, "s1");
        assert_eq!(items[0].summary.output_size, 10);
        let raw: Value = serde_json::from_str(&items[0].raw).expect("raw is json");
        assert_eq!(raw["input_size"], json!(99));
        assert_eq!(raw["options"]["mode"], json!("rand"));
    }

    #[test]
    fn batch_summary_defaults_missing_fields() {
        let items: Vec<ListItem<BatchSummary>> =
            decode_items(r#"[{"batch_name":"b"}]"#).expect("decode");
        assert_eq!(items[0].summary.output_size, 0);
        assert_eq!(items[0].summary.timestamp, "");
    }

    #[test]
    fn filter_descriptor_accepts_names_and_feature_objects() {
        let filters = decode_filters(
            &json!(["word_count", {"name": "comma_count", "desc": "Number of commas"}, 3])
                .to_string(),
        )
        .expect("decode");
        let labels: Vec<&str> = filters.iter().map(FilterDescriptor::label).collect();
        assert_eq!(labels, vec!["word_count", "comma_count", "3"]);
    }

    #[test]
    fn null_listing_decodes_as_empty() {
        let items: Vec<ListItem<BatchSummary>> = decode_items("null").expect("decode");
        assert!(items.is_empty());
        assert!(decode_filters("null").expect("decode").is_empty());
    }

    #[test]
    fn decode_stats_rejects_non_object_payload() {
        assert!(decode_stats("[1,2]").is_err());
        let stats = decode_stats(r#"{"chunks":12,"batches":{"b1":3}}"#).expect("decode");
        assert_eq!(stats.len(), 2);
    }
}
