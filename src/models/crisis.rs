use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CRISIS_LANGUAGE_DETECTED: &str = "crisis_language_detected";

/// Append-only audit record written once per crisis turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrisisFlag {
    id: String,
    conversation_id: String,
    flag_type: String,
    metadata: Value,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl CrisisFlag {
    pub fn new(conversation_id: impl Into<String>, flag_type: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.into(),
            flag_type: flag_type.into(),
            metadata: Value::Null,
            created_at: chrono::Utc::now(),
        }
    }

    /// Flag for a pattern match, tagging the matched intent when known.
    pub fn pattern_match(conversation_id: impl Into<String>, intent: Option<&str>) -> Self {
        let mut metadata = serde_json::json!({ "trigger": "pattern_match" });
        if let Some(intent) = intent {
            metadata["intent"] = Value::String(intent.to_string());
        }
        Self::new(conversation_id, CRISIS_LANGUAGE_DETECTED).with_metadata(metadata)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_created_at(mut self, created_at: chrono::DateTime<chrono::Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn flag_type(&self) -> &str {
        &self.flag_type
    }

    pub fn metadata(&self) -> &Value {
        &self.metadata
    }

    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }
}
