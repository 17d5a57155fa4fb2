use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Write action for one entry of a batch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchAction {
    UpdateObject,
    DeleteObject,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOperation {
    pub action: BatchAction,
    pub body: Value,
}

impl BatchOperation {
    /// Full replace of the record stored under `object_id`.
    pub fn update(object_id: &str, mut body: Value) -> Self {
        if let Value::Object(map) = &mut body {
            map.insert("objectID".to_string(), Value::String(object_id.to_string()));
        }
        Self {
            action: BatchAction::UpdateObject,
            body,
        }
    }

    pub fn delete(object_id: &str) -> Self {
        Self {
            action: BatchAction::DeleteObject,
            body: serde_json::json!({ "objectID": object_id }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchRequest<'a> {
    pub requests: &'a [BatchOperation],
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchResponse {
    #[serde(rename = "taskID")]
    pub task_id: i64,
    #[serde(rename = "objectIDs", default)]
    pub object_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}
