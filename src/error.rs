//! Error type shared by the browser shell and the persistence layer.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum QuestError {
    #[error("no window")]
    NoWindow,
    #[error("no document")]
    NoDocument,
    #[error("missing element `{0}`")]
    MissingElement(&'static str),
    #[error("microphone unavailable: {0}")]
    Microphone(String),
    #[error("audio graph: {0}")]
    Audio(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error("serialization: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("js exception: {0}")]
    Js(String),
}

impl QuestError {
    /// Wrap a thrown JS value, keeping whatever string form it offers.
    pub fn from_js(value: JsValue) -> Self {
        QuestError::Js(describe_js(&value))
    }
}

pub(crate) fn describe_js(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

impl From<QuestError> for JsValue {
    fn from(err: QuestError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type QuestResult<T> = Result<T, QuestError>;
