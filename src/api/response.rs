use axum::{http::StatusCode, Json};
use log::{error, warn};
use serde::Serialize;
use serde_json::{Map, Value};
use strum::{AsRefStr, Display};

use crate::collection::{CollectionKind, Document};
use crate::error::SomanaError;

#[derive(AsRefStr, Display, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StatusText {
    Success,
    Fail,
    Error,
}

/// The envelope every endpoint answers with
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_text: StatusText,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub type ApiReply = (StatusCode, Json<ApiResponse>);
pub type ApiResult = Result<ApiReply, ApiReply>;

impl ApiResponse {
    fn with_data(message: String, key: &str, value: Value) -> Self {
        let mut data = Map::new();
        data.insert(key.to_owned(), value);
        ApiResponse {
            status_text: StatusText::Success,
            message,
            results: None,
            data: Some(Value::Object(data)),
            error: None,
        }
    }

    /// Success envelope for a list request
    pub fn list(kind: CollectionKind, documents: Vec<Document>) -> Self {
        let results = documents.len();
        let documents = documents.into_iter().map(Value::Object).collect();
        let mut response = Self::with_data(
            format!("{} fetched successfully", kind.display_name()),
            kind.data_key(),
            Value::Array(documents),
        );
        response.results = Some(results);
        response
    }

    /// Success envelope for a create request
    pub fn created(message: &str, key: &str, document: Document) -> Self {
        Self::with_data(message.to_owned(), key, Value::Object(document))
    }

    pub fn single(message: &str, key: &str, value: Value) -> Self {
        Self::with_data(message.to_owned(), key, value)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        ApiResponse {
            status_text: StatusText::Fail,
            message: message.into(),
            results: None,
            data: None,
            error: None,
        }
    }

    pub fn reply(self, status: StatusCode) -> ApiReply {
        (status, Json(self))
    }

    /// Maps an error to its envelope. Client errors carry their own message;
    /// anything else gets `generic_message`, plus the error text when
    /// `expose_errors` is set.
    pub fn from_error(err: &SomanaError, generic_message: &str, expose_errors: bool) -> ApiReply {
        if err.is_client_error() {
            let status = match err {
                SomanaError::Conflict(_) => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            };
            warn!("Rejected request: {err}");
            return Self::fail(err.to_string()).reply(status);
        }

        error!("{generic_message}: {err}");
        ApiResponse {
            status_text: StatusText::Error,
            message: generic_message.to_owned(),
            results: None,
            data: None,
            error: expose_errors.then(|| err.to_string()),
        }
        .reply(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
