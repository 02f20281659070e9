use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use log::warn;

use crate::api::response::{ApiReply, ApiResponse, ApiResult};
use crate::collection::{list_documents, CollectionKind};
use crate::config::Config;
use crate::db::Database;
use crate::error::SomanaError;
use crate::query::ListQuery;

/// Runs store work on the blocking pool and waits for it
pub async fn run_blocking<T, F>(work: F) -> Result<T, SomanaError>
where
    F: FnOnce() -> Result<T, SomanaError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| SomanaError::Error(format!("Blocking task failed: {e}")))?
}

/// Shared body of the list endpoints
pub async fn list_collection(kind: CollectionKind, params: Vec<(String, String)>) -> ApiResult {
    let list_query = ListQuery::from_pairs(params);
    let options = Config::get().query;

    let listed = run_blocking(move || {
        let conn = Database::get_connection()?;
        list_documents(&conn, kind, &list_query, &options)
    })
    .await;

    match listed {
        Ok(documents) => Ok(ApiResponse::list(kind, documents).reply(StatusCode::OK)),
        Err(e) => Err(ApiResponse::from_error(
            &e,
            &format!("Error getting {}", kind.data_key()),
            Config::get().server.expose_errors(),
        )),
    }
}

pub fn invalid_body(rejection: JsonRejection) -> ApiReply {
    warn!("Rejected request body: {rejection}");
    ApiResponse::fail("Invalid JSON in request body").reply(StatusCode::BAD_REQUEST)
}
