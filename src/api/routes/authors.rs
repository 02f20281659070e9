use axum::{extract::Path, http::StatusCode};

use super::common::run_blocking;
use crate::api::response::{ApiResponse, ApiResult};
use crate::config::Config;
use crate::db::Database;
use crate::error::SomanaError;
use crate::stats::AuthorStats;

/// GET /api/v1/authors/{author}/stats
pub async fn get_author_stats(Path(author): Path<String>) -> ApiResult {
    let stats = run_blocking(move || {
        let conn = Database::get_connection()?;
        AuthorStats::for_author(&conn, &author)
    })
    .await
    .and_then(|stats| serde_json::to_value(stats).map_err(SomanaError::from));

    match stats {
        Ok(value) => Ok(ApiResponse::single("Stats fetched successfully", "stats", value)
            .reply(StatusCode::OK)),
        Err(e) => Err(ApiResponse::from_error(
            &e,
            "Error getting stats",
            Config::get().server.expose_errors(),
        )),
    }
}
