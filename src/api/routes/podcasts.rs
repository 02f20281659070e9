use axum::{
    extract::{rejection::JsonRejection, Query},
    http::StatusCode,
    Json,
};

use super::common::{invalid_body, list_collection, run_blocking};
use crate::api::response::{ApiResponse, ApiResult};
use crate::collection::CollectionKind;
use crate::config::Config;
use crate::db::Database;
use crate::podcasts::{NewPodcast, Podcast};

/// GET /api/v1/podcasts
pub async fn list_podcasts(Query(params): Query<Vec<(String, String)>>) -> ApiResult {
    list_collection(CollectionKind::Podcasts, params).await
}

/// POST /api/v1/podcasts
pub async fn create_podcast(payload: Result<Json<NewPodcast>, JsonRejection>) -> ApiResult {
    let Json(new_podcast) = payload.map_err(invalid_body)?;

    let created = run_blocking(move || {
        let conn = Database::get_connection()?;
        Podcast::create(&conn, new_podcast)
    })
    .await;

    match created {
        Ok(document) => Ok(
            ApiResponse::created("Podcast created successfully", "newPodcast", document)
                .reply(StatusCode::CREATED),
        ),
        Err(e) => Err(ApiResponse::from_error(
            &e,
            "Error creating Podcast",
            Config::get().server.expose_errors(),
        )),
    }
}
