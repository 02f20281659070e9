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
use crate::music::{Music, NewMusic};

/// GET /api/v1/music
/// Lists music without `lyrics`
pub async fn list_music(Query(params): Query<Vec<(String, String)>>) -> ApiResult {
    list_collection(CollectionKind::Music, params).await
}

/// POST /api/v1/music
pub async fn create_music(payload: Result<Json<NewMusic>, JsonRejection>) -> ApiResult {
    let Json(new_music) = payload.map_err(invalid_body)?;

    let created = run_blocking(move || {
        let conn = Database::get_connection()?;
        Music::create(&conn, new_music)
    })
    .await;

    match created {
        Ok(document) => Ok(
            ApiResponse::created("Music created successfully", "newMusic", document)
                .reply(StatusCode::CREATED),
        ),
        Err(e) => Err(ApiResponse::from_error(
            &e,
            "Error creating Music",
            Config::get().server.expose_errors(),
        )),
    }
}
