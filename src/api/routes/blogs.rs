use axum::{
    extract::{rejection::JsonRejection, Query},
    http::StatusCode,
    Json,
};

use super::common::{invalid_body, list_collection, run_blocking};
use crate::api::response::{ApiResponse, ApiResult};
use crate::articles::{Article, NewArticle};
use crate::collection::CollectionKind;
use crate::config::Config;
use crate::db::Database;

/// GET /api/v1/blogs
/// Lists articles without their `content`
pub async fn list_blogs(Query(params): Query<Vec<(String, String)>>) -> ApiResult {
    list_collection(CollectionKind::Articles, params).await
}

/// POST /api/v1/blogs
pub async fn create_blog(payload: Result<Json<NewArticle>, JsonRejection>) -> ApiResult {
    let Json(new_article) = payload.map_err(invalid_body)?;

    let created = run_blocking(move || {
        let mut conn = Database::get_connection()?;
        Article::create(&mut conn, new_article)
    })
    .await;

    match created {
        Ok(document) => Ok(
            ApiResponse::created("Blog created successfully", "newBlog", document)
                .reply(StatusCode::CREATED),
        ),
        Err(e) => Err(ApiResponse::from_error(
            &e,
            "Error creating Blog",
            Config::get().server.expose_errors(),
        )),
    }
}
