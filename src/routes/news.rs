use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use uuid::Uuid;

use crate::auth::session::Session;
use crate::db;
use crate::error::AppError;
use crate::models::news::NewsView;
use crate::routes::InsertResponse;
use crate::state::SharedState;
use crate::uploads;

pub async fn list(State(state): State<SharedState>) -> Result<Json<Vec<NewsView>>, AppError> {
    let news = db::news::list(&state.pool).await?;
    Ok(Json(news.into_iter().map(NewsView::from).collect()))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<NewsView>, AppError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::NotFound("News item not found".to_string()))?;
    let news = db::news::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("News item not found".to_string()))?;
    Ok(Json(news.into()))
}

pub async fn create(
    State(state): State<SharedState>,
    session: Session,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<InsertResponse>, AppError> {
    let mut form = uploads::parse_multipart(&headers, body)
        .await
        .map_err(AppError::BadRequest)?;

    let file = form
        .take_file("newFile")
        .ok_or_else(|| AppError::BadRequest("Uploaded file not found".to_string()))?;

    let title = form.text("title");
    if title.is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    let date = uploads::display_date(form.text("date")).map_err(AppError::BadRequest)?;

    let file_path = uploads::store(&state.config.upload_dir, "news", &file)
        .await
        .map_err(AppError::Internal)?;

    let created = db::news::create(
        &state.pool,
        title,
        form.text("content"),
        &file_path,
        form.text("link"),
        form.text("source"),
        &date,
    )
    .await;
    let news = match created {
        Ok(news) => news,
        Err(e) => {
            uploads::discard(&state.config.upload_dir, &file_path).await;
            return Err(e.into());
        }
    };

    tracing::info!(news_id = %news.id, account_id = %session.account_id, "News created");

    Ok(Json(InsertResponse {
        inserted: true,
        msg: "Added new news successfully".to_string(),
    }))
}
