use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::auth::session::Session;
use crate::db;
use crate::db::events::NewEvent;
use crate::error::AppError;
use crate::models::event::EventView;
use crate::routes::InsertResponse;
use crate::state::SharedState;
use crate::uploads;

pub async fn list(State(state): State<SharedState>) -> Result<Json<Vec<EventView>>, AppError> {
    let events = db::events::list(&state.pool).await?;
    Ok(Json(events.into_iter().map(EventView::from).collect()))
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
        .take_file("file")
        .ok_or_else(|| AppError::BadRequest("Uploaded file not found".to_string()))?;

    let title = form.text("title");
    if title.is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }

    let date = uploads::display_date(form.text("date")).map_err(AppError::BadRequest)?;
    let days: i32 = match form.text("days") {
        "" => 1,
        raw => raw
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid days '{raw}'")))?,
    };

    let image_path = uploads::store(&state.config.upload_dir, "events", &file)
        .await
        .map_err(AppError::Internal)?;

    let created = db::events::create(
        &state.pool,
        &NewEvent {
            title,
            kind: form.text("type"),
            speaker: form.text("speaker"),
            date: &date,
            days,
            time_from: form.text("timeFrom"),
            time_to: form.text("timeTo"),
            description: form.text("description"),
            link: form.text("link"),
            image_path: &image_path,
        },
    )
    .await;
    let event = match created {
        Ok(event) => event,
        Err(e) => {
            uploads::discard(&state.config.upload_dir, &image_path).await;
            return Err(e.into());
        }
    };

    tracing::info!(event_id = %event.id, account_id = %session.account_id, "Event created");

    Ok(Json(InsertResponse {
        inserted: true,
        msg: "Added new event successfully".to_string(),
    }))
}
