use sqlx::PgPool;

use crate::models::Event;

pub struct NewEvent<'a> {
    pub title: &'a str,
    pub kind: &'a str,
    pub speaker: &'a str,
    pub date: &'a str,
    pub days: i32,
    pub time_from: &'a str,
    pub time_to: &'a str,
    pub description: &'a str,
    pub link: &'a str,
    pub image_path: &'a str,
}

pub async fn list(pool: &PgPool) -> Result<Vec<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn create(pool: &PgPool, event: &NewEvent<'_>) -> Result<Event, sqlx::Error> {
    sqlx::query_as::<_, Event>(
        "INSERT INTO events
            (title, kind, speaker, date, days, time_from, time_to, description, link, image_path)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
    )
    .bind(event.title)
    .bind(event.kind)
    .bind(event.speaker)
    .bind(event.date)
    .bind(event.days)
    .bind(event.time_from)
    .bind(event.time_to)
    .bind(event.description)
    .bind(event.link)
    .bind(event.image_path)
    .fetch_one(pool)
    .await
}
