use sqlx::PgPool;
use uuid::Uuid;

use crate::models::News;

pub async fn list(pool: &PgPool) -> Result<Vec<News>, sqlx::Error> {
    sqlx::query_as::<_, News>("SELECT * FROM news ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<News>, sqlx::Error> {
    sqlx::query_as::<_, News>("SELECT * FROM news WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    title: &str,
    content: &str,
    file_path: &str,
    web_link: &str,
    source: &str,
    date: &str,
) -> Result<News, sqlx::Error> {
    sqlx::query_as::<_, News>(
        "INSERT INTO news (title, content, file_path, web_link, source, date)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(title)
    .bind(content)
    .bind(file_path)
    .bind(web_link)
    .bind(source)
    .bind(date)
    .fetch_one(pool)
    .await
}
