use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct News {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub file_path: String,
    pub web_link: String,
    pub source: String,
    pub date: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct NewsView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub links: NewsLinks,
    pub source: String,
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct NewsLinks {
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "webLink")]
    pub web_link: String,
}

impl From<News> for NewsView {
    fn from(n: News) -> Self {
        Self {
            id: n.id,
            title: n.title,
            content: n.content,
            links: NewsLinks {
                file_path: n.file_path,
                web_link: n.web_link,
            },
            source: n.source,
            date: n.date,
        }
    }
}
