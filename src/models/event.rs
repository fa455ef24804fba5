use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub kind: String,
    pub speaker: String,
    pub date: String,
    pub days: i32,
    pub time_from: String,
    pub time_to: String,
    pub description: String,
    pub link: String,
    pub image_path: String,
    pub created_at: DateTime<Utc>,
}

/// Wire shape consumed by the site frontend.
#[derive(Debug, Serialize)]
pub struct EventView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub info: EventInfo,
    pub description: String,
    pub link: String,
    #[serde(rename = "imagePath")]
    pub image_path: String,
}

#[derive(Debug, Serialize)]
pub struct EventInfo {
    pub speaker: String,
    pub date: String,
    pub days: i32,
    pub timing: EventTiming,
}

#[derive(Debug, Serialize)]
pub struct EventTiming {
    pub from: String,
    pub to: String,
}

impl From<Event> for EventView {
    fn from(e: Event) -> Self {
        Self {
            id: e.id,
            title: e.title,
            kind: e.kind,
            info: EventInfo {
                speaker: e.speaker,
                date: e.date,
                days: e.days,
                timing: EventTiming {
                    from: e.time_from,
                    to: e.time_to,
                },
            },
            description: e.description,
            link: e.link,
            image_path: e.image_path,
        }
    }
}
