use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::datetime;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub event_id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(rename = "datetime", with = "datetime")]
    pub date_time: NaiveDateTime,
    pub location: String,
    pub host: String,
}

impl Event {
    /// Builds a record with a freshly generated identifier.
    pub fn create(input: EventInput) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), input)
    }

    pub fn with_id(event_id: String, input: EventInput) -> Self {
        Self {
            event_id,
            event_type: input.event_type,
            date_time: input.date_time,
            location: input.location,
            host: input.host.to_string(),
        }
    }

    pub fn is_progressing_at(&self, now: NaiveDateTime) -> bool {
        self.date_time >= now
    }
}

/// Body of `POST /api/events` and `PUT /api/events/:event_id`.
///
/// `host` may be any JSON value; it is kept as its serialized JSON text.
#[derive(Debug, Clone, Deserialize)]
pub struct EventInput {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(rename = "datetime", with = "datetime")]
    pub date_time: NaiveDateTime,
    pub location: String,
    pub host: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeline {
    /// Scheduled at or after the reference instant.
    Progressing,
    /// Scheduled strictly before the reference instant.
    Done,
}

impl Timeline {
    pub fn admits(self, event: &Event, now: NaiveDateTime) -> bool {
        match self {
            Timeline::Progressing => event.is_progressing_at(now),
            Timeline::Done => !event.is_progressing_at(now),
        }
    }
}
