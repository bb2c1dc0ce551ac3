use serde::{Deserialize, Serialize};

/// One `(member_id, event_id)` authority pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Manage {
    pub member_id: String,
    pub event_id: String,
}

impl Manage {
    pub fn new(member_id: impl Into<String>, event_id: impl Into<String>) -> Self {
        Self {
            member_id: member_id.into(),
            event_id: event_id.into(),
        }
    }
}

/// Body of `POST /api/events/auth/:event_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct GrantRequest {
    pub uid: String,
}
