use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A label attached to tasks. `color` is free-form (usually a hex string)
/// and is not checked beyond its length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[validate(length(min = 1, max = 50, message = "name is required and must be at most 50 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "color is required and must be at most 20 characters"))]
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(name: &str, color: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.trim().to_string(),
            color: color.trim().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
