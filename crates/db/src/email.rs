use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// A record of an email the site sent (or tried to send).
#[derive(
    Debug, Queryable, Selectable, Serialize, Deserialize, Clone, PartialEq, Eq,
)]
#[diesel(table_name = crate::schema::emails)]
pub struct EmailRow {
    pub id: i64,
    pub message_id: String,
    pub recipients: String,
    pub subject: String,
    pub contents: Option<String>,
    pub created_at: NaiveDateTime,
}
