//! Site-wide key/value options, used mostly as feature flags.

use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};

use crate::schema::config;

/// Turns the attendee area (profile, sign-in, password restore) on.
pub const ATTENDEES_ZONE_ACTIVATED: &str = "attendees_zone_activated";
/// Makes the published schedule visible to everyone, not only superusers.
pub const SCHEDULE_OPENED: &str = "schedule_opened";

#[derive(
    Debug, Queryable, Selectable, Serialize, Deserialize, Clone, PartialEq, Eq,
)]
#[diesel(table_name = config)]
pub struct ConfigItem {
    pub id: i64,
    pub public_id: String,
    pub key: String,
    pub value: String,
}

/// Returns the stored value for `key`, or `default` when no such option has
/// been set.
pub fn get_value(
    key: &str,
    default: &str,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> QueryResult<String> {
    let value = config::table
        .filter(config::key.eq(key))
        .select(config::value)
        .first::<String>(conn)
        .optional()?;

    Ok(value.unwrap_or_else(|| default.to_string()))
}

/// Whether the option `key` is switched on. Missing options are off.
#[tracing::instrument(skip(conn))]
pub fn is_enabled(
    key: &str,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> QueryResult<bool> {
    Ok(value_is_truthy(&get_value(key, "0", conn)?))
}

/// Interprets an option value as a boolean flag: non-zero integers and the
/// usual English spellings of "true" are on, everything else is off.
pub fn value_is_truthy(value: &str) -> bool {
    let value = value.trim();
    match value.parse::<i64>() {
        Ok(n) => n != 0,
        Err(_) => matches!(
            value.to_ascii_lowercase().as_str(),
            "true" | "yes" | "on"
        ),
    }
}
