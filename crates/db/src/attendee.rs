use chrono::NaiveDateTime;
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::Serialize;

use crate::{
    schema::{attendees, users},
    user::User,
};

/// A ticket holder. Each attendee owns exactly one user account, and signs
/// in with the tracker of their purchase.
#[derive(Debug, Queryable, Selectable, Serialize, Clone)]
#[diesel(table_name = attendees)]
pub struct Attendee {
    pub id: i64,
    pub user_id: i64,
    pub tracker: String,
    pub restore_code: Option<String>,
    pub name: String,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Attendee {
    pub fn of_user(
        user_id: i64,
        conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
    ) -> QueryResult<Option<Attendee>> {
        attendees::table
            .filter(attendees::user_id.eq(user_id))
            .select(Attendee::as_select())
            .first(conn)
            .optional()
    }

    /// Looks up the attendee holding an outstanding restore code, together
    /// with their account.
    pub fn with_restore_code(
        code: &str,
        conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
    ) -> QueryResult<Option<(Attendee, User)>> {
        attendees::table
            .inner_join(users::table)
            .filter(attendees::restore_code.eq(code))
            .select((Attendee::as_select(), User::as_select()))
            .first(conn)
            .optional()
    }

    pub fn with_tracker(
        tracker: &str,
        conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
    ) -> QueryResult<Option<(Attendee, User)>> {
        attendees::table
            .inner_join(users::table)
            .filter(attendees::tracker.eq(tracker))
            .select((Attendee::as_select(), User::as_select()))
            .first(conn)
            .optional()
    }
}
