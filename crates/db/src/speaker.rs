use std::fmt;

use chrono::NaiveDateTime;
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::Serialize;

use crate::presentation::Presentation;
use crate::schema::{
    presentation_additional_speakers, presentations, speakers, users,
};

pub const DEFAULT_MARKUP_TYPE: &str = "markdown";

/// A speaker profile. Invited speakers exist before they have an account, in
/// which case `user_id` is empty and `invite_email` is where we reach them.
#[derive(Debug, Queryable, Selectable, Serialize, Clone, PartialEq, Eq)]
#[diesel(table_name = speakers)]
pub struct Speaker {
    pub id: i64,
    pub user_id: Option<i64>,
    /// As it should appear in the conference programme.
    pub name: String,
    /// Raw biography markup, see `biography_markup_type`.
    pub biography: String,
    pub biography_markup_type: String,
    pub photo: Option<String>,
    /// Staff-only notes.
    pub annotation: String,
    pub invite_email: Option<String>,
    pub invite_token: String,
    pub created_at: NaiveDateTime,
}

impl Speaker {
    /// The account email if the speaker has signed up, otherwise the address
    /// the invitation was sent to.
    pub fn email(
        &self,
        conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
    ) -> QueryResult<Option<String>> {
        let account_email = match self.user_id {
            Some(user_id) => users::table
                .filter(users::id.eq(user_id))
                .select(users::email)
                .first::<String>(conn)
                .optional()?,
            None => None,
        };

        Ok(self.email_given_account(account_email))
    }

    /// As [`Speaker::email`], when the account email is already at hand.
    pub fn email_given_account(
        &self,
        account_email: Option<String>,
    ) -> Option<String> {
        match self.user_id {
            Some(_) => account_email,
            None => self.invite_email.clone(),
        }
    }

    /// Presentations the speaker leads, followed by the ones they co-present.
    pub fn all_presentations(
        &self,
        conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
    ) -> QueryResult<Vec<Presentation>> {
        let mut all = presentations::table
            .filter(presentations::speaker_id.eq(self.id))
            .order_by(presentations::id.asc())
            .select(Presentation::as_select())
            .load(conn)?;

        let co_presented = presentation_additional_speakers::table
            .inner_join(presentations::table)
            .filter(presentation_additional_speakers::speaker_id.eq(self.id))
            .order_by(presentations::id.asc())
            .select(Presentation::as_select())
            .load(conn)?;
        all.extend(co_presented);

        Ok(all)
    }

    pub fn has_biography(&self) -> bool {
        !self.biography.is_empty()
    }

    /// Identifier used in the public exports, e.g. `S00007`.
    pub fn api_id(&self) -> String {
        format!("S{:05}", self.id)
    }

    /// Biography split into paragraphs on blank lines.
    pub fn biography_paragraphs(&self) -> impl Iterator<Item = &str> {
        self.biography
            .split("\n\n")
            .map(str::trim)
            .filter(|paragraph| !paragraph.is_empty())
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.user_id.is_some() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "?")
        }
    }
}
