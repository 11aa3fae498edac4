use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::Serialize;

use crate::schema::{presentation_additional_speakers, presentations, speakers};
use crate::speaker::Speaker;

/// An accepted talk or workshop, as it will be delivered.
#[derive(Debug, Queryable, Selectable, Serialize, Clone, PartialEq, Eq)]
#[diesel(table_name = presentations)]
pub struct Presentation {
    pub id: i64,
    pub proposal_id: Option<i64>,
    pub speaker_id: i64,
    pub title: String,
    pub description: String,
    pub summary: String,
}

impl Presentation {
    /// The main speaker followed by any co-presenters, in the order they
    /// were added.
    pub fn speakers(
        &self,
        conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
    ) -> QueryResult<Vec<Speaker>> {
        let mut all = speakers::table
            .filter(speakers::id.eq(self.speaker_id))
            .select(Speaker::as_select())
            .load(conn)?;

        let co_presenters = presentation_additional_speakers::table
            .inner_join(speakers::table)
            .filter(
                presentation_additional_speakers::presentation_id.eq(self.id),
            )
            .filter(speakers::id.ne(self.speaker_id))
            .order_by(presentation_additional_speakers::id.asc())
            .select(Speaker::as_select())
            .load(conn)?;
        all.extend(co_presenters);

        Ok(all)
    }
}
