use chrono::{NaiveDate, NaiveTime};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use rocket::http::RawStr;
use serde::Serialize;

use crate::schema::{days, schedules, slots, tracks};

#[derive(Debug, Queryable, Selectable, Serialize, Clone, PartialEq, Eq)]
#[diesel(table_name = schedules)]
pub struct Schedule {
    pub id: i64,
    pub name: String,
    pub published: bool,
    pub hidden: bool,
}

impl Schedule {
    /// The schedule shown to the public: published and not hidden. If
    /// several qualify, the oldest wins.
    pub fn public(
        conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
    ) -> QueryResult<Option<Schedule>> {
        schedules::table
            .filter(schedules::published.eq(true))
            .filter(schedules::hidden.eq(false))
            .order_by(schedules::id.asc())
            .select(Schedule::as_select())
            .first(conn)
            .optional()
    }

    pub fn days(
        &self,
        conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
    ) -> QueryResult<Vec<Day>> {
        days::table
            .filter(days::schedule_id.eq(self.id))
            .order_by(days::date.asc())
            .select(Day::as_select())
            .load(conn)
    }
}

#[derive(Debug, Queryable, Selectable, Serialize, Clone, PartialEq, Eq)]
#[diesel(table_name = days)]
pub struct Day {
    pub id: i64,
    pub schedule_id: i64,
    pub date: NaiveDate,
}

impl Day {
    pub fn tracks(
        &self,
        conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
    ) -> QueryResult<Vec<Track>> {
        tracks::table
            .filter(tracks::day_id.eq(self.id))
            .order_by((tracks::position.asc(), tracks::id.asc()))
            .select(Track::as_select())
            .load(conn)
    }

    pub fn slots(
        &self,
        conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
    ) -> QueryResult<Vec<Slot>> {
        slots::table
            .filter(slots::day_id.eq(self.id))
            .order_by((
                slots::start_time.asc(),
                slots::end_time.asc(),
                slots::id.asc(),
            ))
            .select(Slot::as_select())
            .load(conn)
    }
}

/// A parallel stream of sessions on a given day, usually one per room.
#[derive(Debug, Queryable, Selectable, Serialize, Clone, PartialEq, Eq)]
#[diesel(table_name = tracks)]
pub struct Track {
    pub id: i64,
    pub day_id: i64,
    pub name: String,
    pub room: String,
    pub position: i64,
}

/// A scheduled block of time. Slots without a track are plenary (keynotes,
/// breaks) and span every track of the day.
#[derive(Debug, Queryable, Selectable, Serialize, Clone, PartialEq, Eq)]
#[diesel(table_name = slots)]
pub struct Slot {
    pub id: i64,
    pub day_id: i64,
    pub track_id: Option<i64>,
    pub kind: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slug: Option<String>,
    pub title: String,
    pub description: String,
    pub presentation_id: Option<i64>,
}

impl Slot {
    /// Canonical URL of the slot's detail page. The slug is percent-encoded
    /// as a single path segment.
    pub fn absolute_url(&self) -> String {
        match &self.slug {
            Some(slug) => format!(
                "/schedule/slots/{}",
                RawStr::new(slug).percent_encode()
            ),
            None => format!("/schedule/slots/{}", self.id),
        }
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }

    pub fn with_id(
        id: i64,
        conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
    ) -> QueryResult<Option<Slot>> {
        slots::table
            .filter(slots::id.eq(id))
            .select(Slot::as_select())
            .first(conn)
            .optional()
    }

    pub fn with_slug(
        slug: &str,
        conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
    ) -> QueryResult<Option<Slot>> {
        slots::table
            .filter(slots::slug.eq(slug))
            .select(Slot::as_select())
            .first(conn)
            .optional()
    }
}
