//! The public conference schedule: the grid, slot pages and the calendar
//! exports.

use chrono::NaiveDate;
use db::{
    presentation::Presentation,
    schedule::{Day, Schedule, Slot, Track},
    schema::{presentations, proposals},
    speaker::Speaker,
    user::User,
};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};

use crate::{
    error::{AppResult, OrNotFound},
    permissions::check_schedule_view,
};

pub mod downloads;
pub mod export;
pub mod show;
pub mod slot;

/// A slot together with everything the pages and exports show about it.
#[derive(Debug, Clone)]
pub struct ScheduledSlot {
    pub slot: Slot,
    /// `None` for plenary slots.
    pub track: Option<Track>,
    pub presentation: Option<Presentation>,
    pub speakers: Vec<Speaker>,
    /// Language of the underlying proposal, empty when unknown.
    pub language: String,
}

impl ScheduledSlot {
    pub fn title(&self) -> &str {
        match &self.presentation {
            Some(presentation) if self.slot.title.is_empty() => {
                &presentation.title
            }
            _ => &self.slot.title,
        }
    }

    pub fn description(&self) -> &str {
        match &self.presentation {
            Some(presentation) if self.slot.description.is_empty() => {
                &presentation.description
            }
            _ => &self.slot.description,
        }
    }

    pub fn summary(&self) -> &str {
        self.presentation
            .as_ref()
            .map(|presentation| presentation.summary.as_str())
            .unwrap_or("")
    }

    pub fn track_name(&self) -> Option<&str> {
        self.track.as_ref().map(|track| track.name.as_str())
    }

    pub fn room(&self) -> Option<&str> {
        self.track.as_ref().map(|track| track.room.as_str())
    }

    /// Identifier that stays stable across exports: the slug when there is
    /// one, otherwise the id.
    pub fn slug_or_id(&self) -> String {
        self.slot
            .slug
            .clone()
            .unwrap_or_else(|| self.slot.id.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ScheduleDay {
    pub day: Day,
    /// Ordered by position.
    pub tracks: Vec<Track>,
    /// Ordered by start, then end.
    pub slots: Vec<ScheduledSlot>,
}

impl ScheduleDay {
    pub fn date(&self) -> NaiveDate {
        self.day.date
    }
}

/// A schedule loaded in full, ready to render or serialize.
#[derive(Debug, Clone)]
pub struct ScheduleExport {
    pub schedule: Schedule,
    pub days: Vec<ScheduleDay>,
}

impl ScheduleExport {
    pub fn load(
        schedule: Schedule,
        conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
    ) -> QueryResult<ScheduleExport> {
        let mut days = Vec::new();
        for day in schedule.days(conn)? {
            let tracks = day.tracks(conn)?;
            let slots = day
                .slots(conn)?
                .into_iter()
                .map(|slot| load_slot(slot, &tracks, conn))
                .collect::<QueryResult<Vec<_>>>()?;
            days.push(ScheduleDay { day, tracks, slots });
        }

        Ok(ScheduleExport { schedule, days })
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.first().map(ScheduleDay::date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.last().map(ScheduleDay::date)
    }

    pub fn slots(&self) -> impl Iterator<Item = (&ScheduleDay, &ScheduledSlot)> {
        self.days
            .iter()
            .flat_map(|day| day.slots.iter().map(move |slot| (day, slot)))
    }
}

/// Fills in the track, presentation and speakers of a slot. `tracks` are the
/// tracks of the slot's day.
pub fn load_slot(
    slot: Slot,
    tracks: &[Track],
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> QueryResult<ScheduledSlot> {
    let track = slot
        .track_id
        .and_then(|id| tracks.iter().find(|track| track.id == id))
        .cloned();

    let presentation = match slot.presentation_id {
        Some(id) => presentations::table
            .filter(presentations::id.eq(id))
            .select(Presentation::as_select())
            .first(conn)
            .optional()?,
        None => None,
    };

    let (speakers, language) = match &presentation {
        Some(presentation) => {
            let language = match presentation.proposal_id {
                Some(proposal_id) => proposals::table
                    .filter(proposals::id.eq(proposal_id))
                    .select(proposals::language)
                    .first::<String>(conn)
                    .optional()?,
                None => None,
            };
            (presentation.speakers(conn)?, language.unwrap_or_default())
        }
        None => (Vec::new(), String::new()),
    };

    Ok(ScheduledSlot {
        slot,
        track,
        presentation,
        speakers,
        language,
    })
}

/// The schedule the requester may see: 404 while the schedule is closed to
/// them, or when no schedule is published and visible.
pub fn visible_schedule(
    user: Option<&User>,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> AppResult<Schedule> {
    check_schedule_view(user, conn)?;
    Schedule::public(conn)?.or_not_found()
}
