use chrono::NaiveTime;
use db::{user::User, DbConn};
use itertools::Itertools;
use maud::{html, Markup};
use rocket::State;
use trace_request::TracingSpan;
use tracing::Instrument;
use ui::{page_of_body, page_title};

use super::{visible_schedule, ScheduleDay, ScheduleExport, ScheduledSlot};
use crate::{error::AppResult, settings::SiteConfig};

/// Slots sharing the same start and end time, shown as one row of the grid.
pub struct SlotGroup<'a> {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub slots: Vec<&'a ScheduledSlot>,
}

impl SlotGroup<'_> {
    /// The plenary slot of the group, if any. It spans every track.
    pub fn plenary(&self) -> Option<&ScheduledSlot> {
        self.slots.iter().copied().find(|s| s.slot.track_id.is_none())
    }

    pub fn in_track(&self, track_id: i64) -> Option<&ScheduledSlot> {
        self.slots
            .iter()
            .copied()
            .find(|s| s.slot.track_id == Some(track_id))
    }
}

/// Groups a day's slots (already sorted by start and end) into grid rows.
pub fn slot_groups(day: &ScheduleDay) -> Vec<SlotGroup<'_>> {
    let chunks = day
        .slots
        .iter()
        .chunk_by(|s| (s.slot.start_time, s.slot.end_time));

    let groups = chunks
        .into_iter()
        .map(|((start, end), slots)| SlotGroup {
            start,
            end,
            slots: slots.collect(),
        })
        .collect();
    groups
}

fn slot_cell(slot: &ScheduledSlot) -> Markup {
    html! {
        a href=(slot.slot.absolute_url()) { (slot.title()) }
        @if !slot.speakers.is_empty() {
            div class="small text-muted" {
                (slot.speakers.iter().map(|s| s.name.as_str()).join(", "))
            }
        }
    }
}

fn day_grid(day: &ScheduleDay) -> Markup {
    let columns = day.tracks.len().max(1);

    html! {
        h2 class="mt-4" { (day.date().format("%A %-d %B %Y").to_string()) }
        table class="table table-bordered" {
            thead {
                tr {
                    th scope="col" { "Time" }
                    @for track in &day.tracks {
                        th scope="col" {
                            (track.name)
                            @if !track.room.is_empty() {
                                div class="small text-muted" { (track.room) }
                            }
                        }
                    }
                }
            }
            tbody {
                @for group in slot_groups(day) {
                    tr {
                        th scope="row" {
                            (group.start.format("%H:%M").to_string())
                            " - "
                            (group.end.format("%H:%M").to_string())
                        }
                        @if let Some(plenary) = group.plenary() {
                            td colspan=(columns) class="text-center table-light" {
                                (slot_cell(plenary))
                            }
                        } @else {
                            @for track in &day.tracks {
                                td {
                                    @if let Some(slot) = group.in_track(track.id) {
                                        (slot_cell(slot))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[get("/schedule")]
pub async fn show_schedule(
    site: &State<SiteConfig>,
    user: Option<User>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<Markup> {
    let site_name = site.site_name.clone();
    db.run(move |conn| -> AppResult<_> {
        let schedule = visible_schedule(user.as_ref(), conn)?;
        let export = ScheduleExport::load(schedule, conn)?;

        Ok(page_of_body(
            html! {
                (page_title(&export.schedule.name))
                p {
                    "Download: "
                    a href="/schedule/schedule.ics" { "iCalendar" }
                    " · "
                    a href="/schedule/xcal.xml" { "xCal" }
                    " · "
                    a href="/schedule/pentabarf.xml" { "Pentabarf" }
                }
                @for day in &export.days {
                    (day_grid(day))
                }
            },
            user,
            &site_name,
        ))
    })
    .instrument(span.0)
    .await
}
