use db::{
    presentation::Presentation,
    schedule::{Day, Slot},
    schema::days,
    user::User,
    DbConn,
};
use diesel::prelude::*;
use maud::{html, Markup};
use rocket::{response::Redirect, State};
use trace_request::TracingSpan;
use tracing::Instrument;
use ui::{page_of_body, page_title};

use super::{load_slot, ScheduledSlot};
use crate::{
    error::{AppResult, OrNotFound},
    permissions::check_schedule_view,
    settings::SiteConfig,
};

fn slot_details(
    day: &Day,
    slot: &ScheduledSlot,
    other_talks: &[Vec<Presentation>],
) -> Markup {
    html! {
        (page_title(slot.title()))
        dl class="row" {
            dt class="col-sm-2" { "Day" }
            dd class="col-sm-10" { (day.date.format("%A %-d %B %Y").to_string()) }
            dt class="col-sm-2" { "Time" }
            dd class="col-sm-10" {
                (slot.slot.start_time.format("%H:%M").to_string())
                " - "
                (slot.slot.end_time.format("%H:%M").to_string())
            }
            @if let Some(track) = &slot.track {
                dt class="col-sm-2" { "Track" }
                dd class="col-sm-10" { (track.name) }
                @if !track.room.is_empty() {
                    dt class="col-sm-2" { "Room" }
                    dd class="col-sm-10" { (track.room) }
                }
            }
            dt class="col-sm-2" { "Kind" }
            dd class="col-sm-10" { (slot.slot.kind) }
            @if !slot.language.is_empty() {
                dt class="col-sm-2" { "Language" }
                dd class="col-sm-10" { (slot.language) }
            }
        }
        @if !slot.summary().is_empty() {
            p class="lead" { (slot.summary()) }
        }
        @for paragraph in slot.description().split("\n\n").filter(|p| !p.trim().is_empty()) {
            p { (paragraph.trim()) }
        }
        @if !slot.speakers.is_empty() {
            h2 { "Speakers" }
            @for (speaker, others) in slot.speakers.iter().zip(other_talks) {
                div class="mb-3" {
                    h3 class="h5" { (speaker.name) }
                    @if speaker.has_biography() {
                        @for paragraph in speaker.biography_paragraphs() {
                            p { (paragraph) }
                        }
                    }
                    @if !others.is_empty() {
                        p class="text-muted" {
                            "Also presenting: "
                            @for (i, other) in others.iter().enumerate() {
                                @if i > 0 { ", " }
                                em { (other.title) }
                            }
                        }
                    }
                }
            }
        }
        a href="/schedule" { "Back to the schedule" }
    }
}

/// A slot's detail page. Slots are addressed by slug; an id still works, but
/// redirects to the slug when the slot has one.
#[get("/schedule/slots/<slot>")]
pub async fn show_slot(
    site: &State<SiteConfig>,
    slot: String,
    user: Option<User>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<Result<Markup, Redirect>> {
    let site_name = site.site_name.clone();
    db.run(move |conn| -> AppResult<_> {
        check_schedule_view(user.as_ref(), conn)?;

        let found = match slot.parse::<i64>() {
            Ok(id) => {
                let found = Slot::with_id(id, conn)?.or_not_found()?;
                if found.slug.is_some() {
                    return Ok(Err(Redirect::permanent(found.absolute_url())));
                }
                found
            }
            Err(_) => Slot::with_slug(&slot, conn)?.or_not_found()?,
        };

        let day = days::table
            .filter(days::id.eq(found.day_id))
            .select(Day::as_select())
            .first(conn)?;
        let tracks = day.tracks(conn)?;
        let scheduled = load_slot(found, &tracks, conn)?;

        let current = scheduled.slot.presentation_id;
        let other_talks = scheduled
            .speakers
            .iter()
            .map(|speaker| -> AppResult<Vec<Presentation>> {
                Ok(speaker
                    .all_presentations(conn)?
                    .into_iter()
                    .filter(|presentation| Some(presentation.id) != current)
                    .collect())
            })
            .collect::<AppResult<Vec<Vec<Presentation>>>>()?;

        Ok(Ok(page_of_body(
            slot_details(&day, &scheduled, &other_talks),
            user,
            &site_name,
        )))
    })
    .instrument(span.0)
    .await
}
