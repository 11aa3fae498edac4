use chrono::Utc;
use db::{user::User, DbConn};
use rocket::{http::ContentType, State};
use trace_request::TracingSpan;
use tracing::Instrument;

use super::{
    export::{export_to_icalendar, export_to_pentabarf, export_to_xcal},
    visible_schedule, ScheduleExport,
};
use crate::{error::AppResult, settings::SiteConfig};

fn application_xml() -> ContentType {
    ContentType::new("application", "xml")
}

async fn load_visible(
    user: Option<User>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<ScheduleExport> {
    db.run(move |conn| -> AppResult<_> {
        let schedule = visible_schedule(user.as_ref(), conn)?;
        Ok(ScheduleExport::load(schedule, conn)?)
    })
    .instrument(span.0)
    .await
}

#[get("/schedule/pentabarf.xml")]
pub async fn pentabarf_xml(
    user: Option<User>,
    site: &State<SiteConfig>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<(ContentType, String)> {
    let export = load_visible(user, db, span).await?;
    Ok((application_xml(), export_to_pentabarf(&export, site)))
}

#[get("/schedule/xcal.xml")]
pub async fn xcal_xml(
    user: Option<User>,
    site: &State<SiteConfig>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<(ContentType, String)> {
    let export = load_visible(user, db, span).await?;
    Ok((application_xml(), export_to_xcal(&export, site)))
}

#[get("/schedule/schedule.ics")]
pub async fn icalendar_ics(
    user: Option<User>,
    site: &State<SiteConfig>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<(ContentType, String)> {
    let export = load_visible(user, db, span).await?;
    Ok((
        ContentType::Calendar,
        export_to_icalendar(&export, site, Utc::now().naive_utc()),
    ))
}
