use db::{attendee::Attendee, schema::attendees, user::User, DbConn};
use diesel::prelude::*;
use maud::{html, Markup};
use rocket::{
    form::Form,
    request::FlashMessage,
    response::{Flash, Redirect},
    State,
};
use serde::Serialize;
use trace_request::TracingSpan;
use tracing::Instrument;
use ui::{flash_message, page_of_body, page_title};

use crate::{
    error::{AppError, AppResult, OrNotFound},
    forms::{input, FieldErrors, InputOpts},
    permissions::check_attendee_view,
    settings::SiteConfig,
};

const MAX_FIELD_LENGTH: usize = 100;

#[derive(FromForm, Serialize, Debug, Clone, Default)]
pub struct AttendeeForm {
    #[field(default = String::new())]
    pub name: String,
    #[field(default = String::new())]
    pub company: String,
    #[field(default = String::new())]
    pub job_title: String,
}

impl AttendeeForm {
    fn of_attendee(attendee: &Attendee) -> Self {
        AttendeeForm {
            name: attendee.name.clone(),
            company: attendee.company.clone().unwrap_or_default(),
            job_title: attendee.job_title.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.require("name", &self.name);
        errors.max_length("name", &self.name, MAX_FIELD_LENGTH);
        errors.max_length("company", &self.company, MAX_FIELD_LENGTH);
        errors.max_length("job_title", &self.job_title, MAX_FIELD_LENGTH);
        errors.into_result()
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn profile_form(
    attendee: &Attendee,
    form: &AttendeeForm,
    errors: &FieldErrors,
    flash: Markup,
) -> Markup {
    html! {
        (page_title("My profile"))
        (flash)
        p class="text-muted" { "Ticket: " (attendee.tracker) }
        form method="post" action="/attendees/profile" {
            (input("name", "Name", &form.name, errors, InputOpts { required: true, ..Default::default() }))
            (input("company", "Company", &form.company, errors, InputOpts::default()))
            (input("job_title", "Job title", &form.job_title, errors, InputOpts::default()))
            button type="submit" class="btn btn-primary" { "Save" }
        }
    }
}

/// Shows the signed-in attendee's profile form.
#[get("/attendees/profile")]
pub async fn profile_page(
    site: &State<SiteConfig>,
    user: Option<User>,
    flash: Option<FlashMessage<'_>>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<Result<Markup, Redirect>> {
    let site_name = site.site_name.clone();
    let flash = flash_message(flash);

    db.run(move |conn| -> AppResult<_> {
        check_attendee_view(conn)?;
        let Some(user) = user else {
            return Ok(Err(Redirect::to("/attendees/sign-in")));
        };
        let attendee = Attendee::of_user(user.id, conn)?.or_not_found()?;

        let form = AttendeeForm::of_attendee(&attendee);
        Ok(Ok(page_of_body(
            profile_form(&attendee, &form, &FieldErrors::default(), flash),
            Some(user),
            &site_name,
        )))
    })
    .instrument(span.0)
    .await
}

/// Saves the signed-in attendee's profile.
#[post("/attendees/profile", data = "<form>")]
pub async fn do_edit_profile(
    site: &State<SiteConfig>,
    user: Option<User>,
    form: Form<AttendeeForm>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<Result<Markup, Flash<Redirect>>> {
    let site_name = site.site_name.clone();
    let form = form.into_inner();

    db.run(move |conn| {
        conn.transaction(|conn| -> AppResult<_> {
            check_attendee_view(conn)?;
            let Some(user) = user else {
                return Ok(Err(Flash::error(
                    Redirect::to("/attendees/sign-in"),
                    "Please sign in first.",
                )));
            };
            let attendee = Attendee::of_user(user.id, conn)?.or_not_found()?;

            if let Err(errors) = form.validate() {
                return Ok(Ok(page_of_body(
                    profile_form(&attendee, &form, &errors, html! {}),
                    Some(user),
                    &site_name,
                )));
            }

            let n = diesel::update(attendees::table)
                .filter(attendees::id.eq(attendee.id))
                .set((
                    attendees::name.eq(form.name.trim()),
                    attendees::company.eq(non_empty(&form.company)),
                    attendees::job_title.eq(non_empty(&form.job_title)),
                ))
                .execute(conn)?;
            if n != 1 {
                return Err(AppError::NotFound);
            }

            tracing::info!("attendee {} updated their profile", attendee.id);
            Ok(Err(Flash::success(
                Redirect::to("/attendees/profile"),
                "Data saved successfully.",
            )))
        })
    })
    .instrument(span.0)
    .await
}
