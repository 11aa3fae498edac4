use db::{
    attendee::Attendee,
    user::{set_login_cookie, User},
    DbConn,
};
use maud::{html, Markup};
use rocket::{form::Form, http::CookieJar, response::Redirect, State};
use serde::Serialize;
use trace_request::TracingSpan;
use tracing::Instrument;
use ui::{page_of_body, page_title};

use crate::{
    error::AppResult,
    forms::{input, FieldErrors, InputOpts},
    permissions::check_attendee_view,
    settings::SiteConfig,
    util::password_matches,
};

#[derive(FromForm, Serialize, Debug, Clone, Default)]
pub struct AttendeeSignInForm {
    #[field(default = String::new())]
    pub tracker: String,
    #[field(default = String::new())]
    pub password: String,
}

fn sign_in_form(tracker: &str, error: Option<&str>) -> Markup {
    let errors = FieldErrors::default();
    html! {
        (page_title("Attendee sign in"))
        @if let Some(error) = error {
            div class="alert alert-danger" role="alert" { (error) }
        }
        form method="post" action="/attendees/sign-in" {
            (input("tracker", "Ticket tracker", tracker, &errors, InputOpts { required: true, ..Default::default() }))
            (input("password", "Password", "", &errors, InputOpts { input_type: "password", required: true, ..Default::default() }))
            button type="submit" class="btn btn-primary" { "Sign in" }
        }
        p class="mt-3" {
            a href="/attendees/restore" { "First time here, or forgot your password?" }
        }
    }
}

#[get("/attendees/sign-in")]
pub async fn sign_in_page(
    site: &State<SiteConfig>,
    user: Option<User>,
    db: DbConn,
) -> AppResult<Result<Markup, Redirect>> {
    db.run(|conn| check_attendee_view(conn)).await?;

    if user.is_some() {
        return Ok(Err(Redirect::to("/attendees/profile")));
    }
    Ok(Ok(page_of_body(sign_in_form("", None), None, &site.site_name)))
}

/// Authenticates an attendee by ticket tracker and password.
#[post("/attendees/sign-in", data = "<form>")]
pub async fn do_sign_in(
    site: &State<SiteConfig>,
    form: Form<AttendeeSignInForm>,
    jar: &CookieJar<'_>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<Result<Markup, Redirect>> {
    let form = form.into_inner();
    let tracker = form.tracker.trim().to_string();

    let found = db
        .run(move |conn| -> AppResult<_> {
            check_attendee_view(conn)?;
            if tracker.is_empty() {
                return Ok(None);
            }
            Ok(Attendee::with_tracker(&tracker, conn)?)
        })
        .instrument(span.0)
        .await?;

    match found {
        Some((attendee, account))
            if password_matches(
                &form.password,
                account.password_hash.as_deref(),
            ) =>
        {
            tracing::info!("attendee {} signed in", attendee.id);
            set_login_cookie(account.id, jar);
            Ok(Err(Redirect::to("/attendees/profile")))
        }
        _ => Ok(Ok(page_of_body(
            sign_in_form(
                &form.tracker,
                Some("Please enter a correct tracker and password."),
            ),
            None,
            &site.site_name,
        ))),
    }
}
