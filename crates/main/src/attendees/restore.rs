//! Password restore for attendees: an attendee asks for a link by giving the
//! tracker of their ticket, and the link lets them choose a new password
//! exactly once.

use db::{
    attendee::Attendee,
    schema::{attendees, users},
    user::User,
    DbConn,
};
use diesel::prelude::*;
use email::{dispatch, queue_mail, OutgoingEmail};
use maud::{html, Markup};
use rocket::{form::Form, State};
use serde::Serialize;
use trace_request::TracingSpan;
use tracing::Instrument;
use ui::{page_of_body, page_title};

use crate::{
    error::{AppError, AppResult, OrNotFound},
    forms::{input, FieldErrors, InputOpts},
    permissions::check_attendee_view,
    settings::SiteConfig,
    util::{hash_password, short_random},
};

pub const MIN_PASSWORD_LENGTH: usize = 8;
const RESTORE_CODE_LENGTH: usize = 32;

#[derive(FromForm, Serialize, Debug, Clone, Default)]
pub struct RestorePasswordForm {
    #[field(default = String::new())]
    pub restore_code: String,
    #[field(default = String::new())]
    pub tracker: String,
    #[field(default = String::new())]
    pub password: String,
    #[field(default = String::new())]
    pub password2: String,
}

impl RestorePasswordForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.require("password", &self.password);
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!(
                    "The password must have at least {MIN_PASSWORD_LENGTH} characters."
                ),
            );
        }
        if self.password != self.password2 {
            errors.add("password2", "The passwords do not match.");
        }
        errors.into_result()
    }
}

fn restore_form(
    restore_code: &str,
    tracker: &str,
    errors: &FieldErrors,
) -> Markup {
    html! {
        (page_title("Set a new password"))
        form method="post" action=(format!("/attendees/restore/{restore_code}")) {
            input type="hidden" name="restore_code" value=(restore_code);
            (input("tracker", "Ticket tracker", tracker, errors, InputOpts { readonly: true, ..Default::default() }))
            (input("password", "New password", "", errors, InputOpts { input_type: "password", required: true, ..Default::default() }))
            (input("password2", "Repeat the new password", "", errors, InputOpts { input_type: "password", required: true, ..Default::default() }))
            button type="submit" class="btn btn-primary" { "Set password" }
        }
    }
}

#[get("/attendees/restore/<restore_code>")]
pub async fn restore_password_page(
    site: &State<SiteConfig>,
    restore_code: String,
    user: Option<User>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<Markup> {
    let site_name = site.site_name.clone();
    db.run(move |conn| -> AppResult<_> {
        check_attendee_view(conn)?;
        let (attendee, _) =
            Attendee::with_restore_code(&restore_code, conn)?.or_not_found()?;

        Ok(page_of_body(
            restore_form(&restore_code, &attendee.tracker, &FieldErrors::default()),
            user,
            &site_name,
        ))
    })
    .instrument(span.0)
    .await
}

/// Sets a new password with a restore code. The code is consumed in the same
/// transaction, so it cannot be used twice.
#[post("/attendees/restore/<restore_code>", data = "<form>")]
pub async fn do_restore_password(
    site: &State<SiteConfig>,
    restore_code: String,
    form: Form<RestorePasswordForm>,
    user: Option<User>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<Markup> {
    let site_name = site.site_name.clone();
    let form = form.into_inner();

    db.run(move |conn| {
        conn.transaction(|conn| -> AppResult<_> {
            check_attendee_view(conn)?;
            let (attendee, account) =
                Attendee::with_restore_code(&restore_code, conn)?
                    .or_not_found()?;

            if let Err(errors) = form.validate() {
                return Ok(page_of_body(
                    restore_form(&restore_code, &attendee.tracker, &errors),
                    user,
                    &site_name,
                ));
            }

            let password_hash = hash_password(&form.password)?;
            diesel::update(users::table)
                .filter(users::id.eq(account.id))
                .set(users::password_hash.eq(Some(password_hash)))
                .execute(conn)?;
            diesel::update(attendees::table)
                .filter(attendees::id.eq(attendee.id))
                .set(attendees::restore_code.eq(None::<String>))
                .execute(conn)?;

            tracing::info!("attendee {} restored their password", attendee.id);
            Ok(page_of_body(
                html! {
                    (page_title("Set a new password"))
                    div class="alert alert-success" role="alert" {
                        "Your new password has been set."
                    }
                    a class="btn btn-primary" href="/attendees/sign-in" { "Sign in" }
                },
                user,
                &site_name,
            ))
        })
    })
    .instrument(span.0)
    .await
}

#[derive(FromForm, Serialize, Debug, Clone, Default)]
pub struct RequestRestoreCodeForm {
    #[field(default = String::new())]
    pub tracker: String,
}

fn request_code_form(tracker: &str, errors: &FieldErrors) -> Markup {
    html! {
        (page_title("Restore your password"))
        p {
            "Enter the tracker of your ticket and we will email you a link to
             set your password."
        }
        form method="post" action="/attendees/restore" {
            (input("tracker", "Ticket tracker", tracker, errors, InputOpts { required: true, ..Default::default() }))
            button type="submit" class="btn btn-primary" { "Send link" }
        }
    }
}

#[get("/attendees/restore")]
pub async fn request_restore_page(
    site: &State<SiteConfig>,
    user: Option<User>,
    db: DbConn,
) -> AppResult<Markup> {
    db.run(|conn| check_attendee_view(conn)).await?;
    Ok(page_of_body(
        request_code_form("", &FieldErrors::default()),
        user,
        &site.site_name,
    ))
}

#[post("/attendees/restore", data = "<form>")]
pub async fn do_request_restore(
    form: Form<RequestRestoreCodeForm>,
    user: Option<User>,
    site: &State<SiteConfig>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<Markup> {
    let form = form.into_inner();
    let site = site.inner().clone();

    let (page, outgoing) = db
        .run(move |conn| {
            conn.transaction(|conn| -> AppResult<_> {
                check_attendee_view(conn)?;

                let mut errors = FieldErrors::default();
                errors.require("tracker", &form.tracker);
                if let Err(errors) = errors.into_result() {
                    return Ok((
                        page_of_body(
                            request_code_form(&form.tracker, &errors),
                            user,
                            &site.site_name,
                        ),
                        None,
                    ));
                }

                let (attendee, account) =
                    Attendee::with_tracker(form.tracker.trim(), conn)?
                        .or_not_found()?;
                let outgoing =
                    send_restore_password_link(&attendee, &account, &site, conn)?;

                Ok((
                    page_of_body(
                        html! {
                            (page_title("Restore your password"))
                            div class="alert alert-success" role="alert" {
                                "We have sent an email to the address you
                                 bought your ticket with, containing a link to
                                 set your password."
                            }
                        },
                        user,
                        &site.site_name,
                    ),
                    Some(outgoing),
                ))
            })
        })
        .instrument(span.0)
        .await?;

    dispatch(outgoing.into_iter().collect()).await;
    Ok(page)
}

/// Gives the attendee a fresh restore code and queues the email carrying the
/// link. Any previous code stops working.
pub fn send_restore_password_link(
    attendee: &Attendee,
    account: &User,
    site: &SiteConfig,
    conn: &mut impl Connection<Backend = diesel::sqlite::Sqlite>,
) -> Result<OutgoingEmail, AppError> {
    let code = short_random(RESTORE_CODE_LENGTH);
    diesel::update(attendees::table)
        .filter(attendees::id.eq(attendee.id))
        .set(attendees::restore_code.eq(Some(&code)))
        .execute(conn)?;

    let link = site.url(&format!("/attendees/restore/{code}"));
    let name = if attendee.name.is_empty() {
        account.display_name()
    } else {
        &attendee.name
    };

    let html = html! {
        p { "Hello " (name) "," }
        p {
            "Use this link to set the password of your " (site.site_name) " account: "
            a href=(link) { (link) }
        }
        p { "If you did not ask for this, you can ignore this email." }
    };
    let text = format!(
        "Hello {name},\n\n\
         Use this link to set the password of your {} account:\n\n\
         {link}\n\n\
         If you did not ask for this, you can ignore this email.\n",
        site.site_name
    );

    Ok(queue_mail(
        vec![(name, account.email.as_str())],
        &format!("{}: set your password", site.site_name),
        &html.into_string(),
        &text,
        conn,
    )?)
}
