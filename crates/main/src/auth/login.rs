//! Email and password login for staff accounts. Attendees sign in with their
//! tracker instead, see `attendees::sign_in`.

use db::{
    schema::users,
    user::{set_login_cookie, User},
    DbConn,
};
use diesel::prelude::*;
use maud::Markup;
use rocket::{
    form::Form,
    http::CookieJar,
    response::{Flash, Redirect},
    State,
};
use serde::Serialize;
use trace_request::TracingSpan;
use tracing::Instrument;
use ui::page_of_body;

use crate::{
    error::{AppError, AppResult},
    settings::SiteConfig,
    util::{is_valid_email, password_matches},
};

#[get("/login")]
pub async fn login_with_password(
    site: &State<SiteConfig>,
    user: Option<User>,
) -> Result<Markup, Flash<Redirect>> {
    if user.is_some() {
        return Err(Flash::error(
            Redirect::to("/"),
            "You are already logged in!",
        ));
    }

    Ok(page_of_body(login_with_password_form(None, ""), user, &site.site_name))
}

#[derive(FromForm, Serialize, Debug)]
pub struct PasswordLoginForm {
    pub email: String,
    pub password: String,
}

#[post("/login", data = "<form>")]
pub async fn do_password_login(
    site: &State<SiteConfig>,
    user: Option<User>,
    form: Form<PasswordLoginForm>,
    jar: &CookieJar<'_>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<Result<Markup, Flash<Redirect>>> {
    if user.is_some() {
        return Ok(Err(Flash::error(
            Redirect::to("/"),
            "You are already logged in!",
        )));
    }

    let form = form.into_inner();
    if !is_valid_email(&form.email) {
        return Ok(Ok(page_of_body(
            login_with_password_form(
                Some("Please enter a valid email address."),
                &form.email,
            ),
            None,
            &site.site_name,
        )));
    }

    let email = form.email.clone();
    let found = db
        .run(move |conn| -> Result<_, AppError> {
            Ok(users::table
                .filter(User::with_email(&email))
                .select(User::as_select())
                .first::<User>(conn)
                .optional()?)
        })
        .instrument(span.0)
        .await?;

    match found {
        Some(user)
            if password_matches(&form.password, user.password_hash.as_deref()) =>
        {
            tracing::info!("user {} logged in", user.public_id);
            set_login_cookie(user.id, jar);
            Ok(Err(Flash::success(
                Redirect::to("/admin"),
                "You are now logged in.",
            )))
        }
        _ => Ok(Ok(page_of_body(
            login_with_password_form(
                Some("Incorrect email or password."),
                &form.email,
            ),
            None,
            &site.site_name,
        ))),
    }
}

fn login_with_password_form(error: Option<&str>, email: &str) -> Markup {
    maud::html! {
        div class="container" {
            h1 { "Staff login" }
            @if let Some(err) = error {
                div class="alert alert-danger" role="alert" {
                    (err)
                }
            }
            form method="post" action="/login" {
                div class="mb-3" {
                    label for="email" class="form-label" { "Email" }
                    input type="email" class="form-control" id="email" name="email" value=(email) required;
                }
                div class="mb-3" {
                    label for="password" class="form-label" { "Password" }
                    input type="password" class="form-control" id="password" name="password" required;
                }
                button type="submit" class="btn btn-primary" { "Log in" }
            }
        }
    }
}
