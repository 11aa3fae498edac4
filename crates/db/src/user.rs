use chrono::NaiveDateTime;
use diesel::prelude::*;
use rocket::{
    http::{Cookie, CookieJar, Status},
    outcome::try_outcome,
    request::{self, FromRequest},
    Request,
};
use serde::{Deserialize, Serialize};

use crate::{schema, DbConn};

pub const LOGIN_COOKIE: &str = "conference_session";

#[derive(Debug, Queryable, Selectable, Serialize, Clone)]
#[diesel(table_name = schema::users)]
pub struct User {
    pub id: i64,
    pub public_id: String,
    pub username: Option<String>,
    pub email: String,
    pub password_hash: Option<String>,
    pub created_at: NaiveDateTime,
    pub is_superuser: bool,
}

type WithEmail<'a> = diesel::dsl::Eq<schema::users::email, &'a str>;

impl User {
    pub fn with_email(email: &str) -> WithEmail<'_> {
        schema::users::email.eq(email)
    }

    /// The name shown in greetings and email headers.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.email)
    }
}

#[derive(Debug)]
pub enum AuthError {
    CookieMissingOrMalformed,
    NoDatabase,
    Unauthorized,
}

#[derive(Serialize, Deserialize)]
pub struct LoginSession {
    id: i64,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for User {
    type Error = AuthError;

    async fn from_request(
        request: &'r Request<'_>,
    ) -> request::Outcome<Self, AuthError> {
        let db = try_outcome!(request
            .guard::<DbConn>()
            .await
            .map_error(|(t, _)| (t, AuthError::NoDatabase)));

        let login_cookie = match request.cookies().get_private(LOGIN_COOKIE) {
            Some(cookie) => cookie,
            None => {
                return request::Outcome::Error((
                    Status::Unauthorized,
                    AuthError::CookieMissingOrMalformed,
                ));
            }
        };

        let login: LoginSession =
            match serde_json::from_str(login_cookie.value()) {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!("discarding malformed login cookie: {e}");
                    // a malformed cookie would otherwise keep the user from
                    // logging in again
                    request.cookies().remove_private(LOGIN_COOKIE);
                    return request::Outcome::Error((
                        Status::BadRequest,
                        AuthError::CookieMissingOrMalformed,
                    ));
                }
            };

        let user = db
            .run(move |conn| {
                schema::users::table
                    .filter(schema::users::id.eq(login.id))
                    .select(User::as_select())
                    .first(conn)
                    .optional()
            })
            .await;

        match user {
            Ok(Some(user)) => request::Outcome::Success(user),
            Ok(None) => request::Outcome::Error((
                Status::Unauthorized,
                AuthError::Unauthorized,
            )),
            Err(e) => {
                tracing::error!("could not load user from session: {e}");
                request::Outcome::Error((
                    Status::InternalServerError,
                    AuthError::NoDatabase,
                ))
            }
        }
    }
}

pub fn set_login_cookie(id: i64, jar: &CookieJar) {
    let session = serde_json::to_string(&LoginSession { id })
        .expect("a login session always serializes");
    jar.add_private(Cookie::new(LOGIN_COOKIE, session));
}

pub fn clear_login_cookie(jar: &CookieJar) {
    jar.remove_private(LOGIN_COOKIE);
}
