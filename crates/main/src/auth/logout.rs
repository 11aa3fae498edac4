use db::user::{clear_login_cookie, User};
use rocket::{
    http::CookieJar,
    response::{Flash, Redirect},
};

/// Drops the session cookie. Attendees and staff share the same cookie, so
/// this signs either out.
#[get("/logout")]
pub async fn logout(user: Option<User>, jar: &CookieJar<'_>) -> Flash<Redirect> {
    if let Some(user) = user {
        tracing::info!("user {} logged out", user.public_id);
    }
    clear_login_cookie(jar);
    Flash::success(Redirect::to("/"), "You have been logged out.")
}
