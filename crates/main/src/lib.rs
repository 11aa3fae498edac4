use admin::{
    admin_overview,
    config::{config_page, do_upsert_config, edit_existing_config_item_page},
};
use attendees::{
    profile::{do_edit_profile, profile_page},
    restore::{
        do_request_restore, do_restore_password, request_restore_page,
        restore_password_page,
    },
    sign_in::{do_sign_in, sign_in_page},
};
use auth::{
    login::{do_password_login, login_with_password},
    logout,
};
use db::{user::User, DbConn};
use diesel_migrations::{
    embed_migrations, EmbeddedMigrations, MigrationHarness,
};
use proposals::{
    actions::do_bulk_action,
    admin::proposal_list_page,
    kinds::{do_create_kind, do_create_section, kinds_page, sections_page},
};
use rocket::{
    fairing::AdHoc,
    figment::{
        util::map,
        value::{Map, Value},
    },
    request::FlashMessage,
    response::Redirect,
    Build, Request, Rocket,
};
use schedule::{
    downloads::{icalendar_ics, pentabarf_xml, xcal_xml},
    show::show_schedule,
    slot::show_slot,
};
use settings::SiteConfig;
use trace_request::RequestTracer;
use ui::{error_403, error_404, error_500, flash_message, page_of_body};

pub mod admin;
pub mod attendees;
pub mod auth;
pub mod error;
pub mod forms;
pub mod permissions;
pub mod proposals;
pub mod schedule;
pub mod settings;
pub mod util;

#[cfg(test)]
mod tests;

#[macro_use]
extern crate rocket;

#[get("/")]
fn index(
    user: Option<User>,
    flash: Option<FlashMessage<'_>>,
    site: &rocket::State<SiteConfig>,
) -> maud::Markup {
    page_of_body(
        maud::html! {
            (flash_message(flash))
            h1 { (site.site_name) }
            ul {
                li { a href="/schedule" { "Schedule" } }
                li { a href="/attendees/profile" { "Attendee profile" } }
            }
        },
        user,
        &site.site_name,
    )
}

#[catch(401)]
fn unauthorized() -> Redirect {
    Redirect::to("/login")
}

fn site_name_of<'r>(req: &'r Request<'_>) -> &'r str {
    req.rocket()
        .state::<SiteConfig>()
        .map(|site| site.site_name.as_str())
        .unwrap_or(settings::DEFAULT_SITE_NAME)
}

#[catch(403)]
async fn forbidden(req: &Request<'_>) -> maud::Markup {
    let user = req.guard::<Option<User>>().await.succeeded().flatten();
    error_403(None::<&str>, user, site_name_of(req))
}

#[catch(404)]
async fn not_found(req: &Request<'_>) -> maud::Markup {
    let user = req.guard::<Option<User>>().await.succeeded().flatten();
    error_404(None::<&str>, user, site_name_of(req))
}

#[catch(500)]
fn internal_error(req: &Request<'_>) -> maud::Markup {
    error_500(None, site_name_of(req))
}

pub const MIGRATIONS: EmbeddedMigrations =
    embed_migrations!("../../migrations");

pub fn make_rocket(default_db: &str) -> Rocket<Build> {
    let db: Map<_, Value> = map![
        "url" => std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| default_db.to_string())
            .into(),
        "pool_size" => 10.into(),
        "timeout" => 5.into(),
    ];

    let figment =
        rocket::Config::figment().merge(("databases", map!["database" => db]));

    rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(AdHoc::try_on_ignite("migrations", |rocket| async move {
            let Some(db_conn) = DbConn::get_one(&rocket).await else {
                tracing::error!("no database connection to run migrations");
                return Err(rocket);
            };

            let ret: Result<(), String> = db_conn
                .run(move |conn| {
                    conn.run_pending_migrations(MIGRATIONS)
                        .map(|applied| {
                            tracing::info!(
                                "applied {} pending migrations",
                                applied.len()
                            );
                        })
                        .map_err(|e| e.to_string())
                })
                .await;

            match ret {
                Ok(()) => Ok(rocket),
                Err(e) => {
                    tracing::error!("migrations failed: {e}");
                    Err(rocket)
                }
            }
        }))
        .attach(AdHoc::config::<SiteConfig>())
        .mount(
            "/",
            routes![
                index,
                login_with_password,
                do_password_login,
                logout::logout,
                profile_page,
                do_edit_profile,
                restore_password_page,
                do_restore_password,
                request_restore_page,
                do_request_restore,
                sign_in_page,
                do_sign_in,
                admin_overview,
                config_page,
                edit_existing_config_item_page,
                do_upsert_config,
                proposal_list_page,
                do_bulk_action,
                kinds_page,
                do_create_kind,
                sections_page,
                do_create_section,
                show_schedule,
                show_slot,
                pentabarf_xml,
                xcal_xml,
                icalendar_ics,
            ],
        )
        .register(
            "/",
            catchers![unauthorized, forbidden, not_found, internal_error],
        )
        .attach(RequestTracer)
}
