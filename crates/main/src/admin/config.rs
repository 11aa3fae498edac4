use db::config::{
    value_is_truthy, ConfigItem, ATTENDEES_ZONE_ACTIVATED, SCHEDULE_OPENED,
};
use db::{schema::config, user::User, DbConn};
use diesel::prelude::*;
use maud::{html, Markup};
use rocket::form::{Form, FromForm};
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use trace_request::TracingSpan;
use tracing::Instrument;
use ui::{flash_message, page_of_body, page_title};
use uuid::Uuid;

use crate::{
    error::{AppResult, OrNotFound},
    permissions::{require, Permission},
    settings::SiteConfig,
};

/// Options the application reads, with what they do.
const KNOWN_OPTIONS: [(&str, &str); 2] = [
    (
        ATTENDEES_ZONE_ACTIVATED,
        "Opens the attendee area: sign in, password restore and profile.",
    ),
    (
        SCHEDULE_OPENED,
        "Shows the published schedule and its exports to everyone.",
    ),
];

fn flag_badge(value: &str) -> Markup {
    html! {
        @if value_is_truthy(value) {
            span class="badge text-bg-success" { "on" }
        } @else {
            span class="badge text-bg-secondary" { "off" }
        }
    }
}

#[get("/admin/config")]
pub async fn config_page(
    site: &State<SiteConfig>,
    user: User,
    flash: Option<FlashMessage<'_>>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<Markup> {
    let site_name = site.site_name.clone();
    let flash = flash_message(flash);

    db.run(move |conn| -> AppResult<_> {
        require(&user, Permission::ModifyGlobalConfig, conn)?;

        let config_items = config::table
            .order_by(config::key.asc())
            .select(ConfigItem::as_select())
            .load(conn)?;

        let markup = html! {
            table class="table" {
                thead {
                    tr {
                        th scope="col" { "Key" }
                        th scope="col" { "Value" }
                        th scope="col" { "As a flag" }
                        th scope="col" { "Edit" }
                    }
                }
                tbody {
                    @for item in &config_items {
                        tr {
                            td { (item.key) }
                            td { (item.value) }
                            td { (flag_badge(&item.value)) }
                            td {
                                a href=(format!("/admin/config/{}/edit", item.public_id)) {
                                    "Edit"
                                }
                            }
                        }
                    }
                }
            }
        };

        let known = html! {
            dl {
                @for (key, description) in KNOWN_OPTIONS {
                    dt { code { (key) } }
                    dd { (description) }
                }
            }
        };

        let create_form_markup = html! {
            form action="/admin/config/upsert" method="post" {
                div class="mb-3" {
                    label for="key" class="form-label" { "Key" }
                    input type="text" class="form-control" id="key" name="key" placeholder="key" required;
                }
                div class="mb-3" {
                    label for="value" class="form-label" { "Value" }
                    input type="text" class="form-control" id="value" name="value" placeholder="value";
                }
                button type="submit" class="btn btn-primary" { "Save" }
            }
        };

        Ok(page_of_body(
            html! {
                (page_title("Site configuration"))
                (flash)
                h2 { "Current options" }
                (markup)
                h2 { "Known options" }
                (known)
                h2 { "Set an option" }
                (create_form_markup)
            },
            Some(user),
            &site_name,
        ))
    })
    .instrument(span.0)
    .await
}

#[get("/admin/config/<config_id>/edit")]
pub async fn edit_existing_config_item_page(
    site: &State<SiteConfig>,
    db: DbConn,
    user: User,
    config_id: &str,
    span: TracingSpan,
) -> AppResult<Markup> {
    let site_name = site.site_name.clone();
    let config_id = config_id.to_string();

    db.run(move |conn| -> AppResult<_> {
        require(&user, Permission::ModifyGlobalConfig, conn)?;

        let config_item = config::table
            .filter(config::public_id.eq(config_id))
            .select(ConfigItem::as_select())
            .first(conn)
            .optional()?
            .or_not_found()?;

        Ok(page_of_body(
            html! {
                (page_title("Edit option"))
                form action="/admin/config/upsert" method="post" {
                    div class="mb-3" {
                        label for="key" class="form-label" { "Key" }
                        input type="text" class="form-control" id="key" name="key" value=(config_item.key) readonly;
                    }
                    div class="mb-3" {
                        label for="value" class="form-label" { "Value" }
                        input type="text" class="form-control" id="value" name="value" value=(config_item.value);
                    }
                    button type="submit" class="btn btn-primary" { "Save changes" }
                }
            },
            Some(user),
            &site_name,
        ))
    })
    .instrument(span.0)
    .await
}

#[derive(FromForm)]
pub struct UpsertConfigForm {
    key: String,
    value: String,
}

#[post("/admin/config/upsert", data = "<form>")]
pub async fn do_upsert_config(
    db: DbConn,
    user: User,
    form: Form<UpsertConfigForm>,
    span: TracingSpan,
) -> AppResult<Flash<Redirect>> {
    let form = form.into_inner();
    let key = form.key.trim().to_string();
    let value = form.value.trim().to_string();

    db.run(move |conn| {
        conn.transaction(|conn| -> AppResult<_> {
            require(&user, Permission::ModifyGlobalConfig, conn)?;

            if key.is_empty() {
                return Ok(Flash::error(
                    Redirect::to("/admin/config"),
                    "The key cannot be empty.",
                ));
            }

            diesel::insert_into(config::table)
                .values((
                    config::public_id.eq(Uuid::new_v4().to_string()),
                    config::key.eq(&key),
                    config::value.eq(&value),
                ))
                .on_conflict(config::key)
                .do_update()
                .set(config::value.eq(&value))
                .execute(conn)?;
            tracing::info!("user {} set option {key} to {value:?}", user.id);

            Ok(Flash::success(
                Redirect::to("/admin/config"),
                format!("Saved {key}."),
            ))
        })
    })
    .instrument(span.0)
    .await
}
