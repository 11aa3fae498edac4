use db::{user::User, DbConn};
use maud::{html, Markup};
use rocket::State;
use trace_request::TracingSpan;
use tracing::Instrument;
use ui::{page_of_body, page_title};

use crate::{
    error::AppResult,
    permissions::{require, Permission},
    settings::SiteConfig,
};

pub mod config;

#[get("/admin")]
pub async fn admin_overview(
    site: &State<SiteConfig>,
    user: User,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<Markup> {
    let site_name = site.site_name.clone();
    db.run(move |conn| -> AppResult<_> {
        require(&user, Permission::ModifyGlobalConfig, conn)?;

        Ok(page_of_body(
            html! {
                (page_title("Admin page"))
                ul class="list-group" {
                    li class="list-group-item" {
                        a href="/admin/proposals" { "Proposals" }
                    }
                    li class="list-group-item" {
                        a href="/admin/proposals/kinds" { "Proposal kinds" }
                    }
                    li class="list-group-item" {
                        a href="/admin/proposals/sections" { "Proposal sections" }
                    }
                    li class="list-group-item" {
                        a href="/admin/config" { "Site options" }
                    }
                    li class="list-group-item" {
                        a href="/schedule" { "Schedule preview" }
                    }
                }
            },
            Some(user),
            &site_name,
        ))
    })
    .instrument(span.0)
    .await
}
