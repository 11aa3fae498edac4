//! The lookup tables proposals are filed under.

use db::{
    proposal::{ProposalKind, ProposalSection},
    schema::{proposal_kinds, proposal_sections},
    user::User,
    DbConn,
};
use diesel::prelude::*;
use maud::{html, Markup};
use rocket::{
    form::Form,
    request::FlashMessage,
    response::{Flash, Redirect},
    State,
};
use trace_request::TracingSpan;
use tracing::Instrument;
use ui::{flash_message, page_of_body, page_title};

use crate::{
    error::AppResult,
    forms::{input, FieldErrors, InputOpts},
    permissions::{require, Permission},
    settings::SiteConfig,
};

#[derive(FromForm, Debug)]
pub struct KindForm {
    pub name: String,
}

#[derive(FromForm, Debug)]
pub struct SectionForm {
    pub name: String,
    pub closed: bool,
}

fn name_errors(name: &str) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.require("name", name);
    errors.max_length("name", name, 100);
    errors
}

#[get("/admin/proposals/kinds")]
pub async fn kinds_page(
    site: &State<SiteConfig>,
    user: User,
    flash: Option<FlashMessage<'_>>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<Markup> {
    let site_name = site.site_name.clone();
    let flash = flash_message(flash);

    db.run(move |conn| -> AppResult<_> {
        require(&user, Permission::ManageProposals, conn)?;

        let kinds = proposal_kinds::table
            .order_by(proposal_kinds::name.asc())
            .select(ProposalKind::as_select())
            .load(conn)?;

        Ok(page_of_body(
            html! {
                (page_title("Proposal kinds"))
                (flash)
                ul class="list-group mb-4" {
                    @for kind in &kinds {
                        li class="list-group-item" { (kind.name) }
                    }
                }
                h2 { "Add a kind" }
                form method="post" action="/admin/proposals/kinds" {
                    (input("name", "Name", "", &FieldErrors::default(), InputOpts { required: true, ..Default::default() }))
                    button type="submit" class="btn btn-primary" { "Add" }
                }
            },
            Some(user),
            &site_name,
        ))
    })
    .instrument(span.0)
    .await
}

#[post("/admin/proposals/kinds", data = "<form>")]
pub async fn do_create_kind(
    user: User,
    form: Form<KindForm>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<Flash<Redirect>> {
    let name = form.into_inner().name.trim().to_string();

    db.run(move |conn| {
        conn.transaction(|conn| -> AppResult<_> {
            require(&user, Permission::ManageProposals, conn)?;

            if let Some(error) = name_errors(&name).get("name") {
                return Ok(Flash::error(
                    Redirect::to("/admin/proposals/kinds"),
                    error.to_string(),
                ));
            }

            let exists = diesel::select(diesel::dsl::exists(
                proposal_kinds::table.filter(proposal_kinds::name.eq(&name)),
            ))
            .get_result::<bool>(conn)?;
            if exists {
                return Ok(Flash::error(
                    Redirect::to("/admin/proposals/kinds"),
                    format!("A kind named \"{name}\" already exists."),
                ));
            }

            diesel::insert_into(proposal_kinds::table)
                .values(proposal_kinds::name.eq(&name))
                .execute(conn)?;
            tracing::info!("created proposal kind {name}");

            Ok(Flash::success(
                Redirect::to("/admin/proposals/kinds"),
                "Kind added.",
            ))
        })
    })
    .instrument(span.0)
    .await
}

#[get("/admin/proposals/sections")]
pub async fn sections_page(
    site: &State<SiteConfig>,
    user: User,
    flash: Option<FlashMessage<'_>>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<Markup> {
    let site_name = site.site_name.clone();
    let flash = flash_message(flash);

    db.run(move |conn| -> AppResult<_> {
        require(&user, Permission::ManageProposals, conn)?;

        let sections = proposal_sections::table
            .order_by(proposal_sections::name.asc())
            .select(ProposalSection::as_select())
            .load(conn)?;

        Ok(page_of_body(
            html! {
                (page_title("Proposal sections"))
                (flash)
                table class="table mb-4" {
                    thead {
                        tr {
                            th scope="col" { "Name" }
                            th scope="col" { "Accepting proposals" }
                        }
                    }
                    tbody {
                        @for section in &sections {
                            tr {
                                td { (section.name) }
                                td { @if section.closed { "no" } @else { "yes" } }
                            }
                        }
                    }
                }
                h2 { "Add a section" }
                form method="post" action="/admin/proposals/sections" {
                    (input("name", "Name", "", &FieldErrors::default(), InputOpts { required: true, ..Default::default() }))
                    div class="form-check mb-3" {
                        input type="checkbox" class="form-check-input" id="closed" name="closed" value="true";
                        label class="form-check-label" for="closed" { "Closed" }
                    }
                    button type="submit" class="btn btn-primary" { "Add" }
                }
            },
            Some(user),
            &site_name,
        ))
    })
    .instrument(span.0)
    .await
}

#[post("/admin/proposals/sections", data = "<form>")]
pub async fn do_create_section(
    user: User,
    form: Form<SectionForm>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<Flash<Redirect>> {
    let form = form.into_inner();
    let name = form.name.trim().to_string();

    db.run(move |conn| {
        conn.transaction(|conn| -> AppResult<_> {
            require(&user, Permission::ManageProposals, conn)?;

            if let Some(error) = name_errors(&name).get("name") {
                return Ok(Flash::error(
                    Redirect::to("/admin/proposals/sections"),
                    error.to_string(),
                ));
            }

            diesel::insert_into(proposal_sections::table)
                .values((
                    proposal_sections::name.eq(&name),
                    proposal_sections::closed.eq(form.closed),
                ))
                .execute(conn)?;
            tracing::info!("created proposal section {name}");

            Ok(Flash::success(
                Redirect::to("/admin/proposals/sections"),
                "Section added.",
            ))
        })
    })
    .instrument(span.0)
    .await
}
