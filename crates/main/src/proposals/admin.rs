use db::{
    proposal::ProposalKind, schema::proposal_kinds, user::User, DbConn,
};
use diesel::prelude::*;
use maud::{html, Markup};
use rocket::{request::FlashMessage, State};
use trace_request::TracingSpan;
use tracing::Instrument;
use ui::{flash_message, page_of_body, page_title};

use super::{
    actions::BulkAction,
    load_rows,
    scoring::format_score,
    ProposalFilter, ProposalRow,
};
use crate::{
    error::AppResult,
    permissions::{require, Permission},
    settings::SiteConfig,
};

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn bool_filter(name: &str, label: &str, current: Option<bool>) -> Markup {
    html! {
        div class="col-auto" {
            label for=(name) class="form-label" { (label) }
            select class="form-select" id=(name) name=(name) {
                option value="" selected[current.is_none()] { "All" }
                option value="true" selected[current == Some(true)] { "Yes" }
                option value="false" selected[current == Some(false)] { "No" }
            }
        }
    }
}

fn filter_form(filter: &ProposalFilter, kinds: &[ProposalKind]) -> Markup {
    html! {
        form method="get" action="/admin/proposals" class="row g-3 mb-4" {
            div class="col-auto" {
                label for="kind" class="form-label" { "Kind" }
                select class="form-select" id="kind" name="kind" {
                    option value="" selected[filter.kind.is_none()] { "All" }
                    @for kind in kinds {
                        option value=(kind.name) selected[filter.kind.as_deref() == Some(kind.name.as_str())] {
                            (kind.name)
                        }
                    }
                }
            }
            (bool_filter("notified", "Notified", filter.notified))
            (bool_filter("accepted", "Accepted", filter.accepted))
            div class="col-auto align-self-end" {
                button type="submit" class="btn btn-secondary" { "Filter" }
            }
        }
    }
}

fn proposal_table(rows: &[ProposalRow]) -> Markup {
    html! {
        form method="post" action="/admin/proposals/actions" {
            div class="row g-3 mb-3" {
                div class="col-auto" {
                    select class="form-select" name="action" {
                        @for action in BulkAction::ALL {
                            option value=(action.name()) { (action.label()) }
                        }
                    }
                }
                div class="col-auto" {
                    button type="submit" class="btn btn-primary" { "Go" }
                }
            }
            table class="table table-sm table-striped" {
                thead {
                    tr {
                        th scope="col" {}
                        th scope="col" { "ID" }
                        th scope="col" { "Title" }
                        th scope="col" { "Speaker" }
                        th scope="col" { "Speaker email" }
                        th scope="col" { "Kind" }
                        th scope="col" { "Audience level" }
                        th scope="col" { "Language" }
                        th scope="col" { "Tags" }
                        th scope="col" { "Average" }
                        th scope="col" { "O0" }
                        th scope="col" { "O1" }
                        th scope="col" { "Assigned reviews" }
                        th scope="col" { "Completed reviews" }
                        th scope="col" { "Notified" }
                        th scope="col" { "Accepted" }
                        th scope="col" { "Acceptance notified" }
                    }
                }
                tbody {
                    @for row in rows {
                        tr {
                            td {
                                input type="checkbox" class="form-check-input" name="selected" value=(row.proposal.id);
                            }
                            td { (row.proposal.id) }
                            td { (row.proposal.title) }
                            td { (row.speaker.to_string()) }
                            td { (row.speaker_email.as_deref().unwrap_or("")) }
                            td { (row.kind.name) }
                            td { (row.proposal.audience_level) }
                            td { (row.proposal.language) }
                            td { (row.tag_list()) }
                            td { (format_score(row.scores.avg)) }
                            td { (format_score(row.scores.renormalization_o0)) }
                            td { (format_score(row.scores.renormalization_o1)) }
                            td { (row.scores.assigned_reviews) }
                            td { (row.scores.completed_reviews) }
                            td { (yes_no(row.proposal.notified)) }
                            td { (yes_no(row.proposal.accepted)) }
                            td { (yes_no(row.proposal.accepted_notified)) }
                        }
                    }
                }
            }
        }
    }
}

#[get("/admin/proposals?<filter..>")]
pub async fn proposal_list_page(
    site: &State<SiteConfig>,
    user: User,
    filter: ProposalFilter,
    flash: Option<FlashMessage<'_>>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<Markup> {
    let site_name = site.site_name.clone();
    let flash = flash_message(flash);
    let filter = ProposalFilter {
        kind: filter.kind.filter(|kind| !kind.is_empty()),
        ..filter
    };

    db.run(move |conn| -> AppResult<_> {
        require(&user, Permission::ManageProposals, conn)?;

        let kinds = proposal_kinds::table
            .order_by(proposal_kinds::name.asc())
            .select(ProposalKind::as_select())
            .load(conn)?;
        let rows = load_rows(&filter, None, conn)?;

        Ok(page_of_body(
            html! {
                (page_title("Proposals"))
                (flash)
                p {
                    a href="/admin/proposals/kinds" { "Proposal kinds" }
                    " · "
                    a href="/admin/proposals/sections" { "Proposal sections" }
                }
                (filter_form(&filter, &kinds))
                p class="text-muted" { (rows.len()) " proposals" }
                (proposal_table(&rows))
            },
            Some(user),
            &site_name,
        ))
    })
    .instrument(span.0)
    .await
}
