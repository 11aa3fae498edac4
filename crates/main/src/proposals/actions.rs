//! Bulk actions available on the proposal list: CSV export, and the two
//! notification emails sent to speakers.

use db::{schema::proposals, user::User, DbConn};
use diesel::{prelude::*, sqlite::Sqlite};
use email::{dispatch, queue_mail, OutgoingEmail};
use maud::html;
use rocket::{
    form::Form,
    http::Header,
    response::{Flash, Redirect},
    State,
};
use trace_request::TracingSpan;
use tracing::Instrument;

use super::{load_rows, scoring::format_score, ProposalFilter, ProposalRow};
use crate::{
    error::AppResult,
    permissions::{require, Permission},
    settings::SiteConfig,
};

pub const CSV_HEADER: [&str; 13] = [
    "id",
    "title",
    "speaker",
    "speaker_email",
    "kind",
    "audience_level",
    "language",
    "avg",
    "renormalization_O0",
    "renormalization_O1",
    "assigned_reviews",
    "completed_reviews",
    "tag_list",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    ExportCsv,
    SendConfirmation,
    SendAcceptance,
}

impl BulkAction {
    pub const ALL: [BulkAction; 3] = [
        BulkAction::ExportCsv,
        BulkAction::SendConfirmation,
        BulkAction::SendAcceptance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BulkAction::ExportCsv => "csv",
            BulkAction::SendConfirmation => "confirmation",
            BulkAction::SendAcceptance => "acceptance",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BulkAction::ExportCsv => "CSV Export",
            BulkAction::SendConfirmation => "Sends confirmation email",
            BulkAction::SendAcceptance => "Sends acceptance email",
        }
    }

    pub fn from_name(name: &str) -> Option<BulkAction> {
        BulkAction::ALL.into_iter().find(|action| action.name() == name)
    }
}

#[derive(FromForm, Debug)]
pub struct BulkActionForm {
    pub action: String,
    pub selected: Vec<i64>,
}

#[derive(Responder)]
#[response(content_type = "text/csv")]
pub struct CsvDownload {
    body: String,
    disposition: Header<'static>,
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Renders the proposals as CSV, one line per proposal after the header.
pub fn export_as_csv(rows: &[ProposalRow]) -> String {
    let mut csv = CSV_HEADER.join(",");
    csv.push_str("\r\n");

    for row in rows {
        let fields = [
            row.proposal.id.to_string(),
            row.proposal.title.clone(),
            row.speaker.to_string(),
            row.speaker_email.clone().unwrap_or_default(),
            row.kind.name.clone(),
            row.proposal.audience_level.clone(),
            row.proposal.language.clone(),
            format_score(row.scores.avg),
            format_score(row.scores.renormalization_o0),
            format_score(row.scores.renormalization_o1),
            row.scores.assigned_reviews.to_string(),
            row.scores.completed_reviews.to_string(),
            row.tag_list(),
        ];
        let line = fields
            .iter()
            .map(|field| csv_field(field))
            .collect::<Vec<_>>()
            .join(",");
        csv.push_str(&line);
        csv.push_str("\r\n");
    }

    csv
}

/// Tells each speaker their proposal was received, and marks it notified.
pub fn send_confirmation(
    rows: &[ProposalRow],
    site: &SiteConfig,
    conn: &mut impl Connection<Backend = Sqlite>,
) -> QueryResult<Vec<OutgoingEmail>> {
    let mut outgoing = Vec::new();

    for row in rows {
        let Some(address) = &row.speaker_email else {
            tracing::warn!(
                "proposal {} has no speaker email, not confirming",
                row.proposal.id
            );
            continue;
        };

        let html = html! {
            p { "Hello " (row.speaker.name) "," }
            p {
                "We have received your proposal \"" (row.proposal.title) "\" for "
                (site.site_name) ". Thank you for submitting it!"
            }
            p { "We will let you know once the review is over." }
        };
        let text = format!(
            "Hello {},\n\n\
             We have received your proposal \"{}\" for {}. Thank you for submitting it!\n\n\
             We will let you know once the review is over.\n",
            row.speaker.name, row.proposal.title, site.site_name
        );
        outgoing.push(queue_mail(
            vec![(row.speaker.name.as_str(), address.as_str())],
            &format!("{}: proposal received", site.site_name),
            &html.into_string(),
            &text,
            conn,
        )?);

        diesel::update(proposals::table)
            .filter(proposals::id.eq(row.proposal.id))
            .set(proposals::notified.eq(true))
            .execute(conn)?;
    }

    Ok(outgoing)
}

/// Tells the speakers of accepted proposals the good news. Proposals that are
/// not accepted, or whose speaker was already told, are skipped.
pub fn send_acceptance(
    rows: &[ProposalRow],
    site: &SiteConfig,
    conn: &mut impl Connection<Backend = Sqlite>,
) -> QueryResult<Vec<OutgoingEmail>> {
    let mut outgoing = Vec::new();

    for row in rows {
        if !row.proposal.accepted || row.proposal.accepted_notified {
            continue;
        }
        let Some(address) = &row.speaker_email else {
            tracing::warn!(
                "proposal {} has no speaker email, not sending acceptance",
                row.proposal.id
            );
            continue;
        };

        let html = html! {
            p { "Hello " (row.speaker.name) "," }
            p {
                "Congratulations! Your proposal \"" (row.proposal.title) "\" has been accepted for "
                (site.site_name) "."
            }
            p { "We will be in touch soon with the details of your slot." }
        };
        let text = format!(
            "Hello {},\n\n\
             Congratulations! Your proposal \"{}\" has been accepted for {}.\n\n\
             We will be in touch soon with the details of your slot.\n",
            row.speaker.name, row.proposal.title, site.site_name
        );
        outgoing.push(queue_mail(
            vec![(row.speaker.name.as_str(), address.as_str())],
            &format!("{}: proposal accepted", site.site_name),
            &html.into_string(),
            &text,
            conn,
        )?);

        diesel::update(proposals::table)
            .filter(proposals::id.eq(row.proposal.id))
            .set(proposals::accepted_notified.eq(true))
            .execute(conn)?;
    }

    Ok(outgoing)
}

enum Outcome {
    Csv(String),
    Sent(BulkAction, Vec<OutgoingEmail>),
}

#[post("/admin/proposals/actions", data = "<form>")]
pub async fn do_bulk_action(
    user: User,
    form: Form<BulkActionForm>,
    site: &State<SiteConfig>,
    db: DbConn,
    span: TracingSpan,
) -> AppResult<Result<CsvDownload, Flash<Redirect>>> {
    let form = form.into_inner();
    let Some(action) = BulkAction::from_name(&form.action) else {
        return Ok(Err(Flash::error(
            Redirect::to("/admin/proposals"),
            "Unknown action.",
        )));
    };
    if form.selected.is_empty() {
        return Ok(Err(Flash::error(
            Redirect::to("/admin/proposals"),
            "Select at least one proposal.",
        )));
    }
    let site = site.inner().clone();

    let outcome = db
        .run(move |conn| {
            conn.transaction(|conn| -> AppResult<_> {
                require(&user, Permission::ManageProposals, conn)?;
                let rows = load_rows(
                    &ProposalFilter::default(),
                    Some(form.selected.as_slice()),
                    conn,
                )?;
                tracing::info!(
                    "running {} on {} proposals",
                    action.name(),
                    rows.len()
                );

                Ok(match action {
                    BulkAction::ExportCsv => Outcome::Csv(export_as_csv(&rows)),
                    BulkAction::SendConfirmation => Outcome::Sent(
                        action,
                        send_confirmation(&rows, &site, conn)?,
                    ),
                    BulkAction::SendAcceptance => Outcome::Sent(
                        action,
                        send_acceptance(&rows, &site, conn)?,
                    ),
                })
            })
        })
        .instrument(span.0)
        .await?;

    match outcome {
        Outcome::Csv(body) => Ok(Ok(CsvDownload {
            body,
            disposition: Header::new(
                "Content-Disposition",
                "attachment; filename=\"proposals.csv\"",
            ),
        })),
        Outcome::Sent(action, outgoing) => {
            let n = outgoing.len();
            dispatch(outgoing).await;
            Ok(Err(Flash::success(
                Redirect::to("/admin/proposals"),
                format!("{}: {n} emails sent.", action.label()),
            )))
        }
    }
}
