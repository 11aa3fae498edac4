//! Administration of the call for proposals.

use db::{
    proposal::{all_reviews, tags_of_proposals, Proposal, ProposalKind, Tag},
    schema::{proposal_kinds, proposals, speakers, users},
    speaker::Speaker,
};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use itertools::Itertools;

use scoring::{ProposalScores, ScoringContext};

pub mod actions;
pub mod admin;
pub mod kinds;
pub mod scoring;

/// Which proposals the admin list shows.
#[derive(Debug, Default, Clone, FromForm)]
pub struct ProposalFilter {
    /// Name of a proposal kind.
    pub kind: Option<String>,
    pub notified: Option<bool>,
    pub accepted: Option<bool>,
}

/// A proposal with everything shown about it in the admin list and the CSV
/// export.
#[derive(Debug, Clone)]
pub struct ProposalRow {
    pub proposal: Proposal,
    pub speaker: Speaker,
    pub speaker_email: Option<String>,
    pub kind: ProposalKind,
    pub tags: Vec<Tag>,
    pub scores: ProposalScores,
}

impl ProposalRow {
    pub fn tag_list(&self) -> String {
        self.tags.iter().map(|tag| tag.name.as_str()).join(", ")
    }
}

/// Loads the proposals matching `filter`, or only those in `ids` when given,
/// ordered by id.
pub fn load_rows(
    filter: &ProposalFilter,
    ids: Option<&[i64]>,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> QueryResult<Vec<ProposalRow>> {
    let mut query = proposals::table
        .inner_join(speakers::table.left_join(users::table))
        .inner_join(proposal_kinds::table)
        .order_by(proposals::id.asc())
        .select((
            Proposal::as_select(),
            Speaker::as_select(),
            users::email.nullable(),
            ProposalKind::as_select(),
        ))
        .into_boxed();

    if let Some(kind) = &filter.kind {
        query = query.filter(proposal_kinds::name.eq(kind.clone()));
    }
    if let Some(notified) = filter.notified {
        query = query.filter(proposals::notified.eq(notified));
    }
    if let Some(accepted) = filter.accepted {
        query = query.filter(proposals::accepted.eq(accepted));
    }
    if let Some(ids) = ids {
        query = query.filter(proposals::id.eq_any(ids.to_vec()));
    }

    let loaded = query
        .load::<(Proposal, Speaker, Option<String>, ProposalKind)>(conn)?;

    let proposal_ids = loaded.iter().map(|(p, ..)| p.id).collect::<Vec<_>>();
    let mut tags = tags_of_proposals(&proposal_ids, conn)?;
    let reviews = all_reviews(conn)?;
    let context = ScoringContext::new(&reviews);

    Ok(loaded
        .into_iter()
        .map(|(proposal, speaker, account_email, kind)| {
            let own_reviews = reviews
                .iter()
                .filter(|review| review.proposal_id == proposal.id)
                .collect::<Vec<_>>();
            ProposalRow {
                scores: context.scores(&own_reviews),
                tags: tags.remove(&proposal.id).unwrap_or_default(),
                speaker_email: speaker.email_given_account(account_email),
                proposal,
                speaker,
                kind,
            }
        })
        .collect())
}
