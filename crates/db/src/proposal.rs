use std::collections::HashMap;

use chrono::NaiveDateTime;
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::Serialize;

use crate::schema::{
    proposal_kinds, proposal_sections, proposal_tags, proposals, reviews, tags,
};

#[derive(Debug, Queryable, Selectable, Serialize, Clone, PartialEq, Eq)]
#[diesel(table_name = proposal_kinds)]
pub struct ProposalKind {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Queryable, Selectable, Serialize, Clone, PartialEq, Eq)]
#[diesel(table_name = proposal_sections)]
pub struct ProposalSection {
    pub id: i64,
    pub name: String,
    pub closed: bool,
}

/// A submission to the call for proposals.
#[derive(Debug, Queryable, Selectable, Serialize, Clone, PartialEq, Eq)]
#[diesel(table_name = proposals)]
pub struct Proposal {
    pub id: i64,
    pub speaker_id: i64,
    pub kind_id: i64,
    pub section_id: i64,
    pub title: String,
    pub description: String,
    pub summary: String,
    pub audience_level: String,
    pub language: String,
    /// The speaker has been told their proposal was received.
    pub notified: bool,
    pub accepted: bool,
    /// The speaker has been told their proposal was accepted.
    pub accepted_notified: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Queryable, Selectable, Serialize, Clone, PartialEq, Eq)]
#[diesel(table_name = tags)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// One reviewer's assessment of a proposal. A review exists (is "assigned")
/// before it is finished.
#[derive(Debug, Queryable, Selectable, Serialize, Clone, PartialEq, Eq)]
#[diesel(table_name = reviews)]
pub struct Review {
    pub id: i64,
    pub proposal_id: i64,
    pub reviewer_id: i64,
    pub relevance: Option<i64>,
    pub interest: Option<i64>,
    pub newness: Option<i64>,
    pub notes: String,
    pub finished: bool,
    pub created_at: NaiveDateTime,
}

impl Review {
    /// Mean of whichever scores the reviewer filled in.
    pub fn avg(&self) -> Option<f64> {
        let scores = [self.relevance, self.interest, self.newness]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        if scores.is_empty() {
            return None;
        }
        Some(scores.iter().sum::<i64>() as f64 / scores.len() as f64)
    }
}

/// Tags of each of the given proposals, alphabetically.
pub fn tags_of_proposals(
    proposal_ids: &[i64],
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> QueryResult<HashMap<i64, Vec<Tag>>> {
    let rows = proposal_tags::table
        .inner_join(tags::table)
        .filter(proposal_tags::proposal_id.eq_any(proposal_ids))
        .order_by(tags::name.asc())
        .select((proposal_tags::proposal_id, Tag::as_select()))
        .load::<(i64, Tag)>(conn)?;

    let mut by_proposal: HashMap<i64, Vec<Tag>> = HashMap::new();
    for (proposal_id, tag) in rows {
        by_proposal.entry(proposal_id).or_default().push(tag);
    }
    Ok(by_proposal)
}

/// Every review in the database. Renormalized scores depend on how each
/// reviewer scored all the proposals they reviewed, not only the ones being
/// displayed.
pub fn all_reviews(
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> QueryResult<Vec<Review>> {
    reviews::table
        .order_by(reviews::id.asc())
        .select(Review::as_select())
        .load(conn)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::Review;

    #[test]
    fn review_avg_ignores_missing_scores() {
        let review = Review {
            id: 1,
            proposal_id: 1,
            reviewer_id: 1,
            relevance: Some(4),
            interest: None,
            newness: Some(1),
            notes: String::new(),
            finished: true,
            created_at: NaiveDateTime::default(),
        };
        assert_eq!(review.avg(), Some(2.5));

        let empty = Review {
            relevance: None,
            newness: None,
            ..review
        };
        assert_eq!(empty.avg(), None);
    }
}
