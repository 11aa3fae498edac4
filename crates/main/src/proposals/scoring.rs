//! Review scores of proposals, raw and renormalized.
//!
//! Reviewers grade on different internal scales: some are lenient, some
//! strict, some use the whole range and some only a corner of it. The two
//! renormalizations correct for that using every finished review a reviewer
//! has written:
//!
//! * O0 removes each reviewer's offset: a score is replaced by its distance
//!   to the reviewer's mean, shifted back onto the global mean.
//! * O1 additionally removes each reviewer's spread: the distance is divided
//!   by the reviewer's standard deviation and rescaled to the global one.

use std::collections::HashMap;

use db::proposal::Review;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Moments {
    mean: f64,
    std_dev: f64,
}

impl Moments {
    fn of(values: &[f64]) -> Option<Moments> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Moments {
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

/// Score statistics over every finished review, needed to renormalize the
/// scores of any single proposal.
#[derive(Debug, Clone, Default)]
pub struct ScoringContext {
    global: Option<Moments>,
    reviewers: HashMap<i64, Moments>,
}

/// Everything the proposal admin shows about a proposal's reviews.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProposalScores {
    pub avg: Option<f64>,
    pub renormalization_o0: Option<f64>,
    pub renormalization_o1: Option<f64>,
    pub assigned_reviews: usize,
    pub completed_reviews: usize,
}

fn scored(review: &Review) -> Option<f64> {
    if review.finished {
        review.avg()
    } else {
        None
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

impl ScoringContext {
    pub fn new(all_reviews: &[Review]) -> Self {
        let mut per_reviewer: HashMap<i64, Vec<f64>> = HashMap::new();
        let mut everything = Vec::new();
        for review in all_reviews {
            if let Some(score) = scored(review) {
                per_reviewer.entry(review.reviewer_id).or_default().push(score);
                everything.push(score);
            }
        }

        ScoringContext {
            global: Moments::of(&everything),
            reviewers: per_reviewer
                .into_iter()
                .filter_map(|(reviewer, scores)| {
                    Moments::of(&scores).map(|m| (reviewer, m))
                })
                .collect(),
        }
    }

    /// Scores of one proposal, given all of its reviews (finished or not).
    pub fn scores(&self, reviews: &[&Review]) -> ProposalScores {
        let finished = reviews
            .iter()
            .filter_map(|review| scored(review).map(|score| (*review, score)))
            .collect::<Vec<_>>();

        ProposalScores {
            avg: mean(finished.iter().map(|(_, score)| *score)),
            renormalization_o0: self.renormalized(&finished, |score, own, global| {
                score - own.mean + global.mean
            }),
            renormalization_o1: self.renormalized(&finished, |score, own, global| {
                let deviation = if own.std_dev > 0.0 {
                    (score - own.mean) / own.std_dev
                } else {
                    0.0
                };
                deviation * global.std_dev + global.mean
            }),
            assigned_reviews: reviews.len(),
            completed_reviews: reviews.iter().filter(|r| r.finished).count(),
        }
    }

    fn renormalized(
        &self,
        finished: &[(&Review, f64)],
        transform: impl Fn(f64, &Moments, &Moments) -> f64,
    ) -> Option<f64> {
        let global = self.global.as_ref()?;
        mean(finished.iter().filter_map(|(review, score)| {
            self.reviewers
                .get(&review.reviewer_id)
                .map(|own| transform(*score, own, global))
        }))
    }
}

/// Two decimals, or a dash when there is nothing to show.
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(score) => format!("{score:.2}"),
        None => "-".to_string(),
    }
}
