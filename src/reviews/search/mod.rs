//! The proposal search engine used by organizers to review an event's
//! submissions. All operations run the team-membership guard before touching
//! any proposal data, and shape their rows according to the event's
//! `display_proposals_speakers` / `display_proposals_reviews` flags.

use axum::extract::{Path, Query};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use hypertext::prelude::*;
use serde::Serialize;

use crate::{
    auth::User,
    events::Event,
    proposals::Proposal,
    reviews::{FEELING_NEGATIVE, FEELING_POSITIVE, Review},
    schema::{proposal_categories, proposal_formats, proposal_speakers,
             proposals, reviews, users},
    state::Conn,
    teams::Team,
    template::Page,
    util_resp::{FailureResponse, StandardResponse, success},
};

pub mod exports;
pub mod filters;

use filters::ProposalsFilters;

pub const RESULTS_PER_PAGE: i64 = 25;

#[derive(Debug, Serialize, PartialEq)]
pub struct SearchResults {
    pub results: Vec<ProposalRow>,
    pub filters: ProposalsFilters,
    pub statistics: Statistics,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Statistics {
    pub reviewed: i64,
    pub total: i64,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub current: i64,
    pub total: i64,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRow {
    pub id: String,
    pub title: String,
    pub deliberation_status: String,
    pub confirmation_status: Option<String>,
    pub publication_status: String,
    /// Empty (not absent) when the event hides speakers from reviewers.
    pub speakers: Vec<SpeakerDisplay>,
    pub reviews: RowReviews,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SpeakerDisplay {
    pub name: String,
    pub picture: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RowReviews {
    /// Omitted when the event hides review summaries. The caller's own
    /// review stays visible regardless, since it only reflects their own
    /// input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ReviewSummary>,
    pub you: UserReview,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ReviewSummary {
    pub positives: i64,
    pub negatives: i64,
    pub average: Option<f64>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UserReview {
    pub note: Option<i64>,
    pub feeling: Option<String>,
    pub comment: Option<String>,
}

pub fn summarize(proposal_reviews: &[Review]) -> ReviewSummary {
    let positives = proposal_reviews
        .iter()
        .filter(|r| r.feeling == FEELING_POSITIVE)
        .count() as i64;
    let negatives = proposal_reviews
        .iter()
        .filter(|r| r.feeling == FEELING_NEGATIVE)
        .count() as i64;

    let notes: Vec<i64> =
        proposal_reviews.iter().filter_map(|r| r.note).collect();
    let average = (!notes.is_empty())
        .then(|| notes.iter().sum::<i64>() as f64 / notes.len() as f64);

    ReviewSummary {
        positives,
        negatives,
        average,
    }
}

/// Searches an event's proposals on behalf of one requesting user. Bound to
/// its scope at construction; no queries run until an operation is invoked.
pub struct ReviewsSearch {
    user_id: String,
    team_slug: String,
    event_slug: String,
}

impl ReviewsSearch {
    pub fn new(user_id: &str, team_slug: &str, event_slug: &str) -> Self {
        ReviewsSearch {
            user_id: user_id.to_string(),
            team_slug: team_slug.to_string(),
            event_slug: event_slug.to_string(),
        }
    }

    pub(in crate::reviews::search) fn allowed_event(
        &self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Event, FailureResponse> {
        Event::for_member(
            &self.user_id,
            &self.team_slug,
            &self.event_slug,
            conn,
        )
    }

    /// Builds the filtered proposal query for the event. Every operation
    /// (search, statistics, exports) starts from this so they always agree
    /// on what matches.
    pub(in crate::reviews::search) fn filtered(
        event: &Event,
        filters: &ProposalsFilters,
    ) -> proposals::BoxedQuery<'static, Sqlite> {
        let mut query = proposals::table
            .filter(proposals::event_id.eq(event.id.clone()))
            .into_boxed();

        if let Some(status) = filters.status {
            query = query.filter(
                proposals::deliberation_status.eq(status.as_db_value()),
            );
        }

        if let Some(format) = &filters.format {
            query = query.filter(diesel::dsl::exists(
                proposal_formats::table.filter(
                    proposal_formats::proposal_id
                        .eq(proposals::id)
                        .and(proposal_formats::format_id.eq(format.clone())),
                ),
            ));
        }

        if let Some(category) = &filters.category {
            query = query.filter(diesel::dsl::exists(
                proposal_categories::table.filter(
                    proposal_categories::proposal_id
                        .eq(proposals::id)
                        .and(
                            proposal_categories::category_id
                                .eq(category.clone()),
                        ),
                ),
            ));
        }

        if let Some(text) = &filters.query {
            // Sqlite's LIKE is case-insensitive for ascii.
            let pattern = format!("%{text}%");

            if event.display_proposals_speakers {
                query = query.filter(
                    proposals::title.like(pattern.clone()).or(
                        diesel::dsl::exists(
                            proposal_speakers::table
                                .inner_join(users::table)
                                .filter(
                                    proposal_speakers::proposal_id
                                        .eq(proposals::id)
                                        .and(users::name.like(pattern)),
                                ),
                        ),
                    ),
                );
            } else {
                // Hidden speakers must not be discoverable by name; only
                // the title match path remains.
                query = query.filter(proposals::title.like(pattern));
            }
        }

        query
    }

    #[tracing::instrument(skip(self, conn), fields(event = %self.event_slug))]
    pub fn search(
        &self,
        filters: ProposalsFilters,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<SearchResults, FailureResponse> {
        let event = self.allowed_event(&mut *conn)?;
        let filters = filters.normalize();

        let total: i64 = Self::filtered(&event, &filters)
            .count()
            .get_result(&mut *conn)
            .unwrap();

        let reviewed: i64 = Self::filtered(&event, &filters)
            .filter(diesel::dsl::exists(
                reviews::table.filter(
                    reviews::proposal_id
                        .eq(proposals::id)
                        .and(reviews::user_id.eq(self.user_id.clone())),
                ),
            ))
            .count()
            .get_result(&mut *conn)
            .unwrap();

        let page = filters.page();

        let page_proposals = Self::filtered(&event, &filters)
            .order(proposals::created_at.desc())
            .limit(RESULTS_PER_PAGE)
            .offset((page - 1) * RESULTS_PER_PAGE)
            .load::<Proposal>(&mut *conn)
            .unwrap();

        let results = page_proposals
            .iter()
            .map(|proposal| self.shape_row(&event, proposal, &mut *conn))
            .collect();

        Ok(SearchResults {
            results,
            statistics: Statistics { reviewed, total },
            pagination: Pagination {
                current: page,
                total: (total + RESULTS_PER_PAGE - 1) / RESULTS_PER_PAGE,
            },
            filters,
        })
    }

    /// The visibility flags are consulted here, and only here, so the
    /// present-but-empty (speakers) versus absent-key (review summary)
    /// distinction lives in one place.
    fn shape_row(
        &self,
        event: &Event,
        proposal: &Proposal,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> ProposalRow {
        let speakers = if event.display_proposals_speakers {
            proposal_speakers::table
                .inner_join(users::table)
                .filter(proposal_speakers::proposal_id.eq(&proposal.id))
                .select((users::name, users::picture))
                .order(users::name.asc())
                .load::<(String, Option<String>)>(&mut *conn)
                .unwrap()
                .into_iter()
                .map(|(name, picture)| SpeakerDisplay { name, picture })
                .collect()
        } else {
            Vec::new()
        };

        let proposal_reviews = Review::of_proposal(&proposal.id, &mut *conn);

        let summary = event
            .display_proposals_reviews
            .then(|| summarize(&proposal_reviews));

        let you = proposal_reviews
            .iter()
            .find(|r| r.user_id == self.user_id)
            .map(|r| UserReview {
                note: r.note,
                feeling: Some(r.feeling.clone()),
                comment: r.comment.clone(),
            })
            .unwrap_or(UserReview {
                note: None,
                feeling: None,
                comment: None,
            });

        ProposalRow {
            id: proposal.id.clone(),
            title: proposal.title.clone(),
            deliberation_status: proposal.deliberation_status.clone(),
            confirmation_status: proposal.confirmation_status.clone(),
            publication_status: proposal.publication_status.clone(),
            speakers,
            reviews: RowReviews { summary, you },
        }
    }
}

pub async fn reviews_page(
    Path((team_slug, event_slug)): Path<(String, String)>,
    user: User<true>,
    Query(filters): Query<ProposalsFilters>,
    mut conn: Conn<true>,
) -> StandardResponse {
    let search = ReviewsSearch::new(&user.id, &team_slug, &event_slug);
    let found = search.search(filters, &mut *conn)?;

    let team = Team::fetch_by_slug(&team_slug, &mut *conn)?;
    let event = Event::fetch_by_slug(&event_slug, &mut *conn)?;

    success(
        Page::new()
            .user(user)
            .team(team)
            .event(event.clone())
            .body(maud! {
                h1 { (event.name) }
                p class="text-muted" {
                    (found.statistics.reviewed) " of " (found.statistics.total)
                    " proposals reviewed by you"
                }
                form method="get" class="row g-2 mb-4" {
                    div class="col-auto" {
                        input type="text" class="form-control" name="query"
                            placeholder="Search by title or speaker"
                            value=(found.filters.query.as_deref().unwrap_or(""));
                    }
                    div class="col-auto" {
                        select class="form-select" name="status" {
                            option value="" { "All statuses" }
                            option value="pending" { "Pending" }
                            option value="accepted" { "Accepted" }
                            option value="rejected" { "Rejected" }
                        }
                    }
                    div class="col-auto" {
                        button type="submit" class="btn btn-primary" { "Filter" }
                    }
                    div class="col-auto" {
                        a class="btn btn-outline-secondary"
                          href=(format!("/team/{team_slug}/{event_slug}/export/json")) {
                            "Export JSON"
                        }
                        " "
                        a class="btn btn-outline-secondary"
                          href=(format!("/team/{team_slug}/{event_slug}/export/cards.csv")) {
                            "Export CSV"
                        }
                    }
                }
                table class="table" {
                    thead {
                        tr {
                            th { "Title" }
                            th { "Speakers" }
                            th { "Status" }
                            th { "Reviews" }
                            th { "Your review" }
                        }
                    }
                    tbody {
                        @for row in &found.results {
                            tr {
                                td { (row.title) }
                                td {
                                    @for speaker in &row.speakers {
                                        span class="me-2" { (speaker.name) }
                                    }
                                }
                                td { (row.deliberation_status) }
                                td {
                                    @if let Some(summary) = &row.reviews.summary {
                                        "+" (summary.positives)
                                        " / -" (summary.negatives)
                                        @if let Some(average) = summary.average {
                                            (format!(" (avg {average:.1})"))
                                        }
                                    }
                                }
                                td {
                                    form method="post"
                                        action=(format!("/team/{team_slug}/{event_slug}/review/{}", row.id))
                                        class="d-flex gap-1" {
                                        select class="form-select form-select-sm" name="feeling" {
                                            option value="NEUTRAL" { "Neutral" }
                                            option value="POSITIVE" { "Positive" }
                                            option value="NEGATIVE" { "Negative" }
                                        }
                                        input type="number" class="form-control form-control-sm"
                                            name="note" min="0" max="5"
                                            value=(row.reviews.you.note.map(|n| n.to_string()).unwrap_or_default());
                                        button type="submit" class="btn btn-sm btn-primary" { "Save" }
                                    }
                                }
                            }
                        }
                    }
                }
                nav {
                    ul class="pagination" {
                        @if found.pagination.current > 1 {
                            li class="page-item" {
                                a class="page-link"
                                  href=(format!("?page={}", found.pagination.current - 1)) {
                                    "Previous"
                                }
                            }
                        }
                        li class="page-item disabled" {
                            span class="page-link" {
                                "Page " (found.pagination.current)
                                " of " (found.pagination.total.max(1))
                            }
                        }
                        @if found.pagination.current < found.pagination.total {
                            li class="page-item" {
                                a class="page-link"
                                  href=(format!("?page={}", found.pagination.current + 1)) {
                                    "Next"
                                }
                            }
                        }
                    }
                }
            })
            .render(),
    )
}
