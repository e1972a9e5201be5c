//! Proposal exports for organizers. Both exports apply the same membership
//! guard and filters as the interactive search, but return every matching
//! proposal rather than one page. Hidden speakers and hidden review summaries
//! are omitted as keys entirely, unlike the search rows.

use axum::{
    Json,
    extract::{Path, Query},
    http::header::{self, HeaderName},
};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use itertools::Itertools;
use serde::Serialize;

use crate::{
    auth::User,
    proposals::Proposal,
    reviews::Review,
    schema::{
        event_categories, event_formats, proposal_categories,
        proposal_formats, proposal_speakers, proposals, users,
    },
    state::Conn,
    util_resp::FailureResponse,
};

use super::{ReviewSummary, ReviewsSearch, filters::ProposalsFilters, summarize};

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JsonExportRow {
    pub id: String,
    pub title: String,
    pub deliberation_status: String,
    pub confirmation_status: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_: String,
    pub comments: Option<String>,
    pub languages: serde_json::Value,
    pub references: Option<String>,
    pub level: Option<String>,
    pub categories: Vec<String>,
    pub formats: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<ReviewSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speakers: Option<Vec<SpeakerProfile>>,
}

/// The full speaker profile included in the JSON export. Organizers use this
/// to build their programme, so unlike the search rows it carries contact
/// details rather than just a display name.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerProfile {
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub picture: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub references: Option<String>,
    pub socials: serde_json::Value,
}

/// A condensed row for printable review cards.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardsExportRow {
    pub id: String,
    pub title: String,
    pub languages: serde_json::Value,
    pub level: Option<String>,
    pub categories: Vec<String>,
    pub formats: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<ReviewSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speakers: Option<Vec<String>>,
}

type SpeakerRecord = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
);

fn category_names(
    proposal_id: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Vec<String> {
    proposal_categories::table
        .inner_join(event_categories::table)
        .filter(proposal_categories::proposal_id.eq(proposal_id))
        .select(event_categories::name)
        .order(event_categories::name.asc())
        .load::<String>(&mut *conn)
        .unwrap()
}

fn format_names(
    proposal_id: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Vec<String> {
    proposal_formats::table
        .inner_join(event_formats::table)
        .filter(proposal_formats::proposal_id.eq(proposal_id))
        .select(event_formats::name)
        .order(event_formats::name.asc())
        .load::<String>(&mut *conn)
        .unwrap()
}

impl ReviewsSearch {
    fn matching_proposals(
        &self,
        filters: ProposalsFilters,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<(crate::events::Event, Vec<Proposal>), FailureResponse> {
        let event = self.allowed_event(&mut *conn)?;
        let filters = filters.normalize();

        let matching = Self::filtered(&event, &filters)
            .order(proposals::created_at.desc())
            .load::<Proposal>(&mut *conn)
            .unwrap();

        Ok((event, matching))
    }

    #[tracing::instrument(skip(self, conn))]
    pub fn for_json_export(
        &self,
        filters: ProposalsFilters,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Vec<JsonExportRow>, FailureResponse> {
        let (event, matching) = self.matching_proposals(filters, &mut *conn)?;

        let rows = matching
            .into_iter()
            .map(|proposal| {
                let speakers = event.display_proposals_speakers.then(|| {
                    proposal_speakers::table
                        .inner_join(users::table)
                        .filter(
                            proposal_speakers::proposal_id.eq(&proposal.id),
                        )
                        .select((
                            users::name,
                            users::email,
                            users::bio,
                            users::picture,
                            users::company,
                            users::address,
                            users::references,
                            users::socials,
                        ))
                        .order(users::name.asc())
                        .load::<SpeakerRecord>(&mut *conn)
                        .unwrap()
                        .into_iter()
                        .map(
                            |(
                                name,
                                email,
                                bio,
                                picture,
                                company,
                                address,
                                references,
                                socials,
                            )| SpeakerProfile {
                                name,
                                email,
                                bio,
                                picture,
                                company,
                                address,
                                references,
                                socials: serde_json::from_str(&socials)
                                    .unwrap_or_default(),
                            },
                        )
                        .collect()
                });

                let reviews = event.display_proposals_reviews.then(|| {
                    summarize(&Review::of_proposal(&proposal.id, &mut *conn))
                });

                JsonExportRow {
                    categories: category_names(&proposal.id, &mut *conn),
                    formats: format_names(&proposal.id, &mut *conn),
                    id: proposal.id,
                    title: proposal.title,
                    deliberation_status: proposal.deliberation_status,
                    confirmation_status: proposal.confirmation_status,
                    abstract_: proposal.abstract_,
                    comments: proposal.comments,
                    languages: serde_json::from_str(&proposal.languages)
                        .unwrap_or_default(),
                    references: proposal.references,
                    level: proposal.level,
                    reviews,
                    speakers,
                }
            })
            .collect();

        Ok(rows)
    }

    #[tracing::instrument(skip(self, conn))]
    pub fn for_cards_export(
        &self,
        filters: ProposalsFilters,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Vec<CardsExportRow>, FailureResponse> {
        let (event, matching) = self.matching_proposals(filters, &mut *conn)?;

        let rows = matching
            .into_iter()
            .map(|proposal| {
                let speakers = event.display_proposals_speakers.then(|| {
                    proposal_speakers::table
                        .inner_join(users::table)
                        .filter(
                            proposal_speakers::proposal_id.eq(&proposal.id),
                        )
                        .select(users::name)
                        .order(users::name.asc())
                        .load::<String>(&mut *conn)
                        .unwrap()
                });

                let reviews = event.display_proposals_reviews.then(|| {
                    summarize(&Review::of_proposal(&proposal.id, &mut *conn))
                });

                CardsExportRow {
                    categories: category_names(&proposal.id, &mut *conn),
                    formats: format_names(&proposal.id, &mut *conn),
                    id: proposal.id,
                    title: proposal.title,
                    languages: serde_json::from_str(&proposal.languages)
                        .unwrap_or_default(),
                    level: proposal.level,
                    reviews,
                    speakers,
                }
            })
            .collect();

        Ok(rows)
    }
}

#[tracing::instrument(skip(conn))]
pub async fn export_json(
    Path((team_slug, event_slug)): Path<(String, String)>,
    user: User<true>,
    Query(filters): Query<ProposalsFilters>,
    mut conn: Conn<true>,
) -> Result<Json<Vec<JsonExportRow>>, FailureResponse> {
    let rows = ReviewsSearch::new(&user.id, &team_slug, &event_slug)
        .for_json_export(filters, &mut *conn)?;

    Ok(Json(rows))
}

fn languages_column(languages: &serde_json::Value) -> String {
    match languages {
        serde_json::Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| entry.as_str())
            .join(", "),
        _ => String::new(),
    }
}

#[tracing::instrument(skip(conn))]
pub async fn export_cards_csv(
    Path((team_slug, event_slug)): Path<(String, String)>,
    user: User<true>,
    Query(filters): Query<ProposalsFilters>,
    mut conn: Conn<true>,
) -> Result<([(HeaderName, &'static str); 1], String), FailureResponse> {
    let rows = ReviewsSearch::new(&user.id, &team_slug, &event_slug)
        .for_cards_export(filters, &mut *conn)?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "id",
            "title",
            "languages",
            "level",
            "categories",
            "formats",
            "positives",
            "negatives",
            "average",
            "speakers",
        ])
        .map_err(|_| FailureResponse::ServerError(()))?;

    for row in rows {
        let (positives, negatives, average) = match &row.reviews {
            Some(summary) => (
                summary.positives.to_string(),
                summary.negatives.to_string(),
                summary
                    .average
                    .map(|avg| format!("{avg:.2}"))
                    .unwrap_or_default(),
            ),
            None => (String::new(), String::new(), String::new()),
        };

        writer
            .write_record([
                row.id.as_str(),
                row.title.as_str(),
                &languages_column(&row.languages),
                row.level.as_deref().unwrap_or(""),
                &row.categories.iter().join(", "),
                &row.formats.iter().join(", "),
                &positives,
                &negatives,
                &average,
                &row.speakers
                    .as_deref()
                    .map(|names| names.iter().join(", "))
                    .unwrap_or_default(),
            ])
            .map_err(|_| FailureResponse::ServerError(()))?;
    }

    let body = String::from_utf8(
        writer
            .into_inner()
            .map_err(|_| FailureResponse::ServerError(()))?,
    )
    .map_err(|_| FailureResponse::ServerError(()))?;

    Ok(([(header::CONTENT_TYPE, "text/csv")], body))
}
