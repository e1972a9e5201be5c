use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};

use crate::{schema::proposals, util_resp::FailureResponse};

pub mod invite;
pub mod submit;

pub const DELIBERATION_PENDING: &str = "PENDING";
pub const DELIBERATION_ACCEPTED: &str = "ACCEPTED";
pub const DELIBERATION_REJECTED: &str = "REJECTED";

pub const NOT_PUBLISHED: &str = "NOT_PUBLISHED";

/// A talk submitted to one specific event. The talk's content and speaker set
/// are copied at submission time; later talk edits do not retroactively
/// change the proposal.
#[derive(Serialize, Deserialize, Queryable, Clone, Debug)]
pub struct Proposal {
    pub id: String,
    pub event_id: String,
    pub talk_id: String,
    pub title: String,
    pub abstract_: String,
    pub references: Option<String>,
    pub level: Option<String>,
    pub languages: String,
    pub comments: Option<String>,
    pub deliberation_status: String,
    pub confirmation_status: Option<String>,
    pub publication_status: String,
    pub invitation_code: String,
    pub created_at: chrono::NaiveDateTime,
}

impl Proposal {
    #[tracing::instrument(skip(conn))]
    pub fn fetch(
        proposal_id: &str,
        event_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Proposal, FailureResponse> {
        proposals::table
            .filter(
                proposals::id
                    .eq(proposal_id)
                    .and(proposals::event_id.eq(event_id)),
            )
            .first::<Proposal>(&mut *conn)
            .optional()
            .unwrap()
            .ok_or(FailureResponse::NotFound(()))
    }
}
