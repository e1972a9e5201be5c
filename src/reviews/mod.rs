use axum::{
    extract::{Form, Path},
    response::Redirect,
};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::User,
    events::Event,
    proposals::Proposal,
    schema::reviews,
    state::Conn,
    util_resp::{FailureResponse, StandardResponse, see_other_ok},
};

pub mod search;

pub const FEELING_POSITIVE: &str = "POSITIVE";
pub const FEELING_NEGATIVE: &str = "NEGATIVE";
pub const FEELING_NEUTRAL: &str = "NEUTRAL";

/// One user's opinion on one proposal. Unique per (user, proposal); saving
/// again replaces the previous review.
#[derive(Serialize, Deserialize, Queryable, Clone, Debug)]
pub struct Review {
    pub id: String,
    pub proposal_id: String,
    pub user_id: String,
    pub feeling: String,
    pub note: Option<i64>,
    pub comment: Option<String>,
    pub created_at: chrono::NaiveDateTime,
}

impl Review {
    pub fn of_proposal(
        proposal_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Vec<Review> {
        reviews::table
            .filter(reviews::proposal_id.eq(proposal_id))
            .load::<Review>(&mut *conn)
            .unwrap()
    }

    #[tracing::instrument(skip(conn))]
    pub fn save(
        proposal_id: &str,
        user_id: &str,
        feeling: &str,
        note: Option<i64>,
        comment: Option<&str>,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<(), FailureResponse> {
        diesel::insert_into(reviews::table)
            .values((
                reviews::id.eq(Uuid::now_v7().to_string()),
                reviews::proposal_id.eq(proposal_id),
                reviews::user_id.eq(user_id),
                reviews::feeling.eq(feeling),
                reviews::note.eq(note),
                reviews::comment.eq(comment),
                reviews::created_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .on_conflict((reviews::proposal_id, reviews::user_id))
            .do_update()
            .set((
                reviews::feeling.eq(feeling),
                reviews::note.eq(note),
                reviews::comment.eq(comment),
            ))
            .execute(&mut *conn)
            .map_err(|_| FailureResponse::ServerError(()))?;

        Ok(())
    }
}

#[derive(Deserialize)]
pub struct ReviewForm {
    pub feeling: String,
    #[serde(default)]
    pub note: Option<i64>,
    #[serde(default)]
    pub comment: String,
}

#[tracing::instrument(skip(conn, form))]
pub async fn do_save_review(
    Path((team_slug, event_slug, proposal_id)): Path<(String, String, String)>,
    user: User<true>,
    mut conn: Conn<true>,
    Form(form): Form<ReviewForm>,
) -> StandardResponse {
    let event = Event::for_member(&user.id, &team_slug, &event_slug, &mut *conn)?;
    let proposal = Proposal::fetch(&proposal_id, &event.id, &mut *conn)?;

    if ![FEELING_POSITIVE, FEELING_NEGATIVE, FEELING_NEUTRAL]
        .contains(&form.feeling.as_str())
    {
        return Err(FailureResponse::NotFound(()));
    }

    Review::save(
        &proposal.id,
        &user.id,
        &form.feeling,
        form.note,
        (!form.comment.is_empty()).then_some(form.comment.as_str()),
        &mut *conn,
    )?;

    see_other_ok(Redirect::to(&format!(
        "/team/{team_slug}/{event_slug}/reviews"
    )))
}
