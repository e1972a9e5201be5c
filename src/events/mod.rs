use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};

use crate::{
    schema::{event_categories, event_formats, events, team_members, teams},
    util_resp::FailureResponse,
};

pub mod create;
pub mod settings;

pub const KIND_CONFERENCE: &str = "CONFERENCE";
pub const KIND_MEETUP: &str = "MEETUP";

#[derive(Serialize, Deserialize, Queryable, Clone, Debug)]
pub struct Event {
    pub id: String,
    pub team_id: String,
    pub name: String,
    pub slug: String,
    pub kind: String,
    pub display_proposals_speakers: bool,
    pub display_proposals_reviews: bool,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Serialize, Deserialize, Queryable, Clone, Debug)]
pub struct EventFormat {
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Queryable, Clone, Debug)]
pub struct EventCategory {
    pub id: String,
    pub event_id: String,
    pub name: String,
}

impl Event {
    #[tracing::instrument(skip(conn))]
    pub fn fetch_by_slug(
        slug: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Event, FailureResponse> {
        events::table
            .filter(events::slug.eq(slug))
            .first::<Event>(&mut *conn)
            .optional()
            .unwrap()
            .ok_or(FailureResponse::NotFound(()))
    }

    /// The authorization guard run at the top of every organizer operation:
    /// resolves the event within the team scope and checks the user holds a
    /// role on that team. A missing team, a missing event and a missing
    /// membership all come back as the same forbidden error, so probing for
    /// event slugs reveals nothing.
    pub fn for_member(
        user_id: &str,
        team_slug: &str,
        event_slug: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Event, FailureResponse> {
        let event = events::table
            .inner_join(teams::table)
            .filter(
                teams::slug
                    .eq(team_slug)
                    .and(events::slug.eq(event_slug)),
            )
            .select(events::all_columns)
            .first::<Event>(&mut *conn)
            .optional()
            .unwrap()
            .ok_or(FailureResponse::ForbiddenOperation(()))?;

        let is_member = diesel::select(diesel::dsl::exists(
            team_members::table.filter(
                team_members::team_id
                    .eq(&event.team_id)
                    .and(team_members::user_id.eq(user_id)),
            ),
        ))
        .get_result::<bool>(&mut *conn)
        .unwrap();

        if is_member {
            Ok(event)
        } else {
            Err(FailureResponse::ForbiddenOperation(()))
        }
    }

    pub fn formats(
        &self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Vec<EventFormat> {
        event_formats::table
            .filter(event_formats::event_id.eq(&self.id))
            .order(event_formats::name.asc())
            .load::<EventFormat>(&mut *conn)
            .unwrap()
    }

    pub fn categories(
        &self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Vec<EventCategory> {
        event_categories::table
            .filter(event_categories::event_id.eq(&self.id))
            .order(event_categories::name.asc())
            .load::<EventCategory>(&mut *conn)
            .unwrap()
    }
}
