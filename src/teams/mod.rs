use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};

use crate::{
    schema::{team_members, teams},
    util_resp::FailureResponse,
};

pub mod create;
pub mod invite;
pub mod view;

pub const ROLE_OWNER: &str = "OWNER";
pub const ROLE_REVIEWER: &str = "REVIEWER";

#[derive(Serialize, Deserialize, Queryable, Clone, Debug)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub invitation_code: String,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Serialize, Deserialize, Queryable, Clone, Debug)]
pub struct TeamMember {
    pub id: String,
    pub team_id: String,
    pub user_id: String,
    pub role: String,
}

impl Team {
    #[tracing::instrument(skip(conn))]
    pub fn fetch_by_slug(
        slug: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Team, FailureResponse> {
        teams::table
            .filter(teams::slug.eq(slug))
            .first::<Team>(&mut *conn)
            .optional()
            .unwrap()
            .ok_or(FailureResponse::NotFound(()))
    }

    /// Checks that the given user holds any role on this team. Which role it
    /// is does not matter here; reviewers can see everything organizers can.
    pub fn check_user_is_member(
        &self,
        user_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<(), FailureResponse> {
        let is_member = diesel::select(diesel::dsl::exists(
            team_members::table.filter(
                team_members::team_id
                    .eq(&self.id)
                    .and(team_members::user_id.eq(user_id)),
            ),
        ))
        .get_result::<bool>(&mut *conn)
        .unwrap();

        if is_member {
            Ok(())
        } else {
            Err(FailureResponse::ForbiddenOperation(()))
        }
    }
}
