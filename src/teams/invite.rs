use axum::{
    extract::Path,
    response::Redirect,
};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use hypertext::prelude::*;
use uuid::Uuid;

use crate::{
    auth::User,
    invites::gen_invitation_code,
    schema::{team_members, teams},
    state::Conn,
    teams::{ROLE_REVIEWER, Team},
    template::Page,
    util_resp::{FailureResponse, StandardResponse, see_other_ok, success},
};

/// The public identity of a team, as revealed to whoever presents its
/// invitation code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamInvite {
    pub id: String,
    pub slug: String,
    pub name: String,
}

/// Resolves team invitation codes and attaches new members.
pub struct TeamMemberInvite {
    code: String,
}

impl TeamMemberInvite {
    pub fn with(code: &str) -> Self {
        TeamMemberInvite {
            code: code.to_string(),
        }
    }

    /// Looks up the team owning this invitation code.
    pub fn check(
        &self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<TeamInvite, FailureResponse> {
        let team = teams::table
            .filter(teams::invitation_code.eq(&self.code))
            .first::<Team>(&mut *conn)
            .optional()
            .unwrap()
            .ok_or(FailureResponse::InvitationNotFound(()))?;

        Ok(TeamInvite {
            id: team.id,
            slug: team.slug,
            name: team.name,
        })
    }

    /// Adds the user as a `REVIEWER` on the resolved team. Re-adding an
    /// existing member is a no-op, whatever role they already hold.
    #[tracing::instrument(skip(self, conn), fields(code = %self.code))]
    pub fn add_member(
        &self,
        user_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<TeamInvite, FailureResponse> {
        let team = self.check(&mut *conn)?;

        diesel::insert_or_ignore_into(team_members::table)
            .values((
                team_members::id.eq(Uuid::now_v7().to_string()),
                team_members::team_id.eq(&team.id),
                team_members::user_id.eq(user_id),
                team_members::role.eq(ROLE_REVIEWER),
            ))
            .execute(&mut *conn)
            .unwrap();

        Ok(team)
    }
}

pub async fn team_invite_page(
    Path(code): Path<String>,
    user: Option<User<true>>,
    mut conn: Conn<true>,
) -> StandardResponse {
    let invite = TeamMemberInvite::with(&code).check(&mut *conn)?;

    success(
        Page::new()
            .user_opt(user)
            .body(maud! {
                h1 { "Join " (invite.name) }
                p {
                    "You have been invited to review proposals for "
                    (invite.name) "."
                }
                form method="post" {
                    button type="submit" class="btn btn-primary" {
                        "Accept invitation"
                    }
                }
            })
            .render(),
    )
}

#[tracing::instrument(skip(conn))]
pub async fn do_accept_team_invite(
    Path(code): Path<String>,
    user: User<true>,
    mut conn: Conn<true>,
) -> StandardResponse {
    let invite = TeamMemberInvite::with(&code).add_member(&user.id, &mut *conn)?;

    see_other_ok(Redirect::to(&format!("/team/{}", invite.slug)))
}

/// Invalidates the current team invitation code, replacing it with a fresh
/// one. Links shared with the old code stop working.
#[tracing::instrument(skip(conn))]
pub async fn do_regenerate_team_code(
    Path(team_slug): Path<String>,
    user: User<true>,
    mut conn: Conn<true>,
) -> StandardResponse {
    let team = Team::fetch_by_slug(&team_slug, &mut *conn)?;
    team.check_user_is_member(&user.id, &mut *conn)?;

    let code = gen_invitation_code(&mut *conn);

    diesel::update(teams::table.filter(teams::id.eq(&team.id)))
        .set(teams::invitation_code.eq(&code))
        .execute(&mut *conn)
        .unwrap();

    see_other_ok(Redirect::to(&format!("/team/{team_slug}")))
}
