use axum::{extract::Path, response::Redirect};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use hypertext::prelude::*;
use uuid::Uuid;

use crate::{
    auth::User,
    events::Event,
    proposals::Proposal,
    schema::{events, proposal_speakers, proposals, talk_speakers},
    state::Conn,
    template::Page,
    util_resp::{FailureResponse, StandardResponse, see_other_ok, success},
};

/// The public identity of a proposal, as revealed to whoever presents its
/// invitation code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalInvite {
    pub id: String,
    pub title: String,
    pub event: InviteEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteEvent {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Resolves proposal invitation codes and attaches co-speakers.
pub struct CoSpeakerProposalInvite {
    code: String,
}

impl CoSpeakerProposalInvite {
    pub fn with(code: &str) -> Self {
        CoSpeakerProposalInvite {
            code: code.to_string(),
        }
    }

    fn resolve(
        &self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<(Proposal, Event), FailureResponse> {
        proposals::table
            .inner_join(events::table)
            .filter(proposals::invitation_code.eq(&self.code))
            .select((proposals::all_columns, events::all_columns))
            .first::<(Proposal, Event)>(&mut *conn)
            .optional()
            .unwrap()
            .ok_or(FailureResponse::InvitationNotFound(()))
    }

    /// Looks up the proposal owning this invitation code.
    pub fn check(
        &self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<ProposalInvite, FailureResponse> {
        let (proposal, event) = self.resolve(&mut *conn)?;

        Ok(ProposalInvite {
            id: proposal.id,
            title: proposal.title,
            event: InviteEvent {
                id: event.id,
                name: event.name,
                slug: event.slug,
            },
        })
    }

    /// Adds the user to the proposal's speaker set and to the originating
    /// talk's speaker set. The two writes happen in one transaction; a
    /// failure between them must not leave the sets inconsistent. Re-adding
    /// an existing speaker is a no-op on either side.
    #[tracing::instrument(skip(self, conn), fields(code = %self.code))]
    pub fn add_cospeaker(
        &self,
        user_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<ProposalInvite, FailureResponse> {
        let (proposal, event) = self.resolve(&mut *conn)?;

        conn.transaction(|conn| {
            diesel::insert_or_ignore_into(proposal_speakers::table)
                .values((
                    proposal_speakers::id.eq(Uuid::now_v7().to_string()),
                    proposal_speakers::proposal_id.eq(&proposal.id),
                    proposal_speakers::user_id.eq(user_id),
                ))
                .execute(conn)?;

            diesel::insert_or_ignore_into(talk_speakers::table)
                .values((
                    talk_speakers::id.eq(Uuid::now_v7().to_string()),
                    talk_speakers::talk_id.eq(&proposal.talk_id),
                    talk_speakers::user_id.eq(user_id),
                ))
                .execute(conn)?;

            Ok::<_, FailureResponse>(())
        })?;

        Ok(ProposalInvite {
            id: proposal.id,
            title: proposal.title,
            event: InviteEvent {
                id: event.id,
                name: event.name,
                slug: event.slug,
            },
        })
    }
}

pub async fn proposal_invite_page(
    Path(code): Path<String>,
    user: Option<User<true>>,
    mut conn: Conn<true>,
) -> StandardResponse {
    let invite = CoSpeakerProposalInvite::with(&code).check(&mut *conn)?;

    success(
        Page::new()
            .user_opt(user)
            .body(maud! {
                h1 { "Co-speaker invitation" }
                p {
                    "You have been invited to join \"" (invite.title)
                    "\" at " (invite.event.name) "."
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
pub async fn do_accept_proposal_invite(
    Path(code): Path<String>,
    user: User<true>,
    mut conn: Conn<true>,
) -> StandardResponse {
    let invite =
        CoSpeakerProposalInvite::with(&code).add_cospeaker(&user.id, &mut *conn)?;

    tracing::info!(proposal = %invite.id, "added co-speaker");

    see_other_ok(Redirect::to("/speaker/talks"))
}
