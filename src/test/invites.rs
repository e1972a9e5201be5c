use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};

use crate::{
    proposals::invite::CoSpeakerProposalInvite,
    schema::{proposal_speakers, proposals, talk_speakers, team_members, teams},
    teams::{ROLE_OWNER, ROLE_REVIEWER, invite::TeamMemberInvite},
    test::factories::{
        create_event, create_proposal, create_team, create_user, setup_pool,
    },
    util_resp::FailureResponse,
};

fn proposal_code(
    proposal_id: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> String {
    proposals::table
        .filter(proposals::id.eq(proposal_id))
        .select(proposals::invitation_code)
        .first::<String>(conn)
        .unwrap()
}

#[test]
fn proposal_invite_check_reveals_the_proposal() {
    let pool = setup_pool();
    let conn = &mut pool.get().unwrap();

    let owner = create_user("Olaf Organizer", "olaf", conn);
    let speaker = create_user("Alice Speaker", "alice", conn);

    let team = create_team("Dev Collective", "devcol", &owner, conn);
    let event_id = create_event(&team, "DevConf", "devconf", true, true, conn);
    let proposal =
        create_proposal(&event_id, "Rust at scale", &[&speaker], conn);

    let code = proposal_code(&proposal, conn);
    let invite = CoSpeakerProposalInvite::with(&code).check(conn).unwrap();

    assert_eq!(invite.id, proposal);
    assert_eq!(invite.title, "Rust at scale");
    assert_eq!(invite.event.slug, "devconf");
}

#[test]
fn unknown_invitation_codes_resolve_to_nothing() {
    let pool = setup_pool();
    let conn = &mut pool.get().unwrap();

    let err = CoSpeakerProposalInvite::with("nosuchcode12")
        .check(conn)
        .unwrap_err();
    assert!(matches!(err, FailureResponse::InvitationNotFound(())));

    let err = TeamMemberInvite::with("nosuchcode12")
        .check(conn)
        .unwrap_err();
    assert!(matches!(err, FailureResponse::InvitationNotFound(())));
}

#[test]
fn accepting_a_proposal_invite_updates_both_speaker_sets() {
    let pool = setup_pool();
    let conn = &mut pool.get().unwrap();

    let owner = create_user("Olaf Organizer", "olaf", conn);
    let speaker = create_user("Alice Speaker", "alice", conn);
    let cospeaker = create_user("Bob Speaker", "bob", conn);

    let team = create_team("Dev Collective", "devcol", &owner, conn);
    let event_id = create_event(&team, "DevConf", "devconf", true, true, conn);
    let proposal =
        create_proposal(&event_id, "Rust at scale", &[&speaker], conn);

    let code = proposal_code(&proposal, conn);
    let invite = CoSpeakerProposalInvite::with(&code);

    invite.add_cospeaker(&cospeaker, conn).unwrap();

    let on_proposal: i64 = proposal_speakers::table
        .filter(
            proposal_speakers::proposal_id
                .eq(&proposal)
                .and(proposal_speakers::user_id.eq(&cospeaker)),
        )
        .count()
        .get_result(conn)
        .unwrap();
    assert_eq!(on_proposal, 1);

    let talk_id = proposals::table
        .filter(proposals::id.eq(&proposal))
        .select(proposals::talk_id)
        .first::<String>(conn)
        .unwrap();

    let on_talk: i64 = talk_speakers::table
        .filter(
            talk_speakers::talk_id
                .eq(&talk_id)
                .and(talk_speakers::user_id.eq(&cospeaker)),
        )
        .count()
        .get_result(conn)
        .unwrap();
    assert_eq!(on_talk, 1);

    // Accepting the same invitation twice changes nothing.
    invite.add_cospeaker(&cospeaker, conn).unwrap();

    let total: i64 = proposal_speakers::table
        .filter(proposal_speakers::proposal_id.eq(&proposal))
        .count()
        .get_result(conn)
        .unwrap();
    assert_eq!(total, 2);
}

#[test]
fn accepting_a_team_invite_grants_the_reviewer_role() {
    let pool = setup_pool();
    let conn = &mut pool.get().unwrap();

    let owner = create_user("Olaf Organizer", "olaf", conn);
    let joiner = create_user("Clara Reviewer", "clara", conn);

    let team = create_team("Dev Collective", "devcol", &owner, conn);

    let code = teams::table
        .filter(teams::id.eq(&team))
        .select(teams::invitation_code)
        .first::<String>(conn)
        .unwrap();

    let invite = TeamMemberInvite::with(&code);
    let resolved = invite.add_member(&joiner, conn).unwrap();
    assert_eq!(resolved.slug, "devcol");

    let role = team_members::table
        .filter(
            team_members::team_id
                .eq(&team)
                .and(team_members::user_id.eq(&joiner)),
        )
        .select(team_members::role)
        .first::<String>(conn)
        .unwrap();
    assert_eq!(role, ROLE_REVIEWER);

    // Re-accepting keeps the membership unique and leaves existing roles
    // untouched.
    invite.add_member(&joiner, conn).unwrap();
    invite.add_member(&owner, conn).unwrap();

    let members: i64 = team_members::table
        .filter(team_members::team_id.eq(&team))
        .count()
        .get_result(conn)
        .unwrap();
    assert_eq!(members, 2);

    let owner_role = team_members::table
        .filter(
            team_members::team_id
                .eq(&team)
                .and(team_members::user_id.eq(&owner)),
        )
        .select(team_members::role)
        .first::<String>(conn)
        .unwrap();
    assert_eq!(owner_role, ROLE_OWNER);
}
