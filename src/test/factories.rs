//! Shared builders for test data. Every helper takes an open connection and
//! returns the id of the row it created.

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use diesel::{
    SqliteConnection,
    connection::LoadConnection,
    prelude::*,
    r2d2::{ConnectionManager, Pool},
    sqlite::Sqlite,
};
use diesel_migrations::MigrationHarness;
use uuid::Uuid;

use crate::{
    MIGRATIONS,
    invites::gen_invitation_code,
    proposals::{DELIBERATION_PENDING, NOT_PUBLISHED},
    schema::{
        event_categories, event_formats, events, proposal_categories,
        proposal_formats, proposal_speakers, proposals, reviews,
        talk_speakers, talks, team_members, teams, users,
    },
    state::DbPool,
    teams::ROLE_OWNER,
};

pub const TEST_PASSWORD: &str = "hunter2hunter2";

pub fn setup_pool() -> DbPool {
    let pool: DbPool = Pool::builder()
        .max_size(1)
        .build(ConnectionManager::<SqliteConnection>::new(":memory:"))
        .unwrap();

    pool.get().unwrap().run_pending_migrations(MIGRATIONS).unwrap();

    pool
}

pub fn create_user(
    name: &str,
    username: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> String {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(TEST_PASSWORD.as_bytes(), &salt)
        .unwrap()
        .to_string();

    let id = Uuid::now_v7().to_string();
    diesel::insert_into(users::table)
        .values((
            users::id.eq(&id),
            users::name.eq(name),
            users::username.eq(username),
            users::email.eq(format!("{username}@example.com")),
            users::password_hash.eq(&password_hash),
            users::socials.eq("{}"),
            users::created_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)
        .unwrap();

    id
}

pub fn create_team(
    name: &str,
    slug: &str,
    owner_id: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> String {
    let id = Uuid::now_v7().to_string();
    diesel::insert_into(teams::table)
        .values((
            teams::id.eq(&id),
            teams::name.eq(name),
            teams::slug.eq(slug),
            teams::invitation_code.eq(gen_invitation_code(&mut *conn)),
            teams::created_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)
        .unwrap();

    add_member(&id, owner_id, ROLE_OWNER, &mut *conn);

    id
}

pub fn add_member(
    team_id: &str,
    user_id: &str,
    role: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) {
    diesel::insert_or_ignore_into(team_members::table)
        .values((
            team_members::id.eq(Uuid::now_v7().to_string()),
            team_members::team_id.eq(team_id),
            team_members::user_id.eq(user_id),
            team_members::role.eq(role),
        ))
        .execute(&mut *conn)
        .unwrap();
}

pub fn create_event(
    team_id: &str,
    name: &str,
    slug: &str,
    display_speakers: bool,
    display_reviews: bool,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> String {
    let id = Uuid::now_v7().to_string();
    diesel::insert_into(events::table)
        .values((
            events::id.eq(&id),
            events::team_id.eq(team_id),
            events::name.eq(name),
            events::slug.eq(slug),
            events::kind.eq(crate::events::KIND_CONFERENCE),
            events::display_proposals_speakers.eq(display_speakers),
            events::display_proposals_reviews.eq(display_reviews),
            events::created_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)
        .unwrap();

    id
}

pub fn create_format(
    event_id: &str,
    name: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> String {
    let id = Uuid::now_v7().to_string();
    diesel::insert_into(event_formats::table)
        .values((
            event_formats::id.eq(&id),
            event_formats::event_id.eq(event_id),
            event_formats::name.eq(name),
        ))
        .execute(&mut *conn)
        .unwrap();

    id
}

pub fn create_category(
    event_id: &str,
    name: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> String {
    let id = Uuid::now_v7().to_string();
    diesel::insert_into(event_categories::table)
        .values((
            event_categories::id.eq(&id),
            event_categories::event_id.eq(event_id),
            event_categories::name.eq(name),
        ))
        .execute(&mut *conn)
        .unwrap();

    id
}

pub fn create_talk(
    title: &str,
    speaker_ids: &[&str],
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> String {
    let id = Uuid::now_v7().to_string();
    diesel::insert_into(talks::table)
        .values((
            talks::id.eq(&id),
            talks::title.eq(title),
            talks::abstract_.eq(format!("An abstract for {title}.")),
            talks::languages.eq("[\"en\"]"),
            talks::created_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)
        .unwrap();

    for speaker_id in speaker_ids {
        diesel::insert_into(talk_speakers::table)
            .values((
                talk_speakers::id.eq(Uuid::now_v7().to_string()),
                talk_speakers::talk_id.eq(&id),
                talk_speakers::user_id.eq(speaker_id),
            ))
            .execute(&mut *conn)
            .unwrap();
    }

    id
}

/// Creates a proposal directly, together with its talk. The proposal's
/// speaker set is initialised to `speaker_ids`.
pub fn create_proposal(
    event_id: &str,
    title: &str,
    speaker_ids: &[&str],
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> String {
    let talk_id = create_talk(title, speaker_ids, &mut *conn);

    let id = Uuid::now_v7().to_string();
    diesel::insert_into(proposals::table)
        .values((
            proposals::id.eq(&id),
            proposals::event_id.eq(event_id),
            proposals::talk_id.eq(&talk_id),
            proposals::title.eq(title),
            proposals::abstract_.eq(format!("An abstract for {title}.")),
            proposals::languages.eq("[\"en\"]"),
            proposals::deliberation_status.eq(DELIBERATION_PENDING),
            proposals::publication_status.eq(NOT_PUBLISHED),
            proposals::invitation_code.eq(gen_invitation_code(&mut *conn)),
            proposals::created_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)
        .unwrap();

    for speaker_id in speaker_ids {
        diesel::insert_into(proposal_speakers::table)
            .values((
                proposal_speakers::id.eq(Uuid::now_v7().to_string()),
                proposal_speakers::proposal_id.eq(&id),
                proposal_speakers::user_id.eq(speaker_id),
            ))
            .execute(&mut *conn)
            .unwrap();
    }

    id
}

pub fn set_deliberation_status(
    proposal_id: &str,
    status: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) {
    diesel::update(proposals::table.filter(proposals::id.eq(proposal_id)))
        .set(proposals::deliberation_status.eq(status))
        .execute(&mut *conn)
        .unwrap();
}

pub fn attach_format(
    proposal_id: &str,
    format_id: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) {
    diesel::insert_into(proposal_formats::table)
        .values((
            proposal_formats::id.eq(Uuid::now_v7().to_string()),
            proposal_formats::proposal_id.eq(proposal_id),
            proposal_formats::format_id.eq(format_id),
        ))
        .execute(&mut *conn)
        .unwrap();
}

pub fn attach_category(
    proposal_id: &str,
    category_id: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) {
    diesel::insert_into(proposal_categories::table)
        .values((
            proposal_categories::id.eq(Uuid::now_v7().to_string()),
            proposal_categories::proposal_id.eq(proposal_id),
            proposal_categories::category_id.eq(category_id),
        ))
        .execute(&mut *conn)
        .unwrap();
}

pub fn create_review(
    proposal_id: &str,
    user_id: &str,
    feeling: &str,
    note: Option<i64>,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) {
    diesel::insert_into(reviews::table)
        .values((
            reviews::id.eq(Uuid::now_v7().to_string()),
            reviews::proposal_id.eq(proposal_id),
            reviews::user_id.eq(user_id),
            reviews::feeling.eq(feeling),
            reviews::note.eq(note),
            reviews::created_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)
        .unwrap();
}
