use axum::{
    extract::{Form, Path},
    response::Redirect,
};
use diesel::prelude::*;
use hypertext::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::User,
    events::Event,
    invites::gen_invitation_code,
    proposals::{DELIBERATION_PENDING, NOT_PUBLISHED},
    schema::{
        proposal_categories, proposal_formats, proposal_speakers, proposals,
        talk_speakers,
    },
    state::Conn,
    talks::Talk,
    template::Page,
    util_resp::{StandardResponse, bad_request, see_other_ok, success},
    widgets::alert::ErrorAlert,
};

pub async fn submission_page(
    Path(event_slug): Path<String>,
    user: User<true>,
    mut conn: Conn<true>,
) -> StandardResponse {
    let event = Event::fetch_by_slug(&event_slug, &mut *conn)?;

    let user_talks = talk_speakers::table
        .inner_join(crate::schema::talks::table)
        .filter(talk_speakers::user_id.eq(&user.id))
        .select(crate::schema::talks::all_columns)
        .order(crate::schema::talks::created_at.desc())
        .load::<Talk>(&mut *conn)
        .unwrap();

    let formats = event.formats(&mut *conn);
    let categories = event.categories(&mut *conn);

    success(
        Page::new()
            .user(user)
            .body(maud! {
                h1 { "Submit to " (event.name) }
                form method="post" class="mt-4" {
                    div class="mb-3" {
                        label for="talk_id" class="form-label" { "Talk" }
                        select class="form-select" id="talk_id" name="talk_id" {
                            @for talk in &user_talks {
                                option value=(talk.id) { (talk.title) }
                            }
                        }
                    }
                    @if !formats.is_empty() {
                        div class="mb-3" {
                            label for="format" class="form-label" { "Format" }
                            select class="form-select" id="format" name="format" {
                                option value="" { "-" }
                                @for format in &formats {
                                    option value=(format.id) { (format.name) }
                                }
                            }
                        }
                    }
                    @if !categories.is_empty() {
                        div class="mb-3" {
                            label for="category" class="form-label" { "Category" }
                            select class="form-select" id="category" name="category" {
                                option value="" { "-" }
                                @for category in &categories {
                                    option value=(category.id) { (category.name) }
                                }
                            }
                        }
                    }
                    div class="mb-3" {
                        label for="comments" class="form-label" { "Message to organizers" }
                        textarea class="form-control" id="comments" name="comments" rows="3" {}
                    }
                    button type="submit" class="btn btn-primary" { "Submit" }
                }
            })
            .render(),
    )
}

#[derive(Deserialize)]
pub struct SubmissionForm {
    pub talk_id: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub comments: String,
}

/// Creates a proposal from a talk. The proposal owns an independent copy of
/// the talk's content and speaker relation from this point on.
#[tracing::instrument(skip(conn, form))]
pub async fn do_submit_talk(
    Path(event_slug): Path<String>,
    user: User<true>,
    mut conn: Conn<true>,
    Form(form): Form<SubmissionForm>,
) -> StandardResponse {
    let event = Event::fetch_by_slug(&event_slug, &mut *conn)?;
    let talk = Talk::fetch(&form.talk_id, &mut *conn)?;
    talk.check_user_is_speaker(&user.id, &mut *conn)?;

    let already_submitted = diesel::select(diesel::dsl::exists(
        proposals::table.filter(
            proposals::event_id
                .eq(&event.id)
                .and(proposals::talk_id.eq(&talk.id)),
        ),
    ))
    .get_result::<bool>(&mut *conn)
    .unwrap();

    if already_submitted {
        return bad_request(
            Page::new()
                .user(user)
                .body(maud! {
                    ErrorAlert msg = "This talk has already been submitted to
                                      this event.";
                })
                .render(),
        );
    }

    let invitation_code = gen_invitation_code(&mut *conn);

    let proposal_id = Uuid::now_v7().to_string();
    let n = diesel::insert_into(proposals::table)
        .values((
            proposals::id.eq(&proposal_id),
            proposals::event_id.eq(&event.id),
            proposals::talk_id.eq(&talk.id),
            proposals::title.eq(&talk.title),
            proposals::abstract_.eq(&talk.abstract_),
            proposals::references.eq(&talk.references),
            proposals::level.eq(&talk.level),
            proposals::languages.eq(&talk.languages),
            proposals::comments
                .eq((!form.comments.is_empty()).then_some(&form.comments)),
            proposals::deliberation_status.eq(DELIBERATION_PENDING),
            proposals::publication_status.eq(NOT_PUBLISHED),
            proposals::invitation_code.eq(&invitation_code),
            proposals::created_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)
        .unwrap();
    assert_eq!(n, 1);

    // Snapshot the talk's current speaker set onto the proposal.
    for speaker_id in talk.speaker_ids(&mut *conn) {
        diesel::insert_into(proposal_speakers::table)
            .values((
                proposal_speakers::id.eq(Uuid::now_v7().to_string()),
                proposal_speakers::proposal_id.eq(&proposal_id),
                proposal_speakers::user_id.eq(&speaker_id),
            ))
            .execute(&mut *conn)
            .unwrap();
    }

    if !form.format.is_empty() {
        diesel::insert_into(proposal_formats::table)
            .values((
                proposal_formats::id.eq(Uuid::now_v7().to_string()),
                proposal_formats::proposal_id.eq(&proposal_id),
                proposal_formats::format_id.eq(&form.format),
            ))
            .execute(&mut *conn)
            .unwrap();
    }

    if !form.category.is_empty() {
        diesel::insert_into(proposal_categories::table)
            .values((
                proposal_categories::id.eq(Uuid::now_v7().to_string()),
                proposal_categories::proposal_id.eq(&proposal_id),
                proposal_categories::category_id.eq(&form.category),
            ))
            .execute(&mut *conn)
            .unwrap();
    }

    see_other_ok(Redirect::to("/speaker/talks"))
}
