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
    events::{KIND_CONFERENCE, KIND_MEETUP},
    schema::{event_categories, event_formats, events},
    state::Conn,
    teams::Team,
    template::Page,
    util_resp::{StandardResponse, bad_request, see_other_ok, success},
    validation::is_valid_slug,
    widgets::alert::ErrorAlert,
};

pub async fn create_event_page(
    Path(team_slug): Path<String>,
    user: User<true>,
    mut conn: Conn<true>,
) -> StandardResponse {
    let team = Team::fetch_by_slug(&team_slug, &mut *conn)?;
    team.check_user_is_member(&user.id, &mut *conn)?;

    success(
        Page::new()
            .user(user)
            .team(team)
            .body(maud! {
                h1 { "Create a new event" }
                form method="post" class="mt-4" {
                    div class="mb-3" {
                        label for="name" class="form-label" { "Name" }
                        input type="text" class="form-control" id="name" name="name";
                    }
                    div class="mb-3" {
                        label for="slug" class="form-label" { "Slug" }
                        input type="text" class="form-control" id="slug" name="slug";
                    }
                    div class="mb-3" {
                        label for="kind" class="form-label" { "Type" }
                        select class="form-select" id="kind" name="kind" {
                            option value="CONFERENCE" { "Conference" }
                            option value="MEETUP" { "Meetup" }
                        }
                    }
                    div class="mb-3" {
                        label for="formats" class="form-label" { "Formats (one per line)" }
                        textarea class="form-control" id="formats" name="formats" {}
                    }
                    div class="mb-3" {
                        label for="categories" class="form-label" { "Categories (one per line)" }
                        textarea class="form-control" id="categories" name="categories" {}
                    }
                    button type="submit" class="btn btn-primary" { "Create" }
                }
            })
            .render(),
    )
}

#[derive(Deserialize)]
pub struct CreateEventForm {
    pub name: String,
    pub slug: String,
    pub kind: String,
    #[serde(default)]
    pub formats: String,
    #[serde(default)]
    pub categories: String,
}

#[tracing::instrument(skip(conn, form))]
pub async fn do_create_event(
    Path(team_slug): Path<String>,
    user: User<true>,
    mut conn: Conn<true>,
    Form(form): Form<CreateEventForm>,
) -> StandardResponse {
    let team = Team::fetch_by_slug(&team_slug, &mut *conn)?;
    team.check_user_is_member(&user.id, &mut *conn)?;

    if form.name.is_empty() || form.name.len() > 128 {
        return bad_request(
            Page::new()
                .user(user)
                .team(team)
                .body(maud! {
                    ErrorAlert msg = "Event names must be between 1 and 128
                                      characters.";
                })
                .render(),
        );
    }

    if is_valid_slug(&form.slug).is_err() {
        return bad_request(
            Page::new()
                .user(user)
                .team(team)
                .body(maud! {
                    ErrorAlert msg = "Slugs may only contain lowercase
                                      letters, digits and hyphens.";
                })
                .render(),
        );
    }

    if form.kind != KIND_CONFERENCE && form.kind != KIND_MEETUP {
        return bad_request(
            Page::new()
                .user(user)
                .team(team)
                .body(maud! {
                    ErrorAlert msg = "Unknown event type.";
                })
                .render(),
        );
    }

    let slug_taken = diesel::select(diesel::dsl::exists(
        events::table.filter(events::slug.eq(&form.slug)),
    ))
    .get_result::<bool>(&mut *conn)
    .unwrap();

    if slug_taken {
        return bad_request(
            Page::new()
                .user(user)
                .team(team)
                .body(maud! {
                    ErrorAlert msg = "An event with that slug already exists.";
                })
                .render(),
        );
    }

    let event_id = Uuid::now_v7().to_string();
    let n = diesel::insert_into(events::table)
        .values((
            events::id.eq(&event_id),
            events::team_id.eq(&team.id),
            events::name.eq(&form.name),
            events::slug.eq(&form.slug),
            events::kind.eq(&form.kind),
            events::display_proposals_speakers.eq(true),
            events::display_proposals_reviews.eq(true),
            events::created_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)
        .unwrap();
    assert_eq!(n, 1);

    for name in form.formats.lines().filter(|l| !l.trim().is_empty()) {
        diesel::insert_into(event_formats::table)
            .values((
                event_formats::id.eq(Uuid::now_v7().to_string()),
                event_formats::event_id.eq(&event_id),
                event_formats::name.eq(name.trim()),
            ))
            .execute(&mut *conn)
            .unwrap();
    }

    for name in form.categories.lines().filter(|l| !l.trim().is_empty()) {
        diesel::insert_into(event_categories::table)
            .values((
                event_categories::id.eq(Uuid::now_v7().to_string()),
                event_categories::event_id.eq(&event_id),
                event_categories::name.eq(name.trim()),
            ))
            .execute(&mut *conn)
            .unwrap();
    }

    see_other_ok(Redirect::to(&format!(
        "/team/{}/{}/reviews",
        team_slug, form.slug
    )))
}
