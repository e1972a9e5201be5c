use axum::{extract::Form, response::Redirect};
use diesel::prelude::*;
use hypertext::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::User,
    invites::gen_invitation_code,
    schema::{team_members, teams},
    state::Conn,
    teams::ROLE_OWNER,
    template::Page,
    util_resp::{StandardResponse, bad_request, see_other_ok, success},
    validation::is_valid_slug,
    widgets::alert::ErrorAlert,
};

pub async fn create_team_page(user: User<true>) -> StandardResponse {
    success(
        Page::new()
            .user(user)
            .body(maud! {
                h1 { "Create a new team" }
                form method="post" class="mt-4" {
                    div class="mb-3" {
                        label for="name" class="form-label" { "Name" }
                        input type="text" class="form-control" id="name" name="name";
                    }
                    div class="mb-3" {
                        label for="slug" class="form-label" { "Slug" }
                        input type="text" class="form-control" id="slug" name="slug";
                    }
                    button type="submit" class="btn btn-primary" { "Create" }
                }
            })
            .render(),
    )
}

#[derive(Deserialize)]
pub struct CreateTeamForm {
    pub name: String,
    pub slug: String,
}

#[tracing::instrument(skip(conn, form))]
pub async fn do_create_team(
    user: User<true>,
    mut conn: Conn<true>,
    Form(form): Form<CreateTeamForm>,
) -> StandardResponse {
    if form.name.is_empty() || form.name.len() > 128 {
        return bad_request(
            Page::new()
                .user(user)
                .body(maud! {
                    ErrorAlert msg = "Team names must be between 1 and 128
                                      characters.";
                })
                .render(),
        );
    }

    if is_valid_slug(&form.slug).is_err() {
        return bad_request(
            Page::new()
                .user(user)
                .body(maud! {
                    ErrorAlert msg = "Slugs may only contain lowercase
                                      letters, digits and hyphens.";
                })
                .render(),
        );
    }

    let slug_taken = diesel::select(diesel::dsl::exists(
        teams::table.filter(teams::slug.eq(&form.slug)),
    ))
    .get_result::<bool>(&mut *conn)
    .unwrap();

    if slug_taken {
        return bad_request(
            Page::new()
                .user(user)
                .body(maud! {
                    ErrorAlert msg = "A team with that slug already exists.";
                })
                .render(),
        );
    }

    let invitation_code = gen_invitation_code(&mut *conn);

    let team_id = Uuid::now_v7().to_string();
    let n = diesel::insert_into(teams::table)
        .values((
            teams::id.eq(&team_id),
            teams::name.eq(&form.name),
            teams::slug.eq(&form.slug),
            teams::invitation_code.eq(&invitation_code),
            teams::created_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)
        .unwrap();
    assert_eq!(n, 1);

    diesel::insert_into(team_members::table)
        .values((
            team_members::id.eq(Uuid::now_v7().to_string()),
            team_members::team_id.eq(&team_id),
            team_members::user_id.eq(&user.id),
            team_members::role.eq(ROLE_OWNER),
        ))
        .execute(&mut *conn)
        .unwrap();

    see_other_ok(Redirect::to(&format!("/team/{}", form.slug)))
}
