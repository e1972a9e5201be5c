use axum::{extract::Form, response::Redirect};
use diesel::prelude::*;
use hypertext::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::User,
    schema::{talk_speakers, talks},
    state::Conn,
    template::Page,
    util_resp::{StandardResponse, bad_request, see_other_ok, success},
    widgets::alert::ErrorAlert,
};

pub async fn create_talk_page(user: User<true>) -> StandardResponse {
    success(
        Page::new()
            .user(user)
            .body(maud! {
                h1 { "New talk" }
                form method="post" class="mt-4" {
                    div class="mb-3" {
                        label for="title" class="form-label" { "Title" }
                        input type="text" class="form-control" id="title" name="title";
                    }
                    div class="mb-3" {
                        label for="abstract" class="form-label" { "Abstract" }
                        textarea class="form-control" id="abstract" name="abstract" rows="6" {}
                    }
                    div class="mb-3" {
                        label for="references" class="form-label" { "References" }
                        textarea class="form-control" id="references" name="references" rows="3" {}
                    }
                    div class="mb-3" {
                        label for="level" class="form-label" { "Level" }
                        select class="form-select" id="level" name="level" {
                            option value="" { "-" }
                            option value="BEGINNER" { "Beginner" }
                            option value="INTERMEDIATE" { "Intermediate" }
                            option value="ADVANCED" { "Advanced" }
                        }
                    }
                    div class="mb-3" {
                        label for="languages" class="form-label" { "Languages (comma separated)" }
                        input type="text" class="form-control" id="languages" name="languages";
                    }
                    button type="submit" class="btn btn-primary" { "Create" }
                }
            })
            .render(),
    )
}

#[derive(Deserialize)]
pub struct CreateTalkForm {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_: String,
    #[serde(default)]
    pub references: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub languages: String,
}

#[tracing::instrument(skip(conn, form))]
pub async fn do_create_talk(
    user: User<true>,
    mut conn: Conn<true>,
    Form(form): Form<CreateTalkForm>,
) -> StandardResponse {
    if form.title.is_empty() || form.title.len() > 256 {
        return bad_request(
            Page::new()
                .user(user)
                .body(maud! {
                    ErrorAlert msg = "Titles must be between 1 and 256
                                      characters.";
                })
                .render(),
        );
    }

    let languages: Vec<String> = form
        .languages
        .split(',')
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();

    let talk_id = Uuid::now_v7().to_string();
    let n = diesel::insert_into(talks::table)
        .values((
            talks::id.eq(&talk_id),
            talks::title.eq(&form.title),
            talks::abstract_.eq(&form.abstract_),
            talks::references
                .eq((!form.references.is_empty()).then_some(&form.references)),
            talks::level.eq((!form.level.is_empty()).then_some(&form.level)),
            talks::languages.eq(serde_json::to_string(&languages).unwrap()),
            talks::created_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)
        .unwrap();
    assert_eq!(n, 1);

    diesel::insert_into(talk_speakers::table)
        .values((
            talk_speakers::id.eq(Uuid::now_v7().to_string()),
            talk_speakers::talk_id.eq(&talk_id),
            talk_speakers::user_id.eq(&user.id),
        ))
        .execute(&mut *conn)
        .unwrap();

    see_other_ok(Redirect::to("/speaker/talks"))
}
