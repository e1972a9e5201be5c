use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use hypertext::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    auth::User,
    schema::{talk_speakers, talks},
    state::Conn,
    template::Page,
    util_resp::{FailureResponse, StandardResponse, success},
};

pub mod create;

#[derive(Serialize, Deserialize, Queryable, Clone, Debug)]
pub struct Talk {
    pub id: String,
    pub title: String,
    pub abstract_: String,
    pub references: Option<String>,
    pub level: Option<String>,
    pub languages: String,
    pub created_at: chrono::NaiveDateTime,
}

impl Talk {
    #[tracing::instrument(skip(conn))]
    pub fn fetch(
        talk_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Talk, FailureResponse> {
        talks::table
            .filter(talks::id.eq(talk_id))
            .first::<Talk>(&mut *conn)
            .optional()
            .unwrap()
            .ok_or(FailureResponse::NotFound(()))
    }

    pub fn speaker_ids(
        &self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Vec<String> {
        talk_speakers::table
            .filter(talk_speakers::talk_id.eq(&self.id))
            .select(talk_speakers::user_id)
            .load::<String>(&mut *conn)
            .unwrap()
    }

    /// Whether the user is one of the talk's co-authors.
    pub fn check_user_is_speaker(
        &self,
        user_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<(), FailureResponse> {
        let is_speaker = diesel::select(diesel::dsl::exists(
            talk_speakers::table.filter(
                talk_speakers::talk_id
                    .eq(&self.id)
                    .and(talk_speakers::user_id.eq(user_id)),
            ),
        ))
        .get_result::<bool>(&mut *conn)
        .unwrap();

        if is_speaker {
            Ok(())
        } else {
            Err(FailureResponse::ForbiddenOperation(()))
        }
    }
}

pub async fn speaker_talks_page(
    user: User<true>,
    mut conn: Conn<true>,
) -> StandardResponse {
    let user_talks = talk_speakers::table
        .inner_join(talks::table)
        .filter(talk_speakers::user_id.eq(&user.id))
        .select(talks::all_columns)
        .order(talks::created_at.desc())
        .load::<Talk>(&mut *conn)
        .unwrap();

    success(
        Page::new()
            .user(user)
            .body(maud! {
                h1 { "Your talks" }
                div class="mb-3" {
                    a class="btn btn-primary" href="/speaker/talks/create" {
                        "New talk"
                    }
                }
                ul class="list-group" {
                    @for talk in &user_talks {
                        li class="list-group-item" {
                            (talk.title)
                            @if let Some(level) = &talk.level {
                                span class="badge text-bg-secondary ms-2" { (level) }
                            }
                        }
                    }
                }
            })
            .render(),
    )
}
