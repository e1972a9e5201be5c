use axum::{Router, middleware, routing::get};
use axum_extra::extract::cookie::Key;
use hypertext::prelude::*;
use tower_http::trace::TraceLayer;

use crate::{
    auth::{
        User,
        login::{do_login, login_page},
        register::{do_register, register_page},
    },
    events::{
        create::{create_event_page, do_create_event},
        settings::{do_update_event_settings, event_settings_page},
    },
    proposals::{
        invite::{do_accept_proposal_invite, proposal_invite_page},
        submit::{do_submit_talk, submission_page},
    },
    reviews::{
        do_save_review,
        search::{
            exports::{export_cards_csv, export_json},
            reviews_page,
        },
    },
    state::{AppState, DbPool, tx_commit_layer},
    talks::{
        create::{create_talk_page, do_create_talk},
        speaker_talks_page,
    },
    teams::{
        create::{create_team_page, do_create_team},
        invite::{
            do_accept_team_invite, do_regenerate_team_code, team_invite_page,
        },
        view::team_page,
    },
    template::Page,
    util_resp::{StandardResponse, success},
};

pub async fn home(user: Option<User<true>>) -> StandardResponse {
    success(
        Page::new()
            .user_opt(user)
            .body(maud! {
                h1 { "Conference Hall" }
                ul {
                    li {
                        a href="/speaker/talks" { "My talks" }
                    }
                    li {
                        a href="/teams/create" { "Create a team" }
                    }
                }
            })
            .render(),
    )
}

fn secret_key() -> Key {
    if let Ok(secret) = std::env::var("SECRET_KEY") {
        Key::from(secret.as_bytes())
    } else if cfg!(test) {
        Key::from(&[0; 64])
    } else {
        Key::generate()
    }
}

pub fn create_app(pool: DbPool) -> Router {
    let state = AppState {
        pool,
        key: secret_key(),
    };

    Router::new()
        .route("/", get(home))
        .route("/login", get(login_page).post(do_login))
        .route("/register", get(register_page).post(do_register))
        .route("/speaker/talks", get(speaker_talks_page))
        .route(
            "/speaker/talks/create",
            get(create_talk_page).post(do_create_talk),
        )
        .route(
            "/:event_slug/submission",
            get(submission_page).post(do_submit_talk),
        )
        .route("/teams/create", get(create_team_page).post(do_create_team))
        .route("/team/:team_slug", get(team_page))
        .route(
            "/team/:team_slug/settings/invite",
            axum::routing::post(do_regenerate_team_code),
        )
        .route(
            "/team/:team_slug/events/create",
            get(create_event_page).post(do_create_event),
        )
        .route(
            "/team/:team_slug/:event_slug/settings",
            get(event_settings_page).post(do_update_event_settings),
        )
        .route("/team/:team_slug/:event_slug/reviews", get(reviews_page))
        .route(
            "/team/:team_slug/:event_slug/review/:proposal_id",
            axum::routing::post(do_save_review),
        )
        .route(
            "/team/:team_slug/:event_slug/export/json",
            get(export_json),
        )
        .route(
            "/team/:team_slug/:event_slug/export/cards.csv",
            get(export_cards_csv),
        )
        .route(
            "/invite/team/:code",
            get(team_invite_page).post(do_accept_team_invite),
        )
        .route(
            "/invite/proposal/:code",
            get(proposal_invite_page).post(do_accept_proposal_invite),
        )
        .layer(middleware::from_fn(tx_commit_layer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
