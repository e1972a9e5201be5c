use axum::{
    extract::{Form, Path},
    response::Redirect,
};
use diesel::prelude::*;
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    auth::User,
    events::Event,
    schema::events,
    state::Conn,
    teams::Team,
    template::Page,
    util_resp::{StandardResponse, see_other_ok, success},
};

pub async fn event_settings_page(
    Path((team_slug, event_slug)): Path<(String, String)>,
    user: User<true>,
    mut conn: Conn<true>,
) -> StandardResponse {
    let event = Event::for_member(&user.id, &team_slug, &event_slug, &mut *conn)?;
    let team = Team::fetch_by_slug(&team_slug, &mut *conn)?;

    success(
        Page::new()
            .user(user)
            .team(team)
            .event(event.clone())
            .body(maud! {
                h1 { (event.name) " settings" }
                form method="post" class="mt-4" {
                    div class="form-check mb-3" {
                        input type="checkbox" class="form-check-input"
                            id="display_proposals_speakers"
                            name="display_proposals_speakers" value="true"
                            checked=(event.display_proposals_speakers);
                        label class="form-check-label" for="display_proposals_speakers" {
                            "Display proposal speakers to reviewers"
                        }
                    }
                    div class="form-check mb-3" {
                        input type="checkbox" class="form-check-input"
                            id="display_proposals_reviews"
                            name="display_proposals_reviews" value="true"
                            checked=(event.display_proposals_reviews);
                        label class="form-check-label" for="display_proposals_reviews" {
                            "Display review summaries to reviewers"
                        }
                    }
                    button type="submit" class="btn btn-primary" { "Save" }
                }
            })
            .render(),
    )
}

// Unchecked checkboxes are absent from the form body, hence the defaults.
#[derive(Deserialize)]
pub struct ReviewSettingsForm {
    #[serde(default)]
    pub display_proposals_speakers: bool,
    #[serde(default)]
    pub display_proposals_reviews: bool,
}

#[tracing::instrument(skip(conn, form))]
pub async fn do_update_event_settings(
    Path((team_slug, event_slug)): Path<(String, String)>,
    user: User<true>,
    mut conn: Conn<true>,
    Form(form): Form<ReviewSettingsForm>,
) -> StandardResponse {
    let event = Event::for_member(&user.id, &team_slug, &event_slug, &mut *conn)?;

    diesel::update(events::table.filter(events::id.eq(&event.id)))
        .set((
            events::display_proposals_speakers
                .eq(form.display_proposals_speakers),
            events::display_proposals_reviews
                .eq(form.display_proposals_reviews),
        ))
        .execute(&mut *conn)
        .unwrap();

    see_other_ok(Redirect::to(&format!(
        "/team/{team_slug}/{event_slug}/settings"
    )))
}
