use axum::extract::Path;
use diesel::prelude::*;
use hypertext::prelude::*;

use crate::{
    auth::User,
    events::Event,
    schema::events,
    state::Conn,
    teams::Team,
    template::Page,
    util_resp::{StandardResponse, success},
};

pub async fn team_page(
    Path(team_slug): Path<String>,
    user: User<true>,
    mut conn: Conn<true>,
) -> StandardResponse {
    let team = Team::fetch_by_slug(&team_slug, &mut *conn)?;
    team.check_user_is_member(&user.id, &mut *conn)?;

    let team_events = events::table
        .filter(events::team_id.eq(&team.id))
        .order(events::created_at.desc())
        .load::<Event>(&mut *conn)
        .unwrap();

    success(
        Page::new()
            .user(user)
            .team(team.clone())
            .body(maud! {
                h1 { (team.name) }
                div class="mb-3" {
                    a class="btn btn-primary" href=(format!("/team/{}/events/create", team.slug)) {
                        "New event"
                    }
                }
                p class="text-muted" {
                    "Reviewer invitation link: "
                    code { (format!("/invite/team/{}", team.invitation_code)) }
                }
                form method="post" action=(format!("/team/{}/settings/invite", team.slug)) class="mb-3" {
                    button type="submit" class="btn btn-outline-secondary btn-sm" {
                        "Regenerate invitation link"
                    }
                }
                ul class="list-group" {
                    @for event in &team_events {
                        li class="list-group-item" {
                            a href=(format!("/team/{}/{}/reviews", team.slug, event.slug)) {
                                (event.name)
                            }
                            span class="badge text-bg-secondary ms-2" { (event.kind) }
                        }
                    }
                }
            })
            .render(),
    )
}
