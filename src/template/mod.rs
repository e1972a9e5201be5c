//! Templating code.
//!
//! This defines the [`Page`] item, which is used in most of the other parts of
//! this crate.

use hypertext::prelude::*;

use crate::{auth::User, events::Event, teams::Team};

pub struct Page<R1: Renderable, const TX: bool> {
    body: Option<R1>,
    user: Option<User<TX>>,
    team: Option<Team>,
    event: Option<Event>,
}

impl<R1: Renderable, const TX: bool> Page<R1, TX> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn body(mut self, body: R1) -> Self {
        self.body = Some(body);
        self
    }

    pub fn user(mut self, user: User<TX>) -> Self {
        self.user = Some(user);
        self
    }

    pub fn user_opt(mut self, user: Option<User<TX>>) -> Self {
        self.user = user;
        self
    }

    pub fn team(mut self, team: Team) -> Self {
        self.team = Some(team);
        self
    }

    pub fn event(mut self, event: Event) -> Self {
        self.event = Some(event);
        self
    }
}

impl<R1: Renderable, const TX: bool> Renderable for Page<R1, TX> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            html {
                head {
                    title { "Conference Hall" }
                    script src="https://cdn.jsdelivr.net/npm/htmx.org@2.0.7/dist/htmx.min.js" integrity="sha384-ZBXiYtYQ6hJ2Y0ZNoYuI+Nq5MqWBr+chMrS/RkXpNzQCApHEhOt2aY8EJgqwHLkJ" crossorigin="anonymous" {
                    }
                    link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css" rel="stylesheet";
                    meta
                        name="viewport"
                        content="width=device-width, initial-scale=1";
                }
                body class="d-flex flex-column vh-100" {
                    nav class="navbar navbar-expand"
                        style="background-color: #28445c; display: flex; justify-content: space-between; align-items: center;"
                        data-bs-theme="dark" {
                        div class="container-fluid" style="display: flex; justify-content: space-between; align-items: center;" {
                            @if let Some(team) = &self.team {
                                a class="navbar-brand text-white"
                                  href=(format!("/team/{}", team.slug)) {
                                    (team.name)
                                }
                            } @else {
                                a class="navbar-brand text-white" href="/" {
                                    "Conference Hall"
                                }
                            }
                            @if let (Some(team), Some(event)) = (&self.team, &self.event) {
                                ul class="navbar-nav" style="display: flex; gap: 1rem;" data-bs-theme="dark" {
                                    li class="nav-item" {
                                        a class="nav-link text-white" href=(format!("/team/{}/{}/reviews", team.slug, event.slug)) {
                                            "Proposals"
                                        }
                                    }
                                    li class="nav-item" {
                                        a class="nav-link text-white" href=(format!("/team/{}/{}/settings", team.slug, event.slug)) {
                                            "Settings"
                                        }
                                    }
                                }
                            }
                            div {
                                ul class="navbar-nav" style="display: flex; gap: 1rem;" data-bs-theme="dark" {
                                    @if let Some(user) = &self.user {
                                        li class="nav-item" {
                                            a class="nav-link text-white" href="/speaker/talks" {
                                                (user.name)
                                            }
                                        }
                                    } @else {
                                        li class="nav-item" {
                                            a class="nav-link text-white" href="/login" {
                                                "Login"
                                            }
                                        }
                                        li class="nav-item" {
                                            a class="nav-link text-white" href="/register" {
                                                "Register"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                    div class="flex-grow-1 container mt-4" {
                        @if let Some(body) = &self.body {
                            (body)
                        }
                    }
                }
            }
        }.render_to(buffer)
    }
}

impl<R1: Renderable, const TX: bool> Default for Page<R1, TX> {
    fn default() -> Self {
        Self {
            body: Default::default(),
            user: Default::default(),
            team: Default::default(),
            event: Default::default(),
        }
    }
}
