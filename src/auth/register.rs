use argon2::Argon2;
use argon2::PasswordHasher;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use axum::{extract::Form, response::Redirect};
use axum_extra::extract::PrivateCookieJar;
use chrono::Utc;
use diesel::{insert_into, prelude::*};
use hypertext::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{User, set_login_cookie},
    schema::users,
    state::Conn,
    template::Page,
    util_resp::{FailureResponse, StandardResponse, bad_request, success},
    validation::is_valid_email,
    widgets::alert::ErrorAlert,
};

pub async fn register_page(user: Option<User<true>>) -> StandardResponse {
    if user.is_some() {
        return bad_request(
            Page::new()
                .user_opt(user)
                .body(maud! {
                    ErrorAlert msg = "You are already logged in.";
                })
                .render(),
        );
    }

    success(
        Page::new().user_opt(user).body(maud! {
            h1 { "Register" }
            form method="post" class="mt-4" {
                div class="mb-3" {
                    label for="name" class="form-label" { "Full name" }
                    input type="text" class="form-control" id="name" name="name";
                }
                div class="mb-3" {
                    label for="username" class="form-label" { "Username" }
                    input type="text" class="form-control" id="username" name="username";
                }
                div class="mb-3" {
                    label for="email" class="form-label" { "Email" }
                    input type="email" class="form-control" id="email" name="email";
                }
                div class="mb-3" {
                    label for="password" class="form-label" { "Password" }
                    input type="password" class="form-control" id="password" name="password";
                }
                button type="submit" class="btn btn-primary" { "Register" }
            }
        }).render(),
    )
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

fn register_error(msg: &str) -> FailureResponse {
    FailureResponse::BadRequest(
        Page::<_, true>::new()
            .body(maud! {
                ErrorAlert msg = (msg);
            })
            .render(),
    )
}

#[tracing::instrument(skip(conn, jar, form))]
pub async fn do_register(
    mut conn: Conn<true>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<(PrivateCookieJar, Redirect), FailureResponse> {
    if !User::<true>::validate_username(&form.username) {
        return Err(register_error(
            "Usernames must be longer than 3 characters and alphanumeric.",
        ));
    }

    if is_valid_email(&form.email).is_err() {
        return Err(register_error("Invalid email address."));
    }

    if !User::<true>::validate_password(&form.password) {
        return Err(register_error(
            "Passwords must be longer than 6 characters.",
        ));
    }

    let already_taken = diesel::select(diesel::dsl::exists(
        users::table.filter(
            users::username
                .eq(&form.username)
                .or(users::email.eq(&form.email)),
        ),
    ))
    .get_result::<bool>(&mut *conn)
    .unwrap();

    if already_taken {
        return Err(register_error(
            "A user with that username or email already exists.",
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(form.password.as_bytes(), &salt)
        .unwrap()
        .to_string();

    let user_id = Uuid::now_v7().to_string();
    let n = insert_into(users::table)
        .values((
            users::id.eq(&user_id),
            users::name.eq(&form.name),
            users::username.eq(&form.username),
            users::email.eq(&form.email),
            users::password_hash.eq(&password_hash),
            users::socials.eq("{}"),
            users::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)
        .unwrap();
    assert_eq!(n, 1);

    let jar = set_login_cookie(user_id, jar);

    Ok((jar, Redirect::to("/")))
}
