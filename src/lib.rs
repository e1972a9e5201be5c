use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub mod auth;
pub mod config;
pub mod events;
pub mod invites;
pub mod proposals;
pub mod reviews;
pub mod schema;
pub mod state;
pub mod talks;
pub mod teams;
pub mod template;
pub mod util_resp;
pub mod validation;
pub mod widgets;

#[cfg(test)]
pub mod test;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();
