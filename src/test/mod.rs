pub mod factories;

mod invites;
mod search;
