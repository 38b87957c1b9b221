//! SeaORM entity definitions for the tables shared with the web application.

pub mod auth_provider;
pub mod prelude;
pub mod saved_repository;
pub mod user_account;
