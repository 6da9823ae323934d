//! HTTP route handlers

pub mod auth;
pub mod decks;
pub mod settings;
pub mod study;
pub mod users;
