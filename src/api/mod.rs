pub mod auth;
pub mod cards;
pub mod collections;
pub mod decks;
pub mod health;
pub mod stats;
pub mod swagger;
pub mod users;
