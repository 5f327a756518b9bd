pub mod auth_service;
pub mod collection_service;
pub mod deck_service;
pub mod legality;
pub mod scryfall_service;
pub mod stats_service;
pub mod user_service;
