pub mod card;
pub mod collection;
pub mod deck;
pub mod user;

pub use card::*;
pub use collection::*;
pub use deck::*;
pub use user::*;
