//! Database persistence layer for game sessions and guess history.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::DbError;
pub use models::{GameChangeset, GameRow, GuessRow, NewGuessRow};
pub use repository::{GameRepository, UpdateOutcome};
