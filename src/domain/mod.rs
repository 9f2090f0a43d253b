pub mod models;
pub mod score;

pub use models::*;
pub use score::{Score, ScoreCard};
