pub mod events;
pub mod leaderboard;
pub mod percentile;
pub mod results;
pub mod round;
pub mod session;

pub use crate::domain::model::{
    Direction, GameResult, Item, ItemView, PackId, PairSnapshot, Phase, RoundState, ScoreEntry,
};
pub use crate::domain::ports::{ItemSource, ScoreRepository};
pub use crate::utils::error::Result;
