pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::GameConfig;

pub use adapters::{
    CatalogItemSource, ConfiguredSource, HttpItemSource, InMemoryScoreRepository,
    JsonFileScoreRepository,
};
pub use core::{
    events::RoundEvent,
    leaderboard::{Leaderboard, LeaderboardPage},
    percentile::PercentileCalculator,
    results::{GameSummary, ResultsService},
    round::{GuessOutcome, RoundEngine, TiePolicy},
    session::GameSession,
};
pub use domain::model::{
    Direction, GameResult, Item, ItemView, PackId, PairSnapshot, Phase, RoundState, ScoreEntry,
};
pub use domain::ports::{ItemSource, ScoreRepository};
pub use utils::error::{GameError, Result};
