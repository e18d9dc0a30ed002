//! Score Persistence
//!
//! - `storage`: whole-document byte storage (file, memory)
//! - `score_store`: leaderboard operations over a storage backend

pub mod storage;
pub mod score_store;

pub use storage::{JsonFileStorage, MemoryStorage, ScoreStorage, StorageError};
pub use score_store::{Clock, GameScores, ScoreStore, ScoreUpdate, StoreError};
