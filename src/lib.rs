//! # Arcade Scores
//!
//! Shared leaderboard persistence for the 3-in-1 arcade (Flappy Bird, Snake,
//! Space Invaders).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ARCADE SCORES                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Pure leaderboard rules                  │
//! │  ├── record.rs     - Score records and email validation      │
//! │  ├── leaderboard.rs- Top-10 ranking and best-score updates   │
//! │  └── document.rs   - Game id -> leaderboard JSON document    │
//! │                                                              │
//! │  store/            - Persistence (I/O)                       │
//! │  ├── storage.rs    - Byte storage (file, memory)             │
//! │  └── score_store.rs- Load-modify-save score store            │
//! │                                                              │
//! │  notify/           - Top score notifications                 │
//! │  └── email.rs      - Record emails and outbox transport      │
//! │                                                              │
//! │  launcher/         - Menu-side plumbing                      │
//! │  ├── game.rs       - Game catalog and guest policies         │
//! │  ├── player.rs     - Player identity and email memory        │
//! │  ├── session.rs    - Session lifecycle                       │
//! │  └── board.rs      - Leaderboard rendering                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Consistency
//!
//! The score file is the only shared state. Every operation re-reads it,
//! every accepted update rewrites it whole, so several game processes see
//! each other's scores without further coordination. Concurrent writers
//! are last-writer-wins.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod store;
pub mod notify;
pub mod launcher;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use crate::core::record::{is_valid_email, ScoreRecord};
pub use crate::core::leaderboard::{Leaderboard, Submission, LEADERBOARD_CAPACITY};
pub use crate::core::document::ScoreDocument;
pub use store::{GameScores, JsonFileStorage, ScoreStore, ScoreUpdate, StoreError};
pub use notify::{NotificationPort, TopScoreNotice};
pub use launcher::{GameKind, Launcher, PlayerIdentity};
pub use config::{ArcadeConfig, DEFAULT_SCORES_PATH};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
