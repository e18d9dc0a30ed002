//! Launcher
//!
//! Menu-side plumbing around the score store. Drawing, input and game
//! physics live in the games themselves.
//!
//! ## Module Structure
//!
//! - `game`: game catalog and guest policies
//! - `player`: player identity and remembered email
//! - `session`: session context lifecycle and score reporting
//! - `board`: text rendering of leaderboards

pub mod game;
pub mod player;
pub mod session;
pub mod board;

// Re-export key types
pub use game::{GameKind, GuestPolicy, ScoreClaim, SkipReason, UnknownGame};
pub use player::{EmailMemory, PlayerIdentity, GUEST_NAME};
pub use session::{
    GameSession, Launcher, RecordedSession, SaveStatus, SessionContext, SessionError,
    SessionOutcome, SessionReport,
};
pub use board::{describe_status, render_leaderboard};
