//! Core score types.
//!
//! Everything in this module is pure: no file access, no clock reads.
//! Timestamps are passed in by the caller.

pub mod record;
pub mod leaderboard;
pub mod document;

// Re-export core types
pub use record::{ScoreRecord, is_valid_email, display_name, DATE_FORMAT, DISPLAY_NAME_LEN};
pub use leaderboard::{Leaderboard, LeaderSnapshot, Submission, leader_changed, LEADERBOARD_CAPACITY};
pub use document::ScoreDocument;
