//! Top Score Notifications
//!
//! The store calls a [`NotificationPort`] once per top rank change.
//! Delivery is fire-and-forget: one attempt, no retry, and a failure
//! never affects the score update that triggered it.

pub mod email;

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub use email::{
    compose_top_score_email, EmailMessage, EmailNotifier, MailTransport, OutboxTransport,
};

/// A new leader in one game's leaderboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopScoreNotice {
    /// Email of the new leader.
    pub email: String,
    /// Game identifier.
    pub game_id: String,
    /// Leader's score.
    pub score: i64,
    /// Leader's display name.
    pub name: String,
}

/// Notification errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Recipient is not a deliverable address.
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),
    /// Configured sender cannot be used in a `From` header.
    #[error("invalid sender: {0}")]
    InvalidSender(String),
    /// Message could not be encoded.
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
    /// Transport I/O failed.
    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),
    /// Transport refused the message.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Outbound "new #1" channel.
pub trait NotificationPort: Send + Sync {
    /// Attempt delivery once.
    fn notify(&self, notice: &TopScoreNotice) -> Result<(), NotifyError>;
}

/// Drops every notice.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

impl NotificationPort for NoopNotifier {
    fn notify(&self, _notice: &TopScoreNotice) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Writes every notice to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl NotificationPort for LogNotifier {
    fn notify(&self, notice: &TopScoreNotice) -> Result<(), NotifyError> {
        info!(
            game = %notice.game_id,
            email = %notice.email,
            score = notice.score,
            "New leader {} in {}",
            notice.name,
            notice.game_id
        );
        Ok(())
    }
}
