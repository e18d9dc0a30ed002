//! Record Emails
//!
//! Composes the "you are the new #1" email and hands it to a
//! [`MailTransport`]. Talking SMTP is left to whatever drains the
//! transport; the bundled [`OutboxTransport`] spools messages as JSON files.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::record::{email_local_part, is_valid_email};
use crate::notify::{NotificationPort, NotifyError, TopScoreNotice};

/// Name used when neither a player name nor an email local part exists.
const FALLBACK_PLAYER_NAME: &str = "Player";

/// A composed multipart (text + HTML) message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Unique message id.
    pub id: Uuid,
    /// Composition time.
    pub created_at: DateTime<Local>,
    /// `From` header.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text alternative.
    pub text_body: String,
    /// HTML alternative.
    pub html_body: String,
}

/// Something that can carry a composed message away.
pub trait MailTransport: Send + Sync {
    /// Hand over one message.
    fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}

/// Format an integer with `,` thousands separators.
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn greeting_name(notice: &TopScoreNotice) -> &str {
    let name = notice.name.trim();
    if !name.is_empty() {
        return name;
    }
    email_local_part(&notice.email).unwrap_or(FALLBACK_PLAYER_NAME)
}

/// Whether `address` can be placed inside `<...>` in a mail header.
pub fn is_header_address(address: &str) -> bool {
    is_valid_email(address)
        && !address
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | ',' | '"'))
}

/// Build the record email for `notice`.
pub fn compose_top_score_email(sender: &str, notice: &TopScoreNotice) -> EmailMessage {
    let player = greeting_name(notice);
    let game = &notice.game_id;
    let score = format_thousands(notice.score);

    let subject = format!("🏆 New record in {}!", game);

    let text_body = format!(
        "Congratulations {player}! 🎉\n\n\
         You reached first place in {game} with {score} points.\n\
         You are the new #1 of the ranking.\n\n\
         Keep playing and defend your spot.\n"
    );

    let html_body = format!(
        "<html>\n\
         <body style=\"font-family: Arial, sans-serif; background-color:#f4f4f4; padding:20px;\">\n\
         <div style=\"max-width:600px; margin:auto; background:#fff; border-radius:8px; padding:20px; border:1px solid #ddd;\">\n\
         <h2 style=\"color:#2b6cb0; text-align:center;\">🏆 New Record!</h2>\n\
         <p style=\"font-size:16px; color:#333;\"><b>Congratulations, {player}!</b><br>\n\
         You reached <b>first place</b> in <span style=\"color:#2b6cb0; font-weight:bold;\">{game}</span> \
         with <b>{score}</b> points.</p>\n\
         <p style=\"font-size:15px; color:#333;\">You are the new champion of the ranking.<br>\n\
         Keep playing and defend your spot!</p>\n\
         <hr style=\"margin:20px 0;\">\n\
         <p style=\"font-size:13px; color:#888; text-align:center;\">\
         Sent automatically by the 3-in-1 arcade score system.</p>\n\
         </div>\n\
         </body>\n\
         </html>\n",
        player = escape_html(player),
        game = escape_html(game),
        score = score,
    );

    EmailMessage {
        id: Uuid::new_v4(),
        created_at: Local::now(),
        from: format!("3-in-1 Arcade <{}>", sender),
        to: notice.email.clone(),
        subject,
        text_body,
        html_body,
    }
}

// =============================================================================
// OUTBOX TRANSPORT
// =============================================================================

/// Spools each message as `<id>.json` in a directory.
#[derive(Clone, Debug)]
pub struct OutboxTransport {
    dir: PathBuf,
}

impl OutboxTransport {
    /// Outbox rooted at `dir` (created on first send).
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Spool directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl MailTransport for OutboxTransport {
    fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.json", message.id));
        let bytes = serde_json::to_vec_pretty(message)?;
        fs::write(&path, bytes)?;
        debug!("Spooled message {} to {}", message.id, path.display());
        Ok(())
    }
}

// =============================================================================
// EMAIL NOTIFIER
// =============================================================================

/// Notification port that composes a record email per notice.
#[derive(Clone, Debug)]
pub struct EmailNotifier<T: MailTransport> {
    sender: String,
    transport: T,
}

impl<T: MailTransport> EmailNotifier<T> {
    /// Notifier sending as `sender` through `transport`.
    pub fn new(sender: impl Into<String>, transport: T) -> Self {
        Self {
            sender: sender.into(),
            transport,
        }
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: MailTransport> NotificationPort for EmailNotifier<T> {
    fn notify(&self, notice: &TopScoreNotice) -> Result<(), NotifyError> {
        if !is_header_address(&self.sender) {
            return Err(NotifyError::InvalidSender(self.sender.clone()));
        }
        if !is_header_address(&notice.email) {
            return Err(NotifyError::InvalidRecipient(notice.email.clone()));
        }

        let message = compose_top_score_email(&self.sender, notice);
        self.transport.send(&message)?;
        info!("Record email queued for {} ({})", notice.email, notice.game_id);
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
