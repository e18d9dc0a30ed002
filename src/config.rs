//! Configuration
//!
//! Paths and notification settings, read from the environment.

use std::path::PathBuf;
use std::sync::Arc;

use crate::launcher::{EmailMemory, Launcher};
use crate::notify::{EmailNotifier, LogNotifier, NoopNotifier, NotificationPort, OutboxTransport};
use crate::store::ScoreStore;

/// Default location of the shared leaderboard file.
pub const DEFAULT_SCORES_PATH: &str = "data/global_scores.json";

/// Default location of the remembered email.
pub const DEFAULT_EMAIL_FILE: &str = "data/current_email.txt";

/// Default `From` address of record emails.
pub const DEFAULT_MAIL_SENDER: &str = "noreply@arcade.local";

/// Launcher and store configuration.
#[derive(Clone, Debug)]
pub struct ArcadeConfig {
    /// Shared leaderboard file.
    pub scores_path: PathBuf,
    /// File remembering the last entered email.
    pub email_file: PathBuf,
    /// Spool directory for record emails. If None, notices are only logged.
    pub mail_outbox: Option<PathBuf>,
    /// `From` address of record emails.
    pub mail_sender: String,
    /// Whether top score notifications are sent at all.
    pub notify: bool,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            scores_path: PathBuf::from(DEFAULT_SCORES_PATH),
            email_file: PathBuf::from(DEFAULT_EMAIL_FILE),
            mail_outbox: None,
            mail_sender: DEFAULT_MAIL_SENDER.to_string(),
            notify: true,
            log_level: "info".to_string(),
        }
    }
}

impl ArcadeConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            scores_path: std::env::var_os("ARCADE_SCORES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.scores_path),
            email_file: std::env::var_os("ARCADE_EMAIL_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.email_file),
            mail_outbox: std::env::var_os("ARCADE_MAIL_OUTBOX").map(PathBuf::from),
            mail_sender: std::env::var("ARCADE_MAIL_SENDER").unwrap_or(defaults.mail_sender),
            notify: std::env::var("ARCADE_NOTIFY")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.notify),
            log_level: std::env::var("ARCADE_LOG").unwrap_or(defaults.log_level),
        }
    }

    /// Notification port matching this configuration.
    pub fn notifier(&self) -> Arc<dyn NotificationPort> {
        if !self.notify {
            return Arc::new(NoopNotifier);
        }
        match &self.mail_outbox {
            Some(dir) => Arc::new(EmailNotifier::new(
                self.mail_sender.clone(),
                OutboxTransport::new(dir),
            )),
            None => Arc::new(LogNotifier),
        }
    }

    /// Score store over the configured file and notifier.
    pub fn open_store(&self) -> ScoreStore {
        ScoreStore::open(&self.scores_path).with_notifier(self.notifier())
    }

    /// Launcher over [`Self::open_store`] with email memory.
    pub fn launcher(&self) -> Launcher {
        Launcher::new(self.open_store()).with_email_memory(EmailMemory::new(&self.email_file))
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::TopScoreNotice;

    #[test]
    fn test_defaults() {
        let config = ArcadeConfig::default();
        assert_eq!(config.scores_path, PathBuf::from("data/global_scores.json"));
        assert!(config.notify);
        assert!(config.mail_outbox.is_none());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(" OFF "));
        assert!(!parse_flag("0"));
    }

    #[test]
    fn test_outbox_notifier_spools() {
        let dir = std::env::temp_dir().join(format!("arcade-config-{}", uuid::Uuid::new_v4()));
        let config = ArcadeConfig {
            mail_outbox: Some(dir.clone()),
            ..Default::default()
        };

        let notice = TopScoreNotice {
            email: "al@x.com".into(),
            game_id: "SNAKE".into(),
            score: 10,
            name: "AL".into(),
        };
        config.notifier().notify(&notice).unwrap();

        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_disabled_notifier_writes_nothing() {
        let dir = std::env::temp_dir().join(format!("arcade-config-{}", uuid::Uuid::new_v4()));
        let config = ArcadeConfig {
            mail_outbox: Some(dir.clone()),
            notify: false,
            ..Default::default()
        };

        let notice = TopScoreNotice {
            email: "al@x.com".into(),
            game_id: "SNAKE".into(),
            score: 10,
            name: "AL".into(),
        };
        config.notifier().notify(&notice).unwrap();

        assert!(!dir.exists());
    }
}
