//! Player Identity
//!
//! Who is playing: an optional validated email, the name shown on the
//! leaderboard, and the small file that remembers the last email typed
//! into the launcher.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::record::{display_name, email_local_part, is_valid_email};

/// Name used when a player has neither a typed name nor an email.
pub const GUEST_NAME: &str = "Guest";

/// Domain of synthesized guest emails. Kept for compatibility with
/// existing score files.
pub const PLACEHOLDER_DOMAIN: &str = "anonimo";

/// Placeholder email for a guest called `name`.
pub fn placeholder_email(name: &str) -> String {
    format!("{}@{}", name.trim().to_lowercase(), PLACEHOLDER_DOMAIN)
}

/// Whether `email` looks like a guest placeholder: any address containing
/// `@anonimo`, so variants such as `zoe@anonimo.com` count too.
pub fn is_placeholder_email(email: &str) -> bool {
    email
        .to_ascii_lowercase()
        .contains(&format!("@{}", PLACEHOLDER_DOMAIN))
}

/// The person in front of the launcher.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerIdentity {
    email: Option<String>,
}

impl PlayerIdentity {
    /// A player without email.
    pub fn guest() -> Self {
        Self::default()
    }

    /// Identity from the games' single positional argument.
    ///
    /// Missing, blank or `@`-less input yields a guest.
    pub fn from_arg(arg: Option<&str>) -> Self {
        let email = arg
            .map(str::trim)
            .filter(|e| is_valid_email(e))
            .map(str::to_string);
        Self { email }
    }

    /// Validated email, if any.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Whether the player has no email.
    pub fn is_guest(&self) -> bool {
        self.email.is_none()
    }

    /// Name to store for this player.
    ///
    /// The typed name wins; a blank one falls back to the email's local
    /// part, then to [`GUEST_NAME`]. The result is cut to display length.
    pub fn resolve_name(&self, typed: &str) -> String {
        let typed = typed.trim();
        let name = if !typed.is_empty() && typed != GUEST_NAME {
            typed
        } else {
            self.email()
                .and_then(email_local_part)
                .unwrap_or(GUEST_NAME)
        };
        display_name(name)
    }
}

// =============================================================================
// EMAIL MEMORY
// =============================================================================

/// Remembers the last email entered in the launcher.
///
/// Purely a convenience: read and write failures are logged and ignored.
#[derive(Clone, Debug)]
pub struct EmailMemory {
    path: PathBuf,
}

impl EmailMemory {
    /// Memory stored at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Last remembered email, trimmed; `None` if absent or blank.
    pub fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Some(text.trim().to_string()).filter(|e| !e.is_empty()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Could not read remembered email from {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Remember `email` for next time.
    pub fn save(&self, email: &str) {
        let result = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| fs::write(&self.path, email.trim()));

        match result {
            Ok(()) => debug!("Remembered email in {}", self.path.display()),
            Err(e) => warn!("Could not remember email in {}: {}", self.path.display(), e),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
