//! Game Catalog
//!
//! The three bundled games, their leaderboard identifiers, and how each
//! one treats players without a usable email.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::launcher::player::{is_placeholder_email, placeholder_email, PlayerIdentity};

/// A bundled game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameKind {
    /// Flappy-bird-style side-scroller.
    Flappy,
    /// Snake.
    Snake,
    /// Space-invaders shooter.
    SpaceInvaders,
}

impl GameKind {
    /// Every game, in menu order.
    pub const ALL: [GameKind; 3] = [GameKind::Flappy, GameKind::Snake, GameKind::SpaceInvaders];

    /// Leaderboard identifier in the score document.
    pub const fn id(self) -> &'static str {
        match self {
            GameKind::Flappy => "FLAPPY",
            GameKind::Snake => "SNAKE",
            GameKind::SpaceInvaders => "SPACEINVADERS",
        }
    }

    /// Menu title.
    pub const fn title(self) -> &'static str {
        match self {
            GameKind::Flappy => "Flappy Bird",
            GameKind::Snake => "Snake",
            GameKind::SpaceInvaders => "Space Invaders",
        }
    }

    /// How this game records scores of players without a real email.
    pub const fn guest_policy(self) -> GuestPolicy {
        match self {
            GameKind::Flappy => GuestPolicy::Placeholder,
            GameKind::Snake => GuestPolicy::RequireEmail,
            GameKind::SpaceInvaders => GuestPolicy::RequireRealEmail,
        }
    }

    /// Look up a game by its leaderboard identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.id() == id)
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl From<GameKind> for String {
    fn from(game: GameKind) -> Self {
        game.id().to_string()
    }
}

/// Unknown game name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown game '{0}' (expected flappy, snake or space-invaders)")]
pub struct UnknownGame(pub String);

impl FromStr for GameKind {
    type Err = UnknownGame;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "flappy" | "flappybird" => Ok(GameKind::Flappy),
            "snake" => Ok(GameKind::Snake),
            "spaceinvaders" | "invaders" => Ok(GameKind::SpaceInvaders),
            _ => Err(UnknownGame(s.to_string())),
        }
    }
}

// =============================================================================
// GUEST POLICY
// =============================================================================

/// Why a finished session's score was not sent to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Player has no (real) email.
    Guest,
    /// Nothing worth recording.
    NoScore,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Guest => f.write_str("playing as guest"),
            SkipReason::NoScore => f.write_str("no points scored"),
        }
    }
}

/// Identity under which a score should be stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScoreClaim {
    /// Store under this email.
    Record {
        /// Email key for the leaderboard.
        email: String,
    },
    /// Do not store.
    Skip(SkipReason),
}

/// Per-game treatment of guests and empty scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuestPolicy {
    /// Guests are stored under `lowercase(name)@anonimo`; every score counts.
    Placeholder,
    /// Only players with an email and a positive score are stored.
    RequireEmail,
    /// Like `RequireEmail`, and placeholder emails are refused too.
    RequireRealEmail,
}

impl GuestPolicy {
    /// Decide where `score` by `player` (shown as `name`) goes.
    pub fn claim(self, player: &PlayerIdentity, name: &str, score: i64) -> ScoreClaim {
        match self {
            GuestPolicy::Placeholder => ScoreClaim::Record {
                email: player
                    .email()
                    .map(str::to_string)
                    .unwrap_or_else(|| placeholder_email(name)),
            },
            GuestPolicy::RequireEmail | GuestPolicy::RequireRealEmail => {
                let email = match player.email() {
                    Some(email) => email,
                    None => return ScoreClaim::Skip(SkipReason::Guest),
                };
                if self == GuestPolicy::RequireRealEmail && is_placeholder_email(email) {
                    return ScoreClaim::Skip(SkipReason::Guest);
                }
                if score <= 0 {
                    return ScoreClaim::Skip(SkipReason::NoScore);
                }
                ScoreClaim::Record {
                    email: email.to_string(),
                }
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_stable() {
        assert_eq!(GameKind::Flappy.id(), "FLAPPY");
        assert_eq!(GameKind::Snake.id(), "SNAKE");
        assert_eq!(GameKind::SpaceInvaders.id(), "SPACEINVADERS");
        for game in GameKind::ALL {
            assert_eq!(GameKind::from_id(game.id()), Some(game));
        }
        assert_eq!(GameKind::from_id("snake"), None);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("snake".parse::<GameKind>(), Ok(GameKind::Snake));
        assert_eq!("FLAPPY".parse::<GameKind>(), Ok(GameKind::Flappy));
        assert_eq!("space-invaders".parse::<GameKind>(), Ok(GameKind::SpaceInvaders));
        assert_eq!("Space Invaders".parse::<GameKind>(), Ok(GameKind::SpaceInvaders));
        assert_eq!("pong".parse::<GameKind>(), Err(UnknownGame("pong".into())));
    }

    #[test]
    fn test_placeholder_policy_records_guests() {
        let guest = PlayerIdentity::guest();
        assert_eq!(
            GuestPolicy::Placeholder.claim(&guest, "Zoe", 0),
            ScoreClaim::Record { email: "zoe@anonimo".into() }
        );

        let player = PlayerIdentity::from_arg(Some("al@x.com"));
        assert_eq!(
            GuestPolicy::Placeholder.claim(&player, "AL", 3),
            ScoreClaim::Record { email: "al@x.com".into() }
        );
    }

    #[test]
    fn test_require_email_policy() {
        let guest = PlayerIdentity::guest();
        let player = PlayerIdentity::from_arg(Some("al@x.com"));

        assert_eq!(
            GuestPolicy::RequireEmail.claim(&guest, "AL", 10),
            ScoreClaim::Skip(SkipReason::Guest)
        );
        assert_eq!(
            GuestPolicy::RequireEmail.claim(&player, "AL", 0),
            ScoreClaim::Skip(SkipReason::NoScore)
        );
        assert_eq!(
            GuestPolicy::RequireEmail.claim(&player, "AL", 10),
            ScoreClaim::Record { email: "al@x.com".into() }
        );
    }

    #[test]
    fn test_require_real_email_refuses_placeholders() {
        let placeholder = PlayerIdentity::from_arg(Some("zoe@anonimo"));

        assert_eq!(
            GuestPolicy::RequireEmail.claim(&placeholder, "Zoe", 10),
            ScoreClaim::Record { email: "zoe@anonimo".into() }
        );
        assert_eq!(
            GuestPolicy::RequireRealEmail.claim(&placeholder, "Zoe", 10),
            ScoreClaim::Skip(SkipReason::Guest)
        );
    }
}
