//! Game Sessions
//!
//! The launcher owns one [`SessionContext`] per played game. The context
//! is created when the session starts and consumed when it ends, at
//! which point the final score is reported to the store.
//!
//! ```text
//! Launcher::begin ──► SessionContext ──► GameSession::play ──► SessionContext::finish
//!                          │                                        │
//!                          └── game, player, GameScores ────────────┴──► SessionReport
//! ```

use std::time::Instant;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::core::record::ScoreRecord;
use crate::launcher::game::{GameKind, ScoreClaim, SkipReason};
use crate::launcher::player::{EmailMemory, PlayerIdentity};
use crate::store::{GameScores, ScoreStore, ScoreUpdate, StoreError};

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The game ended without producing a result.
    #[error("game session aborted: {0}")]
    Aborted(String),
}

/// What a game reports when it ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionOutcome {
    /// Name typed on the game-over screen.
    pub name: String,
    /// Final score.
    pub score: i64,
}

/// What happened to a session's score.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveStatus {
    /// Stored.
    Saved {
        /// Score previously stored for the player.
        previous: i64,
        /// Whether the player became #1.
        new_leader: bool,
    },
    /// Player already has an equal or better score.
    NotImproved {
        /// The stored score.
        best: i64,
    },
    /// Not sent to the store.
    Skipped(SkipReason),
    /// The store failed; the score was lost.
    Failed(String),
}

impl SaveStatus {
    /// Whether the score reached the store.
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveStatus::Saved { .. })
    }
}

/// Result of a finished session, for the game-over and leaderboard screens.
#[derive(Clone, Debug)]
pub struct SessionReport {
    /// Game played.
    pub game: GameKind,
    /// Name the score was reported under.
    pub name: String,
    /// Final score.
    pub score: i64,
    /// What happened to the score.
    pub status: SaveStatus,
    /// Leaderboard after the update (empty if it could not be read).
    pub leaderboard: Vec<ScoreRecord>,
}

/// One running game. Rendering and input are the implementor's business.
pub trait GameSession {
    /// Which game this is.
    fn game(&self) -> GameKind;

    /// Run the game to completion.
    fn play(&mut self, ctx: &SessionContext) -> Result<SessionOutcome, SessionError>;
}

/// A session whose outcome is already known (e.g. reported on the command line).
#[derive(Clone, Debug)]
pub struct RecordedSession {
    game: GameKind,
    outcome: SessionOutcome,
}

impl RecordedSession {
    /// Session that will report `score` under `name`.
    pub fn new(game: GameKind, name: impl Into<String>, score: i64) -> Self {
        Self {
            game,
            outcome: SessionOutcome {
                name: name.into(),
                score,
            },
        }
    }
}

impl GameSession for RecordedSession {
    fn game(&self) -> GameKind {
        self.game
    }

    fn play(&mut self, _ctx: &SessionContext) -> Result<SessionOutcome, SessionError> {
        Ok(self.outcome.clone())
    }
}

// =============================================================================
// SESSION CONTEXT
// =============================================================================

/// Everything a running game may use. Lives exactly as long as the session.
#[derive(Debug)]
pub struct SessionContext {
    game: GameKind,
    player: PlayerIdentity,
    scores: GameScores,
    started_at: Instant,
}

impl SessionContext {
    /// Game being played.
    pub fn game(&self) -> GameKind {
        self.game
    }

    /// Player at the controls.
    pub fn player(&self) -> &PlayerIdentity {
        &self.player
    }

    /// The game's leaderboard handle.
    pub fn scores(&self) -> &GameScores {
        &self.scores
    }

    /// The player's current stored record, for "best so far" displays.
    pub fn personal_best(&self) -> Option<ScoreRecord> {
        let email = self.player.email()?;
        match self.scores.find_player(email) {
            Ok(record) => record,
            Err(e) => {
                warn!("Could not look up personal best: {}", e);
                None
            }
        }
    }

    /// End the session and report `outcome`. Store failures become
    /// [`SaveStatus::Failed`]; this never errors.
    pub fn finish(self, outcome: SessionOutcome) -> SessionReport {
        let name = self.player.resolve_name(&outcome.name);
        let claim = self
            .game
            .guest_policy()
            .claim(&self.player, &name, outcome.score);

        let status = match claim {
            ScoreClaim::Skip(reason) => {
                info!("Score {} in {} not saved: {}", outcome.score, self.game, reason);
                SaveStatus::Skipped(reason)
            }
            ScoreClaim::Record { email } => {
                save_status(self.scores.update_score(&name, &email, outcome.score))
            }
        };

        let leaderboard = self.scores.top_scores().unwrap_or_else(|e| {
            warn!("Could not reload {} leaderboard: {}", self.game, e);
            Vec::new()
        });

        info!(
            "Session of {} ended after {:.1}s with score {}",
            self.game,
            self.started_at.elapsed().as_secs_f32(),
            outcome.score
        );

        SessionReport {
            game: self.game,
            name,
            score: outcome.score,
            status,
            leaderboard,
        }
    }
}

fn save_status(result: Result<ScoreUpdate, StoreError>) -> SaveStatus {
    match result {
        Ok(update) if update.accepted => SaveStatus::Saved {
            previous: update.previous_score,
            new_leader: update.new_leader,
        },
        Ok(update) => SaveStatus::NotImproved {
            best: update.previous_score,
        },
        Err(e) => {
            error!("Score not saved: {}", e);
            SaveStatus::Failed(e.to_string())
        }
    }
}

// =============================================================================
// LAUNCHER
// =============================================================================

/// Menu-side owner of the store and the remembered email.
#[derive(Debug)]
pub struct Launcher {
    store: ScoreStore,
    email_memory: Option<EmailMemory>,
}

impl Launcher {
    /// Launcher over `store`, without email memory.
    pub fn new(store: ScoreStore) -> Self {
        Self {
            store,
            email_memory: None,
        }
    }

    /// Remember entered emails in `memory`.
    pub fn with_email_memory(mut self, memory: EmailMemory) -> Self {
        self.email_memory = Some(memory);
        self
    }

    /// Shared store.
    pub fn store(&self) -> &ScoreStore {
        &self.store
    }

    /// Email pre-filled in the menu's input box.
    pub fn remembered_email(&self) -> Option<String> {
        self.email_memory.as_ref().and_then(EmailMemory::load)
    }

    /// Start a session of `game` for `player`.
    pub fn begin(&self, game: GameKind, player: PlayerIdentity) -> SessionContext {
        if let (Some(memory), Some(email)) = (&self.email_memory, player.email()) {
            memory.save(email);
        }
        info!("Starting {} for {}", game.title(), player.email().unwrap_or("guest"));

        SessionContext {
            game,
            player,
            scores: self.store.game(game.id()),
            started_at: Instant::now(),
        }
    }

    /// Run `session` from start to finish.
    pub fn run(
        &self,
        session: &mut dyn GameSession,
        player: PlayerIdentity,
    ) -> Result<SessionReport, SessionError> {
        let ctx = self.begin(session.game(), player);
        let outcome = session.play(&ctx)?;
        Ok(ctx.finish(outcome))
    }

    /// Every game's leaderboard, in menu order.
    pub fn leaderboards(&self) -> Result<Vec<(GameKind, Vec<ScoreRecord>)>, StoreError> {
        let mut all = self.store.all_top_scores()?;
        Ok(GameKind::ALL
            .into_iter()
            .map(|game| (game, all.remove(game.id()).unwrap_or_default()))
            .collect())
    }
}

// =============================================================================
// TESTS
// =============================================================================
