//! Score Store
//!
//! Durable per-game top-10 leaderboards in one shared document.
//!
//! Every operation re-reads the whole document and, when it mutates,
//! writes the whole document back before returning. There is no cache:
//! the file is the only state.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::document::ScoreDocument;
use crate::core::leaderboard::{leader_changed, LeaderSnapshot, Submission, LEADERBOARD_CAPACITY};
use crate::core::record::{is_valid_email, ScoreRecord};
use crate::notify::{NoopNotifier, NotificationPort, TopScoreNotice};
use crate::store::storage::{JsonFileStorage, ScoreStorage, StorageError};

/// Source of record timestamps.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Store errors. Corrupt documents are not errors; they read as empty.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The document could not be encoded.
    #[error("failed to encode score document: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Outcome of [`ScoreStore::update_score`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreUpdate {
    /// Whether the store was changed.
    pub accepted: bool,
    /// Score previously stored for the email (0 if none).
    pub previous_score: i64,
    /// Whether the update produced a new leader (and a notification attempt).
    pub new_leader: bool,
}

impl ScoreUpdate {
    fn rejected(previous_score: i64) -> Self {
        Self {
            accepted: false,
            previous_score,
            new_leader: false,
        }
    }

    /// `(accepted, previous_score)`.
    pub fn as_tuple(&self) -> (bool, i64) {
        (self.accepted, self.previous_score)
    }
}

/// Shared score store. Cheap to clone; clones share storage and notifier.
#[derive(Clone)]
pub struct ScoreStore {
    storage: Arc<dyn ScoreStorage>,
    notifier: Arc<dyn NotificationPort>,
    clock: Clock,
}

impl std::fmt::Debug for ScoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreStore")
            .field("location", &self.storage.location())
            .finish_non_exhaustive()
    }
}

impl ScoreStore {
    /// Store over `storage`, with notifications disabled and local time.
    pub fn new(storage: Arc<dyn ScoreStorage>) -> Self {
        Self {
            storage,
            notifier: Arc::new(NoopNotifier),
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    /// Store backed by the JSON file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::new(Arc::new(JsonFileStorage::new(path)))
    }

    /// Replace the notification port.
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationPort>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replace the timestamp source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Where the document lives.
    pub fn location(&self) -> String {
        self.storage.location()
    }

    /// Handle bound to one game identifier.
    pub fn game(&self, game_id: impl Into<String>) -> GameScores {
        GameScores {
            store: self.clone(),
            game_id: game_id.into(),
        }
    }

    /// Load the whole document. Missing or malformed documents read as empty.
    pub fn load(&self) -> Result<ScoreDocument, StoreError> {
        let bytes = match self.storage.load()? {
            Some(bytes) => bytes,
            None => {
                debug!("No score document at {}, starting empty", self.location());
                return Ok(ScoreDocument::new());
            }
        };

        let text = match std::str::from_utf8(&bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!("Score document {} is not UTF-8 ({}), treating as empty", self.location(), e);
                return Ok(ScoreDocument::new());
            }
        };

        match ScoreDocument::parse(text) {
            Ok(doc) => {
                for (game_id, count) in doc.unreadable_games() {
                    warn!(
                        "Skipped {} unreadable record(s) of {} in {}",
                        count,
                        game_id,
                        self.location()
                    );
                }
                Ok(doc)
            }
            Err(e) => {
                warn!("Score document {} is malformed ({}), treating as empty", self.location(), e);
                Ok(ScoreDocument::new())
            }
        }
    }

    fn persist(&self, doc: &ScoreDocument) -> Result<(), StoreError> {
        let text = doc.to_pretty_json()?;
        self.storage.save(text.as_bytes())?;
        Ok(())
    }

    /// Create an empty document if none exists yet. Never overwrites.
    ///
    /// Returns `true` if a document was created.
    pub fn ensure_initialized(&self) -> Result<bool, StoreError> {
        if self.storage.load()?.is_some() {
            return Ok(false);
        }
        self.persist(&ScoreDocument::new())?;
        info!("Created score document at {}", self.location());
        Ok(true)
    }

    /// Top records for `game_id`, best first, at most ten.
    pub fn top_scores(&self, game_id: &str) -> Result<Vec<ScoreRecord>, StoreError> {
        let doc = self.load()?;
        Ok(doc
            .leaderboard(game_id)
            .map(|board| board.top(LEADERBOARD_CAPACITY))
            .unwrap_or_default())
    }

    /// Top records of every game present in the document.
    pub fn all_top_scores(&self) -> Result<BTreeMap<String, Vec<ScoreRecord>>, StoreError> {
        let doc = self.load()?;
        Ok(doc
            .games()
            .map(|(id, board)| (id.to_string(), board.top(LEADERBOARD_CAPACITY)))
            .collect())
    }

    /// Record for `email` among the top records of `game_id`.
    pub fn find_player(&self, game_id: &str, email: &str) -> Result<Option<ScoreRecord>, StoreError> {
        Ok(self
            .top_scores(game_id)?
            .into_iter()
            .find(|r| r.email == email))
    }

    /// Submit a score.
    ///
    /// Rejected without touching storage when the email has no `@` or the
    /// game id is empty. An existing record is only replaced by a strictly
    /// greater score. Accepted updates are written before returning; if the
    /// top rank changed and the new top score is positive, the notifier is
    /// called once and its failure is only logged.
    pub fn update_score(
        &self,
        game_id: &str,
        name: &str,
        email: &str,
        score: i64,
    ) -> Result<ScoreUpdate, StoreError> {
        if game_id.is_empty() || !is_valid_email(email) {
            debug!("Score not saved for {:?} in {:?}: invalid identity", email, game_id);
            return Ok(ScoreUpdate::rejected(0));
        }

        let mut doc = self.load()?;
        let board = doc.leaderboard_mut(game_id);
        let before = board.leader().map(LeaderSnapshot::from);

        let submission = board.submit(name, email, score, (self.clock)());
        if let Submission::NotImproved { best } = submission {
            debug!("Score {} for {} in {} does not beat {}", score, email, game_id, best);
            return Ok(ScoreUpdate::rejected(best));
        }

        let leader = board
            .leader()
            .filter(|top| top.score > 0 && leader_changed(before.as_ref(), top))
            .cloned();

        self.persist(&doc)?;
        info!(
            "Saved score {} for {} in {} (previous {})",
            score,
            email,
            game_id,
            submission.previous_score()
        );

        if let Some(top) = &leader {
            self.announce(game_id, top);
        }

        Ok(ScoreUpdate {
            accepted: true,
            previous_score: submission.previous_score(),
            new_leader: leader.is_some(),
        })
    }

    /// Remove every record of `game_id`, keeping other games.
    ///
    /// Returns how many records were removed. Nothing is written when the
    /// game had no leaderboard.
    pub fn clear_game(&self, game_id: &str) -> Result<usize, StoreError> {
        let mut doc = self.load()?;
        let removed = match doc.remove(game_id) {
            Some(board) => board.len(),
            None => return Ok(0),
        };
        self.persist(&doc)?;
        info!("Cleared {} records from {}", removed, game_id);
        Ok(removed)
    }

    fn announce(&self, game_id: &str, leader: &ScoreRecord) {
        let notice = TopScoreNotice {
            email: leader.email.clone(),
            game_id: game_id.to_string(),
            score: leader.score,
            name: leader.name.clone(),
        };

        match self.notifier.notify(&notice) {
            Ok(()) => info!("Notified {} of new top score {} in {}", notice.email, notice.score, game_id),
            Err(e) => warn!("Failed to notify {} of new top score: {}", notice.email, e),
        }
    }
}

// =============================================================================
// PER-GAME HANDLE
// =============================================================================

/// A [`ScoreStore`] bound to one game identifier.
#[derive(Clone, Debug)]
pub struct GameScores {
    store: ScoreStore,
    game_id: String,
}

impl GameScores {
    /// Bound game identifier.
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Shared store.
    pub fn store(&self) -> &ScoreStore {
        &self.store
    }

    /// See [`ScoreStore::top_scores`].
    pub fn top_scores(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        self.store.top_scores(&self.game_id)
    }

    /// See [`ScoreStore::update_score`].
    pub fn update_score(&self, name: &str, email: &str, score: i64) -> Result<ScoreUpdate, StoreError> {
        self.store.update_score(&self.game_id, name, email, score)
    }

    /// See [`ScoreStore::find_player`].
    pub fn find_player(&self, email: &str) -> Result<Option<ScoreRecord>, StoreError> {
        self.store.find_player(&self.game_id, email)
    }

    /// See [`ScoreStore::clear_game`].
    pub fn clear(&self) -> Result<usize, StoreError> {
        self.store.clear_game(&self.game_id)
    }
}

// =============================================================================
// TESTS
// =============================================================================
