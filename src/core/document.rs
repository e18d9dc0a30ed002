//! Score Document
//!
//! The whole persisted file: a mapping from game identifier to that
//! game's leaderboard. Only the top level must be a JSON object. Each
//! game is decoded on its own, unreadable records are skipped, and games
//! that are never mutated are written back exactly as they were read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

use crate::core::leaderboard::Leaderboard;
use crate::core::record::ScoreRecord;

/// One game's entry: decoded records plus the raw value it came from.
#[derive(Clone, Debug, Default, PartialEq)]
struct GameEntry {
    board: Leaderboard,
    /// Records that could not be decoded (or 1 for a non-array value).
    unreadable: usize,
    /// Value as read from disk, until the board is mutated.
    raw: Option<Value>,
}

impl GameEntry {
    fn decode(value: Value) -> Self {
        let mut records = Vec::new();
        let mut unreadable = 0;
        match value.as_array() {
            Some(items) => {
                for item in items {
                    match ScoreRecord::deserialize(item) {
                        Ok(record) => records.push(record),
                        Err(_) => unreadable += 1,
                    }
                }
            }
            None => unreadable += 1,
        }

        Self {
            board: Leaderboard::from_records(records),
            unreadable,
            raw: Some(value),
        }
    }
}

impl Serialize for GameEntry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.raw {
            Some(raw) => raw.serialize(serializer),
            None => self.board.serialize(serializer),
        }
    }
}

/// Every game's leaderboard, keyed by game identifier.
///
/// Uses BTreeMap so the written file has a stable key order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScoreDocument {
    games: BTreeMap<String, GameEntry>,
}

impl ScoreDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse document text. Any top level other than an object is an error;
    /// problems inside a game's array only affect that game.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<String, Value> = serde_json::from_str(text)?;
        let games = raw
            .into_iter()
            .map(|(id, value)| (id, GameEntry::decode(value)))
            .collect();
        Ok(Self { games })
    }

    /// Encode as pretty JSON with four-space indentation.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::with_capacity(256);
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only ever emits valid UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Leaderboard for `game_id`, if the game has one.
    pub fn leaderboard(&self, game_id: &str) -> Option<&Leaderboard> {
        self.games.get(game_id).map(|entry| &entry.board)
    }

    /// Leaderboard for `game_id`, created empty if missing.
    ///
    /// The game is written from its decoded records from now on, so
    /// records that could not be read are dropped at the next save.
    pub fn leaderboard_mut(&mut self, game_id: &str) -> &mut Leaderboard {
        let entry = self.games.entry(game_id.to_string()).or_default();
        entry.raw = None;
        entry.unreadable = 0;
        &mut entry.board
    }

    /// Remove and return a game's leaderboard.
    pub fn remove(&mut self, game_id: &str) -> Option<Leaderboard> {
        self.games.remove(game_id).map(|entry| entry.board)
    }

    /// Iterate games in identifier order.
    pub fn games(&self) -> impl Iterator<Item = (&str, &Leaderboard)> {
        self.games.iter().map(|(id, entry)| (id.as_str(), &entry.board))
    }

    /// Records skipped while decoding `game_id`.
    pub fn unreadable_records(&self, game_id: &str) -> usize {
        self.games.get(game_id).map_or(0, |entry| entry.unreadable)
    }

    /// Games with records that could not be decoded, and how many.
    pub fn unreadable_games(&self) -> impl Iterator<Item = (&str, usize)> {
        self.games
            .iter()
            .filter(|(_, entry)| entry.unreadable > 0)
            .map(|(id, entry)| (id.as_str(), entry.unreadable))
    }

    /// Number of games present.
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Whether no game has a leaderboard.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
