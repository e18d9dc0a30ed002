//! Leaderboard Rules
//!
//! Pure, file-free rules for one game's leaderboard:
//! - Stable descending sort by score (ties keep prior order)
//! - Truncation to [`LEADERBOARD_CAPACITY`] records
//! - Best-score-only submission per email
//! - Top rank change detection

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core::record::ScoreRecord;

/// Maximum number of records kept per game.
pub const LEADERBOARD_CAPACITY: usize = 10;

/// Result of submitting a score to a leaderboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Submission {
    /// Email had no record; a new one was added.
    Inserted,
    /// Existing record was replaced by a strictly greater score.
    Improved {
        /// Score stored before the improvement.
        previous: i64,
    },
    /// Existing record was kept; nothing changed.
    NotImproved {
        /// Score already stored for the email.
        best: i64,
    },
}

impl Submission {
    /// Whether the leaderboard was mutated.
    pub fn accepted(&self) -> bool {
        !matches!(self, Submission::NotImproved { .. })
    }

    /// Score stored for the email before the submission (0 if none).
    pub fn previous_score(&self) -> i64 {
        match *self {
            Submission::Inserted => 0,
            Submission::Improved { previous } => previous,
            Submission::NotImproved { best } => best,
        }
    }
}

/// Identity of the top-ranked record at some point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderSnapshot {
    /// Leader's email.
    pub email: String,
    /// Leader's score.
    pub score: i64,
}

impl From<&ScoreRecord> for LeaderSnapshot {
    fn from(record: &ScoreRecord) -> Self {
        Self {
            email: record.email.clone(),
            score: record.score,
        }
    }
}

/// Whether `after` represents a different top rank than `before`.
///
/// A change is a higher top score or a different top email. An empty
/// board before counts as score 0 with no email.
pub fn leader_changed(before: Option<&LeaderSnapshot>, after: &ScoreRecord) -> bool {
    match before {
        None => true,
        Some(prev) => after.score > prev.score || after.email != prev.email,
    }
}

/// One game's records.
///
/// Records loaded from disk are kept in file order until the next
/// mutation ranks them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    records: Vec<ScoreRecord>,
}

impl Leaderboard {
    /// Create an empty leaderboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap records as they are, without ranking.
    pub fn from_records(records: Vec<ScoreRecord>) -> Self {
        Self { records }
    }

    /// Records in stored order.
    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record stored for `email`, searching every stored record.
    pub fn find(&self, email: &str) -> Option<&ScoreRecord> {
        self.records.iter().find(|r| r.email == email)
    }

    /// Highest-scoring record; the earliest one wins ties.
    pub fn leader(&self) -> Option<&ScoreRecord> {
        let mut best: Option<&ScoreRecord> = None;
        for record in &self.records {
            if best.map_or(true, |b| record.score > b.score) {
                best = Some(record);
            }
        }
        best
    }

    /// Stable sort descending by score, then drop everything past capacity.
    pub fn rank(&mut self) {
        self.records.sort_by(|a, b| b.score.cmp(&a.score));
        self.records.truncate(LEADERBOARD_CAPACITY);
    }

    /// Ranked copy of at most `limit` records. Does not mutate.
    pub fn top(&self, limit: usize) -> Vec<ScoreRecord> {
        let mut ranked = self.records.clone();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.truncate(limit.min(LEADERBOARD_CAPACITY));
        ranked
    }

    /// Submit `score` for `email`.
    ///
    /// An existing record is only replaced by a strictly greater score;
    /// otherwise the board is left untouched. Accepted submissions
    /// re-rank the board.
    pub fn submit(
        &mut self,
        name: &str,
        email: &str,
        score: i64,
        now: NaiveDateTime,
    ) -> Submission {
        let submission = match self.records.iter().position(|r| r.email == email) {
            Some(index) => {
                let record = &mut self.records[index];
                if score <= record.score {
                    return Submission::NotImproved { best: record.score };
                }
                let previous = record.score;
                record.name = name.to_string();
                record.score = score;
                record.date = Some(now);
                Submission::Improved { previous }
            }
            None => {
                self.records.push(ScoreRecord::new(name, email, score, now));
                Submission::Inserted
            }
        };

        self.rank();
        submission
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use std::collections::{BTreeMap, HashSet};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn rec(email: &str, score: i64) -> ScoreRecord {
        ScoreRecord::new(email.to_uppercase(), email, score, now())
    }

    #[test]
    fn test_insert_into_empty() {
        let mut board = Leaderboard::new();
        let result = board.submit("AL", "al@x.com", 50, now());

        assert_eq!(result, Submission::Inserted);
        assert!(result.accepted());
        assert_eq!(result.previous_score(), 0);
        assert_eq!(board.len(), 1);
        assert_eq!(board.records()[0].name, "AL");
    }

    #[test]
    fn test_lower_score_rejected_without_mutation() {
        let mut board = Leaderboard::from_records(vec![rec("a@x", 100), rec("b@x", 90)]);
        let before = board.clone();

        let result = board.submit("B", "b@x", 80, now());

        assert_eq!(result, Submission::NotImproved { best: 90 });
        assert!(!result.accepted());
        assert_eq!(result.previous_score(), 90);
        assert_eq!(board, before);
    }

    #[test]
    fn test_equal_score_rejected() {
        let mut board = Leaderboard::from_records(vec![rec("a@x", 100)]);
        assert_eq!(
            board.submit("A", "a@x", 100, now()),
            Submission::NotImproved { best: 100 }
        );
    }

    #[test]
    fn test_improvement_overwrites_name_and_date() {
        let mut board = Leaderboard::from_records(vec![rec("a@x", 100), rec("b@x", 90)]);
        let later = now() + chrono::Duration::hours(1);

        let result = board.submit("Bobby", "b@x", 120, later);

        assert_eq!(result, Submission::Improved { previous: 90 });
        let top = &board.records()[0];
        assert_eq!(top.email, "b@x");
        assert_eq!(top.name, "Bobby");
        assert_eq!(top.score, 120);
        assert_eq!(top.date, Some(later));
    }

    #[test]
    fn test_ties_keep_prior_order() {
        let mut board = Leaderboard::from_records(vec![rec("a@x", 50), rec("b@x", 40)]);
        board.submit("C", "c@x", 50, now());

        let emails: Vec<_> = board.records().iter().map(|r| r.email.as_str()).collect();
        assert_eq!(emails, vec!["a@x", "c@x", "b@x"]);
    }

    #[test]
    fn test_eleventh_player_evicts_tenth() {
        let records = (0..10)
            .map(|i| rec(&format!("p{}@x", i), 100 - i as i64 * 5))
            .collect();
        let mut board = Leaderboard::from_records(records);
        assert_eq!(board.records()[9].email, "p9@x");

        let result = board.submit("NEW", "new@x", 60, now());

        assert!(result.accepted());
        assert_eq!(board.len(), LEADERBOARD_CAPACITY);
        assert!(board.find("p9@x").is_none());
        assert!(board.find("new@x").is_some());
    }

    #[test]
    fn test_low_newcomer_on_full_board_is_dropped() {
        let records = (0..10).map(|i| rec(&format!("p{}@x", i), 100)).collect();
        let mut board = Leaderboard::from_records(records);

        let result = board.submit("LOW", "low@x", 1, now());

        assert_eq!(result, Submission::Inserted);
        assert!(board.find("low@x").is_none());
    }

    #[test]
    fn test_leader_prefers_earliest_on_tie() {
        let board = Leaderboard::from_records(vec![rec("a@x", 10), rec("b@x", 30), rec("c@x", 30)]);
        assert_eq!(board.leader().unwrap().email, "b@x");
        assert!(Leaderboard::new().leader().is_none());
    }

    #[test]
    fn test_top_does_not_mutate() {
        let board = Leaderboard::from_records(vec![rec("a@x", 1), rec("b@x", 2)]);
        let top = board.top(LEADERBOARD_CAPACITY);

        assert_eq!(top[0].email, "b@x");
        assert_eq!(board.records()[0].email, "a@x");
        assert_eq!(board.top(1).len(), 1);
    }

    #[test]
    fn test_leader_change_detection() {
        let prev = LeaderSnapshot { email: "a@x".into(), score: 100 };

        assert!(leader_changed(None, &rec("a@x", 1)));
        assert!(leader_changed(Some(&prev), &rec("c@x", 150)));
        assert!(leader_changed(Some(&prev), &rec("a@x", 110)));
        assert!(!leader_changed(Some(&prev), &rec("a@x", 100)));
    }

    proptest! {
        #[test]
        fn prop_board_invariants_hold(
            ops in prop::collection::vec((0u8..15, 0i64..1000), 1..80)
        ) {
            let mut board = Leaderboard::new();
            let mut best: BTreeMap<String, i64> = BTreeMap::new();

            for (player, score) in ops {
                let email = format!("p{}@x", player);
                let before = board.find(&email).map(|r| r.score);
                board.submit("P", &email, score, now());

                let records = board.records();
                prop_assert!(records.len() <= LEADERBOARD_CAPACITY);
                prop_assert!(records.windows(2).all(|w| w[0].score >= w[1].score));
                let unique: HashSet<_> = records.iter().map(|r| &r.email).collect();
                prop_assert_eq!(unique.len(), records.len());

                if let (Some(prev), Some(after)) = (before, board.find(&email)) {
                    prop_assert!(after.score >= prev);
                }
                let entry = best.entry(email).or_insert(score);
                *entry = (*entry).max(score);
                // Evicted players start over when they re-enter.
                best.retain(|e, _| board.find(e).is_some());

                for record in board.records() {
                    prop_assert_eq!(Some(&record.score), best.get(&record.email));
                }
            }
        }
    }
}
