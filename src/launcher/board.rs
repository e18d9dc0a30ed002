//! Plain-text leaderboard screens.

use std::fmt::Write as _;

use crate::core::record::{ScoreRecord, DATE_FORMAT};
use crate::launcher::game::GameKind;
use crate::launcher::session::SaveStatus;

/// Render one game's leaderboard as a fixed-width table.
pub fn render_leaderboard(game: GameKind, records: &[ScoreRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ({}) ==", game.title(), game.id());

    if records.is_empty() {
        out.push_str("   no scores yet\n");
        return out;
    }

    let _ = writeln!(out, "{:>3}  {:<5}  {:>9}  {}", "#", "NAME", "SCORE", "DATE");
    for (rank, record) in records.iter().enumerate() {
        let date = record
            .date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>3}  {:<5}  {:>9}  {}",
            rank + 1,
            record.display_name(),
            record.score,
            date
        );
    }
    out
}

/// One-line game-over feedback for a save status.
pub fn describe_status(status: &SaveStatus) -> String {
    match status {
        SaveStatus::Saved { new_leader: true, .. } => "Score saved. You are the new #1!".to_string(),
        SaveStatus::Saved { previous: 0, .. } => "Score saved.".to_string(),
        SaveStatus::Saved { previous, .. } => format!("New personal best (was {}).", previous),
        SaveStatus::NotImproved { best } => format!("Score not saved: your best is {}.", best),
        SaveStatus::Skipped(reason) => format!("Score not saved: {}.", reason),
        SaveStatus::Failed(message) => format!("Score not saved: {}", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::game::SkipReason;
    use chrono::NaiveDate;

    #[test]
    fn test_render_truncates_names() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let records = vec![ScoreRecord::new("Valentina", "v@x", 1200, date)];

        let text = render_leaderboard(GameKind::Snake, &records);

        assert!(text.starts_with("== Snake (SNAKE) =="));
        assert!(text.contains("  1  Valen       1200  2024-02-02 08:00:00"));
        assert!(!text.contains("Valentina"));
    }

    #[test]
    fn test_render_empty_board() {
        let text = render_leaderboard(GameKind::Flappy, &[]);
        assert!(text.contains("no scores yet"));
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(
            describe_status(&SaveStatus::Saved { previous: 0, new_leader: true }),
            "Score saved. You are the new #1!"
        );
        assert_eq!(
            describe_status(&SaveStatus::Saved { previous: 40, new_leader: false }),
            "New personal best (was 40)."
        );
        assert_eq!(
            describe_status(&SaveStatus::Skipped(SkipReason::Guest)),
            "Score not saved: playing as guest."
        );
    }
}
