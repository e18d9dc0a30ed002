//! Score Records
//!
//! A single leaderboard entry and the small rules attached to it:
//! email validity and display-name truncation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Wire format of the `date` field (local time, second precision).
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Names are shown with at most this many characters.
pub const DISPLAY_NAME_LEN: usize = 5;

/// One player's best score in one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Display name (not truncated at storage).
    #[serde(default)]
    pub name: String,
    /// Player identity within a leaderboard.
    pub email: String,
    /// Best score reached.
    #[serde(deserialize_with = "lenient_score")]
    pub score: i64,
    /// Time of insertion or last improvement. `None` for records whose
    /// date is missing or unreadable; such records are written without one.
    #[serde(with = "date_format", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDateTime>,
}

impl ScoreRecord {
    /// Create a record.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        score: i64,
        date: NaiveDateTime,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            score,
            date: Some(date),
        }
    }

    /// Name truncated for leaderboard display.
    pub fn display_name(&self) -> String {
        display_name(&self.name)
    }
}

/// An email is accepted as a player identity when it contains `@`.
#[inline]
pub fn is_valid_email(email: &str) -> bool {
    email.contains('@')
}

/// Truncate a name to [`DISPLAY_NAME_LEN`] characters.
pub fn display_name(name: &str) -> String {
    name.chars().take(DISPLAY_NAME_LEN).collect()
}

/// Local part of an email (text before the first `@`), if any.
pub fn email_local_part(email: &str) -> Option<&str> {
    email
        .split_once('@')
        .map(|(local, _)| local)
        .filter(|local| !local.is_empty())
}

/// Parse a stored date. Besides [`DATE_FORMAT`], ISO-8601 `T`-separated
/// dates (optionally with fractional seconds) are accepted.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

/// Integer scores as written by the games; fractional ones are truncated.
fn lenient_score<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawScore {
        Int(i64),
        Float(f64),
    }

    match RawScore::deserialize(deserializer)? {
        RawScore::Int(score) => Ok(score),
        RawScore::Float(score) if score.is_finite() => Ok(score.trunc() as i64),
        RawScore::Float(score) => Err(serde::de::Error::custom(format!("invalid score {}", score))),
    }
}

mod date_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{parse_date, DATE_FORMAT};

    pub fn serialize<S>(date: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_date))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_email_validity() {
        assert!(is_valid_email("al@x.com"));
        assert!(is_valid_email("bob@anonimo"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_display_name_truncation() {
        assert_eq!(display_name("Alexander"), "Alexa");
        assert_eq!(display_name("AL"), "AL");
        assert_eq!(display_name("ÑandúÑandú"), "Ñandú");
    }

    #[test]
    fn test_email_local_part() {
        assert_eq!(email_local_part("carla@x.com"), Some("carla"));
        assert_eq!(email_local_part("@x.com"), None);
        assert_eq!(email_local_part("plain"), None);
    }

    #[test]
    fn test_record_json_shape() {
        let record = ScoreRecord::new("AL", "al@x.com", 50, at(14, 5, 9));
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["name"], "AL");
        assert_eq!(value["email"], "al@x.com");
        assert_eq!(value["score"], 50);
        assert_eq!(value["date"], "2024-03-09 14:05:09");
    }

    #[test]
    fn test_record_parse_tolerates_missing_name_and_date() {
        let record: ScoreRecord =
            serde_json::from_str(r#"{"email": "a@x", "score": 7}"#).unwrap();

        assert_eq!(record.name, "");
        assert_eq!(record.score, 7);
        assert_eq!(record.date, None);
    }

    #[test]
    fn test_missing_date_is_not_invented_on_write() {
        let record: ScoreRecord =
            serde_json::from_str(r#"{"name": "A", "email": "a@x", "score": 7}"#).unwrap();
        let value = serde_json::to_value(&record).unwrap();

        assert!(value.get("date").is_none());
    }

    #[test]
    fn test_iso_dates_accepted() {
        let record: ScoreRecord = serde_json::from_str(
            r#"{"name": "A", "email": "a@x", "score": 1, "date": "2024-03-09T14:05:09"}"#,
        )
        .unwrap();
        assert_eq!(record.date, Some(at(14, 5, 9)));
        assert_eq!(
            parse_date("2024-03-09T14:05:09.250"),
            Some(at(14, 5, 9) + chrono::Duration::milliseconds(250))
        );
    }

    #[test]
    fn test_unreadable_date_becomes_none() {
        let record: ScoreRecord = serde_json::from_str(
            r#"{"name": "A", "email": "a@x", "score": 1, "date": "yesterday"}"#,
        )
        .unwrap();
        assert_eq!(record.date, None);
    }

    #[test]
    fn test_fractional_score_truncated() {
        let record: ScoreRecord =
            serde_json::from_str(r#"{"email": "a@x", "score": 41.9}"#).unwrap();
        assert_eq!(record.score, 41);
    }

    #[test]
    fn test_record_without_email_rejected() {
        let parsed: Result<ScoreRecord, _> =
            serde_json::from_str(r#"{"name": "A", "score": 1}"#);
        assert!(parsed.is_err());
    }
}
