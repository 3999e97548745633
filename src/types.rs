use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of reasoning characters shown before truncation.
const REASONING_PREVIEW_CHARS: usize = 120;

/// Predicted side of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Over,
    Under,
}

/// One modeled sports-prop prediction, as served by `/v1/predictions/*`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(rename = "prop_id")]
    pub id: String,
    pub player_name: String,
    /// Absent from the backend response model, present in bundled data.
    #[serde(default)]
    pub team: String,
    pub sport: String,
    pub stat_type: String,
    pub line_value: f64,
    #[serde(rename = "prediction")]
    pub direction: Direction,
    pub confidence: f64,
    pub reasoning: String,
    /// American odds. The backend serializes these as floats (`-110.0`).
    #[serde(deserialize_with = "de_american_odds")]
    pub market_value: i32,
    /// Fractional edge; `0.23` displays as 23%.
    pub edge_percentage: f64,
    pub posted_at: String,
}

impl PredictionRecord {
    /// Card label for the confidence band.
    pub fn confidence_label(&self) -> &'static str {
        if self.confidence >= 0.9 {
            "Very High"
        } else if self.confidence >= 0.8 {
            "High"
        } else if self.confidence >= 0.7 {
            "Medium"
        } else {
            "Low"
        }
    }

    /// Reasoning truncated for list views.
    pub fn reasoning_preview(&self) -> String {
        let mut chars = self.reasoning.chars();
        let head: String = chars.by_ref().take(REASONING_PREVIEW_CHARS).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

fn de_american_odds<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() || raw.fract() != 0.0 || raw.abs() > f64::from(i32::MAX) {
        return Err(serde::de::Error::custom(format!(
            "market_value must be integral odds, got {raw}"
        )));
    }
    Ok(raw as i32)
}

/// Sport selection in the filter panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SportFilter {
    #[default]
    All,
    /// Lowercase sport code, e.g. `nba`.
    Sport(String),
}

impl SportFilter {
    /// Parse a UI value; `all` (any case) is the sentinel, anything else is a code.
    pub fn parse(value: &str) -> Self {
        let code = value.trim().to_lowercase();
        if code == "all" {
            Self::All
        } else {
            Self::Sport(code)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Sport(code) => code,
        }
    }
}

impl Serialize for SportFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SportFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Confidence tier selection.
///
/// Unrecognized tier strings are kept verbatim in `Other` and impose no
/// constraint when filtering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfidenceTier {
    #[default]
    All,
    /// `confidence >= 0.85`
    High,
    /// `0.75 <= confidence < 0.85`
    Medium,
    Other(String),
}

impl ConfidenceTier {
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for ConfidenceTier {
    fn from(value: &str) -> Self {
        match value {
            "all" => Self::All,
            "high" => Self::High,
            "medium" => Self::Medium,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ConfidenceTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ConfidenceTier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// User-selected filter criteria. `Default` is the "Reset Filters" state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    pub sport: SportFilter,
    pub confidence_tier: ConfidenceTier,
    /// Minimum edge in whole percentage points (UI slider 0–30).
    pub min_edge: f64,
}

/// Summary statistics over a set of predictions. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateStats {
    pub total_count: usize,
    pub high_confidence_count: usize,
    pub average_confidence: f64,
    pub average_edge: f64,
}

/// `AggregateStats` with averages rounded to whole percentage points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayStats {
    pub total_count: usize,
    pub high_confidence_count: usize,
    pub average_confidence_pct: i64,
    pub average_edge_pct: i64,
}

/// Where the current feed contents came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSource {
    /// Fetched successfully on the latest refresh.
    Live,
    /// Latest refresh failed; serving the previous good fetch.
    LastKnownGood,
    /// No good fetch yet; serving the bundled default list.
    Bundled,
}

/// One refresh cycle's output, emitted as a JSON line.
#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub timestamp: String,
    pub source: FeedSource,
    pub filter: FilterConfig,
    /// Stats over the whole feed, matching the dashboard header.
    pub stats: DisplayStats,
    pub matched: usize,
    pub predictions: Vec<PredictionRecord>,
    pub live_connected: bool,
}

/// Available prop lines for one sport (`/v1/sports`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportLines {
    pub name: String,
    pub display: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SportsResponse {
    pub sports: Vec<SportLines>,
}

/// `/v1/health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
}

/// `/v1/time` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerTime {
    pub server_utc: String,
    pub server_zone: String,
    pub skew_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire_record() -> serde_json::Value {
        json!({
            "prop_id": "pp-003",
            "player_name": "Josh Allen",
            "team": "BUF",
            "sport": "nfl",
            "stat_type": "Passing Yards",
            "line_value": 285.5,
            "prediction": "OVER",
            "confidence": 0.87,
            "reasoning": "Jets defense allows 7.8 yards per attempt.",
            "market_value": -110,
            "edge_percentage": 0.18,
            "posted_at": "2025-10-30T13:20:00Z"
        })
    }

    #[test]
    fn decodes_wire_names() {
        let rec: PredictionRecord = serde_json::from_value(wire_record()).unwrap();
        assert_eq!(rec.id, "pp-003");
        assert_eq!(rec.player_name, "Josh Allen");
        assert_eq!(rec.direction, Direction::Over);
        assert_eq!(rec.market_value, -110);
        assert_eq!(rec.posted_at, "2025-10-30T13:20:00Z");
    }

    #[test]
    fn decodes_float_odds_and_missing_team() {
        let mut value = wire_record();
        value["market_value"] = json!(-125.0);
        value.as_object_mut().unwrap().remove("team");
        let rec: PredictionRecord = serde_json::from_value(value).unwrap();
        assert_eq!(rec.market_value, -125);
        assert_eq!(rec.team, "");
    }

    #[test]
    fn rejects_fractional_odds() {
        let mut value = wire_record();
        value["market_value"] = json!(-110.5);
        assert!(serde_json::from_value::<PredictionRecord>(value).is_err());
    }

    #[test]
    fn rejects_unknown_direction() {
        let mut value = wire_record();
        value["prediction"] = json!("PUSH");
        assert!(serde_json::from_value::<PredictionRecord>(value).is_err());
    }

    #[test]
    fn serializes_back_to_wire_names() {
        let rec: PredictionRecord = serde_json::from_value(wire_record()).unwrap();
        let out = serde_json::to_value(&rec).unwrap();
        assert_eq!(out["prop_id"], "pp-003");
        assert_eq!(out["prediction"], "OVER");
        assert!(out.get("id").is_none());
    }

    #[test]
    fn confidence_labels() {
        let mut rec: PredictionRecord = serde_json::from_value(wire_record()).unwrap();
        for (confidence, label) in [
            (0.92, "Very High"),
            (0.9, "Very High"),
            (0.85, "High"),
            (0.75, "Medium"),
            (0.5, "Low"),
        ] {
            rec.confidence = confidence;
            assert_eq!(rec.confidence_label(), label, "confidence {confidence}");
        }
    }

    #[test]
    fn reasoning_preview_truncates_long_text() {
        let mut rec: PredictionRecord = serde_json::from_value(wire_record()).unwrap();
        assert_eq!(rec.reasoning_preview(), rec.reasoning);

        rec.reasoning = "x".repeat(150);
        let preview = rec.reasoning_preview();
        assert_eq!(preview.len(), 123);
        assert!(preview.ends_with("..."));

        rec.reasoning = "y".repeat(120);
        assert_eq!(rec.reasoning_preview(), rec.reasoning);
    }

    #[test]
    fn sport_filter_parse() {
        assert_eq!(SportFilter::parse("all"), SportFilter::All);
        assert_eq!(SportFilter::parse("ALL"), SportFilter::All);
        assert_eq!(SportFilter::parse(" NBA "), SportFilter::Sport("nba".into()));
    }

    #[test]
    fn tier_keeps_unknown_values() {
        assert_eq!(ConfidenceTier::from("high"), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from("medium"), ConfidenceTier::Medium);
        let other = ConfidenceTier::from("low");
        assert_eq!(other, ConfidenceTier::Other("low".into()));
        assert_eq!(other.to_string(), "low");
    }

    #[test]
    fn filter_config_round_trips_as_strings() {
        let cfg = FilterConfig {
            sport: SportFilter::Sport("nhl".into()),
            confidence_tier: ConfidenceTier::Medium,
            min_edge: 12.0,
        };
        let value = serde_json::to_value(&cfg).unwrap();
        assert_eq!(
            value,
            json!({
                "sport": "nhl",
                "confidence_tier": "medium",
                "min_edge": 12.0
            })
        );
        let back: FilterConfig = serde_json::from_value(value).unwrap();
        assert_eq!(back, cfg);
    }
}
