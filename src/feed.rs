use std::collections::HashSet;
use std::fmt;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::api::PrizeEdgeApi;
use crate::fallback::bundled_predictions;
use crate::types::{FeedSource, PredictionRecord};

/// Why a fetched prediction list was rejected at ingestion.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Confidence is NaN, infinite, negative, or above 1.
    Confidence { id: String, value: f64 },
    /// Edge is NaN, infinite, or negative.
    Edge { id: String, value: f64 },
    /// Line is NaN, infinite, or negative.
    Line { id: String, value: f64 },
    DuplicateId(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confidence { id, value } => write!(f, "{id}: confidence {value} out of range"),
            Self::Edge { id, value } => write!(f, "{id}: edge {value} out of range"),
            Self::Line { id, value } => write!(f, "{id}: line value {value} out of range"),
            Self::DuplicateId(id) => write!(f, "duplicate prop id {id}"),
        }
    }
}

impl std::error::Error for ValidationError {}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Check numeric invariants and id uniqueness, normalizing sport codes to lowercase.
pub fn validate(records: Vec<PredictionRecord>) -> Result<Vec<PredictionRecord>, ValidationError> {
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    let mut out = Vec::with_capacity(records.len());

    for mut rec in records {
        if !non_negative(rec.confidence) || rec.confidence > 1.0 {
            return Err(ValidationError::Confidence {
                id: rec.id,
                value: rec.confidence,
            });
        }
        if !non_negative(rec.edge_percentage) {
            return Err(ValidationError::Edge {
                id: rec.id,
                value: rec.edge_percentage,
            });
        }
        if !non_negative(rec.line_value) {
            return Err(ValidationError::Line {
                id: rec.id,
                value: rec.line_value,
            });
        }
        if !seen.insert(rec.id.clone()) {
            return Err(ValidationError::DuplicateId(rec.id));
        }
        rec.sport = rec.sport.to_lowercase();
        out.push(rec);
    }

    Ok(out)
}

/// Current prediction snapshot plus where it came from.
///
/// Refreshing never fails: a bad fetch keeps the last good list, or the
/// bundled default if nothing has been fetched yet.
#[derive(Debug, Clone)]
pub struct PredictionFeed {
    records: Vec<PredictionRecord>,
    source: FeedSource,
    last_good_at: Option<DateTime<Utc>>,
}

impl Default for PredictionFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionFeed {
    pub fn new() -> Self {
        Self {
            records: bundled_predictions(),
            source: FeedSource::Bundled,
            last_good_at: None,
        }
    }

    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    pub fn source(&self) -> FeedSource {
        self.source
    }

    pub fn last_good_at(&self) -> Option<DateTime<Utc>> {
        self.last_good_at
    }

    /// Fetch all of today's predictions and apply the result.
    pub async fn refresh(&mut self, api: &PrizeEdgeApi) -> FeedSource {
        let fetched = api.fetch_today(None).await;
        self.apply(fetched)
    }

    /// Apply a fetch outcome, falling back on fetch or validation failure.
    pub fn apply(&mut self, fetched: Result<Vec<PredictionRecord>>) -> FeedSource {
        let outcome = fetched.and_then(|records| validate(records).map_err(anyhow::Error::from));

        match outcome {
            Ok(records) => {
                debug!("Accepted {} predictions", records.len());
                if self.source != FeedSource::Live {
                    info!("Prediction feed live ({} picks)", records.len());
                }
                self.records = records;
                self.source = FeedSource::Live;
                self.last_good_at = Some(Utc::now());
            }
            Err(e) => {
                self.source = if self.last_good_at.is_some() {
                    FeedSource::LastKnownGood
                } else {
                    FeedSource::Bundled
                };
                warn!("Prediction fetch failed, serving {:?} data: {e:#}", self.source);
            }
        }

        self.source
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::types::Direction;

    /// Local HTTP backend answering one canned `(status, body)` per connection.
    async fn serve_responses(responses: Vec<(&'static str, String)>) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().await.unwrap();
                let mut request: Vec<u8> = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.ok();
            }
        });
        addr
    }

    fn make_record(id: &str, sport: &str, confidence: f64, edge: f64) -> PredictionRecord {
        PredictionRecord {
            id: id.to_string(),
            player_name: String::new(),
            team: String::new(),
            sport: sport.to_string(),
            stat_type: String::new(),
            line_value: 1.5,
            direction: Direction::Under,
            confidence,
            reasoning: String::new(),
            market_value: 120,
            edge_percentage: edge,
            posted_at: String::new(),
        }
    }

    // ── validate ───────────────────────────────────────────────────

    #[test]
    fn validate_lowercases_sport() {
        let out = validate(vec![make_record("a", "NBA", 0.8, 0.1)]).unwrap();
        assert_eq!(out[0].sport, "nba");
    }

    #[test]
    fn validate_rejects_nan_confidence() {
        let err = validate(vec![make_record("a", "nba", f64::NAN, 0.1)]).unwrap_err();
        assert!(matches!(err, ValidationError::Confidence { ref id, .. } if id == "a"));
    }

    #[test]
    fn validate_rejects_confidence_above_one() {
        assert!(validate(vec![make_record("a", "nba", 1.01, 0.1)]).is_err());
        assert!(validate(vec![make_record("a", "nba", 1.0, 0.1)]).is_ok());
    }

    #[test]
    fn validate_rejects_negative_or_infinite_edge() {
        assert!(validate(vec![make_record("a", "nba", 0.8, -0.01)]).is_err());
        assert!(validate(vec![make_record("a", "nba", 0.8, f64::INFINITY)]).is_err());
    }

    #[test]
    fn validate_rejects_negative_line() {
        let mut rec = make_record("a", "nba", 0.8, 0.1);
        rec.line_value = -0.5;
        assert!(matches!(validate(vec![rec]), Err(ValidationError::Line { .. })));
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let err = validate(vec![
            make_record("a", "nba", 0.8, 0.1),
            make_record("a", "nfl", 0.9, 0.2),
        ])
        .unwrap_err();
        assert_eq!(err, ValidationError::DuplicateId("a".into()));
        assert_eq!(err.to_string(), "duplicate prop id a");
    }

    // ── PredictionFeed ─────────────────────────────────────────────

    #[test]
    fn new_feed_serves_bundled() {
        let feed = PredictionFeed::new();
        assert_eq!(feed.source(), FeedSource::Bundled);
        assert_eq!(feed.records(), bundled_predictions().as_slice());
        assert!(feed.last_good_at().is_none());
    }

    #[test]
    fn failure_before_any_success_keeps_bundled() {
        let mut feed = PredictionFeed::new();
        let source = feed.apply(Err(anyhow::anyhow!("connection refused")));
        assert_eq!(source, FeedSource::Bundled);
        assert_eq!(feed.records().len(), 6);
    }

    #[test]
    fn success_replaces_records() {
        let mut feed = PredictionFeed::new();
        let source = feed.apply(Ok(vec![make_record("x", "nhl", 0.9, 0.3)]));
        assert_eq!(source, FeedSource::Live);
        assert_eq!(feed.records().len(), 1);
        assert!(feed.last_good_at().is_some());
    }

    #[test]
    fn failure_after_success_keeps_last_known_good() {
        let mut feed = PredictionFeed::new();
        feed.apply(Ok(vec![make_record("x", "nhl", 0.9, 0.3)]));
        let source = feed.apply(Err(anyhow::anyhow!("503")));
        assert_eq!(source, FeedSource::LastKnownGood);
        assert_eq!(feed.records()[0].id, "x");

        let source = feed.apply(Ok(vec![make_record("y", "nba", 0.8, 0.1)]));
        assert_eq!(source, FeedSource::Live);
        assert_eq!(feed.records()[0].id, "y");
    }

    #[test]
    fn invalid_payload_is_treated_as_failure() {
        let mut feed = PredictionFeed::new();
        feed.apply(Ok(vec![make_record("x", "nhl", 0.9, 0.3)]));
        let source = feed.apply(Ok(vec![make_record("bad", "nba", f64::NAN, 0.1)]));
        assert_eq!(source, FeedSource::LastKnownGood);
        assert_eq!(feed.records()[0].id, "x");
    }

    #[test]
    fn empty_fetch_is_a_valid_live_feed() {
        let mut feed = PredictionFeed::new();
        assert_eq!(feed.apply(Ok(Vec::new())), FeedSource::Live);
        assert!(feed.records().is_empty());
    }

    #[tokio::test]
    async fn refresh_against_unreachable_backend_falls_back() {
        let api = PrizeEdgeApi::new("http://127.0.0.1:1").unwrap();
        let mut feed = PredictionFeed::new();
        assert_eq!(feed.refresh(&api).await, FeedSource::Bundled);
        assert_eq!(feed.records(), bundled_predictions().as_slice());
    }

    #[tokio::test]
    async fn error_status_before_any_success_serves_bundled() {
        let addr = serve_responses(vec![("500 Internal Server Error", "{}".to_string())]).await;
        let api = PrizeEdgeApi::new(&format!("http://{addr}")).unwrap();
        let mut feed = PredictionFeed::new();
        assert_eq!(feed.refresh(&api).await, FeedSource::Bundled);
        assert_eq!(feed.records(), bundled_predictions().as_slice());
    }

    #[tokio::test]
    async fn bad_responses_after_success_serve_last_known_good() {
        let good = serde_json::to_string(&bundled_predictions()[..1]).unwrap();
        let addr = serve_responses(vec![
            ("200 OK", good),
            ("200 OK", "<html>gateway timeout</html>".to_string()),
            ("500 Internal Server Error", "{}".to_string()),
            ("200 OK", r#"[{"prop_id": "pp-009"}]"#.to_string()),
        ])
        .await;
        let api = PrizeEdgeApi::new(&format!("http://{addr}")).unwrap();
        let mut feed = PredictionFeed::new();

        assert_eq!(feed.refresh(&api).await, FeedSource::Live);
        assert_eq!(feed.records().len(), 1);
        assert_eq!(feed.records()[0].id, "pp-001");

        // Non-JSON body, error status, then JSON missing required fields.
        for _ in 0..3 {
            assert_eq!(feed.refresh(&api).await, FeedSource::LastKnownGood);
            assert_eq!(feed.records().len(), 1);
            assert_eq!(feed.records()[0].id, "pp-001");
        }
    }
}
