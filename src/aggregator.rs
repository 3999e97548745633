use crate::types::{
    AggregateStats, ConfidenceTier, DisplayStats, FilterConfig, PredictionRecord, SportFilter,
};
use crate::{HIGH_CONFIDENCE, MEDIUM_CONFIDENCE};

fn matches_sport(record: &PredictionRecord, sport: &SportFilter) -> bool {
    match sport {
        SportFilter::All => true,
        SportFilter::Sport(code) => record.sport == *code,
    }
}

fn matches_tier(record: &PredictionRecord, tier: &ConfidenceTier) -> bool {
    match tier {
        ConfidenceTier::High => record.confidence >= HIGH_CONFIDENCE,
        ConfidenceTier::Medium => {
            record.confidence >= MEDIUM_CONFIDENCE && record.confidence < HIGH_CONFIDENCE
        }
        // Unknown tiers impose no constraint.
        ConfidenceTier::All | ConfidenceTier::Other(_) => true,
    }
}

/// Return the records matching `config`, in input order.
///
/// `min_edge` is in whole percentage points while `edge_percentage` is a
/// fraction, so the edge is scaled by 100 before comparing.
pub fn filter(records: &[PredictionRecord], config: &FilterConfig) -> Vec<PredictionRecord> {
    records
        .iter()
        .filter(|r| matches_sport(r, &config.sport))
        .filter(|r| matches_tier(r, &config.confidence_tier))
        .filter(|r| r.edge_percentage * 100.0 >= config.min_edge)
        .cloned()
        .collect()
}

/// Compute count and average statistics. Averages are 0 for an empty input.
pub fn summarize(records: &[PredictionRecord]) -> AggregateStats {
    let total_count = records.len();
    let high_confidence_count = records
        .iter()
        .filter(|r| r.confidence >= HIGH_CONFIDENCE)
        .count();

    if total_count == 0 {
        return AggregateStats {
            total_count,
            high_confidence_count,
            average_confidence: 0.0,
            average_edge: 0.0,
        };
    }

    let n = total_count as f64;
    let confidence_sum: f64 = records.iter().map(|r| r.confidence).sum();
    let edge_sum: f64 = records.iter().map(|r| r.edge_percentage).sum();

    AggregateStats {
        total_count,
        high_confidence_count,
        average_confidence: confidence_sum / n,
        average_edge: edge_sum / n,
    }
}

/// Convert a fraction to whole percentage points, rounding half up.
pub fn round_percent(fraction: f64) -> i64 {
    (fraction * 100.0 + 0.5).floor() as i64
}

pub fn display_stats(stats: &AggregateStats) -> DisplayStats {
    DisplayStats {
        total_count: stats.total_count,
        high_confidence_count: stats.high_confidence_count,
        average_confidence_pct: round_percent(stats.average_confidence),
        average_edge_pct: round_percent(stats.average_edge),
    }
}
