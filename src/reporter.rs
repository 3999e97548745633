use crate::state::WatchlistSummary;
use crate::types::{FeedSnapshot, SportLines};

/// Emit a feed snapshot as a single JSON line to stdout.
pub fn report_snapshot(snapshot: &FeedSnapshot) {
    if let Ok(json) = serde_json::to_string(snapshot) {
        println!("{json}");
    }
}

/// Emit the prop line catalog as pretty-printed JSON to stdout.
pub fn report_sports(sports: &[SportLines]) {
    if let Ok(json) = serde_json::to_string_pretty(sports) {
        println!("{json}");
    }
}

/// Emit the watchlist summary as pretty-printed JSON to stdout.
pub fn report_watchlist(summary: &WatchlistSummary) {
    if let Ok(json) = serde_json::to_string_pretty(summary) {
        println!("{json}");
    }
}
