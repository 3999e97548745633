pub mod aggregator;
pub mod api;
pub mod config;
pub mod fallback;
pub mod feed;
pub mod live;
pub mod reporter;
pub mod state;
pub mod types;

/// PrizeEdge backend base URL (local development server)
pub const API_BASE: &str = "http://localhost:8000";

/// Live update WebSocket URL
/// Signals "something changed"; messages carry no schema we rely on
pub const LIVE_WS_URL: &str = "ws://localhost:8000/ws/predictions";

/// Confidence at or above which a pick counts as high confidence.
pub const HIGH_CONFIDENCE: f64 = 0.85;

/// Lower bound (inclusive) of the medium confidence tier.
pub const MEDIUM_CONFIDENCE: f64 = 0.75;
