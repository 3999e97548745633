use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::aggregator::round_percent;
use crate::types::{ConfidenceTier, Direction, FilterConfig, PredictionRecord};

/// Per-sport update toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SportToggles {
    #[serde(default = "enabled")]
    pub nba: bool,
    #[serde(default = "enabled")]
    pub nfl: bool,
    #[serde(default = "enabled")]
    pub cbb: bool,
    #[serde(default = "enabled")]
    pub nhl: bool,
}

fn enabled() -> bool {
    true
}

impl Default for SportToggles {
    fn default() -> Self {
        Self {
            nba: true,
            nfl: true,
            cbb: true,
            nhl: true,
        }
    }
}

impl SportToggles {
    fn slot(&mut self, sport: &str) -> Option<&mut bool> {
        match sport {
            "nba" => Some(&mut self.nba),
            "nfl" => Some(&mut self.nfl),
            "cbb" => Some(&mut self.cbb),
            "nhl" => Some(&mut self.nhl),
            _ => None,
        }
    }

    /// Sports without a toggle are always enabled.
    pub fn is_enabled(&self, sport: &str) -> bool {
        match sport {
            "nba" => self.nba,
            "nfl" => self.nfl,
            "cbb" => self.cbb,
            "nhl" => self.nhl,
            _ => true,
        }
    }

    /// Returns false if `sport` has no toggle.
    pub fn set(&mut self, sport: &str, value: bool) -> bool {
        match self.slot(sport) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

/// User preferences. In-memory unless loaded from the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "enabled")]
    pub notifications: bool,
    #[serde(default = "enabled")]
    pub sound_enabled: bool,
    #[serde(default = "enabled")]
    pub auto_refresh: bool,
    #[serde(default = "enabled")]
    pub show_live_clock: bool,
    #[serde(default)]
    pub high_confidence_only: bool,
    #[serde(default)]
    pub sport_updates: SportToggles,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications: true,
            sound_enabled: true,
            auto_refresh: true,
            show_live_clock: true,
            high_confidence_only: false,
            sport_updates: SportToggles::default(),
        }
    }
}

impl Settings {
    /// Apply preferences to a user filter: `high_confidence_only` narrows an
    /// unconstrained tier to `high`.
    pub fn effective_filter(&self, filter: &FilterConfig) -> FilterConfig {
        let mut out = filter.clone();
        if self.high_confidence_only && out.confidence_tier == ConfidenceTier::All {
            out.confidence_tier = ConfidenceTier::High;
        }
        out
    }
}

/// A tracked pick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchItem {
    pub id: String,
    pub player_name: String,
    pub team: String,
    pub sport: String,
    pub stat_type: String,
    pub line_value: f64,
    pub direction: Direction,
    pub confidence: f64,
    /// Edge in whole percentage points.
    pub edge: i64,
    pub is_live: bool,
    pub reason: String,
}

impl WatchItem {
    pub fn from_prediction(pred: &PredictionRecord, is_live: bool) -> Self {
        Self {
            id: pred.id.clone(),
            player_name: pred.player_name.clone(),
            team: pred.team.clone(),
            sport: pred.sport.clone(),
            stat_type: pred.stat_type.clone(),
            line_value: pred.line_value,
            direction: pred.direction,
            confidence: pred.confidence,
            edge: round_percent(pred.edge_percentage),
            is_live,
            reason: pred.reasoning_preview(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WatchlistSummary {
    pub count: usize,
    pub total_edge: i64,
    pub average_confidence_pct: i64,
    pub live_count: usize,
}

/// Ordered, de-duplicated list of tracked picks.
#[derive(Debug, Clone, Default)]
pub struct Watchlist {
    items: Vec<WatchItem>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[WatchItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    /// Append an item. Returns false if its id is already tracked.
    pub fn add(&mut self, item: WatchItem) -> bool {
        if self.contains(&item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove by id. Returns false if not tracked.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    pub fn summary(&self) -> WatchlistSummary {
        let count = self.items.len();
        let average_confidence_pct = if count > 0 {
            let sum: f64 = self.items.iter().map(|i| i.confidence).sum();
            round_percent(sum / count as f64)
        } else {
            0
        };
        WatchlistSummary {
            count,
            total_edge: self.items.iter().map(|i| i.edge).sum(),
            average_confidence_pct,
            live_count: self.items.iter().filter(|i| i.is_live).count(),
        }
    }
}

/// Application state owned by the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub settings: Settings,
    pub watchlist: Watchlist,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            watchlist: Watchlist::new(),
        }
    }

    /// Picks in `current` that were not in `previous` and whose sport has
    /// updates enabled. Empty when notifications are off.
    pub fn new_pick_alerts<'a>(
        &self,
        previous: &[PredictionRecord],
        current: &'a [PredictionRecord],
    ) -> Vec<&'a PredictionRecord> {
        if !self.settings.notifications {
            return Vec::new();
        }
        let seen: HashSet<&str> = previous.iter().map(|p| p.id.as_str()).collect();
        current
            .iter()
            .filter(|p| !seen.contains(p.id.as_str()))
            .filter(|p| self.settings.sport_updates.is_enabled(&p.sport))
            .collect()
    }
}
