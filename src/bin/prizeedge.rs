use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use prizeedge::aggregator::{display_stats, filter, round_percent, summarize};
use prizeedge::api::PrizeEdgeApi;
use prizeedge::config::{AppConfig, CONFIG_PATH};
use prizeedge::fallback::{bundled_predictions, bundled_sports};
use prizeedge::feed::PredictionFeed;
use prizeedge::live::{LiveChannel, UpdateCursor};
use prizeedge::reporter;
use prizeedge::state::{AppState, WatchItem};
use prizeedge::types::{
    ConfidenceTier, FeedSnapshot, FeedSource, FilterConfig, PredictionRecord, SportFilter,
};

#[derive(Parser)]
#[command(name = "prizeedge", about = "PrizeEdge sports prop prediction feed")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Sport code to show (all, nba, nfl, cbb, nhl)
    #[arg(long, default_value = "all")]
    sport: String,

    /// Confidence tier (all, high, medium)
    #[arg(long, default_value = "all")]
    confidence: String,

    /// Minimum edge in percentage points (0-30)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=30))]
    min_edge: u8,

    /// Prop ids to track in the watchlist
    #[arg(long, value_delimiter = ',')]
    watch: Vec<String>,

    /// Refresh once and exit
    #[arg(long)]
    once: bool,

    /// Do not open the live update channel
    #[arg(long)]
    no_live: bool,

    /// Print the prop line catalog and exit
    #[arg(long, conflicts_with = "prop")]
    sports: bool,

    /// Print a single prediction by prop id and exit
    #[arg(long)]
    prop: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let tier = ConfidenceTier::from(args.confidence.as_str());
    if let ConfidenceTier::Other(raw) = &tier {
        warn!("Unknown confidence tier '{raw}', no confidence constraint applied");
    }
    let user_filter = FilterConfig {
        sport: SportFilter::parse(&args.sport),
        confidence_tier: tier,
        min_edge: f64::from(args.min_edge),
    };

    let config = AppConfig::load_or_default(&args.config)?.with_env();
    info!("Using API at {}", config.api.base_url);
    let api = PrizeEdgeApi::new(&config.api.base_url)?;

    if args.sports {
        let sports = match api.fetch_sports().await {
            Ok(sports) => sports,
            Err(e) => {
                warn!("Failed to fetch sports catalog, using bundled: {e:#}");
                bundled_sports()
            }
        };
        reporter::report_sports(&sports);
        return Ok(());
    }

    if let Some(prop_id) = &args.prop {
        let pred = match api.fetch_prediction(prop_id).await {
            Ok(pred) => Some(pred),
            Err(e) => {
                warn!("Failed to fetch {prop_id}, checking bundled picks: {e:#}");
                bundled_predictions().into_iter().find(|p| &p.id == prop_id)
            }
        };
        match pred {
            Some(pred) => {
                println!("{}", serde_json::to_string_pretty(&pred)?);
                info!("{} ({} confidence)", pred.player_name, pred.confidence_label());
            }
            None => anyhow::bail!("Prediction {prop_id} not found"),
        }
        return Ok(());
    }

    check_backend(&api).await;

    let mut state = AppState::new(config.preferences.clone());
    let effective = state.settings.effective_filter(&user_filter);
    let poll_interval_secs = config.settings.poll_interval_secs;
    info!(
        "Starting feed: sport={} confidence={} min_edge={} poll={}s",
        effective.sport.as_str(),
        effective.confidence_tier,
        effective.min_edge,
        poll_interval_secs,
    );

    let shutdown = CancellationToken::new();
    let live = if args.no_live {
        None
    } else {
        Some(LiveChannel::spawn(
            config.live.url.clone(),
            config.live.reconnect_policy(),
            shutdown.clone(),
        ))
    };
    let mut cursor = live.as_ref().map(|l| UpdateCursor::new(l.status()));

    let mut feed = PredictionFeed::new();
    let mut previous: Option<Vec<PredictionRecord>> = None;

    refresh_cycle(
        &api,
        &mut feed,
        &mut state,
        &effective,
        &args.watch,
        &mut previous,
        live.as_ref(),
    )
    .await;

    let keep_running = !args.once && state.settings.auto_refresh;
    if !args.once && !keep_running {
        info!("Auto refresh disabled, exiting after one refresh");
    }
    if keep_running {
        info!("Entering refresh loop (interval: {poll_interval_secs}s). Press Ctrl+C to stop.");
        let poll_duration = Duration::from_secs(poll_interval_secs);

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
                _ = tokio::time::sleep(poll_duration) => {}
                _ = next_live_update(cursor.as_mut()) => {
                    info!("Live update received, refreshing early");
                }
            }
            refresh_cycle(
                &api,
                &mut feed,
                &mut state,
                &effective,
                &args.watch,
                &mut previous,
                live.as_ref(),
            )
            .await;
        }
    }

    shutdown.cancel();
    if let Some(live) = live {
        live.join().await;
    }

    if !state.watchlist.is_empty() {
        reporter::report_watchlist(&state.watchlist.summary());
    }

    Ok(())
}

/// Log backend health and clock skew. Failures are informational only.
async fn check_backend(api: &PrizeEdgeApi) {
    match api.health().await {
        Ok(health) => info!("Backend {} at {}", health.status, health.timestamp),
        Err(e) => {
            warn!("Backend unreachable, bundled picks will be served until it answers: {e:#}");
            return;
        }
    }
    match api.server_time().await {
        Ok(time) => info!(
            "Server time {} ({}, skew {}ms)",
            time.server_utc, time.server_zone, time.skew_ms
        ),
        Err(e) => warn!("Failed to read server time: {e:#}"),
    }
}

/// Resolve when the live channel has delivered a message not yet acted on.
/// Never resolves when the channel is disabled or has stopped.
async fn next_live_update(cursor: Option<&mut UpdateCursor>) {
    match cursor {
        Some(cursor) => {
            cursor.changed().await;
        }
        None => std::future::pending().await,
    }
}

/// One refresh: fetch (with fallback), alert on new picks, track watched
/// props, filter, summarize, and emit a snapshot.
async fn refresh_cycle(
    api: &PrizeEdgeApi,
    feed: &mut PredictionFeed,
    state: &mut AppState,
    config: &FilterConfig,
    watch_ids: &[String],
    previous: &mut Option<Vec<PredictionRecord>>,
    live: Option<&LiveChannel>,
) {
    let source = feed.refresh(api).await;
    let records = feed.records();

    if let Some(prev) = previous.as_deref() {
        for pick in state.new_pick_alerts(prev, records) {
            info!(
                "New pick: {} {} {:?} {} ({}%)",
                pick.player_name,
                pick.stat_type,
                pick.direction,
                pick.line_value,
                round_percent(pick.confidence),
            );
        }
    }
    *previous = Some(records.to_vec());

    for id in watch_ids {
        if state.watchlist.contains(id) {
            continue;
        }
        match records.iter().find(|p| &p.id == id) {
            Some(pred) => {
                let item = WatchItem::from_prediction(pred, source == FeedSource::Live);
                state.watchlist.add(item);
                info!("Tracking {} ({})", pred.player_name, id);
            }
            None => warn!("Watched prop {id} not in current feed"),
        }
    }

    let matched = filter(records, config);
    let snapshot = FeedSnapshot {
        timestamp: chrono::Utc::now().to_rfc3339(),
        source,
        filter: config.clone(),
        stats: display_stats(&summarize(records)),
        matched: matched.len(),
        predictions: matched,
        live_connected: live.is_some_and(|l| l.snapshot().connected),
    };
    if snapshot.matched == 0 {
        info!("No predictions match the current filters");
    }
    reporter::report_snapshot(&snapshot);
}
