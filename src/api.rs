use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::types::{HealthStatus, PredictionRecord, ServerTime, SportLines, SportsResponse};

/// Per-request timeout; a slow backend should fall back, not stall the poll loop.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Thin typed client over the PrizeEdge backend routes.
#[derive(Debug, Clone)]
pub struct PrizeEdgeApi {
    client: Client,
    base: Url,
}

impl PrizeEdgeApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("invalid API base {base_url}"))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("API base {base_url} cannot carry a path");
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Append path segments to the base, keeping any prefix it carries.
    /// Each segment is percent-encoded, so ids cannot escape their route.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("API base {} cannot carry a path", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, &str)]) -> Result<T> {
        let resp = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?
            .error_for_status()
            .with_context(|| format!("GET {url} returned error status"))?;
        let body = resp
            .json::<T>()
            .await
            .with_context(|| format!("malformed body from {url}"))?;
        Ok(body)
    }

    /// Fetch today's predictions, optionally for one sport only.
    pub async fn fetch_today(&self, sport: Option<&str>) -> Result<Vec<PredictionRecord>> {
        let url = self.endpoint(&["v1", "predictions", "today"])?;
        let records: Vec<PredictionRecord> = match sport {
            Some(code) => self.get_json(url, &[("sport", code)]).await?,
            None => self.get_json(url, &[]).await?,
        };
        debug!("Fetched {} predictions", records.len());
        Ok(records)
    }

    /// Fetch a single prediction by its prop id.
    pub async fn fetch_prediction(&self, prop_id: &str) -> Result<PredictionRecord> {
        let url = self.endpoint(&["v1", "predictions", prop_id])?;
        self.get_json(url, &[]).await
    }

    /// Fetch the prop line catalog.
    pub async fn fetch_sports(&self) -> Result<Vec<SportLines>> {
        let url = self.endpoint(&["v1", "sports"])?;
        let resp: SportsResponse = self.get_json(url, &[]).await?;
        Ok(resp.sports)
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint(&["v1", "health"])?;
        self.get_json(url, &[]).await
    }

    pub async fn server_time(&self) -> Result<ServerTime> {
        let url = self.endpoint(&["v1", "time"])?;
        self.get_json(url, &[]).await
    }
}
