use super::types::*;
use super::OddsFeed;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

/// Cross-sport pseudo-key: the odds endpoint returns the next games across
/// every in-season sport when asked for "upcoming".
pub const UPCOMING_SPORT_KEY: &str = "upcoming";

pub struct TheOddsApi {
    client: Client,
    api_key: String,
    base_url: String,
    regions: String,
    markets: String,
    last_quota: Option<ApiQuota>,
}

/// Parse a quota header that may be an integer or float (e.g. "14527.0").
fn parse_quota_header(headers: &reqwest::header::HeaderMap, name: &str) -> u64 {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<f64>().ok())
        .map(|v| v as u64)
        .unwrap_or(0)
}

impl TheOddsApi {
    pub fn new(api_key: String, base_url: &str, regions: &str, markets: &str) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            regions: regions.to_string(),
            markets: markets.to_string(),
            last_quota: None,
        }
    }

    fn record_quota(&mut self, headers: &reqwest::header::HeaderMap) -> ApiQuota {
        let quota = ApiQuota {
            requests_used: parse_quota_header(headers, "x-requests-used"),
            requests_remaining: parse_quota_header(headers, "x-requests-remaining"),
        };
        self.last_quota = Some(quota.clone());
        quota
    }

    /// Call the free `/v4/sports` endpoint to check quota without consuming
    /// usage credits. Returns an error if the key is invalid or quota is
    /// exhausted.
    pub async fn check_quota(&mut self) -> Result<ApiQuota> {
        let url = format!("{}/v4/sports?apiKey={}", self.base_url, self.api_key);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("failed to reach the-odds-api for quota check")?;

        let status = resp.status();
        let quota = self.record_quota(resp.headers());

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("the-odds-api key validation failed ({}): {}", status, body);
        }

        if quota.requests_remaining == 0 {
            anyhow::bail!(
                "API quota exhausted ({} used, 0 remaining)",
                quota.requests_used
            );
        }

        Ok(quota)
    }
}

#[async_trait]
impl OddsFeed for TheOddsApi {
    async fn fetch_events(&mut self, sport_key: &str) -> Result<Vec<Event>> {
        let url = format!(
            "{}/v4/sports/{}/odds?apiKey={}&regions={}&markets={}&oddsFormat=decimal&dateFormat=iso",
            self.base_url, sport_key, self.api_key, self.regions, self.markets,
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("the-odds-api request failed")?;

        self.record_quota(resp.headers());

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("the-odds-api {} ({}): {}", sport_key, status, body);
        }

        let events: Vec<Event> = resp
            .json()
            .await
            .context("failed to parse the-odds-api odds response")?;

        tracing::debug!(
            sport = sport_key,
            events = events.len(),
            "fetched odds"
        );

        Ok(events)
    }

    async fn fetch_sports(&mut self) -> Result<Vec<Sport>> {
        let url = format!("{}/v4/sports?apiKey={}", self.base_url, self.api_key);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("the-odds-api sports request failed")?;

        self.record_quota(resp.headers());

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("the-odds-api sports catalog ({}): {}", status, body);
        }

        let sports: Vec<Sport> = resp
            .json()
            .await
            .context("failed to parse the-odds-api sports response")?;

        Ok(sports)
    }

    fn last_quota(&self) -> Option<ApiQuota> {
        self.last_quota.clone()
    }
}
