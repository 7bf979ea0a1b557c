use crate::domain::ports::{KillCredit, ProgressError, ProgressSink};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

// Kill credit body as the progress store expects it.
#[derive(Debug, Serialize)]
struct CreditKillRequest<'a> {
    player_id: String,
    mob_id: u64,
    rarity: &'a str,
    stars: u32,
    drop: Option<&'a str>,
}

impl<'a> From<&'a KillCredit> for CreditKillRequest<'a> {
    fn from(credit: &'a KillCredit) -> Self {
        Self {
            player_id: credit.player_id.to_string(),
            mob_id: credit.mob_id,
            rarity: credit.rarity.as_str(),
            stars: credit.stars,
            drop: credit.drop.map(|r| r.as_str()),
        }
    }
}

// Thin reqwest client for crediting kills to the progress store.
#[derive(Clone)]
pub struct ProgressClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProgressClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ProgressSink for ProgressClient {
    async fn credit_kill(&self, credit: &KillCredit) -> Result<(), ProgressError> {
        let url = format!("{}/progress/kills", self.base_url);
        let response = self
            .http
            .post(url)
            .json(&CreditKillRequest::from(credit))
            .send()
            .await
            .map_err(|_| ProgressError::Unavailable)?;

        if response.status().is_success() {
            return Ok(());
        }
        Err(ProgressError::Rejected(response.status().as_u16()))
    }
}
