/// 좋아요/싫어요 토글 요청 클라이언트
// region:    --- Imports
use crate::config::ConfigError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

// endregion: --- Imports

// region:    --- Model
/// 토글 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Like,
    Dislike,
}

impl Polarity {
    pub fn endpoint(self) -> &'static str {
        match self {
            Polarity::Like => "toggle_like",
            Polarity::Dislike => "toggle_dislike",
        }
    }

    pub fn button_class(self) -> &'static str {
        match self {
            Polarity::Like => "like-btn",
            Polarity::Dislike => "dislike-btn",
        }
    }
}

/// 토글 성공 응답, `count`는 JSON 숫자라면 정수든 실수든 받는다
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ToggleResponse {
    pub count: f64,
}

#[derive(Debug, Error)]
pub enum ToggleError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status: {0}")]
    Status(StatusCode),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}
// endregion: --- Model

// region:    --- Toggle Client Trait
/// 토글 요청 트레이트
#[async_trait]
pub trait ToggleClient: Send + Sync {
    async fn toggle(
        &self,
        auction_id: &str,
        polarity: Polarity,
    ) -> Result<ToggleResponse, ToggleError>;
}

/// HTTP 구현체
#[derive(Debug, Clone)]
pub struct HttpToggleClient {
    client: Client,
    base_url: Url,
}

impl HttpToggleClient {
    /// 응답이 `timeout` 안에 오지 않으면 요청은 실패로 끝난다
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "cannot be a base".to_string(),
            });
        }
        Ok(Self { client, base_url })
    }

    /// `/auctions/{endpoint}/{auctionId}`
    pub fn toggle_url(&self, auction_id: &str, polarity: Polarity) -> String {
        format!(
            "{}/auctions/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            polarity.endpoint(),
            auction_id
        )
    }
}

#[async_trait]
impl ToggleClient for HttpToggleClient {
    async fn toggle(
        &self,
        auction_id: &str,
        polarity: Polarity,
    ) -> Result<ToggleResponse, ToggleError> {
        let url = self.toggle_url(auction_id, polarity);
        info!("{:<12} --> 토글 요청: POST {}", "ToggleHttp", url);

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToggleError::Status(status));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str::<ToggleResponse>(&body)?)
    }
}
// endregion: --- Toggle Client Trait
