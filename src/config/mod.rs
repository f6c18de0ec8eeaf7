/// 페이지 동작 설정
/// 환경 변수가 없거나 잘못되었으면 기본값을 쓴다.
// region:    --- Imports
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use tokio::time::Duration;
use tracing::{info, warn};

// endregion: --- Imports

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("http client build failed: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    /// 토글 요청을 보낼 서버 주소
    pub base_url: String,
    pub countdown_tick: Duration,
    pub flash_lifetime: Duration,
    pub flash_fade: Duration,
    pub search_debounce: Duration,
    /// 토글 요청 제한 시간, 지나면 버튼을 다시 활성화한다
    pub toggle_timeout: Duration,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            countdown_tick: Duration::from_millis(1000),
            flash_lifetime: Duration::from_millis(5000),
            flash_fade: Duration::from_millis(500),
            search_debounce: Duration::from_millis(300),
            toggle_timeout: Duration::from_millis(10_000),
        }
    }
}

impl PageConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("AUCTION_BASE_URL").unwrap_or_else(|_| {
                info!(
                    "{:<12} --> AUCTION_BASE_URL 미설정, 기본값 사용: {}",
                    "Config", defaults.base_url
                );
                defaults.base_url.clone()
            }),
            countdown_tick: millis("COUNTDOWN_TICK_MS", defaults.countdown_tick),
            flash_lifetime: millis("FLASH_LIFETIME_MS", defaults.flash_lifetime),
            flash_fade: millis("FLASH_FADE_MS", defaults.flash_fade),
            search_debounce: millis("SEARCH_DEBOUNCE_MS", defaults.search_debounce),
            toggle_timeout: millis("TOGGLE_TIMEOUT_MS", defaults.toggle_timeout),
        }
    }
}

fn millis(key: &str, default: Duration) -> Duration {
    match env::var(key) {
        Ok(raw) => {
            let ms = parse_or(key, &raw, default.as_millis() as u64);
            // 0이면 interval이 패닉하므로 최소 1ms
            Duration::from_millis(ms.max(1))
        }
        Err(_) => default,
    }
}

fn parse_or<T: FromStr + Display + Copy>(key: &str, raw: &str, default: T) -> T
where
    T::Err: Display,
{
    raw.trim().parse().unwrap_or_else(|e| {
        warn!(
            "{:<12} --> {} 값이 잘못됨 ({}), 기본값 사용: {}",
            "Config", key, e, default
        );
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_values_fall_back() {
        assert_eq!(parse_or("X", "250", 1000u64), 250);
        assert_eq!(parse_or("X", " 250 ", 1000u64), 250);
        assert_eq!(parse_or("X", "fast", 1000u64), 1000);
        assert_eq!(parse_or("X", "-5", 1000u64), 1000);
    }

    #[test]
    fn defaults_match_page_behavior() {
        let config = PageConfig::default();
        assert_eq!(config.countdown_tick, Duration::from_secs(1));
        assert_eq!(config.flash_lifetime, Duration::from_secs(5));
        assert_eq!(config.flash_fade, Duration::from_millis(500));
        assert_eq!(config.search_debounce, Duration::from_millis(300));
        assert_eq!(config.toggle_timeout, Duration::from_secs(10));
    }
}
