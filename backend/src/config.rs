use std::{net::SocketAddr, time::Duration};

use clap::Parser;

use crate::exposure::TrafficSide;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("upstream timeout must be at least one second")]
    ZeroTimeout,
    #[error("suggestion limit must be at least 1")]
    ZeroSuggestLimit,
    #[error("user agent must not be blank")]
    BlankUserAgent,
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Parser)]
#[command(
    author,
    version,
    about = "Recommend the shaded side of a vehicle for a road journey"
)]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long = "bind", env = "BIND_ADDR", default_value = "0.0.0.0:5000")]
    pub bind_addr: SocketAddr,

    /// Base URL of the Nominatim geocoding service
    #[arg(long, env = "NOMINATIM_URL", default_value = "https://nominatim.openstreetmap.org")]
    pub nominatim_url: String,

    /// Base URL of the OSRM routing service
    #[arg(long, env = "OSRM_URL", default_value = "https://router.project-osrm.org")]
    pub osrm_url: String,

    /// Identifying client header sent to the providers
    #[arg(long, env = "GEOCODER_USER_AGENT", default_value = "BestSeatFinder/1.0")]
    pub user_agent: String,

    /// Per-call timeout for outbound provider requests, in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 10)]
    pub upstream_timeout_secs: u64,

    /// Traffic convention used to map the sun's bearing to a side
    #[arg(long, env = "TRAFFIC_SIDE", value_enum, default_value_t = TrafficSide::RightHand)]
    pub traffic: TrafficSide,

    /// Maximum number of autocomplete candidates requested from the geocoder
    #[arg(long, env = "SUGGEST_LIMIT", default_value_t = 5)]
    pub suggest_limit: usize,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.suggest_limit == 0 {
            return Err(ConfigError::ZeroSuggestLimit);
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::BlankUserAgent);
        }
        Ok(())
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Shared client for every provider call: identifying header and bounded timeout.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        let client = reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(self.upstream_timeout())
            .build()?;
        Ok(client)
    }
}
