use crate::{config::Units, model::ForecastResponse};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt::Debug;
use thiserror::Error;

pub mod openweather;

/// What a single fetch asks the provider for.
#[derive(Debug, Clone)]
pub struct ForecastQuery {
    pub city: String,
    pub units: Units,
    /// Number of 3-hour forecast points requested.
    pub count: u32,
}

/// Why the single fetch attempt failed. There is no retry; the caller reports
/// this and stops.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to reach the forecast endpoint: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Forecast request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to parse forecast JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Source of forecast data. One production implementation (OpenWeather);
/// tests substitute their own.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn fetch_forecast(&self, query: &ForecastQuery) -> Result<ForecastResponse, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_surfaces_code_and_body() {
        let err = FetchError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: r#"{"cod":401,"message":"Invalid API key"}"#.to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("Invalid API key"));
    }

    #[test]
    fn decode_error_mentions_json() {
        let parse_err = serde_json::from_str::<ForecastResponse>("not json").unwrap_err();
        let err = FetchError::from(parse_err);

        assert!(err.to_string().contains("Failed to parse forecast JSON"));
    }
}
