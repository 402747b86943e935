use async_trait::async_trait;
use chrono::DateTime;
use log::{debug, info};
use reqwest::Client;
use std::time::Duration;

use crate::model::ForecastResponse;

use super::{FetchError, ForecastProvider, ForecastQuery};

const FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";

/// Upper bound on the whole request, connect included. The one blocking
/// operation in a run.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self { api_key, http })
    }
}

#[async_trait]
impl ForecastProvider for OpenWeatherProvider {
    async fn fetch_forecast(&self, query: &ForecastQuery) -> Result<ForecastResponse, FetchError> {
        let res = self
            .http
            .get(FORECAST_URL)
            .query(&[
                ("q", query.city.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", query.units.as_str()),
                ("cnt", &query.count.to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: ForecastResponse = serde_json::from_str(&body)?;

        info!(
            "Fetched {} forecast points for {}",
            parsed.list.len(),
            parsed.city.name
        );
        if let Some(first) = parsed.list.first() {
            let when = DateTime::from_timestamp(first.dt, 0)
                .map_or_else(|| first.dt.to_string(), |dt| dt.to_string());
            debug!("First forecast point: {} at {}", first.main.temp, when);
        }

        Ok(parsed)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_construction_succeeds() {
        let provider = OpenWeatherProvider::new("0123456789abcdef0123456789abcdef".to_string());
        assert!(provider.is_ok());
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(500);
        let truncated = truncate_body(&body);

        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn short_error_bodies_pass_through() {
        assert_eq!(truncate_body("city not found"), "city not found");
    }
}
