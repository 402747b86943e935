use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use crate::config::{Config, FORECAST_POINTS};
use crate::model::ForecastTable;
use crate::provider::{FetchError, ForecastProvider, ForecastQuery};
use crate::render;

/// How a run ended. Every variant except `Completed` is a graceful halt: the
/// caller prints a diagnostic and the process still exits normally.
#[derive(Debug)]
pub enum RunOutcome {
    Completed { output: PathBuf, records: usize },

    /// No credential configured at all; no request was made.
    MissingApiKey,

    /// The credential failed the pre-flight format check; no request was made.
    InvalidApiKey,

    /// The single fetch attempt failed; nothing downstream ran.
    FetchFailed(FetchError),

    /// The response decoded but carried no forecast points; nothing was
    /// rendered.
    NoData,
}

/// The whole pipeline: guard the credential, fetch once, flatten, render.
/// Each stage runs only if the previous one produced something to work with.
pub async fn run_dashboard(
    config: &Config,
    provider: &dyn ForecastProvider,
) -> Result<RunOutcome> {
    let Some(api_key) = config.api_key.as_deref() else {
        return Ok(RunOutcome::MissingApiKey);
    };
    if !Config::api_key_is_plausible(api_key) {
        return Ok(RunOutcome::InvalidApiKey);
    }

    info!("Starting weather data fetch for {}...", config.city);
    let query = ForecastQuery {
        city: config.city.clone(),
        units: config.units,
        count: FORECAST_POINTS,
    };
    let response = match provider.fetch_forecast(&query).await {
        Ok(response) => response,
        Err(err) => return Ok(RunOutcome::FetchFailed(err)),
    };

    let Some(table) = ForecastTable::from_response(&response, config.units) else {
        return Ok(RunOutcome::NoData);
    };

    info!("Creating visualization dashboard...");
    render::render_dashboard(&table, &config.output).with_context(|| {
        format!("Failed to render dashboard to {}", config.output.display())
    })?;

    Ok(RunOutcome::Completed {
        output: config.output.clone(),
        records: table.records.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const VALID_KEY: &str = "0123456789abcdef0123456789abcdef";

    const FORECAST_JSON: &str = r#"{
        "city": {"name": "Vijayawada"},
        "list": [
            {
                "dt": 1735689600,
                "main": {"temp": 28.5, "feels_like": 30.0, "temp_min": 27.0,
                         "temp_max": 29.0, "pressure": 1008, "humidity": 70},
                "weather": [{"main": "Clouds", "description": "scattered clouds"}],
                "clouds": {"all": 40},
                "wind": {"speed": 3.2, "deg": 120}
            },
            {
                "dt": 1735700400,
                "main": {"temp": 26.0, "feels_like": 26.5, "temp_min": 25.0,
                         "temp_max": 27.0, "pressure": 1010, "humidity": 75},
                "weather": [{"main": "Clear", "description": "clear sky"}],
                "clouds": {"all": 5},
                "wind": {"speed": 1.8, "deg": 300}
            }
        ]
    }"#;

    /// Canned provider that counts how often it was asked.
    #[derive(Debug)]
    struct MockProvider {
        calls: AtomicUsize,
        body: Option<&'static str>,
    }

    impl MockProvider {
        fn returning(body: &'static str) -> Self {
            Self { calls: AtomicUsize::new(0), body: Some(body) }
        }

        fn failing() -> Self {
            Self { calls: AtomicUsize::new(0), body: None }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ForecastProvider for MockProvider {
        async fn fetch_forecast(
            &self,
            _query: &ForecastQuery,
        ) -> Result<crate::model::ForecastResponse, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.body {
                Some(body) => Ok(serde_json::from_str(body).expect("mock fixture must parse")),
                None => Err(FetchError::Status {
                    status: StatusCode::UNAUTHORIZED,
                    body: r#"{"cod":401,"message":"Invalid API key"}"#.to_string(),
                }),
            }
        }
    }

    fn config_with_key(key: Option<&str>, output: &Path) -> Config {
        Config {
            api_key: key.map(str::to_string),
            output: output.to_path_buf(),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn short_api_key_skips_the_network_entirely() {
        let dir = tempfile::tempdir().expect("tempdir must be created");
        let output = dir.path().join("dash.png");
        let provider = MockProvider::returning(FORECAST_JSON);
        let config = config_with_key(Some("not-32-chars"), &output);

        let outcome = run_dashboard(&config, &provider).await.expect("run must not error");

        assert!(matches!(outcome, RunOutcome::InvalidApiKey));
        assert_eq!(provider.call_count(), 0);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn missing_api_key_skips_the_network_entirely() {
        let dir = tempfile::tempdir().expect("tempdir must be created");
        let output = dir.path().join("dash.png");
        let provider = MockProvider::returning(FORECAST_JSON);
        let config = config_with_key(None, &output);

        let outcome = run_dashboard(&config, &provider).await.expect("run must not error");

        assert!(matches!(outcome, RunOutcome::MissingApiKey));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn fetch_failure_halts_before_rendering() {
        let dir = tempfile::tempdir().expect("tempdir must be created");
        let output = dir.path().join("dash.png");
        let provider = MockProvider::failing();
        let config = config_with_key(Some(VALID_KEY), &output);

        let outcome = run_dashboard(&config, &provider).await.expect("run must not error");

        match outcome {
            RunOutcome::FetchFailed(err) => {
                let msg = err.to_string();
                assert!(msg.contains("401"));
                assert!(msg.contains("Invalid API key"));
            }
            other => panic!("expected FetchFailed, got {other:?}"),
        }
        assert_eq!(provider.call_count(), 1);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn empty_forecast_list_halts_before_rendering() {
        let dir = tempfile::tempdir().expect("tempdir must be created");
        let output = dir.path().join("dash.png");
        let provider = MockProvider::returning(r#"{"city": {"name": "Vijayawada"}, "list": []}"#);
        let config = config_with_key(Some(VALID_KEY), &output);

        let outcome = run_dashboard(&config, &provider).await.expect("run must not error");

        assert!(matches!(outcome, RunOutcome::NoData));
        assert_eq!(provider.call_count(), 1);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn response_without_list_halts_before_rendering() {
        let dir = tempfile::tempdir().expect("tempdir must be created");
        let output = dir.path().join("dash.png");
        let provider = MockProvider::returning(r#"{"city": {"name": "Vijayawada"}}"#);
        let config = config_with_key(Some(VALID_KEY), &output);

        let outcome = run_dashboard(&config, &provider).await.expect("run must not error");

        assert!(matches!(outcome, RunOutcome::NoData));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn successful_run_writes_the_dashboard() {
        let dir = tempfile::tempdir().expect("tempdir must be created");
        let output = dir.path().join("dash.png");
        let provider = MockProvider::returning(FORECAST_JSON);
        let config = config_with_key(Some(VALID_KEY), &output);

        let outcome = run_dashboard(&config, &provider).await.expect("run must not error");

        match outcome {
            RunOutcome::Completed { output: reported, records } => {
                assert_eq!(reported, output);
                assert_eq!(records, 2);
            }
            other => panic!("expected Completed, got {other:?}"),
        }
        assert!(output.exists());
    }
}
