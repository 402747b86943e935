use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::Units;

/// Decoded body of the OpenWeather 5-day forecast endpoint.
///
/// Only the fields the dashboard consumes are modeled. `list` defaults to
/// empty so a response without it decodes fine and is handled as "no data"
/// downstream instead of failing the decode.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    pub city: City,
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct City {
    pub name: String,
}

/// One 3-hour forecast point as the provider ships it.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastEntry {
    /// Unix timestamp, seconds.
    pub dt: i64,
    pub main: MainMeasurements,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    pub clouds: Clouds,
    pub wind: Wind,
    #[serde(default)]
    pub rain: Option<Precipitation>,
    #[serde(default)]
    pub snow: Option<Precipitation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainMeasurements {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: f64,
    pub humidity: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherCondition {
    /// Category, e.g. "Clouds".
    pub main: String,
    /// Free-text variant, e.g. "scattered clouds".
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Clouds {
    #[serde(default)]
    pub all: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Wind {
    pub speed: f64,
    #[serde(default)]
    pub deg: f64,
}

/// Accumulated precipitation over the 3-hour window. The provider omits the
/// whole object when there was none, so the volume defaults to zero. Callers
/// cannot (and must not) distinguish "no rain" from "field absent".
#[derive(Debug, Clone, Deserialize)]
pub struct Precipitation {
    #[serde(rename = "3h", default)]
    pub volume: f64,
}

/// One flattened, analysis-ready row derived from a [`ForecastEntry`].
#[derive(Debug, Clone)]
pub struct ForecastRecord {
    pub timestamp: DateTime<Utc>,
    /// Calendar day, `%Y-%m-%d`.
    pub date: String,
    /// Hour and minute, `%H:%M`.
    pub time: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub weather: String,
    pub description: String,
    pub cloudiness: u8,
    pub rain: f64,
    pub snow: f64,
}

impl ForecastRecord {
    pub fn from_entry(entry: &ForecastEntry) -> Self {
        let timestamp = unix_to_utc(entry.dt).unwrap_or_else(Utc::now);

        let (weather, description) = entry
            .weather
            .first()
            .map(|w| (w.main.clone(), w.description.clone()))
            .unwrap_or_else(|| ("Unknown".to_string(), "Unknown".to_string()));

        Self {
            timestamp,
            date: timestamp.format("%Y-%m-%d").to_string(),
            time: timestamp.format("%H:%M").to_string(),
            temperature: entry.main.temp,
            feels_like: entry.main.feels_like,
            temp_min: entry.main.temp_min,
            temp_max: entry.main.temp_max,
            humidity: entry.main.humidity,
            pressure: entry.main.pressure,
            wind_speed: entry.wind.speed,
            wind_deg: entry.wind.deg,
            weather,
            description,
            cloudiness: entry.clouds.all,
            rain: entry.rain.as_ref().map_or(0.0, |p| p.volume),
            snow: entry.snow.as_ref().map_or(0.0, |p| p.volume),
        }
    }
}

/// The processed table the renderer consumes: city, unit system and the
/// flattened records in provider order.
#[derive(Debug, Clone)]
pub struct ForecastTable {
    pub city: String,
    pub units: Units,
    pub records: Vec<ForecastRecord>,
}

impl ForecastTable {
    /// Flatten a decoded response. Exactly one record per forecast entry, in
    /// input order, no filtering. Returns `None` when the response carries no
    /// forecast points (including a response that had no `list` at all).
    pub fn from_response(response: &ForecastResponse, units: Units) -> Option<Self> {
        if response.list.is_empty() {
            return None;
        }

        let records = response.list.iter().map(ForecastRecord::from_entry).collect();

        Some(Self {
            city: response.city.name.clone(),
            units,
            records,
        })
    }

    /// Count of records per weather category, most frequent first. Ties keep
    /// first-seen order.
    pub fn condition_distribution(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();

        for record in &self.records {
            match counts.iter_mut().find(|(name, _)| *name == record.weather) {
                Some((_, n)) => *n += 1,
                None => counts.push((record.weather.clone(), 1)),
            }
        }

        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}
