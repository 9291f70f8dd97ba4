use super::WeatherSource;
use crate::config::WeatherConfig;
use crate::error::{PitchCareError, Result};
use crate::models::{DailyWeather, PitchLocation};
use chrono::NaiveDate;
use reqwest::Url;
use serde::Deserialize;

/// Client for the Visual Crossing timeline API (historical daily summaries).
pub struct VisualCrossingClient {
    client: reqwest::Client,
    config: WeatherConfig,
}

// Visual Crossing API response structures
#[derive(Debug, Deserialize)]
struct VcTimelineResponse {
    #[serde(default)]
    days: Vec<VcDay>,
}

#[derive(Debug, Deserialize)]
struct VcDay {
    datetime: NaiveDate,
    /// Percentage of the day with measurable precipitation; null when the
    /// station has no data
    #[serde(default)]
    precipcover: Option<f64>,
}

impl VisualCrossingClient {
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }

    /// Fetch one summary per day for `start..=end`.
    pub async fn fetch_days(
        &self,
        location: &PitchLocation,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyWeather>> {
        let url = self.timeline_url(
            &[
                location.query_key(),
                start.format("%Y-%m-%d").to_string(),
                end.format("%Y-%m-%d").to_string(),
            ],
            "datetime,precipcover",
        )?;

        tracing::debug!(
            location = %location,
            %start,
            %end,
            "Querying Visual Crossing timeline"
        );

        let response =
            self.client.get(url).send().await.map_err(|e| {
                PitchCareError::WeatherUnavailable(format!("Visual Crossing: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PitchCareError::WeatherUnavailable(format!(
                "Visual Crossing returned {}: {}",
                status,
                body.trim()
            )));
        }

        let timeline: VcTimelineResponse = response.json().await.map_err(|e| {
            PitchCareError::WeatherUnavailable(format!(
                "Failed to parse Visual Crossing response: {}",
                e
            ))
        })?;

        Ok(convert_response(timeline))
    }

    /// Test connection to the Visual Crossing API
    pub async fn test_connection(&self) -> Result<bool> {
        let url = self.timeline_url(&["London,UK".to_string(), "today".to_string()], "datetime")?;

        let response =
            self.client.get(url).send().await.map_err(|e| {
                PitchCareError::WeatherUnavailable(format!("Visual Crossing: {}", e))
            })?;

        Ok(response.status().is_success())
    }

    fn timeline_url(&self, segments: &[String], elements: &str) -> Result<Url> {
        if !self.config.has_api_key() {
            return Err(PitchCareError::WeatherUnavailable(
                "Visual Crossing API key is not set (weather.api_key / VISUAL_CROSSING_API_KEY)"
                    .into(),
            ));
        }

        let mut url = Url::parse(&self.config.base_url).map_err(|e| {
            PitchCareError::Config(format!(
                "invalid weather.base_url '{}': {}",
                self.config.base_url, e
            ))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                PitchCareError::Config(format!(
                    "weather.base_url '{}' cannot take a path",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);

        url.query_pairs_mut()
            .append_pair("key", &self.config.api_key)
            .append_pair("unitGroup", "metric")
            .append_pair("include", "days")
            .append_pair("elements", elements);

        Ok(url)
    }
}

impl WeatherSource for VisualCrossingClient {
    async fn daily_weather(
        &self,
        location: &PitchLocation,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyWeather>> {
        self.fetch_days(location, start, end).await
    }
}

fn convert_response(response: VcTimelineResponse) -> Vec<DailyWeather> {
    let mut days: Vec<DailyWeather> = response
        .days
        .into_iter()
        .map(|day| DailyWeather::new(day.datetime, day.precipcover.unwrap_or(0.0)))
        .collect();
    days.sort_by_key(|d| d.date);
    days
}
