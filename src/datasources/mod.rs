#[cfg(test)]
pub mod fake;
pub mod visualcrossing;

pub use visualcrossing::VisualCrossingClient;

use crate::error::Result;
use crate::models::{DailyWeather, PitchLocation};
use chrono::NaiveDate;
use std::future::Future;

/// Source of observed daily weather for a location.
pub trait WeatherSource: Send + Sync {
    /// Daily summaries for every date in `start..=end`, in date order.
    fn daily_weather(
        &self,
        location: &PitchLocation,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<Vec<DailyWeather>>> + Send;
}
