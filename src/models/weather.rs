use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of observed weather as reported by the weather provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWeather {
    pub date: NaiveDate,
    /// Share of the day with measurable precipitation, 0-100.
    /// Six hours of rain in a day is 25%.
    pub precipitation_coverage_percent: f64,
}

impl DailyWeather {
    pub fn new(date: NaiveDate, precipitation_coverage_percent: f64) -> Self {
        Self {
            date,
            precipitation_coverage_percent,
        }
    }
}
