use super::scoring::rain_hours_from_coverage;
use crate::datasources::WeatherSource;
use crate::error::Result;
use crate::models::PitchLocation;
use chrono::{DateTime, Utc};

/// Turns observed weather into an estimate of rain-hours a pitch has taken.
pub struct WeatherAnalyzer<W> {
    source: W,
}

impl<W: WeatherSource> WeatherAnalyzer<W> {
    pub fn new(source: W) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &W {
        &self.source
    }

    /// Rain-hours on the worst single day between `since` and `now`
    /// (calendar dates, both inclusive). The worst day counts, not the total.
    pub async fn estimate_rain_hours(
        &self,
        location: &PitchLocation,
        since: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<u32> {
        let start = since.date_naive();
        let end = now.date_naive();

        // Maintenance finishing tomorrow leaves nothing to observe yet
        if start > end {
            tracing::debug!(location = %location, %start, %end, "Empty observation window");
            return Ok(0);
        }

        let days = self.source.daily_weather(location, start, end).await?;

        let max_coverage = days
            .iter()
            .map(|d| d.precipitation_coverage_percent)
            .fold(0.0_f64, f64::max);
        let hours = rain_hours_from_coverage(max_coverage);

        tracing::info!(
            location = %location,
            days = days.len(),
            max_coverage,
            rain_hours = hours,
            "Weather data analyzed"
        );

        Ok(hours)
    }
}
