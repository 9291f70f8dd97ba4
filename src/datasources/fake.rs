//! In-memory weather source for tests.

use super::WeatherSource;
use crate::error::{PitchCareError, Result};
use crate::models::{DailyWeather, PitchLocation};
use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

enum Behaviour {
    /// Same coverage on every day of the requested window
    Uniform(f64),
    /// Fixed list regardless of window
    Days(Vec<DailyWeather>),
    Unavailable,
}

pub struct FakeWeather {
    behaviour: Behaviour,
    calls: AtomicUsize,
    last_window: Mutex<Option<(NaiveDate, NaiveDate)>>,
}

impl FakeWeather {
    fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            calls: AtomicUsize::new(0),
            last_window: Mutex::new(None),
        }
    }

    pub fn raining(coverage_percent: f64) -> Self {
        Self::new(Behaviour::Uniform(coverage_percent))
    }

    pub fn dry() -> Self {
        Self::raining(0.0)
    }

    pub fn with_days(days: Vec<DailyWeather>) -> Self {
        Self::new(Behaviour::Days(days))
    }

    pub fn unavailable() -> Self {
        Self::new(Behaviour::Unavailable)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_window(&self) -> Option<(NaiveDate, NaiveDate)> {
        *self.last_window.lock().unwrap()
    }
}

impl WeatherSource for FakeWeather {
    async fn daily_weather(
        &self,
        _location: &PitchLocation,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyWeather>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_window.lock().unwrap() = Some((start, end));

        match &self.behaviour {
            Behaviour::Uniform(coverage) => Ok(start
                .iter_days()
                .take_while(|d| *d <= end)
                .map(|d| DailyWeather::new(d, *coverage))
                .collect()),
            Behaviour::Days(days) => Ok(days.clone()),
            Behaviour::Unavailable => Err(PitchCareError::WeatherUnavailable(
                "fake provider is down".into(),
            )),
        }
    }
}
