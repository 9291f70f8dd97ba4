pub mod pitch_service;
pub mod scoring;
pub mod turf_health;
pub mod weather_analyzer;

pub use pitch_service::{PitchService, SweepReport};
pub use scoring::PitchState;
pub use turf_health::{Evaluation, SkipReason, TurfHealthEngine};
pub use weather_analyzer::WeatherAnalyzer;
