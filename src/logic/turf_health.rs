use super::scoring::{
    rain_damage_points, PitchState, MAINTENANCE_DURATION_HOURS, MAINTENANCE_POINTS,
};
use super::weather_analyzer::WeatherAnalyzer;
use crate::datasources::WeatherSource;
use crate::error::Result;
use crate::models::{Pitch, MAX_CONDITION};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Why an evaluation did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Already flagged for replacement; nothing to assess until the turf is changed
    AwaitingReplacement,
    /// Already evaluated on this calendar date
    AnalyzedToday,
}

/// Outcome of one damage evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Evaluation {
    Skipped {
        reason: SkipReason,
    },
    Assessed {
        rain_hours: u32,
        damage_points: u32,
        state: PitchState,
    },
}

impl Evaluation {
    pub fn was_assessed(&self) -> bool {
        matches!(self, Evaluation::Assessed { .. })
    }
}

/// Turf-health state machine: rain damage, maintenance and turf replacement.
///
/// Pitches are mutated in place; callers persist them afterwards. Every
/// operation has an `_at` variant taking the current time explicitly.
pub struct TurfHealthEngine<W> {
    analyzer: WeatherAnalyzer<W>,
}

impl<W: WeatherSource> TurfHealthEngine<W> {
    pub fn new(source: W) -> Self {
        Self {
            analyzer: WeatherAnalyzer::new(source),
        }
    }

    pub async fn evaluate(&self, pitch: &mut Pitch) -> Result<Evaluation> {
        self.evaluate_at(pitch, Utc::now()).await
    }

    /// Assess rain damage since the last observation.
    ///
    /// Skips pitches already flagged for replacement or already analyzed on
    /// `now`'s date. The pitch is left untouched if the weather query fails.
    pub async fn evaluate_at(&self, pitch: &mut Pitch, now: DateTime<Utc>) -> Result<Evaluation> {
        if pitch.need_to_change_turf {
            tracing::debug!(pitch_id = %pitch.id, "Awaiting turf replacement, skipping evaluation");
            return Ok(Evaluation::Skipped {
                reason: SkipReason::AwaitingReplacement,
            });
        }

        if pitch.analyzed_on(now.date_naive()) {
            tracing::debug!(pitch_id = %pitch.id, "Already analyzed today, skipping evaluation");
            return Ok(Evaluation::Skipped {
                reason: SkipReason::AnalyzedToday,
            });
        }

        let rain_hours = self
            .analyzer
            .estimate_rain_hours(&pitch.location, pitch.observation_start(), now)
            .await?;

        Ok(Self::apply_rain_at(pitch, rain_hours, now))
    }
}

impl<W> TurfHealthEngine<W> {
    pub fn analyzer(&self) -> &WeatherAnalyzer<W> {
        &self.analyzer
    }

    /// Apply `rain_hours` of rain to `pitch` and reschedule it.
    pub fn apply_rain_at(pitch: &mut Pitch, rain_hours: u32, now: DateTime<Utc>) -> Evaluation {
        let damage_points = rain_damage_points(pitch.turf_type, rain_hours);
        if damage_points > 0 {
            tracing::info!(
                pitch_id = %pitch.id,
                rain_hours,
                damage_points,
                "Turf damaged by rain"
            );
            pitch.adjust_condition(-i32::try_from(damage_points).unwrap_or(i32::MAX));
        }

        let state = PitchState::from_condition(pitch.current_condition, false);
        match state {
            PitchState::NeedsReplacement => {
                tracing::info!(pitch_id = %pitch.id, "Turf needs replacement");
                pitch.need_to_change_turf = true;
            }
            PitchState::NeedsMaintenance => {
                let due = now + Duration::hours(pitch.turf_type.drying_hours());
                tracing::info!(pitch_id = %pitch.id, due = %due, "Maintenance scheduled");
                pitch.next_scheduled_maintenance = Some(due);
                pitch.pitch_analyzed_last = Some(now);
            }
            PitchState::Healthy => {}
        }

        Evaluation::Assessed {
            rain_hours,
            damage_points,
            state,
        }
    }

    pub fn perform_maintenance(&self, pitch: &mut Pitch) {
        self.perform_maintenance_at(pitch, Utc::now())
    }

    /// Restore condition points. The maintenance date recorded is when the
    /// work finishes. A pitch flagged for replacement stays flagged.
    pub fn perform_maintenance_at(&self, pitch: &mut Pitch, now: DateTime<Utc>) {
        pitch.adjust_condition(MAINTENANCE_POINTS);
        pitch.last_maintenance_date = now + Duration::hours(MAINTENANCE_DURATION_HOURS);
        pitch.pitch_analyzed_last = None;
        tracing::info!(
            pitch_id = %pitch.id,
            completes = %pitch.last_maintenance_date,
            "Maintenance performed"
        );
    }

    pub fn replace_turf(&self, pitch: &mut Pitch) {
        self.replace_turf_at(pitch, Utc::now())
    }

    pub fn replace_turf_at(&self, pitch: &mut Pitch, now: DateTime<Utc>) {
        pitch.current_condition = MAX_CONDITION;
        pitch.replacement_date = now;
        pitch.next_scheduled_maintenance = None;
        pitch.need_to_change_turf = false;
        pitch.pitch_analyzed_last = None;
        tracing::info!(pitch_id = %pitch.id, "Turf replaced");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasources::fake::FakeWeather;
    use crate::error::PitchCareError;
    use crate::logic::scoring::REPLACEMENT_THRESHOLD;
    use crate::models::{NewPitch, PitchLocation, TurfType, MIN_CONDITION};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 15, 0, 0).unwrap()
    }

    fn pitch(turf_type: TurfType, condition: u8) -> Pitch {
        let mut new = NewPitch::new(
            "Test Pitch",
            PitchLocation::new("Berlin", "Germany"),
            turf_type,
            condition,
        );
        new.last_maintenance_date = now() - Duration::days(4);
        new.replacement_date = now() - Duration::days(6);
        new.pitch_analyzed_last = Some(now() - Duration::days(6));
        new.into_pitch(Uuid::new_v4()).unwrap()
    }

    // 30% coverage is 7.2 hours of rain, truncated to 7
    fn seven_hours_of_rain() -> TurfHealthEngine<FakeWeather> {
        TurfHealthEngine::new(FakeWeather::raining(30.0))
    }

    #[tokio::test]
    async fn rain_damage_schedules_maintenance() {
        let engine = seven_hours_of_rain();
        let mut p = pitch(TurfType::Artificial, 5);

        let evaluation = engine.evaluate_at(&mut p, now()).await.unwrap();

        assert_eq!(
            evaluation,
            Evaluation::Assessed {
                rain_hours: 7,
                damage_points: 2,
                state: PitchState::NeedsMaintenance,
            }
        );
        assert_eq!(p.current_condition, 3);
        assert_eq!(p.next_scheduled_maintenance, Some(now() + Duration::hours(12)));
        assert_eq!(p.pitch_analyzed_last, Some(now()));
        assert!(!p.need_to_change_turf);
    }

    #[tokio::test]
    async fn rain_damage_to_threshold_flags_replacement() {
        let engine = seven_hours_of_rain();
        let mut p = pitch(TurfType::Artificial, 4);
        p.next_scheduled_maintenance = None;
        let analyzed_before = p.pitch_analyzed_last;

        engine.evaluate_at(&mut p, now()).await.unwrap();

        assert_eq!(p.current_condition, 2);
        assert!(p.need_to_change_turf);
        assert!(p.next_scheduled_maintenance.is_none());
        assert_eq!(p.pitch_analyzed_last, analyzed_before);
    }

    #[tokio::test]
    async fn damage_clamps_at_minimum() {
        let engine = seven_hours_of_rain();
        let mut p = pitch(TurfType::Artificial, 2);

        engine.evaluate_at(&mut p, now()).await.unwrap();

        assert_eq!(p.current_condition, MIN_CONDITION);
        assert!(p.need_to_change_turf);
    }

    #[tokio::test]
    async fn perfect_pitch_loses_points_and_gets_scheduled() {
        let engine = seven_hours_of_rain();
        let mut p = pitch(TurfType::Artificial, 10);

        engine.evaluate_at(&mut p, now()).await.unwrap();

        assert_eq!(p.current_condition, 8);
        assert!(p.next_scheduled_maintenance.is_some());
    }

    #[tokio::test]
    async fn dry_weather_leaves_healthy_pitch_alone() {
        let engine = TurfHealthEngine::new(FakeWeather::dry());
        let mut p = pitch(TurfType::Natural, 10);
        let before = p.clone();

        let evaluation = engine.evaluate_at(&mut p, now()).await.unwrap();

        assert_eq!(
            evaluation,
            Evaluation::Assessed {
                rain_hours: 0,
                damage_points: 0,
                state: PitchState::Healthy,
            }
        );
        assert_eq!(p, before);
    }

    #[tokio::test]
    async fn worn_pitch_is_rescheduled_even_without_rain() {
        let engine = TurfHealthEngine::new(FakeWeather::dry());
        let mut p = pitch(TurfType::Hybrid, 6);

        engine.evaluate_at(&mut p, now()).await.unwrap();

        assert_eq!(p.current_condition, 6);
        assert_eq!(p.next_scheduled_maintenance, Some(now() + Duration::hours(24)));
        assert_eq!(p.pitch_analyzed_last, Some(now()));
    }

    #[tokio::test]
    async fn natural_turf_is_most_rain_sensitive() {
        // 7 hours is two full natural cuts (3h each)
        let engine = seven_hours_of_rain();
        let mut p = pitch(TurfType::Natural, 9);

        engine.evaluate_at(&mut p, now()).await.unwrap();

        assert_eq!(p.current_condition, 5);
        assert_eq!(p.next_scheduled_maintenance, Some(now() + Duration::hours(36)));
    }

    #[tokio::test]
    async fn flagged_pitch_is_not_evaluated() {
        let engine = seven_hours_of_rain();
        let mut p = pitch(TurfType::Artificial, 2);
        p.need_to_change_turf = true;
        let before = p.clone();

        let evaluation = engine.evaluate_at(&mut p, now()).await.unwrap();

        assert_eq!(
            evaluation,
            Evaluation::Skipped {
                reason: SkipReason::AwaitingReplacement
            }
        );
        assert_eq!(p, before);
        assert_eq!(engine.analyzer().source().calls(), 0);
    }

    #[tokio::test]
    async fn analyzed_today_is_not_evaluated() {
        let engine = seven_hours_of_rain();
        let mut p = pitch(TurfType::Artificial, 5);
        p.pitch_analyzed_last = Some(now() - Duration::hours(3));
        let before = p.clone();

        let evaluation = engine.evaluate_at(&mut p, now()).await.unwrap();

        assert_eq!(
            evaluation,
            Evaluation::Skipped {
                reason: SkipReason::AnalyzedToday
            }
        );
        assert_eq!(p, before);
        assert_eq!(engine.analyzer().source().calls(), 0);
    }

    #[tokio::test]
    async fn second_evaluation_same_day_is_a_no_op() {
        let engine = seven_hours_of_rain();
        let mut p = pitch(TurfType::Artificial, 9);

        let first = engine.evaluate_at(&mut p, now()).await.unwrap();
        assert!(first.was_assessed());
        let after_first = p.clone();

        let second = engine
            .evaluate_at(&mut p, now() + Duration::hours(2))
            .await
            .unwrap();
        assert!(!second.was_assessed());
        assert_eq!(p, after_first);
        assert_eq!(engine.analyzer().source().calls(), 1);
    }

    #[tokio::test]
    async fn evaluation_resumes_the_next_day() {
        let engine = seven_hours_of_rain();
        let mut p = pitch(TurfType::Artificial, 9);

        engine.evaluate_at(&mut p, now()).await.unwrap();
        let next_day = now() + Duration::days(1);
        let evaluation = engine.evaluate_at(&mut p, next_day).await.unwrap();

        assert!(evaluation.was_assessed());
        assert_eq!(p.current_condition, 5);
        // Observation window starts at the previous analysis
        assert_eq!(
            engine.analyzer().source().last_window(),
            Some((now().date_naive(), next_day.date_naive()))
        );
    }

    #[tokio::test]
    async fn observation_starts_at_maintenance_without_prior_analysis() {
        let engine = TurfHealthEngine::new(FakeWeather::dry());
        let mut p = pitch(TurfType::Artificial, 10);
        p.pitch_analyzed_last = None;

        engine.evaluate_at(&mut p, now()).await.unwrap();

        assert_eq!(
            engine.analyzer().source().last_window(),
            Some((p.last_maintenance_date.date_naive(), now().date_naive()))
        );
    }

    #[tokio::test]
    async fn weather_failure_leaves_pitch_unchanged() {
        let engine = TurfHealthEngine::new(FakeWeather::unavailable());
        let mut p = pitch(TurfType::Hybrid, 5);
        let before = p.clone();

        let result = engine.evaluate_at(&mut p, now()).await;

        assert!(matches!(result, Err(PitchCareError::WeatherUnavailable(_))));
        assert_eq!(p, before);
    }

    #[test]
    fn maintenance_clamps_at_maximum() {
        let engine = TurfHealthEngine::new(FakeWeather::dry());
        let mut p = pitch(TurfType::Artificial, 10);

        engine.perform_maintenance_at(&mut p, now());

        assert_eq!(p.current_condition, 10);
        assert_eq!(p.last_maintenance_date, now() + Duration::hours(6));
        assert!(p.pitch_analyzed_last.is_none());
    }

    #[test]
    fn maintenance_restores_points() {
        let engine = TurfHealthEngine::new(FakeWeather::dry());
        let mut p = pitch(TurfType::Artificial, 2);

        engine.perform_maintenance_at(&mut p, now());

        assert_eq!(p.current_condition, 6);
    }

    #[test]
    fn maintenance_does_not_clear_replacement_or_schedule() {
        let engine = TurfHealthEngine::new(FakeWeather::dry());
        let mut p = pitch(TurfType::Natural, 2);
        p.need_to_change_turf = true;
        p.next_scheduled_maintenance = Some(now());

        engine.perform_maintenance_at(&mut p, now());

        assert!(p.need_to_change_turf);
        assert_eq!(p.next_scheduled_maintenance, Some(now()));
    }

    #[test]
    fn maintenance_never_lowers_condition() {
        let engine = TurfHealthEngine::new(FakeWeather::dry());
        for condition in MIN_CONDITION..=MAX_CONDITION {
            let mut p = pitch(TurfType::Hybrid, condition);
            engine.perform_maintenance_at(&mut p, now());
            assert!(p.current_condition >= condition);
            assert!((MIN_CONDITION..=MAX_CONDITION).contains(&p.current_condition));
        }
    }

    #[test]
    fn replace_turf_resets_everything() {
        let engine = TurfHealthEngine::new(FakeWeather::dry());
        let mut p = pitch(TurfType::Artificial, 1);
        p.need_to_change_turf = true;
        p.next_scheduled_maintenance = Some(now());

        engine.replace_turf_at(&mut p, now());

        assert_eq!(p.current_condition, 10);
        assert_eq!(p.replacement_date, now());
        assert!(p.next_scheduled_maintenance.is_none());
        assert!(p.pitch_analyzed_last.is_none());
        assert!(!p.need_to_change_turf);
    }

    #[tokio::test]
    async fn replaced_turf_survives_dry_evaluation() {
        let engine = TurfHealthEngine::new(FakeWeather::dry());
        let mut p = pitch(TurfType::Artificial, 2);
        p.need_to_change_turf = true;

        engine.replace_turf_at(&mut p, now());
        let evaluation = engine.evaluate_at(&mut p, now()).await.unwrap();

        assert!(evaluation.was_assessed());
        assert_eq!(p.current_condition, 10);
        assert!(!p.need_to_change_turf);
    }

    #[tokio::test]
    async fn absurd_coverage_still_damages() {
        let engine = TurfHealthEngine::new(FakeWeather::raining(1.0e12));
        let mut p = pitch(TurfType::Natural, 5);

        let evaluation = engine.evaluate_at(&mut p, now()).await.unwrap();

        assert_eq!(
            evaluation,
            Evaluation::Assessed {
                rain_hours: 24,
                damage_points: 16,
                state: PitchState::NeedsReplacement,
            }
        );
        assert_eq!(p.current_condition, MIN_CONDITION);
        assert!(p.need_to_change_turf);
    }

    #[test]
    fn condition_stays_in_bounds_for_any_rain() {
        for turf_type in TurfType::all() {
            for condition in MIN_CONDITION..=MAX_CONDITION {
                for rain_hours in [0, 1, 3, 6, 13, 24, 200, u32::MAX] {
                    let mut p = pitch(*turf_type, condition);
                    TurfHealthEngine::<FakeWeather>::apply_rain_at(&mut p, rain_hours, now());
                    assert!(
                        (MIN_CONDITION..=MAX_CONDITION).contains(&p.current_condition),
                        "{:?} {} {}",
                        turf_type,
                        condition,
                        rain_hours
                    );
                    assert_eq!(
                        p.need_to_change_turf,
                        p.current_condition <= REPLACEMENT_THRESHOLD
                    );
                }
            }
        }
    }
}
