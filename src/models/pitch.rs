use super::TurfType;
use crate::error::{PitchCareError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_CONDITION: u8 = 1;
pub const MAX_CONDITION: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchLocation {
    pub city: String,
    pub country: String,
}

impl PitchLocation {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
        }
    }

    /// Location key understood by the weather provider ("Berlin,Germany").
    pub fn query_key(&self) -> String {
        format!("{},{}", self.city.trim(), self.country.trim())
    }
}

impl std::fmt::Display for PitchLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.city, self.country)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pitch {
    pub id: Uuid,
    pub name: String,
    pub location: PitchLocation,
    pub turf_type: TurfType,
    pub current_condition: u8,
    pub last_maintenance_date: DateTime<Utc>,
    pub next_scheduled_maintenance: Option<DateTime<Utc>>,
    pub need_to_change_turf: bool,
    pub pitch_analyzed_last: Option<DateTime<Utc>>,
    pub replacement_date: DateTime<Utc>,
}

impl Pitch {
    /// Shift the condition score by `points`, clamping silently to 1..=10.
    pub fn adjust_condition(&mut self, points: i32) {
        let updated = (self.current_condition as i32)
            .saturating_add(points)
            .clamp(MIN_CONDITION as i32, MAX_CONDITION as i32) as u8;
        tracing::info!(
            pitch_id = %self.id,
            from = self.current_condition,
            to = updated,
            "Pitch condition updated"
        );
        self.current_condition = updated;
    }

    pub fn analyzed_on(&self, date: NaiveDate) -> bool {
        self.pitch_analyzed_last
            .map(|at| at.date_naive() == date)
            .unwrap_or(false)
    }

    /// Start of the window whose weather has not yet been assessed.
    pub fn observation_start(&self) -> DateTime<Utc> {
        self.pitch_analyzed_last
            .unwrap_or(self.last_maintenance_date)
    }
}

/// A pitch that has not been stored yet and so has no identity.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPitch {
    pub name: String,
    pub location: PitchLocation,
    pub turf_type: TurfType,
    pub current_condition: u8,
    pub last_maintenance_date: DateTime<Utc>,
    #[serde(default)]
    pub next_scheduled_maintenance: Option<DateTime<Utc>>,
    pub replacement_date: DateTime<Utc>,
    #[serde(default)]
    pub need_to_change_turf: bool,
    #[serde(default)]
    pub pitch_analyzed_last: Option<DateTime<Utc>>,
}

impl NewPitch {
    pub fn new(
        name: impl Into<String>,
        location: PitchLocation,
        turf_type: TurfType,
        current_condition: u8,
    ) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            location,
            turf_type,
            current_condition,
            last_maintenance_date: now,
            next_scheduled_maintenance: None,
            replacement_date: now,
            need_to_change_turf: false,
            pitch_analyzed_last: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PitchCareError::Validation("Pitch name is empty".into()));
        }
        validate_location(&self.location)?;
        validate_condition(self.current_condition)
    }

    /// Validate and assign an identity.
    pub fn into_pitch(self, id: Uuid) -> Result<Pitch> {
        self.validate()?;
        Ok(Pitch {
            id,
            name: self.name,
            location: self.location,
            turf_type: self.turf_type,
            current_condition: self.current_condition,
            last_maintenance_date: self.last_maintenance_date,
            next_scheduled_maintenance: self.next_scheduled_maintenance,
            need_to_change_turf: self.need_to_change_turf,
            pitch_analyzed_last: self.pitch_analyzed_last,
            replacement_date: self.replacement_date,
        })
    }
}

/// Partial update of an existing pitch. The turf type cannot be changed, so
/// it is not accepted here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PitchUpdate {
    pub name: Option<String>,
    pub location: Option<PitchLocation>,
    pub current_condition: Option<u8>,
    pub last_maintenance_date: Option<DateTime<Utc>>,
    /// Absent leaves the schedule alone; `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub next_scheduled_maintenance: Option<Option<DateTime<Utc>>>,
    pub replacement_date: Option<DateTime<Utc>>,
}

/// Marks a field as present even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl PitchUpdate {
    /// Apply onto `pitch`. Nothing is changed unless every field validates.
    pub fn apply(self, pitch: &mut Pitch) -> Result<()> {
        if let Some(ref name) = self.name {
            if name.trim().is_empty() {
                return Err(PitchCareError::Validation("Pitch name is empty".into()));
            }
        }
        if let Some(ref location) = self.location {
            validate_location(location)?;
        }
        if let Some(condition) = self.current_condition {
            validate_condition(condition)?;
        }

        if let Some(name) = self.name {
            pitch.name = name;
        }
        if let Some(location) = self.location {
            pitch.location = location;
        }
        if let Some(condition) = self.current_condition {
            pitch.current_condition = condition;
        }
        if let Some(date) = self.last_maintenance_date {
            pitch.last_maintenance_date = date;
        }
        if let Some(schedule) = self.next_scheduled_maintenance {
            pitch.next_scheduled_maintenance = schedule;
        }
        if let Some(date) = self.replacement_date {
            pitch.replacement_date = date;
        }
        Ok(())
    }
}

fn validate_condition(condition: u8) -> Result<()> {
    if !(MIN_CONDITION..=MAX_CONDITION).contains(&condition) {
        return Err(PitchCareError::Validation(format!(
            "current_condition must be between {} and {}, got {}",
            MIN_CONDITION, MAX_CONDITION, condition
        )));
    }
    Ok(())
}

fn validate_location(location: &PitchLocation) -> Result<()> {
    if location.city.trim().is_empty() || location.country.trim().is_empty() {
        return Err(PitchCareError::Validation(
            "Pitch location needs both city and country".into(),
        ));
    }
    Ok(())
}
