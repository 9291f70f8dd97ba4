use crate::db::Database;
use crate::error::Result;
use crate::models::{Pitch, PitchLocation, TurfType};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params_from_iter, OptionalExtension, Row};
use tracing::warn;
use uuid::Uuid;

/// Which pitches a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PitchFilter {
    #[default]
    All,
    /// `next_scheduled_maintenance` is set
    MaintenanceScheduled,
    /// `need_to_change_turf` is true
    NeedsTurfReplacement,
}

impl PitchFilter {
    fn where_clause(&self) -> &'static str {
        match self {
            PitchFilter::All => "",
            PitchFilter::MaintenanceScheduled => "WHERE next_scheduled_maintenance IS NOT NULL",
            PitchFilter::NeedsTurfReplacement => "WHERE need_to_change_turf = 1",
        }
    }
}

const PITCH_COLUMNS: &str = "id, name, city, country, turf_type, current_condition, \
     last_maintenance_date, next_scheduled_maintenance, need_to_change_turf, \
     pitch_analyzed_last, replacement_date";

/// Assignment list shared by both update statements; binds ?1..=?10 in
/// `column_values` order and ?11 for `updated_at`.
const UPDATE_SET: &str = "UPDATE pitches SET \
     name = ?1, city = ?2, country = ?3, turf_type = ?4, current_condition = ?5, \
     last_maintenance_date = ?6, next_scheduled_maintenance = ?7, \
     need_to_change_turf = ?8, pitch_analyzed_last = ?9, replacement_date = ?10, \
     updated_at = ?11";

/// Every stored column of `pitch` except `id`, in `PITCH_COLUMNS` order.
fn column_values(pitch: &Pitch) -> [Value; 10] {
    let optional = |dt: &Option<DateTime<Utc>>| match dt {
        Some(dt) => Value::Text(timestamp(dt)),
        None => Value::Null,
    };
    [
        Value::Text(pitch.name.clone()),
        Value::Text(pitch.location.city.clone()),
        Value::Text(pitch.location.country.clone()),
        Value::Text(pitch.turf_type.as_str().to_string()),
        Value::Integer(pitch.current_condition.into()),
        Value::Text(timestamp(&pitch.last_maintenance_date)),
        optional(&pitch.next_scheduled_maintenance),
        Value::Integer(pitch.need_to_change_turf.into()),
        optional(&pitch.pitch_analyzed_last),
        Value::Text(timestamp(&pitch.replacement_date)),
    ]
}

impl Database {
    pub fn insert_pitch(&self, pitch: &Pitch) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO pitches ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    PITCH_COLUMNS
                ),
                params_from_iter(
                    std::iter::once(Value::Text(pitch.id.to_string())).chain(column_values(pitch)),
                ),
            )?;
            Ok(())
        })
    }

    pub fn get_pitch(&self, id: Uuid) -> Result<Option<Pitch>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM pitches WHERE id = ?1", PITCH_COLUMNS),
                [id.to_string()],
                row_to_pitch,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn list_pitches(&self, filter: PitchFilter) -> Result<Vec<Pitch>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM pitches {} ORDER BY name, id",
                PITCH_COLUMNS,
                filter.where_clause()
            ))?;
            let pitches = stmt
                .query_map([], row_to_pitch)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(pitches)
        })
    }

    /// Write every field of `pitch`. Returns false if no such pitch exists.
    pub fn update_pitch(&self, pitch: &Pitch) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                &format!("{} WHERE id = ?12", UPDATE_SET),
                params_from_iter(column_values(pitch).into_iter().chain([
                    Value::Text(timestamp(&Utc::now())),
                    Value::Text(pitch.id.to_string()),
                ])),
            )?;
            Ok(changed > 0)
        })
    }

    /// Compare-and-set write of `pitch`: lands only while the stored row
    /// still matches `expected` column for column. Any write made since
    /// `expected` was read (maintenance, turf change, another evaluation)
    /// makes this return false.
    pub fn update_pitch_if_unchanged(&self, pitch: &Pitch, expected: &Pitch) -> Result<bool> {
        let guard = PITCH_COLUMNS
            .split(',')
            .skip(1)
            .enumerate()
            .map(|(i, column)| format!(" AND {} IS ?{}", column.trim(), i + 13))
            .collect::<String>();

        self.with_conn(|conn| {
            let changed = conn.execute(
                &format!("{} WHERE id = ?12{}", UPDATE_SET, guard),
                params_from_iter(
                    column_values(pitch)
                        .into_iter()
                        .chain([
                            Value::Text(timestamp(&Utc::now())),
                            Value::Text(pitch.id.to_string()),
                        ])
                        .chain(column_values(expected)),
                ),
            )?;
            Ok(changed > 0)
        })
    }

    /// Returns false if no such pitch existed.
    pub fn delete_pitch(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM pitches WHERE id = ?1", [id.to_string()])?;
            Ok(changed > 0)
        })
    }
}

fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn conversion_error<E>(row: &Row, column: &str, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    let index = row.as_ref().column_index(column).unwrap_or(0);
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
}

fn get_timestamp(row: &Row, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(row, column, e))
}

fn get_optional_timestamp(row: &Row, column: &str) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(column)?;
    raw.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| conversion_error(row, column, e))
    })
    .transpose()
}

#[derive(Debug)]
struct UnknownTurfType(String);

impl std::fmt::Display for UnknownTurfType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown turf type '{}'", self.0)
    }
}

impl std::error::Error for UnknownTurfType {}

fn row_to_pitch(row: &Row) -> rusqlite::Result<Pitch> {
    let id_str: String = row.get("id")?;
    let turf_type_str: String = row.get("turf_type")?;

    let id = Uuid::parse_str(&id_str).map_err(|e| conversion_error(row, "id", e))?;
    let turf_type = TurfType::from_str(&turf_type_str).ok_or_else(|| {
        warn!(
            pitch_id = %id,
            turf_type = %turf_type_str,
            "Unknown turf_type in database"
        );
        conversion_error(row, "turf_type", UnknownTurfType(turf_type_str.clone()))
    })?;

    Ok(Pitch {
        id,
        name: row.get("name")?,
        location: PitchLocation {
            city: row.get("city")?,
            country: row.get("country")?,
        },
        turf_type,
        current_condition: row.get("current_condition")?,
        last_maintenance_date: get_timestamp(row, "last_maintenance_date")?,
        next_scheduled_maintenance: get_optional_timestamp(row, "next_scheduled_maintenance")?,
        need_to_change_turf: row.get("need_to_change_turf")?,
        pitch_analyzed_last: get_optional_timestamp(row, "pitch_analyzed_last")?,
        replacement_date: get_timestamp(row, "replacement_date")?,
    })
}
