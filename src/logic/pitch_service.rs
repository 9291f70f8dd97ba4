use super::turf_health::{Evaluation, TurfHealthEngine};
use crate::datasources::WeatherSource;
use crate::db::{Database, PitchFilter};
use crate::error::{PitchCareError, Result};
use crate::models::{NewPitch, Pitch, PitchUpdate};
use serde::Serialize;
use uuid::Uuid;

/// Totals from one pass over every stored pitch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub assessed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Pairs each turf-health operation with the read and write it needs.
pub struct PitchService<W> {
    db: Database,
    engine: TurfHealthEngine<W>,
}

impl<W: WeatherSource> PitchService<W> {
    pub fn new(db: Database, engine: TurfHealthEngine<W>) -> Self {
        Self { db, engine }
    }

    pub fn engine(&self) -> &TurfHealthEngine<W> {
        &self.engine
    }

    pub fn parse_id(raw: &str) -> Result<Uuid> {
        Uuid::parse_str(raw.trim()).map_err(|_| PitchCareError::InvalidIdentifier(raw.to_string()))
    }

    pub fn list(&self, filter: PitchFilter) -> Result<Vec<Pitch>> {
        self.db.list_pitches(filter)
    }

    pub fn maintenance_needed(&self) -> Result<Vec<Pitch>> {
        self.list(PitchFilter::MaintenanceScheduled)
    }

    pub fn replacement_needed(&self) -> Result<Vec<Pitch>> {
        self.list(PitchFilter::NeedsTurfReplacement)
    }

    pub fn get(&self, id: &str) -> Result<Pitch> {
        let id = Self::parse_id(id)?;
        self.db
            .get_pitch(id)?
            .ok_or_else(|| PitchCareError::NotFound(format!("pitch {}", id)))
    }

    pub fn create(&self, new: NewPitch) -> Result<Pitch> {
        let pitch = new.into_pitch(Uuid::new_v4())?;
        self.db.insert_pitch(&pitch)?;
        tracing::info!(pitch_id = %pitch.id, name = %pitch.name, "Pitch registered");
        Ok(pitch)
    }

    pub fn update(&self, id: &str, update: PitchUpdate) -> Result<Pitch> {
        let mut pitch = self.get(id)?;
        update.apply(&mut pitch)?;
        self.store(&pitch)?;
        Ok(pitch)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let id = Self::parse_id(id)?;
        if !self.db.delete_pitch(id)? {
            return Err(PitchCareError::NotFound(format!("pitch {}", id)));
        }
        tracing::info!(pitch_id = %id, "Pitch deleted");
        Ok(())
    }

    pub async fn analyze(&self, id: &str) -> Result<(Pitch, Evaluation)> {
        let pitch = self.get(id)?;
        self.evaluate_and_store(pitch).await
    }

    pub fn do_maintenance(&self, id: &str) -> Result<Pitch> {
        let mut pitch = self.get(id)?;
        self.engine.perform_maintenance(&mut pitch);
        self.store(&pitch)?;
        Ok(pitch)
    }

    pub fn change_turf(&self, id: &str) -> Result<Pitch> {
        let mut pitch = self.get(id)?;
        self.engine.replace_turf(&mut pitch);
        self.store(&pitch)?;
        Ok(pitch)
    }

    /// Evaluate every pitch the guards let through. A pitch whose weather
    /// cannot be fetched is counted and skipped; the rest still run.
    pub async fn sweep(&self) -> Result<SweepReport> {
        let mut report = SweepReport::default();

        for pitch in self.db.list_pitches(PitchFilter::All)? {
            let pitch_id = pitch.id;
            match self.evaluate_and_store(pitch).await {
                Ok((_, evaluation)) if evaluation.was_assessed() => report.assessed += 1,
                Ok(_) => report.skipped += 1,
                Err(e @ (PitchCareError::WeatherUnavailable(_) | PitchCareError::Conflict(_))) => {
                    tracing::warn!(pitch_id = %pitch_id, error = %e, "Pitch evaluation failed");
                    report.failed += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            assessed = report.assessed,
            skipped = report.skipped,
            failed = report.failed,
            "Sweep finished"
        );
        Ok(report)
    }

    async fn evaluate_and_store(&self, mut pitch: Pitch) -> Result<(Pitch, Evaluation)> {
        let read = pitch.clone();
        let evaluation = self.engine.evaluate(&mut pitch).await?;
        if evaluation.was_assessed() {
            self.store_if_unchanged(&pitch, &read)?;
        }
        Ok((pitch, evaluation))
    }

    fn store(&self, pitch: &Pitch) -> Result<()> {
        if !self.db.update_pitch(pitch)? {
            return Err(PitchCareError::NotFound(format!("pitch {}", pitch.id)));
        }
        Ok(())
    }

    fn store_if_unchanged(&self, pitch: &Pitch, read: &Pitch) -> Result<()> {
        if self.db.update_pitch_if_unchanged(pitch, read)? {
            return Ok(());
        }
        // Either the pitch vanished or someone else wrote it first
        match self.db.get_pitch(pitch.id)? {
            None => Err(PitchCareError::NotFound(format!("pitch {}", pitch.id))),
            Some(_) => Err(PitchCareError::Conflict(format!(
                "pitch {} changed while it was being evaluated",
                pitch.id
            ))),
        }
    }
}
