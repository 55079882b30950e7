//! Everything a user can do during one run of the application. A [Session] is created at start
//! by loading stored weeks, mutated by each action and dropped at the end. Nothing reaches the
//! disk unless [Session::save_all] is called.

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::{
    hours::{calculate_week_hours, DayError, WeekHours},
    storage::{
        collection::{StoreError, WeekCollection},
        entities::{DayEntry, WeekRecord, WeekTimes, WorkDay},
        week_storage::WeekStorage,
    },
};

/// Shown for days that were never saved.
pub const DEFAULT_START: &str = "09:00";
pub const DEFAULT_END: &str = "18:00";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculationError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Error calculating hours: {}", join_errors(.0))]
    Days(Vec<DayError>),
}

fn join_errors(errors: &[DayError]) -> String {
    errors
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Times currently entered for a week. They only become part of the week after
/// [Session::save_week].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekDraft {
    times: WeekTimes,
}

impl WeekDraft {
    pub fn from_record(record: &WeekRecord) -> Self {
        let times = WorkDay::ALL
            .into_iter()
            .map(|day| {
                let mut entry = record
                    .times
                    .get(&day)
                    .cloned()
                    .unwrap_or_else(|| DayEntry::new(DEFAULT_START, DEFAULT_END));
                // Each side falls back on its own, a stored day may only have one of them
                entry.start.get_or_insert_with(|| DEFAULT_START.into());
                entry.end.get_or_insert_with(|| DEFAULT_END.into());
                (day, entry)
            })
            .collect();
        Self { times }
    }

    pub fn entry(&self, day: WorkDay) -> &DayEntry {
        &self.times[&day]
    }

    pub fn times(&self) -> &WeekTimes {
        &self.times
    }

    fn set(&mut self, day: WorkDay, start: String, end: String) {
        let entry = self
            .times
            .entry(day)
            .or_insert_with(|| DayEntry::new(DEFAULT_START, DEFAULT_END));
        entry.start = Some(start);
        entry.end = Some(end);
    }
}

pub struct Session<S: WeekStorage> {
    storage: S,
    weeks: WeekCollection,
    /// Always the same length as `weeks`.
    drafts: Vec<WeekDraft>,
    saved: WeekCollection,
}

impl<S: WeekStorage> Session<S> {
    pub async fn start(storage: S) -> Self {
        let weeks = storage.load_all().await;
        let drafts = weeks.iter().map(WeekDraft::from_record).collect();
        Self {
            storage,
            saved: weeks.clone(),
            weeks,
            drafts,
        }
    }

    pub fn weeks(&self) -> &WeekCollection {
        &self.weeks
    }

    pub fn draft(&self, index: usize) -> Result<&WeekDraft, StoreError> {
        self.drafts.get(index).ok_or(StoreError::NoSuchWeek(index))
    }

    /// True when there are changes [Session::save_all] hasn't written yet, including times that
    /// were entered but not saved into their week.
    pub fn has_unsaved_changes(&self) -> bool {
        self.weeks != self.saved
            || self
                .weeks
                .iter()
                .zip(&self.drafts)
                .any(|(week, draft)| *draft != WeekDraft::from_record(week))
    }

    pub fn add_week(&mut self, name: &str) -> Result<usize, StoreError> {
        let index = self.weeks.add_week(name)?;
        self.drafts.push(WeekDraft::from_record(&self.weeks[index]));
        Ok(index)
    }

    pub fn set_day_times(
        &mut self,
        index: usize,
        day: WorkDay,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Result<(), StoreError> {
        let draft = self
            .drafts
            .get_mut(index)
            .ok_or(StoreError::NoSuchWeek(index))?;
        draft.set(day, start.into(), end.into());
        Ok(())
    }

    /// Replaces stored times of the week with what was entered.
    pub fn save_week(&mut self, index: usize) -> Result<&WeekRecord, StoreError> {
        let times = self.draft(index)?.times.clone();
        self.weeks.update_week_times(index, times)?;
        debug!("Saved times for week {index}");
        self.weeks.week(index)
    }

    /// Total for the entered times. A single broken day means there is no total.
    pub fn calculate_week_hours(&self, index: usize) -> Result<WeekHours, CalculationError> {
        let draft = self.draft(index)?;
        calculate_week_hours(draft.times.iter().map(|(day, entry)| (*day, entry)))
            .map_err(CalculationError::Days)
    }

    pub fn delete_week(&mut self, index: usize) -> Result<WeekRecord, StoreError> {
        let removed = self.weeks.remove_week(index)?;
        self.drafts.remove(index);
        Ok(removed)
    }

    #[instrument(skip(self))]
    pub async fn save_all(&mut self) -> Result<()> {
        self.storage.save_all(&self.weeks).await?;
        self.saved = self.weeks.clone();
        info!("Session saved");
        Ok(())
    }
}
