use std::ops::Deref;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::entities::{WeekRecord, WeekTimes};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Please enter a valid week name!")]
    BlankName,
    #[error("There is no week number {}", .0 + 1)]
    NoSuchWeek(usize),
}

/// Ordered list of weeks. Position in the list is both the display order and the index used by
/// every mutation, so indices aren't stable across [WeekCollection::remove_week].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekCollection {
    weeks: Vec<WeekRecord>,
}

impl WeekCollection {
    pub fn new(weeks: Vec<WeekRecord>) -> Self {
        Self { weeks }
    }

    /// Appends an empty week and returns its index.
    pub fn add_week(&mut self, name: &str) -> Result<usize, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::BlankName);
        }
        self.weeks.push(WeekRecord::new(name));
        debug!("Added week {name:?}");
        Ok(self.weeks.len() - 1)
    }

    pub fn update_week_times(&mut self, index: usize, times: WeekTimes) -> Result<(), StoreError> {
        let week = self
            .weeks
            .get_mut(index)
            .ok_or(StoreError::NoSuchWeek(index))?;
        week.times.replace_days(times);
        Ok(())
    }

    pub fn remove_week(&mut self, index: usize) -> Result<WeekRecord, StoreError> {
        if index >= self.weeks.len() {
            return Err(StoreError::NoSuchWeek(index));
        }
        Ok(self.weeks.remove(index))
    }

    pub fn week(&self, index: usize) -> Result<&WeekRecord, StoreError> {
        self.weeks.get(index).ok_or(StoreError::NoSuchWeek(index))
    }
}

impl Deref for WeekCollection {
    type Target = [WeekRecord];

    fn deref(&self) -> &Self::Target {
        &self.weeks
    }
}
