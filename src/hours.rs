//! Worked hours arithmetic. A shift that runs across the lunch window owes the lunch hour back,
//! anything else is counted as is.

use std::{fmt::Display, str::FromStr};

use chrono::{Duration, NaiveTime};
use thiserror::Error;

use crate::storage::entities::{DayEntry, WorkDay};

pub const LUNCH_START: NaiveTime = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
pub const LUNCH_END: NaiveTime = NaiveTime::from_hms_opt(13, 0, 0).unwrap();

const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HoursError {
    #[error("time data '{0}' does not match format 'HH:MM'")]
    Format(String),
    #[error("time is not set")]
    Unset,
}

/// Wall clock time without a date. Textually it's always "HH:MM".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn new_opt(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl FromStr for TimeOfDay {
    type Err = HoursError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
            .map(Self)
            .map_err(|_| HoursError::Format(s.to_string()))
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(TIME_FORMAT))
    }
}

fn as_hours(duration: Duration) -> f64 {
    duration.num_seconds() as f64 / 3600.
}

/// Hours worked between `start` and `end`. The lunch hour is only taken out when the shift starts
/// before noon and ends after it. Never negative.
pub fn compute_daily_hours(start: TimeOfDay, end: TimeOfDay) -> f64 {
    let (start, end) = (start.as_naive(), end.as_naive());
    let hours = if start < LUNCH_START && LUNCH_START < end {
        let before_lunch = as_hours(LUNCH_START - start);
        let after_lunch = f64::max(as_hours(end - LUNCH_END), 0.);
        before_lunch + after_lunch
    } else {
        as_hours(end - start)
    };
    f64::max(hours, 0.)
}

fn parse_time(text: Option<&str>) -> Result<TimeOfDay, HoursError> {
    text.ok_or(HoursError::Unset)?.parse()
}

impl DayEntry {
    pub fn hours(&self) -> Result<f64, HoursError> {
        let start = parse_time(self.start.as_deref())?;
        let end = parse_time(self.end.as_deref())?;
        Ok(compute_daily_hours(start, end))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekHours {
    pub days: Vec<(WorkDay, f64)>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayError {
    pub day: WorkDay,
    pub error: HoursError,
}

impl Display for DayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.day, self.error)
    }
}

/// Sums up hours for every entry. Every day is checked even after a failure so that all broken
/// days can be reported at once, but a single failure discards the total.
pub fn calculate_week_hours<'a>(
    entries: impl IntoIterator<Item = (WorkDay, &'a DayEntry)>,
) -> Result<WeekHours, Vec<DayError>> {
    let mut days = vec![];
    let mut errors = vec![];
    for (day, entry) in entries {
        match entry.hours() {
            Ok(hours) => days.push((day, hours)),
            Err(error) => errors.push(DayError { day, error }),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    let total = days.iter().map(|(_, hours)| hours).sum();
    Ok(WeekHours { days, total })
}

#[cfg(test)]
mod tests {
    use crate::{
        hours::{calculate_week_hours, compute_daily_hours, HoursError, TimeOfDay},
        storage::entities::{DayEntry, WorkDay},
    };

    fn time(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn hours(start: &str, end: &str) -> f64 {
        compute_daily_hours(time(start), time(end))
    }

    #[test]
    fn full_day_deducts_lunch() {
        assert_eq!(hours("09:00", "18:00"), 8.0);
    }

    #[test]
    fn morning_shift_has_no_deduction() {
        assert_eq!(hours("09:00", "11:00"), 2.0);
        assert_eq!(hours("09:00", "12:00"), 3.0);
    }

    #[test]
    fn afternoon_shift_has_no_deduction() {
        assert_eq!(hours("13:00", "17:30"), 4.5);
        assert_eq!(hours("12:00", "14:00"), 2.0);
    }

    #[test]
    fn ending_inside_lunch_counts_only_morning() {
        assert_eq!(hours("10:00", "12:30"), 2.0);
        assert_eq!(hours("10:00", "13:00"), 2.0);
    }

    #[test]
    fn reversed_shift_is_floored() {
        assert_eq!(hours("18:00", "09:00"), 0.0);
        assert_eq!(hours("10:00", "10:00"), 0.0);
    }

    #[test]
    fn minutes_are_fractions_of_hour() {
        assert_eq!(hours("08:45", "17:15"), 7.5);
    }

    #[test]
    fn parse_time_of_day() {
        assert_eq!(time("09:05"), TimeOfDay::new_opt(9, 5).unwrap());
        assert_eq!(time("9:05").to_string(), "09:05");
        assert_eq!(
            "9am".parse::<TimeOfDay>(),
            Err(HoursError::Format("9am".into()))
        );
        assert!("25:00".parse::<TimeOfDay>().is_err());
        assert!("".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn unset_side_is_an_error() {
        let mut entry = DayEntry::new("09:00", "18:00");
        entry.end = None;
        assert_eq!(entry.hours(), Err(HoursError::Unset));
    }

    #[test]
    fn week_total_sums_days() {
        let entry = DayEntry::new("09:00", "18:00");
        let result = calculate_week_hours(WorkDay::ALL.into_iter().map(|day| (day, &entry)));
        let result = result.unwrap();
        assert_eq!(result.total, 40.0);
        assert_eq!(result.days.len(), 5);
    }

    #[test]
    fn week_total_reports_every_broken_day() {
        let good = DayEntry::new("09:00", "18:00");
        let bad_start = DayEntry::new("nine", "18:00");
        let bad_end = DayEntry::new("09:00", "6pm");
        let entries = [
            (WorkDay::Monday, &good),
            (WorkDay::Tuesday, &bad_start),
            (WorkDay::Wednesday, &good),
            (WorkDay::Thursday, &bad_end),
        ];
        let errors = calculate_week_hours(entries).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].day, WorkDay::Tuesday);
        assert_eq!(errors[0].error, HoursError::Format("nine".into()));
        assert_eq!(errors[1].day, WorkDay::Thursday);
        assert_eq!(
            errors[1].to_string(),
            "Thursday: time data '6pm' does not match format 'HH:MM'"
        );
    }
}
