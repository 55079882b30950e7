use std::{
    collections::BTreeMap,
    fmt::Display,
    ops::{Deref, DerefMut},
    str::FromStr,
};

use anyhow::anyhow;
use serde::{ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::warn;

/// Working days a week record keeps times for. Serialized with the full English name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl WorkDay {
    pub const ALL: [WorkDay; 5] = [
        WorkDay::Monday,
        WorkDay::Tuesday,
        WorkDay::Wednesday,
        WorkDay::Thursday,
        WorkDay::Friday,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WorkDay::Monday => "Monday",
            WorkDay::Tuesday => "Tuesday",
            WorkDay::Wednesday => "Wednesday",
            WorkDay::Thursday => "Thursday",
            WorkDay::Friday => "Friday",
        }
    }
}

impl From<WorkDay> for chrono::Weekday {
    fn from(value: WorkDay) -> Self {
        match value {
            WorkDay::Monday => chrono::Weekday::Mon,
            WorkDay::Tuesday => chrono::Weekday::Tue,
            WorkDay::Wednesday => chrono::Weekday::Wed,
            WorkDay::Thursday => chrono::Weekday::Thu,
            WorkDay::Friday => chrono::Weekday::Fri,
        }
    }
}

impl Display for WorkDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for WorkDay {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // chrono already knows both full names and abbreviations
        let weekday = s
            .parse::<chrono::Weekday>()
            .map_err(|_| anyhow!("Unknown day {s}"))?;
        WorkDay::ALL
            .into_iter()
            .find(|day| chrono::Weekday::from(*day) == weekday)
            .ok_or_else(|| anyhow!("{s} is not a working day"))
    }
}

/// Start and end of a single day, kept as the text that was entered. Parsing happens only when
/// hours are calculated. Either side may be missing in stored data, which means it's unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Fields we don't know about are carried over so that saving doesn't lose them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DayEntry {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
            extra: Default::default(),
        }
    }

    pub fn start_text(&self) -> &str {
        self.start.as_deref().unwrap_or_default()
    }

    pub fn end_text(&self) -> &str {
        self.end.as_deref().unwrap_or_default()
    }
}

/// Times of a week by day. Keys that aren't working days, or days whose value isn't an object,
/// are kept aside untouched and written back after the days.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekTimes {
    days: BTreeMap<WorkDay, DayEntry>,
    unknown: Map<String, Value>,
}

impl WeekTimes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unknown(&self) -> &Map<String, Value> {
        &self.unknown
    }

    /// Takes days from `other` while keeping keys this one didn't understand.
    pub fn replace_days(&mut self, other: WeekTimes) {
        self.days = other.days;
        let days = &self.days;
        self.unknown
            .retain(|key, _| !days.keys().any(|day| day.name() == key.as_str()));
        for (key, value) in other.unknown {
            self.unknown.entry(key).or_insert(value);
        }
    }
}

impl Deref for WeekTimes {
    type Target = BTreeMap<WorkDay, DayEntry>;

    fn deref(&self) -> &Self::Target {
        &self.days
    }
}

impl DerefMut for WeekTimes {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.days
    }
}

impl FromIterator<(WorkDay, DayEntry)> for WeekTimes {
    fn from_iter<T: IntoIterator<Item = (WorkDay, DayEntry)>>(iter: T) -> Self {
        Self {
            days: iter.into_iter().collect(),
            unknown: Map::new(),
        }
    }
}

impl Serialize for WeekTimes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len() + self.unknown.len()))?;
        for (day, entry) in &self.days {
            map.serialize_entry(day.name(), entry)?;
        }
        for (key, value) in &self.unknown {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for WeekTimes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let mut times = WeekTimes::new();
        for (key, value) in raw {
            let day = serde_json::from_value::<WorkDay>(Value::String(key.clone()));
            let entry = serde_json::from_value::<DayEntry>(value.clone());
            match (day, entry) {
                (Ok(day), Ok(entry)) => {
                    times.days.insert(day, entry);
                }
                (day, _) => {
                    if day.is_ok() {
                        warn!("Times for {key} aren't readable, keeping them as is");
                    }
                    times.unknown.insert(key, value);
                }
            }
        }
        Ok(times)
    }
}

/// One named week. Names aren't unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRecord {
    pub week_name: String,
    #[serde(default)]
    pub times: WeekTimes,
}

impl WeekRecord {
    pub fn new(week_name: impl Into<String>) -> Self {
        Self {
            week_name: week_name.into(),
            times: WeekTimes::new(),
        }
    }
}
