use std::fmt::Write;

use ansi_term::Colour;

use crate::{
    session::WeekDraft,
    storage::entities::{WeekRecord, WorkDay},
};

/// Outcome of an action the way user sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Success(String),
    Info(String),
    Warning(String),
    Error(String),
}

impl Message {
    pub fn render(&self, color: bool) -> String {
        let (colour, text) = match self {
            Message::Success(text) => (Colour::Green, text),
            Message::Info(text) => (Colour::Blue, text),
            Message::Warning(text) => (Colour::Yellow, text),
            Message::Error(text) => (Colour::Red, text),
        };
        if color {
            colour.paint(text.as_str()).to_string()
        } else {
            text.clone()
        }
    }
}

/// Draws a week together with the times that are currently entered for it. Days where entered
/// times differ from the saved ones are marked with `*`.
pub fn render_week(index: usize, week: &WeekRecord, draft: &WeekDraft) -> String {
    let mut output = String::new();
    // Writing into a String can't fail
    let _ = writeln!(output, "Week {}: {}", index + 1, week.week_name);
    for day in WorkDay::ALL {
        let entry = draft.entry(day);
        let marker = if week.times.get(&day) == Some(entry) {
            " "
        } else {
            "*"
        };
        let _ = writeln!(
            output,
            " {marker} {:<10} {} - {}",
            day.name(),
            entry.start_text(),
            entry.end_text()
        );
    }
    output
}
