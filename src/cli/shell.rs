//! Interactive shell. Each line is a single action that runs to completion, after which the
//! affected weeks are drawn again from the updated session.

use std::ops::ControlFlow;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, warn};

use crate::{
    session::Session,
    storage::{entities::WorkDay, week_storage::WeekStorage},
};

use super::render::{render_week, Message};

const PROMPT: &str = "> ";

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
#[command(about = "Commands available in the shell. Weeks are referred to by their number")]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq)]
enum ShellCommand {
    #[command(about = "Add a new empty week. Quote names with spaces: add \"Week 1\"")]
    Add { name: String },
    #[command(about = "Enter start and end times (HH:MM) of a day")]
    Set {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        week: u64,
        day: WorkDay,
        start: String,
        end: String,
    },
    #[command(about = "Keep entered times as the times of the week")]
    Save {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        week: u64,
    },
    #[command(about = "Calculate total hours of the week, excluding lunch")]
    Calc {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        week: u64,
    },
    #[command(about = "Delete a week. Weeks after it move up by one")]
    Delete {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        week: u64,
    },
    #[command(about = "Write all weeks into the data file")]
    SaveAll,
    #[command(about = "Show one week or all of them")]
    Show {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        week: Option<u64>,
    },
    #[command(about = "Show all weeks")]
    List,
    #[command(about = "Leave the shell without saving", alias = "quit")]
    Exit,
}

fn to_index(week: u64) -> usize {
    (week - 1) as usize
}

pub struct Shell<S: WeekStorage> {
    session: Session<S>,
    color: bool,
}

impl<S: WeekStorage> Shell<S> {
    pub fn new(session: Session<S>, color: bool) -> Self {
        Self { session, color }
    }

    pub fn into_session(self) -> Session<S> {
        self.session
    }

    /// Reads commands until input ends or user exits.
    pub async fn run(
        &mut self,
        input: impl AsyncBufRead + Unpin,
        mut output: impl AsyncWrite + Unpin,
    ) -> Result<()> {
        output.write_all(self.render_all().as_bytes()).await?;
        let mut lines = input.lines();
        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let (text, flow) = self.execute_line(&line).await;
            output.write_all(text.as_bytes()).await?;
            if flow.is_break() {
                break;
            }
        }
        if self.session.has_unsaved_changes() {
            warn!("Leaving with unsaved changes");
        }
        output.flush().await?;
        Ok(())
    }

    /// Parses and runs a single line. Returned text is everything that should be shown after it.
    pub async fn execute_line(&mut self, line: &str) -> (String, ControlFlow<()>) {
        let words = match shell_words::split(line) {
            Ok(words) => words,
            Err(e) => {
                let message = Message::Error(format!("Can't read command: {e}"));
                return (self.line(message), ControlFlow::Continue(()));
            }
        };
        if words.is_empty() {
            return (String::new(), ControlFlow::Continue(()));
        }
        let command = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            // Covers help too
            Err(e) => return (e.render().to_string(), ControlFlow::Continue(())),
        };
        debug!("Executing {command:?}");
        self.execute(command).await
    }

    async fn execute(&mut self, command: ShellCommand) -> (String, ControlFlow<()>) {
        let text = match command {
            ShellCommand::Add { name } => match self.session.add_week(&name) {
                Ok(index) => self.render_index(index),
                Err(e) => self.line(Message::Warning(e.to_string())),
            },
            ShellCommand::Set {
                week,
                day,
                start,
                end,
            } => match self.session.set_day_times(to_index(week), day, start, end) {
                Ok(()) => self.render_index(to_index(week)),
                Err(e) => self.line(Message::Error(e.to_string())),
            },
            ShellCommand::Save { week } => match self.session.save_week(to_index(week)) {
                Ok(saved) => {
                    let message = Message::Success(format!("Saved data for {}!", saved.week_name));
                    self.line(message) + &self.render_index(to_index(week))
                }
                Err(e) => self.line(Message::Error(e.to_string())),
            },
            ShellCommand::Calc { week } => self.calculate(to_index(week)),
            ShellCommand::Delete { week } => match self.session.delete_week(to_index(week)) {
                Ok(removed) => {
                    let message = Message::Success(format!("Deleted week {}", removed.week_name));
                    self.line(message) + &self.render_all()
                }
                Err(e) => self.line(Message::Error(e.to_string())),
            },
            ShellCommand::SaveAll => match self.session.save_all().await {
                Ok(()) => self.line(Message::Success("All data saved successfully!".into())),
                Err(e) => {
                    error!("Failed to save weeks {e:?}");
                    self.line(Message::Error(format!("Failed to save data: {e}")))
                }
            },
            ShellCommand::Show { week: Some(week) } => self.render_index(to_index(week)),
            ShellCommand::Show { week: None } | ShellCommand::List => self.render_all(),
            ShellCommand::Exit => {
                let text = if self.session.has_unsaved_changes() {
                    self.line(Message::Warning(
                        "Leaving without saving. Use save-all to keep changes next time".into(),
                    ))
                } else {
                    String::new()
                };
                return (text, ControlFlow::Break(()));
            }
        };
        (text, ControlFlow::Continue(()))
    }

    fn calculate(&self, index: usize) -> String {
        let name = match self.session.weeks().week(index) {
            Ok(week) => &week.week_name,
            Err(e) => return self.line(Message::Error(e.to_string())),
        };
        match self.session.calculate_week_hours(index) {
            Ok(hours) => self.line(Message::Info(format!(
                "Total Hours for {name}: {:.2} hours (excluding lunch)",
                hours.total
            ))),
            Err(e) => self.line(Message::Error(e.to_string())),
        }
    }

    fn render_index(&self, index: usize) -> String {
        match (self.session.weeks().week(index), self.session.draft(index)) {
            (Ok(week), Ok(draft)) => render_week(index, week, draft),
            (Err(e), _) | (_, Err(e)) => self.line(Message::Error(e.to_string())),
        }
    }

    fn render_all(&self) -> String {
        let weeks = self.session.weeks();
        if weeks.is_empty() {
            return self.line(Message::Info("No weeks yet. Add one with: add <name>".into()));
        }
        let mut output = String::new();
        for (index, week) in weeks.iter().enumerate() {
            if let Ok(draft) = self.session.draft(index) {
                output += &render_week(index, week, draft);
            }
        }
        output
    }

    fn line(&self, message: Message) -> String {
        let mut text = message.render(self.color);
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests {
    use std::ops::ControlFlow;

    use clap::Parser;

    use crate::{
        cli::shell::{Shell, ShellCommand, ShellLine},
        session::{tests::MemoryStorage, Session},
        storage::entities::WorkDay,
    };

    fn parse(line: &str) -> Result<ShellCommand, clap::Error> {
        ShellLine::try_parse_from(shell_words::split(line).unwrap()).map(|v| v.command)
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse("add \"Week 1\"").unwrap(),
            ShellCommand::Add {
                name: "Week 1".into()
            }
        );
        assert_eq!(
            parse("set 2 tue 08:00 17:00").unwrap(),
            ShellCommand::Set {
                week: 2,
                day: WorkDay::Tuesday,
                start: "08:00".into(),
                end: "17:00".into()
            }
        );
        assert_eq!(parse("save-all").unwrap(), ShellCommand::SaveAll);
        assert_eq!(parse("quit").unwrap(), ShellCommand::Exit);
        assert!(parse("calc 0").is_err());
        assert!(parse("set 1 saturday 08:00 17:00").is_err());
    }

    #[tokio::test]
    async fn add_and_calculate() {
        let storage = MemoryStorage::default();
        let mut shell = Shell::new(Session::start(&storage).await, false);

        let (text, _) = shell.execute_line("add 'First week'").await;
        assert!(text.starts_with("Week 1: First week\n"));

        let _ = shell.execute_line("set 1 monday 09:00 12:00").await;
        let (text, _) = shell.execute_line("calc 1").await;
        assert_eq!(
            text,
            "Total Hours for First week: 35.00 hours (excluding lunch)\n"
        );
    }

    #[tokio::test]
    async fn blank_name_warns() {
        let storage = MemoryStorage::default();
        let mut shell = Shell::new(Session::start(&storage).await, false);

        let (text, flow) = shell.execute_line("add '  '").await;
        assert_eq!(text, "Please enter a valid week name!\n");
        assert_eq!(flow, ControlFlow::Continue(()));
        assert!(shell.into_session().weeks().is_empty());
    }

    #[tokio::test]
    async fn missing_week_is_reported() {
        let storage = MemoryStorage::default();
        let mut shell = Shell::new(Session::start(&storage).await, false);

        let (text, _) = shell.execute_line("delete 3").await;
        assert_eq!(text, "There is no week number 3\n");
        let (text, _) = shell.execute_line("calc 1").await;
        assert_eq!(text, "There is no week number 1\n");
    }

    #[tokio::test]
    async fn exit_warns_about_unsaved_changes() {
        let storage = MemoryStorage::default();
        let mut shell = Shell::new(Session::start(&storage).await, false);

        let (text, flow) = shell.execute_line("exit").await;
        assert_eq!(text, "");
        assert_eq!(flow, ControlFlow::Break(()));

        let _ = shell.execute_line("add week").await;
        let (text, flow) = shell.execute_line("exit").await;
        assert!(text.starts_with("Leaving without saving"));
        assert_eq!(flow, ControlFlow::Break(()));
    }

    #[tokio::test]
    async fn exit_warns_about_entered_times() {
        let storage = MemoryStorage::default();
        let mut shell = Shell::new(Session::start(&storage).await, false);
        let _ = shell.execute_line("add week").await;
        let _ = shell.execute_line("save-all").await;

        let _ = shell.execute_line("set 1 mon 08:00 12:00").await;
        let (text, flow) = shell.execute_line("exit").await;

        assert!(text.starts_with("Leaving without saving"));
        assert_eq!(flow, ControlFlow::Break(()));
    }

    #[tokio::test]
    async fn run_reads_until_exit() -> anyhow::Result<()> {
        let storage = MemoryStorage::default();
        let mut shell = Shell::new(Session::start(&storage).await, false);

        let input: &[u8] = b"add one\nsave-all\nexit\nadd never\n";
        let mut output = Vec::new();
        shell.run(input, &mut output).await?;

        let output = String::from_utf8(output)?;
        assert!(output.contains("All data saved successfully!"));
        assert_eq!(shell.into_session().weeks().len(), 1);
        assert_eq!(storage.stored.borrow().as_ref().map(|v| v.len()), Some(1));
        Ok(())
    }
}
