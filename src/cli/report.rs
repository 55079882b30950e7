use anyhow::Result;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{session::Session, storage::week_storage::WeekStorage};

/// Prints one line per week: number, name and total hours. Unset days count with their default
/// times, same as in the shell.
pub async fn print_report<S: WeekStorage>(
    session: &Session<S>,
    mut output: impl AsyncWrite + Unpin,
) -> Result<()> {
    let mut report = String::new();
    for (index, week) in session.weeks().iter().enumerate() {
        let total = match session.calculate_week_hours(index) {
            Ok(hours) => format!("{:.2}", hours.total),
            Err(e) => e.to_string(),
        };
        report += &format!("{}\t{}\t{}\n", index + 1, week.week_name, total);
    }
    output.write_all(report.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}
