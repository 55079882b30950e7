use std::fs;

use anyhow::Result;
use attendance_tracker::{
    cli::shell::Shell,
    session::Session,
    storage::{
        entities::{DayEntry, WorkDay},
        week_storage::{JsonWeekStorage, DEFAULT_FILE_NAME},
    },
};
use tempfile::tempdir;

async fn run_script(storage: JsonWeekStorage, script: &str) -> Result<String> {
    let mut shell = Shell::new(Session::start(storage).await, false);
    let mut output = Vec::new();
    shell.run(script.as_bytes(), &mut output).await?;
    Ok(String::from_utf8(output)?)
}

#[tokio::test]
async fn weeks_survive_between_sessions() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join(DEFAULT_FILE_NAME);

    let output = run_script(
        JsonWeekStorage::new(path.clone()),
        "add \"Week 1\"\n\
         set 1 monday 08:00 17:00\n\
         set 1 fri 09:00 12:00\n\
         save 1\n\
         calc 1\n\
         save-all\n",
    )
    .await?;
    assert!(output.contains("Saved data for Week 1!"));
    assert!(output.contains("Total Hours for Week 1: 35.00 hours (excluding lunch)"));

    let session = Session::start(JsonWeekStorage::new(path)).await;
    let week = &session.weeks()[0];
    assert_eq!(week.week_name, "Week 1");
    assert_eq!(week.times[&WorkDay::Monday], DayEntry::new("08:00", "17:00"));
    assert_eq!(week.times[&WorkDay::Friday], DayEntry::new("09:00", "12:00"));
    assert_eq!(session.calculate_week_hours(0)?.total, 35.0);
    Ok(())
}

#[tokio::test]
async fn nothing_is_written_without_save_all() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join(DEFAULT_FILE_NAME);

    let output = run_script(JsonWeekStorage::new(path.clone()), "add lost\nsave 1\nexit\n").await?;

    assert!(output.contains("Leaving without saving"));
    assert!(!path.exists());
    Ok(())
}

#[tokio::test]
async fn unsaved_times_are_not_stored() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join(DEFAULT_FILE_NAME);

    run_script(
        JsonWeekStorage::new(path.clone()),
        "add week\nset 1 tuesday 10:00 11:00\nsave-all\n",
    )
    .await?;

    assert_eq!(
        fs::read_to_string(&path)?,
        r#"[{"week_name":"week","times":{}}]"#
    );
    Ok(())
}

#[tokio::test]
async fn repeated_delete_hits_the_next_week() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join(DEFAULT_FILE_NAME);

    run_script(
        JsonWeekStorage::new(path.clone()),
        "add a\nadd b\nadd c\ndelete 2\ndelete 2\nsave-all\n",
    )
    .await?;

    let session = Session::start(JsonWeekStorage::new(path)).await;
    let names = session
        .weeks()
        .iter()
        .map(|v| v.week_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, ["a"]);
    Ok(())
}

#[tokio::test]
async fn corrupted_file_starts_empty() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join(DEFAULT_FILE_NAME);
    fs::write(&path, "not json at all")?;

    let output = run_script(JsonWeekStorage::new(path.clone()), "list\n").await?;

    assert!(output.contains("No weeks yet"));
    let moved_aside = fs::read_dir(dir.path())?
        .filter_map(|v| v.ok())
        .filter(|v| v.file_name().to_string_lossy().contains(".corrupt-"))
        .count();
    assert_eq!(moved_aside, 1);
    Ok(())
}
