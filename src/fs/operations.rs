use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::{self, File},
    io::{self, AsyncReadExt, AsyncWriteExt},
};

/// Reads the whole file while holding a shared lock on it. Contents aren't checked in any way,
/// not even for being valid UTF-8.
pub async fn read_locked(path: &Path) -> Result<Vec<u8>, io::Error> {
    let mut file = File::open(path).await?;
    file.lock_shared()?;
    let mut contents = Vec::new();
    let result = file.read_to_end(&mut contents).await;
    file.unlock_async().await?;
    result.map(|_| contents)
}

/// Replaces file contents. Data is written into a sibling file first and then renamed over the
/// target, so a failed write never leaves a half written file behind.
pub async fn replace_file(path: &Path, contents: &[u8]) -> Result<(), io::Error> {
    let temporary = sibling_path(path, "tmp");
    {
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temporary)
            .await?;
        file.lock_exclusive()?;
        let result = write_and_sync(&mut file, contents).await;
        file.unlock_async().await?;
        result?;
    }
    fs::rename(&temporary, path).await
}

async fn write_and_sync(file: &mut File, contents: &[u8]) -> Result<(), io::Error> {
    file.write_all(contents).await?;
    file.flush().await?;
    file.sync_all().await
}

/// Moves a file out of the way instead of deleting it. Returns the new location.
pub async fn move_aside(path: &Path, moment: DateTime<Utc>) -> Result<PathBuf, io::Error> {
    let suffix = format!("corrupt-{}", moment.format("%Y%m%dT%H%M%SZ"));
    let destination = sibling_path(path, &suffix);
    fs::rename(path, &destination).await?;
    Ok(destination)
}

/// `defaults.json` -> `defaults.json.<suffix>`
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}
