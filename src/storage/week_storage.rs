use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::Result;
use tracing::{debug, info, instrument, warn};

use crate::{
    fs::operations::{move_aside, read_locked, replace_file},
    utils::clock::{Clock, DefaultClock},
};

use super::collection::WeekCollection;

pub const DEFAULT_FILE_NAME: &str = "defaults.json";

/// Interface for abstracting storage of weeks.
pub trait WeekStorage {
    /// Best-effort load. Whatever goes wrong the caller receives a usable collection, at worst an
    /// empty one.
    fn load_all(&self) -> impl Future<Output = WeekCollection>;

    /// Overwrites everything that was stored before with `collection`.
    fn save_all(&self, collection: &WeekCollection) -> impl Future<Output = Result<()>>;
}

impl<T: Deref> WeekStorage for T
where
    T::Target: WeekStorage,
{
    fn load_all(&self) -> impl Future<Output = WeekCollection> {
        self.deref().load_all()
    }

    fn save_all(&self, collection: &WeekCollection) -> impl Future<Output = Result<()>> {
        self.deref().save_all(collection)
    }
}

/// Keeps the whole collection as a single json array in one file.
pub struct JsonWeekStorage {
    path: PathBuf,
    clock: Box<dyn Clock>,
}

impl JsonWeekStorage {
    pub fn new(path: PathBuf) -> Self {
        Self::with_clock(path, Box::new(DefaultClock))
    }

    pub fn with_clock(path: PathBuf, clock: Box<dyn Clock>) -> Self {
        Self { path, clock }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Corrupt data is lost for the session, but the file is kept under a new name in the same
    /// directory so that it can be recovered by hand.
    async fn recover_from_corruption(&self, error: serde_json::Error) {
        warn!("Stored weeks in {:?} are corrupted, starting empty: {error}", self.path);
        match move_aside(&self.path, self.clock.time()).await {
            Ok(moved) => warn!("Corrupted weeks were moved to {moved:?}"),
            Err(e) => warn!("Failed to move corrupted weeks aside {e}"),
        }
    }
}

impl WeekStorage for JsonWeekStorage {
    #[instrument(skip(self), fields(path = ?self.path))]
    async fn load_all(&self) -> WeekCollection {
        let contents = match read_locked(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No stored weeks yet");
                return WeekCollection::default();
            }
            Err(e) => {
                warn!("Failed to read stored weeks, starting empty: {e}");
                return WeekCollection::default();
            }
        };

        match serde_json::from_slice::<WeekCollection>(&contents) {
            Ok(collection) => {
                info!("Loaded {} weeks", collection.len());
                collection
            }
            Err(e) => {
                self.recover_from_corruption(e).await;
                WeekCollection::default()
            }
        }
    }

    #[instrument(skip_all, fields(path = ?self.path))]
    async fn save_all(&self, collection: &WeekCollection) -> Result<()> {
        let contents = serde_json::to_vec(collection)?;
        replace_file(&self.path, &contents).await?;
        info!("Saved {} weeks", collection.len());
        Ok(())
    }
}
