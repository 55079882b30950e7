//!  Storage is organized through [week_storage::JsonWeekStorage].
//!  The basic idea is:
//!   - All weeks live in memory as a [collection::WeekCollection] and every change happens there.
//!   - Nothing is written until the whole collection is saved, which replaces the file.
//!   - Loading never fails. Missing or corrupted files result in an empty collection.

pub mod collection;
pub mod entities;
pub mod week_storage;
