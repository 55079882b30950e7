//! Small tool for keeping track of working hours during a week. Start and end of every working
//! day are entered per week, total hours are calculated with the lunch hour taken out, and all
//! weeks are kept in a single json file between runs.
//!

pub mod cli;
pub mod fs;
pub mod hours;
pub mod session;
pub mod storage;
pub mod utils;
