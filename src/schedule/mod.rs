//! Schedule Module
//!
//! Runs commands on a cron schedule.
//!
//! ## File Format
//! ```text
//! # sec min hour day month weekday  command...
//! 0     */5 *    *   *     *        say Server restarts at midnight
//! ```
//!
//! Six schedule fields, then the command. Blank lines, comments and lines
//! with fewer than seven fields are skipped with a warning.

mod parser;
mod runner;

pub use parser::{load_schedule, parse_line, parse_schedule, ScheduleEntry, SkipReason, SCHEDULE_FIELDS};
pub use runner::{compile, run_job, ScheduledJob, Scheduler};
