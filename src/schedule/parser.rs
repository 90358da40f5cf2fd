//! Schedule file parser

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::error::{RconError, Result};

/// Number of leading schedule fields on each line
pub const SCHEDULE_FIELDS: usize = 6;

/// One parsed line of a schedule file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// 1-based line number in the source
    pub line_number: usize,

    /// The six schedule fields joined by single spaces
    pub schedule: String,

    /// Command to execute
    pub command: String,
}

/// Why a line produced no entry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("ignoring empty line")]
    Empty,

    #[error("ignoring commented line: {0}")]
    Comment(String),

    #[error("ignoring line with too few fields: {0}")]
    TooFewFields(String),
}

/// Split a line into `(schedule, command)`
pub fn parse_line(line: &str) -> std::result::Result<(String, String), SkipReason> {
    let line = line.trim();

    if line.is_empty() {
        return Err(SkipReason::Empty);
    }
    if line.starts_with('#') {
        return Err(SkipReason::Comment(line.to_string()));
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() <= SCHEDULE_FIELDS {
        return Err(SkipReason::TooFewFields(line.to_string()));
    }

    let schedule = fields[..SCHEDULE_FIELDS].join(" ");
    let command = fields[SCHEDULE_FIELDS..].join(" ");
    Ok((schedule, command))
}

/// Parse every line of a schedule, logging skipped lines
pub fn parse_schedule<R: BufRead>(reader: R) -> Result<Vec<ScheduleEntry>> {
    let mut entries = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| RconError::Config(format!("failed to read schedule: {}", e)))?;

        match parse_line(&line) {
            Ok((schedule, command)) => entries.push(ScheduleEntry {
                line_number: index + 1,
                schedule,
                command,
            }),
            Err(reason) => tracing::warn!("[CRON] line {}: {}", index + 1, reason),
        }
    }

    Ok(entries)
}

/// Open and parse a schedule file
pub fn load_schedule(path: &Path) -> Result<Vec<ScheduleEntry>> {
    let file = File::open(path).map_err(|e| {
        RconError::Config(format!("cannot open schedule file {}: {}", path.display(), e))
    })?;
    parse_schedule(BufReader::new(file))
}
