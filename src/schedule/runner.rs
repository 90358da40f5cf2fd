//! Scheduler runner
//!
//! A background thread that fires due jobs through a shared session.

use std::str::FromStr;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Local};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use cron::Schedule;

use crate::error::{RconError, Result};
use crate::network::{Connection, SharedSession};
use super::ScheduleEntry;

/// A schedule entry with its compiled expression
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    entry: ScheduleEntry,
    schedule: Schedule,
}

impl ScheduledJob {
    /// Compile an entry's schedule expression
    ///
    /// Weekdays are written 0-6 with Sunday = 0 (7 is also Sunday); they
    /// are renumbered to the evaluator's 1-7, Sunday = 1, before parsing.
    pub fn new(entry: ScheduleEntry) -> Result<Self> {
        let expression = renumber_weekdays(&entry.schedule);
        let schedule = Schedule::from_str(&expression).map_err(|e| {
            RconError::Config(format!(
                "invalid schedule '{}' on line {}: {}",
                entry.schedule, entry.line_number, e
            ))
        })?;
        Ok(Self { entry, schedule })
    }

    pub fn entry(&self) -> &ScheduleEntry {
        &self.entry
    }

    /// First fire time strictly after `after`
    pub fn next_after(&self, after: &DateTime<Local>) -> Option<DateTime<Local>> {
        self.schedule.after(after).next()
    }

    /// Next fire time after a run that was due at `fired_at` and finished
    /// at `finished_at`
    ///
    /// Occurrences that passed while the command ran are skipped rather
    /// than fired back to back.
    pub fn next_run(
        &self,
        fired_at: DateTime<Local>,
        finished_at: DateTime<Local>,
    ) -> Option<DateTime<Local>> {
        self.next_after(&fired_at.max(finished_at))
    }
}

/// Rewrite the weekday field (the sixth) from 0-6, Sunday = 0, to 1-7,
/// Sunday = 1
///
/// Names (`MON`), `*` and `?` pass through. Steps are left alone. A range
/// ending at 7 (Sunday) is split so it does not wrap.
fn renumber_weekdays(expression: &str) -> String {
    let mut fields: Vec<String> = expression.split_whitespace().map(str::to_string).collect();
    if let Some(weekdays) = fields.get_mut(5) {
        *weekdays = weekdays
            .split(',')
            .map(renumber_weekday_item)
            .collect::<Vec<_>>()
            .join(",");
    }
    fields.join(" ")
}

fn renumber_weekday_item(item: &str) -> String {
    let (range, step) = match item.split_once('/') {
        Some((range, step)) => (range, Some(step)),
        None => (item, None),
    };

    let renumbered = match range.split_once('-') {
        Some((start, "7")) if step.is_none() => match start.parse::<u8>() {
            Ok(7) => "1".to_string(),
            Ok(n @ 0..=6) => format!("{}-7,1", n + 1),
            _ => format!("{}-7,1", start),
        },
        Some((start, end)) => format!("{}-{}", renumber_day(start), renumber_day(end)),
        None => renumber_day(range),
    };

    match step {
        Some(step) => format!("{}/{}", renumbered, step),
        None => renumbered,
    }
}

fn renumber_day(day: &str) -> String {
    match day.parse::<u8>() {
        Ok(7) => "1".to_string(),
        Ok(n @ 0..=6) => (n + 1).to_string(),
        // Names and out-of-range values are left for the parser to judge
        _ => day.to_string(),
    }
}

/// Compile entries, logging and dropping those with invalid expressions
pub fn compile(entries: Vec<ScheduleEntry>) -> Vec<ScheduledJob> {
    entries
        .into_iter()
        .filter_map(|entry| match ScheduledJob::new(entry) {
            Ok(job) => {
                tracing::info!("[CRON] Added: [{}] {}", job.entry.schedule, job.entry.command);
                Some(job)
            }
            Err(e) => {
                tracing::warn!("[CRON] {}", e);
                None
            }
        })
        .collect()
}

/// Execute one scheduled command and log the outcome
pub fn run_job<C: Connection>(session: &SharedSession<C>, entry: &ScheduleEntry) -> Result<String> {
    let mut guard = session.lock();
    tracing::info!("[CRON] [{}] {}", entry.schedule, entry.command);

    let result = guard.execute(&entry.command);
    match &result {
        Err(e) => tracing::info!("[CRON] Error sending command: {}", e),
        Ok(output) if output.trim().is_empty() => tracing::info!("[CRON] Server response empty"),
        Ok(output) => tracing::info!("[CRON] Server response: {}", output),
    }
    result
}

/// Handle to the background scheduler thread
///
/// Dropping it stops the thread.
pub struct Scheduler {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn the scheduler thread
    pub fn start<C>(session: SharedSession<C>, jobs: Vec<ScheduledJob>) -> Result<Self>
    where
        C: Connection + Send + 'static,
    {
        let (stop_tx, stop_rx) = channel::bounded(1);

        let handle = thread::Builder::new()
            .name("rcon-scheduler".to_string())
            .spawn(move || run_loop(session, jobs, stop_rx))?;

        Ok(Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Signal the thread and wait for it to exit
    ///
    /// A command already in flight finishes first.
    pub fn stop(mut self) {
        self.shutdown();
    }

    /// Block until the scheduler thread exits
    pub fn wait(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Sleep until the earliest due job, fire every job due by then, repeat
fn run_loop<C: Connection>(session: SharedSession<C>, jobs: Vec<ScheduledJob>, stop: Receiver<()>) {
    let now = Local::now();
    let mut next_runs: Vec<Option<DateTime<Local>>> =
        jobs.iter().map(|job| job.next_after(&now)).collect();

    loop {
        let Some(due) = next_runs.iter().flatten().min().copied() else {
            // Nothing will ever fire
            let _ = stop.recv();
            return;
        };

        let wait = (due - Local::now()).to_std().unwrap_or(Duration::ZERO);
        match stop.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }

        for (job, next_run) in jobs.iter().zip(next_runs.iter_mut()) {
            if let Some(at) = *next_run {
                if at <= due {
                    let _ = run_job(&session, &job.entry);
                    *next_run = job.next_run(at, Local::now());
                }
            }
        }
    }
}
