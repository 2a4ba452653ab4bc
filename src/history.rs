use crate::config::project_dirs;
use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::terminal as term;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Cancelled sessions shorter than this are not written to history.
pub const MIN_CANCELLED_SECS: f64 = 1.0;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionRecord {
    /// ISO 8601 UTC timestamp for when the session ended
    pub timestamp: String,
    /// false when the user stopped the countdown early
    pub completed: bool,
    pub preset: String,
    pub duration_secs: u64,
    pub elapsed_secs: f64,
    pub typed_chars: usize,
    pub correct_chars: usize,
    pub prompt: String,
}

/// Outcome of one practice session, before it is stamped and stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub completed: bool,
    pub preset: String,
    pub duration_secs: u64,
    pub elapsed_secs: f64,
    pub typed_chars: usize,
    pub correct_chars: usize,
    pub prompt: String,
}

impl SessionSummary {
    pub fn accuracy(&self) -> Option<f64> {
        if self.typed_chars == 0 {
            return None;
        }
        Some(self.correct_chars as f64 / self.typed_chars as f64 * 100.0)
    }

    pub fn into_record(self) -> SessionRecord {
        SessionRecord {
            timestamp: Utc::now().to_rfc3339(),
            completed: self.completed,
            preset: self.preset,
            duration_secs: self.duration_secs,
            elapsed_secs: self.elapsed_secs,
            typed_chars: self.typed_chars,
            correct_chars: self.correct_chars,
            prompt: self.prompt,
        }
    }
}

pub fn history_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_local_dir().join("history.json"))
}

pub fn load_history_from(path: &Path) -> Result<Vec<SessionRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read history file {}", path.display()))?;
    let records: Vec<SessionRecord> = serde_json::from_str(&raw)?;
    Ok(records)
}

fn save_history_to(path: &Path, records: &[SessionRecord]) -> Result<()> {
    // create the data directory if it doesn't exist yet
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;
    Ok(())
}

/// Appends `record` to the history file at `path`. An unreadable history is
/// moved aside to `history.json.bak` before a fresh file is started.
pub fn append_record(path: &Path, record: SessionRecord) -> Result<()> {
    let mut records = match load_history_from(path) {
        Ok(records) => records,
        Err(err) => {
            let backup = path.with_extension("json.bak");
            warn!(
                ?err,
                path = %path.display(),
                backup = %backup.display(),
                "history file unreadable; moving it aside"
            );
            fs::rename(path, &backup).with_context(|| {
                format!("could not move unreadable history to {}", backup.display())
            })?;
            Vec::new()
        }
    };
    records.push(record);
    save_history_to(path, &records)
}

/// A session is kept unless it was cancelled straight away.
pub fn worth_recording(summary: &SessionSummary) -> bool {
    summary.completed || summary.elapsed_secs >= MIN_CANCELLED_SECS
}

/// Appends `summary` to the history at `path`; returns whether it was stored.
pub fn record_session(path: &Path, summary: SessionSummary) -> Result<bool> {
    if !worth_recording(&summary) {
        debug!(elapsed_secs = summary.elapsed_secs, "session too short to record");
        return Ok(false);
    }

    append_record(path, summary.into_record())?;
    Ok(true)
}

pub fn show_history() -> Result<()> {
    let records = match history_path() {
        Some(path) => load_history_from(&path)?,
        None => Vec::new(),
    };

    if records.is_empty() {
        println!("\n  No history yet. Finish a practice session to start tracking your progress.\n");
        return Ok(());
    }

    let term_width = term::size()
        .map(|(w, _)| w as usize)
        .unwrap_or(80)
        .max(40);

    const W_NUM:  usize = 5;
    const W_DATE: usize = 12;
    const W_MODE: usize = 12;
    const W_TIME: usize = 10;
    const W_CHAR: usize = 8;
    const W_ACC:  usize = 9;
    const W_DONE: usize = 5;

    let base_width = 1 + W_NUM + W_DATE + W_CHAR + W_ACC + W_DONE;
    let show_mode = term_width >= base_width + W_MODE;
    let show_time = term_width >= base_width + W_MODE + W_TIME;

    let total_width = base_width
        + if show_mode { W_MODE } else { 0 }
        + if show_time { W_TIME } else { 0 };
    let divider = "-".repeat(total_width);

    let completed = records.iter().filter(|r| r.completed).count();
    let typed: usize = records.iter().map(|r| r.typed_chars).sum();
    let correct: usize = records.iter().map(|r| r.correct_chars).sum();

    println!();
    if typed > 0 {
        println!(
            "  {} sessions  |  {} completed  |  {} chars typed  |  acc {:.2}%",
            records.len(),
            completed,
            typed,
            correct as f64 / typed as f64 * 100.0
        );
    } else {
        println!("  {} sessions  |  {} completed", records.len(), completed);
    }
    println!();

    print!(" {:<nw$}{:<dw$}", "#", "date", nw = W_NUM, dw = W_DATE);
    if show_mode { print!("{:<mw$}", "preset", mw = W_MODE); }
    if show_time { print!("{:<tw$}", "time", tw = W_TIME); }
    print!("{:<cw$}", "chars", cw = W_CHAR);
    print!("{:<aw$}", "acc", aw = W_ACC);
    println!("done");
    println!(" {}", divider);

    for (i, r) in records.iter().rev().enumerate() {
        let date = r.timestamp.get(..10).unwrap_or(&r.timestamp).to_string();
        let time = format!("{:.0}/{}s", r.elapsed_secs, r.duration_secs);
        let acc = if r.typed_chars > 0 {
            format!("{:.2}%", r.correct_chars as f64 / r.typed_chars as f64 * 100.0)
        } else {
            "-".to_string()
        };
        let done = if r.completed { "Y" } else { "N" };

        print!(" {:<nw$}{:<dw$}", i + 1, date, nw = W_NUM, dw = W_DATE);
        if show_mode { print!("{:<mw$}", r.preset, mw = W_MODE); }
        if show_time { print!("{:<tw$}", time, tw = W_TIME); }
        print!("{:<cw$}", r.typed_chars, cw = W_CHAR);
        print!("{:<aw$}", acc, aw = W_ACC);
        println!("{}", done);
    }

    println!(" {}", divider);
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(completed: bool, typed: usize, correct: usize) -> SessionSummary {
        SessionSummary {
            completed,
            preset: "1分".to_string(),
            duration_secs: 60,
            elapsed_secs: 60.0,
            typed_chars: typed,
            correct_chars: correct,
            prompt: "吾輩は猫である。".to_string(),
        }
    }

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("atw-history-{}", std::process::id()));
        let path = dir.join(name);
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn accuracy_needs_typed_chars() {
        assert_eq!(summary(true, 0, 0).accuracy(), None);
        assert_eq!(summary(true, 4, 3).accuracy(), Some(75.0));
    }

    #[test]
    fn missing_history_is_empty() {
        let path = scratch("missing.json");
        assert!(load_history_from(&path).unwrap().is_empty());
    }

    #[test]
    fn appends_in_order() {
        let path = scratch("append.json");
        append_record(&path, summary(true, 10, 9).into_record()).unwrap();
        append_record(&path, summary(false, 3, 1).into_record()).unwrap();

        let records = load_history_from(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].completed);
        assert_eq!(records[1].typed_chars, 3);
        assert!(!records[1].completed);
    }

    #[test]
    fn corrupt_history_is_moved_aside_on_append() {
        let path = scratch("corrupt.json");
        let backup = path.with_extension("json.bak");
        let _ = fs::remove_file(&backup);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();
        assert!(load_history_from(&path).is_err());

        append_record(&path, summary(true, 1, 1).into_record()).unwrap();
        assert_eq!(load_history_from(&path).unwrap().len(), 1);
        assert_eq!(fs::read_to_string(&backup).unwrap(), "not json");
    }

    #[test]
    fn short_cancelled_sessions_are_skipped() {
        let mut s = summary(false, 0, 0);
        s.elapsed_secs = 0.99;
        assert!(!worth_recording(&s));
        s.elapsed_secs = MIN_CANCELLED_SECS;
        assert!(worth_recording(&s));

        let mut done = summary(true, 0, 0);
        done.elapsed_secs = 0.0;
        assert!(worth_recording(&done));
    }

    #[test]
    fn record_session_honours_threshold() {
        let path = scratch("threshold.json");
        let mut quick = summary(false, 2, 2);
        quick.elapsed_secs = 0.5;
        assert!(!record_session(&path, quick).unwrap());
        assert!(!path.exists());

        let mut longer = summary(false, 2, 2);
        longer.elapsed_secs = 1.5;
        assert!(record_session(&path, longer).unwrap());
        assert_eq!(load_history_from(&path).unwrap().len(), 1);
    }

    #[test]
    fn record_timestamp_is_rfc3339() {
        let record = summary(true, 1, 1).into_record();
        assert!(chrono::DateTime::parse_from_rfc3339(&record.timestamp).is_ok());
    }
}
