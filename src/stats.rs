//! Runtime counters persisted across restarts, plus the append-only
//! message journal. All file I/O here is advisory: callers log failures
//! and keep the display running.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Counters for queue usage, overwritten wholesale on each save.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub api_call_count: u64,
    #[serde(default)]
    pub messages_picked_count: u64,
}

impl Stats {
    /// Load persisted counters. A missing file yields zeroed counters;
    /// unreadable or malformed contents are an error the caller may ignore.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|err| crate::Error::Parse(err.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents =
            serde_json::to_string(self).map_err(|err| crate::Error::Parse(err.to_string()))?;
        fs::write(path, contents)?;
        Ok(())
    }
}

/// Append one line to the message journal: `YYYY-MM-DD HH:MM:SS - <text>`.
pub fn append_message_log(path: &Path, text: &str) -> Result<()> {
    let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{stamp} - {text}")?;
    Ok(())
}
