//! Per-mode progress tracking for resumable mining.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::NaiveDate;

use crate::mode::Mode;

/// Location name to last successfully completed end date.
pub type ProgressState = HashMap<String, NaiveDate>;

/// Loads and saves the JSON tracker file for one mode.
///
/// The file is rewritten wholesale on every save; a missing file reads as an
/// empty state. Single-process, single-run-per-mode operation is assumed.
pub struct ProgressTracker {
    path: PathBuf,
}

impl ProgressTracker {
    pub fn new(tracker_dir: &Path, mode: Mode) -> Self {
        ProgressTracker {
            path: tracker_dir.join(mode.tracker_file()),
        }
    }

    pub fn load(&self) -> Result<ProgressState> {
        if !self.path.exists() {
            return Ok(ProgressState::new());
        }

        let raw = fs::read_to_string(&self.path)?;
        let state = serde_json::from_str(&raw)?;

        Ok(state)
    }

    pub fn save(&self, state: &ProgressState) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_string(state)?)?;

        Ok(())
    }
}

// -- Tests -------------------------------------------------------------------
