//! Local persistence for drafts and submission history.
//!
//! Each page gets one file per concern under the storage root:
//!
//! ```text
//! <root>/
//!   autosave/<page>.json   # Latest draft of the form
//!   history/<page>.json    # Recent successful submissions, newest first
//! ```

use std::{fs, io, path::PathBuf};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::form::FormState;

/// How many submissions are kept per page.
pub const HISTORY_LIMIT: usize = 10;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// One successful submission, as shown in the history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub submitted_at: Timestamp,
    /// Base field values at the time of submission.
    pub base: BTreeMap<String, String>,
    pub line_count: usize,
    /// Message the backend returned.
    pub message: String,
}

/// Local file-based storage for drafts and history.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory and its subdirectories are created if missing.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("autosave"))?;
        fs::create_dir_all(root.join("history"))?;
        Ok(Self { root })
    }

    /// Returns the default storage root: `~/.depot/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".depot"))
    }

    // ── Drafts ──

    /// Writes the current form state as the page's draft.
    pub fn save_draft(&self, page: &str, state: &FormState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        fs::write(self.draft_path(page), json)?;
        Ok(())
    }

    /// Loads the page's draft, if any. A corrupt draft is logged and
    /// treated as absent rather than blocking the form.
    pub fn load_draft(&self, page: &str) -> Result<Option<FormState>> {
        let path = self.draft_path(page);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&json) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                log::warn!("discarding corrupt draft for {page}: {e}");
                Ok(None)
            }
        }
    }

    /// Removes the page's draft. Missing drafts are fine.
    pub fn clear_draft(&self, page: &str) -> Result<()> {
        match fs::remove_file(self.draft_path(page)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    // ── History ──

    /// Prepends a submission record, dropping the oldest past the limit.
    pub fn append_history(&self, page: &str, record: &HistoryRecord) -> Result<()> {
        let mut records = self.load_history(page)?;
        records.insert(0, record.clone());
        records.truncate(HISTORY_LIMIT);
        let json = serde_json::to_string_pretty(&records)?;
        fs::write(self.history_path(page), json)?;
        Ok(())
    }

    /// Loads the page's history, newest first. Corrupt files reset to empty.
    pub fn load_history(&self, page: &str) -> Result<Vec<HistoryRecord>> {
        let path = self.history_path(page);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&json) {
            Ok(records) => Ok(records),
            Err(e) => {
                log::warn!("discarding corrupt history for {page}: {e}");
                Ok(Vec::new())
            }
        }
    }

    fn draft_path(&self, page: &str) -> PathBuf {
        self.root.join("autosave").join(format!("{page}.json"))
    }

    fn history_path(&self, page: &str) -> PathBuf {
        self.root.join("history").join(format!("{page}.json"))
    }
}
