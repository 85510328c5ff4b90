use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StateError;
use crate::state::PipelineState;

/// JSON file holding the [`PipelineState`] between runs.
///
/// Writes go through a sibling temp file and a rename, so an interrupted
/// write leaves the previous file intact. No locking: concurrent runs
/// against one path are the caller's problem.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the state file. A missing or unreadable file yields an empty state.
    #[must_use]
    pub fn load(&self) -> PipelineState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no state file yet, starting fresh");
                return PipelineState::default();
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "could not read state file, starting fresh"
                );
                return PipelineState::default();
            }
        };

        match serde_json::from_str::<PipelineState>(&raw) {
            Ok(state) => {
                tracing::debug!(
                    path = %self.path.display(),
                    entries = state.processed_entries.len(),
                    "loaded state"
                );
                state
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "state file is corrupt, starting fresh"
                );
                PipelineState::default()
            }
        }
    }

    /// Writes `state` as pretty-printed JSON, replacing the file atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if encoding, directory creation, the temp write,
    /// or the final rename fails.
    pub fn persist(&self, state: &PipelineState) -> Result<(), StateError> {
        let raw = serde_json::to_vec_pretty(state)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StateError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, raw).map_err(|source| StateError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| StateError::Replace {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(
            path = %self.path.display(),
            entries = state.processed_entries.len(),
            "state persisted"
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
