//! Completed-work manifest for batch resumption.
//!
//! Resumption consults this explicit set of finished work units instead of
//! probing for output files, so recovery stays independent of the
//! persistence format. Marking a unit complete and saving after each file
//! makes an interrupted batch resume exactly where it stopped.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::WorkerError;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Manifest {
    completed: BTreeSet<String>,
}

impl Manifest {
    /// Load a manifest, or start empty if none exists yet.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorkerError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn is_complete(&self, unit: &str) -> bool {
        self.completed.contains(unit)
    }

    pub fn mark_complete(&mut self, unit: &str) {
        self.completed.insert(unit.to_string());
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), WorkerError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }
}
