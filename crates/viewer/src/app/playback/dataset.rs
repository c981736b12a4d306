use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::model::{ActorId, IterationSnapshot};

/// A dataset that cannot be played. The run stays failed until restarted.
#[derive(Debug, Error)]
pub(crate) enum DatasetError {
    #[error("read dataset '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse dataset json at {json_path}: {message}")]
    Parse { json_path: String, message: String },
    #[error("dataset contains no iterations")]
    Empty,
    #[error("validation failed at [{position}].index: expected {expected}, got {found}")]
    IndexGap {
        position: usize,
        expected: u64,
        found: u64,
    },
    #[error("validation failed at [{position}]: actor id {id} appears more than once")]
    DuplicateId { position: usize, id: ActorId },
}

/// Supplies the iteration sequence for one run.
pub(crate) trait DatasetSource {
    fn describe(&self) -> String;
    fn fetch(&self) -> Result<Vec<IterationSnapshot>, DatasetError>;
}

#[derive(Debug, Clone)]
pub(crate) struct FileDatasetSource {
    path: PathBuf,
}

impl FileDatasetSource {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetSource for FileDatasetSource {
    fn describe(&self) -> String {
        self.path().display().to_string()
    }

    fn fetch(&self) -> Result<Vec<IterationSnapshot>, DatasetError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| DatasetError::Read {
            path: self.path.clone(),
            source,
        })?;
        parse_dataset_json(&raw)
    }
}

/// Parses and validates a JSON array of snapshots.
pub(crate) fn parse_dataset_json(raw: &str) -> Result<Vec<IterationSnapshot>, DatasetError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let snapshots: Vec<IterationSnapshot> = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|error| {
            let path = error.path().to_string();
            let json_path = if path.is_empty() { ".".to_string() } else { path };
            DatasetError::Parse {
                json_path,
                message: error.into_inner().to_string(),
            }
        })?;
    validate_dataset(&snapshots)?;
    Ok(snapshots)
}

pub(crate) fn validate_dataset(snapshots: &[IterationSnapshot]) -> Result<(), DatasetError> {
    let Some(first) = snapshots.first() else {
        return Err(DatasetError::Empty);
    };
    // Indices label iterations; playback walks list positions.
    for (position, snapshot) in snapshots.iter().enumerate() {
        let expected = first.index.saturating_add(position as u64);
        if snapshot.index != expected {
            return Err(DatasetError::IndexGap {
                position,
                expected,
                found: snapshot.index,
            });
        }
        let mut seen = HashSet::new();
        if let Some(actor) = snapshot.all_actors().find(|actor| !seen.insert(actor.id)) {
            return Err(DatasetError::DuplicateId {
                position,
                id: actor.id,
            });
        }
    }
    Ok(())
}
