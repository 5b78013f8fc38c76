use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("required file not found: {0}")]
    MissingFile(PathBuf),
    #[error("IO error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("malformed CSV in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("no route file for airline '{0}'")]
    UnknownAirline(String),
    #[error("duplicate key '{key}' in {path} (keys are case-insensitive)")]
    DuplicateKey { path: PathBuf, key: String },
}

impl DataError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            DataError::MissingFile(path.to_path_buf())
        } else {
            DataError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn json(path: &Path, source: serde_json::Error) -> Self {
        DataError::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Failures talking to an external service (logo repository, SimBrief, VATSIM).
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected payload: {0}")]
    Payload(String),
    #[error("could not store download: {0}")]
    Io(#[from] io::Error),
}

/// Reads and deserializes a JSON file, mapping a missing file to `DataError::MissingFile`.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let data = std::fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
    serde_json::from_str(&data).map_err(|e| DataError::json(path, e))
}
