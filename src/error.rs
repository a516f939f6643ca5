use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level index {index} out of range ({count} levels)")]
    UnknownLevel { index: usize, count: usize },
    #[error("level '{name}' line {line}: {message}")]
    Parse {
        name: String,
        line: usize,
        message: String,
    },
    #[error("failed to read level file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
