use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Corpus must be a JSON array of recipes")]
    NotAnArray,
    #[error("Malformed recipe at index {index}: {reason}")]
    MalformedRecipe { index: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum IngredientGraphError {
    #[error("Corpus error in file {file}: {source}")]
    Corpus { file: PathBuf, source: CorpusError },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid search pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Config error in file {file}: {reason}")]
    Config { file: PathBuf, reason: String },
}
