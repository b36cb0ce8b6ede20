use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VatMatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Cannot load {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("Unexpected layout in {path}: expected {expected} columns, found {found} ({detail})")]
    Schema {
        path: String,
        expected: usize,
        found: usize,
        detail: String,
    },

    #[error("Cannot write {path}: {reason}")]
    Export { path: String, reason: String },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidSetting { key: String, value: String },
}

impl VatMatchError {
    pub fn load(path: &Path, reason: impl Into<String>) -> Self {
        Self::Load {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }

    pub fn export(path: &Path, reason: impl Into<String>) -> Self {
        Self::Export {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VatMatchError>;
