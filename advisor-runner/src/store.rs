//! Saved recommendations: one pretty JSON array per label, source and day.

use std::path::{Path, PathBuf};

use advisor_core::data::DataSource;
use advisor_core::Recommendation;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed recommendations file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct RecommendationStore {
    dir: PathBuf,
}

impl RecommendationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `{label}-{source}-{YYYY-MM-DD}.json`
    pub fn file_name(label: &str, source: DataSource, date: NaiveDate) -> String {
        format!("{label}-{source}-{}.json", date.format("%Y-%m-%d"))
    }

    pub fn path(&self, label: &str, source: DataSource, date: NaiveDate) -> PathBuf {
        self.dir.join(Self::file_name(label, source, date))
    }

    /// Write the recommendations, replacing any earlier file for the same day.
    /// Nothing is written for an empty list.
    pub fn save(
        &self,
        label: &str,
        source: DataSource,
        date: NaiveDate,
        recommendations: &[Recommendation],
    ) -> Result<Option<PathBuf>, StoreError> {
        if recommendations.is_empty() {
            return Ok(None);
        }
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path(label, source, date);
        let json = serde_json::to_string_pretty(recommendations).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, json).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Some(path))
    }

    /// Missing file reads as an empty list.
    pub fn load(
        &self,
        label: &str,
        source: DataSource,
        date: NaiveDate,
    ) -> Result<Vec<Recommendation>, StoreError> {
        let path = self.path(label, source, date);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_str(&text).map_err(|source| StoreError::Json { path, source })
    }
}
