use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::validate::{parse_month, ValidationError};
use crate::domain::{MonthBatch, MonthLabel};

/// A month file found in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSource {
    pub label: MonthLabel,
    pub path: PathBuf,
}

/// A month that was read but failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedMonth {
    pub label: MonthLabel,
    pub error: ValidationError,
}

/// Outcome of loading every month. Both lists are sorted by month.
#[derive(Debug, Clone, Default)]
pub struct LoadedMonths {
    pub accepted: Vec<MonthBatch>,
    pub skipped: Vec<SkippedMonth>,
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Data directory not found: {}", .0.display())]
    DataDirNotFound(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Month load task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// List `YYYY-MM.toml` files in `dir`, oldest month first.
/// Anything else in the directory is ignored.
pub async fn discover_months(dir: &Path) -> Result<Vec<MonthSource>, LoadError> {
    let read_err = |source: std::io::Error| LoadError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(LoadError::DataDirNotFound(dir.to_path_buf()));
        }
        Err(e) => return Err(read_err(e)),
    };

    let mut sources = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        let path = entry.path();

        if !entry.file_type().await.map_err(read_err)?.is_file()
            || path.extension().and_then(|ext| ext.to_str()) != Some("toml")
        {
            debug!(path = %path.display(), "Ignoring non-TOML entry");
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };

        match stem.parse::<MonthLabel>() {
            Ok(label) => sources.push(MonthSource { label, path }),
            Err(e) => debug!(path = %path.display(), error = %e, "Ignoring file without a month label"),
        }
    }

    sources.sort_by_key(|source| source.label);
    Ok(sources)
}

/// Read and validate every month concurrently, then join.
///
/// A month that fails validation is logged and skipped. A file that cannot
/// be read at all fails the whole load.
pub async fn load_months(sources: Vec<MonthSource>) -> Result<LoadedMonths, LoadError> {
    let mut tasks = JoinSet::new();

    for source in sources {
        tasks.spawn(async move {
            let text = tokio::fs::read_to_string(&source.path)
                .await
                .map_err(|e| LoadError::Read {
                    path: source.path.clone(),
                    source: e,
                })?;
            let result = parse_month(&source.label.to_string(), &text);
            Ok::<_, LoadError>((source.label, result))
        });
    }

    let mut loaded = LoadedMonths::default();

    while let Some(joined) = tasks.join_next().await {
        let (label, result) = joined??;
        match result {
            Ok(batch) => {
                debug!(month = %label, transactions = batch.len(), "Loaded month");
                loaded.accepted.push(MonthBatch::new(label, batch));
            }
            Err(error) => {
                warn!(month = %label, %error, "Failed to parse, skipping month");
                loaded.skipped.push(SkippedMonth { label, error });
            }
        }
    }

    loaded.accepted.sort_by_key(|month| month.label);
    loaded.skipped.sort_by_key(|month| month.label);

    info!(
        accepted = loaded.accepted.len(),
        skipped = loaded.skipped.len(),
        "Finished loading months"
    );

    Ok(loaded)
}

/// Discover and load every month in `dir`.
pub async fn load_data_dir(dir: &Path) -> Result<LoadedMonths, LoadError> {
    let sources = discover_months(dir).await?;
    debug!(dir = %dir.display(), months = sources.len(), "Discovered month files");
    load_months(sources).await
}
