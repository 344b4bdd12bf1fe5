//! Renaming media files from a resolved record.
//!
//! A [`RenamePlan`] is computed first and can be shown to the user (dry run)
//! before [`apply_rename`] touches the filesystem.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use reelname_common::{Error, MetadataRecord, Result};

use crate::format::format;

/// Source and target of one rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl RenamePlan {
    /// Whether the target already equals the source.
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Compute the new path for `path`: same directory, formatted stem,
/// original extension.
pub fn plan_rename(path: &Path, record: &MetadataRecord, pattern: &str) -> Result<RenamePlan> {
    if path.file_name().is_none() {
        return Err(Error::invalid_input(format!(
            "not a file path: {}",
            path.display()
        )));
    }

    let stem = format(record, pattern);
    if stem.is_empty() {
        return Err(Error::invalid_input(format!(
            "pattern {pattern:?} produced an empty name for {}",
            path.display()
        )));
    }

    let file_name = match path.extension() {
        Some(ext) => format!("{stem}.{}", ext.to_string_lossy()),
        None => stem,
    };
    let to = path.with_file_name(file_name);

    debug!(from = %path.display(), to = %to.display(), "Planned rename");
    Ok(RenamePlan {
        from: path.to_path_buf(),
        to,
    })
}

/// Perform a planned rename.
///
/// Refuses to overwrite an existing file at the target. A no-op plan
/// succeeds without touching the filesystem.
pub fn apply_rename(plan: &RenamePlan) -> Result<PathBuf> {
    if plan.is_noop() {
        return Ok(plan.to.clone());
    }
    if !plan.from.exists() {
        return Err(Error::invalid_input(format!(
            "source does not exist: {}",
            plan.from.display()
        )));
    }
    if plan.to.exists() {
        return Err(Error::invalid_input(format!(
            "refusing to overwrite existing file: {}",
            plan.to.display()
        )));
    }

    std::fs::rename(&plan.from, &plan.to)?;
    info!(from = %plan.from.display(), to = %plan.to.display(), "Renamed");
    Ok(plan.to.clone())
}
