//! Full index rebuild with atomic swap.
//!
//! The source index is read page by page, every document is
//! reprocessed with the current processor and rules, and survivors are
//! written to a scratch index. Only a completed rebuild replaces the
//! source; any failure removes the scratch directory and leaves the
//! source as it was.

use crate::core::error::{HisterError, Result};
use crate::core::indexer::DocumentProcessor;
use crate::core::rules::Rules;
use crate::core::storage::backend::{IndexBackend, PAGE_SIZE};
use crate::core::storage::tantivy::TantivyIndex;
use crate::core::types::{ReindexProgress, ReindexStats};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Rebuild the index at `source` through `scratch`.
///
/// `progress` runs after every page; returning an error cancels the
/// rebuild with the same cleanup as a failure.
pub fn reindex<F>(
    source: &Path,
    scratch: &Path,
    processor: &DocumentProcessor,
    rules: &Rules,
    skip_sensitive_checks: bool,
    mut progress: F,
) -> Result<ReindexStats>
where
    F: FnMut(ReindexProgress) -> Result<()>,
{
    let start = Instant::now();

    if same_path(source, scratch) {
        return Err(HisterError::StorageError(format!(
            "Scratch path must differ from the index path ({})",
            source.display()
        )));
    }

    if !TantivyIndex::exists(source) {
        return Err(HisterError::StorageError(format!(
            "No index found at {}",
            source.display()
        )));
    }

    if scratch.exists() {
        tracing::warn!("Removing stale scratch index at {:?}", scratch);
        std::fs::remove_dir_all(scratch)?;
    }

    let src = TantivyIndex::open_read_only(source)?;
    let dst = TantivyIndex::create(scratch)?;

    let rebuilt = rebuild(&src, &dst, processor, rules, skip_sensitive_checks, &mut progress)
        .and_then(|stats| dst.commit().map(|_| stats));

    let mut stats = match rebuilt {
        Ok(stats) => stats,
        Err(e) => {
            discard(dst, scratch);
            return Err(e);
        }
    };

    src.close()?;
    if let Err(e) = dst.close() {
        remove_scratch(scratch);
        return Err(e);
    }

    if let Err(e) = swap(source, scratch) {
        remove_scratch(scratch);
        return Err(e);
    }

    stats.duration_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        "Reindexed {} documents ({} written, {} skipped by rules, {} sensitive) in {}ms",
        stats.visited,
        stats.written,
        stats.skipped_rules,
        stats.skipped_sensitive,
        stats.duration_ms
    );

    Ok(stats)
}

fn rebuild<F>(
    src: &TantivyIndex,
    dst: &TantivyIndex,
    processor: &DocumentProcessor,
    rules: &Rules,
    skip_sensitive_checks: bool,
    progress: &mut F,
) -> Result<ReindexStats>
where
    F: FnMut(ReindexProgress) -> Result<()>,
{
    let mut stats = ReindexStats::default();
    let mut page = 0;

    loop {
        let docs = src.page(stats.visited, PAGE_SIZE)?;
        if docs.is_empty() {
            return Ok(stats);
        }
        page += 1;

        for mut doc in docs {
            stats.visited += 1;

            match processor.reprocess(&mut doc, skip_sensitive_checks) {
                Ok(()) => {}
                Err(e) if e.is_policy_rejection() => {
                    tracing::debug!("Dropping {}: {}", doc.url, e);
                    stats.skipped_sensitive += 1;
                    continue;
                }
                Err(e) => return Err(e),
            }

            if rules.is_skip(&doc.url) {
                tracing::debug!("Dropping {}: matches a skip rule", doc.url);
                stats.skipped_rules += 1;
                continue;
            }

            dst.stage(&doc)?;
            stats.written += 1;
        }

        progress(ReindexProgress {
            page,
            visited: stats.visited,
            written: stats.written,
        })?;
    }
}

/// `<source>.bak` next to the source directory
fn backup_path(source: &Path) -> PathBuf {
    let mut name = source.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".bak");
    source.with_file_name(name)
}

/// source → backup, scratch → source, remove backup
fn swap(source: &Path, scratch: &Path) -> Result<()> {
    let backup = backup_path(source);

    if backup.exists() {
        tracing::warn!("Removing stale backup at {:?}", backup);
        std::fs::remove_dir_all(&backup)?;
    }

    std::fs::rename(source, &backup).map_err(|e| {
        HisterError::StorageError(format!("Failed to move index to backup: {e}"))
    })?;

    if let Err(e) = std::fs::rename(scratch, source) {
        if let Err(restore) = std::fs::rename(&backup, source) {
            tracing::error!("Failed to restore index from {:?}: {}", backup, restore);
        }
        return Err(HisterError::StorageError(format!(
            "Failed to move rebuilt index into place: {e}"
        )));
    }

    if let Err(e) = std::fs::remove_dir_all(&backup) {
        tracing::warn!("Failed to remove backup {:?}: {}", backup, e);
    }

    Ok(())
}

fn discard(dst: TantivyIndex, scratch: &Path) {
    if let Err(e) = dst.close() {
        tracing::warn!("Failed to close scratch index: {}", e);
    }
    remove_scratch(scratch);
}

fn remove_scratch(scratch: &Path) {
    if let Err(e) = std::fs::remove_dir_all(scratch) {
        tracing::warn!("Failed to remove scratch index {:?}: {}", scratch, e);
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
