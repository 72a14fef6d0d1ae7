// crates/saltcheck-providers/src/cache.rs
// ============================================================================
// Module: File Root Cache
// Description: Serves `salt://` directories straight from local file roots.
// Purpose: Implement directory caching for masterless runs.
// Dependencies: saltcheck-core, walkdir
// ============================================================================

//! ## Overview
//! With local file roots there is nothing to download: a remote path
//! `salt://<dir>` is looked up under each root of the environment and the
//! matching files are returned in place. When several roots hold the same
//! relative file, the first root wins. Results are sorted by relative path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use saltcheck_core::CacheError;
use saltcheck_core::FileCache;
use saltcheck_core::runtime::REMOTE_SCHEME;
use walkdir::WalkDir;

// ============================================================================
// SECTION: Cache
// ============================================================================

/// Directory cache over per-environment file roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRootCache {
    /// State tree roots per environment.
    file_roots: BTreeMap<String, Vec<PathBuf>>,
}

impl FileRootCache {
    /// Creates a cache over the given file roots.
    #[must_use]
    pub const fn new(file_roots: BTreeMap<String, Vec<PathBuf>>) -> Self {
        Self {
            file_roots,
        }
    }
}

impl FileCache for FileRootCache {
    fn cache_directory(
        &self,
        remote_path: &str,
        saltenv: &str,
        include_pattern: &str,
    ) -> Result<Vec<PathBuf>, CacheError> {
        let relative = relative_remote_path(remote_path)?;
        let Some(roots) = self.file_roots.get(saltenv) else {
            return Ok(Vec::new());
        };
        let mut found: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();
        for root in roots {
            let directory = root.join(&relative);
            if !directory.is_dir() {
                continue;
            }
            for entry in WalkDir::new(&directory).sort_by_file_name() {
                let entry = entry.map_err(|err| CacheError::Io(err.to_string()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy();
                if !matches_pattern(&name, include_pattern) {
                    continue;
                }
                let Ok(key) = entry.path().strip_prefix(root) else {
                    continue;
                };
                let key = key.to_path_buf();
                found.entry(key).or_insert_with(|| entry.into_path());
            }
        }
        Ok(found.into_values().collect())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates a `salt://` path and returns it relative to a file root.
fn relative_remote_path(remote_path: &str) -> Result<PathBuf, CacheError> {
    let invalid = || CacheError::InvalidPath(remote_path.to_string());
    let stripped = remote_path.strip_prefix(REMOTE_SCHEME).ok_or_else(invalid)?;
    let relative = Path::new(stripped.trim_matches('/'));
    let mut clean = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => clean.push(segment),
            Component::CurDir => {}
            _ => return Err(invalid()),
        }
    }
    Ok(clean)
}

/// Matches a file name against a pattern with at most one `*` wildcard.
fn matches_pattern(name: &str, pattern: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            name.len() >= prefix.len() + suffix.len()
                && name.starts_with(prefix)
                && name.ends_with(suffix)
        }
        None => name == pattern,
    }
}
