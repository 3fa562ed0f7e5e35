//! Plan cache for repeated generations.
//!
//! A generation call takes tens of seconds and costs API quota. Running
//! `build` twice over the same lesson PDF and metadata should not pay for it
//! twice, so successful generations are stored on disk and looked up before
//! the AI call.
//!
//! # Design
//!
//! The cache is **content-addressed**: the key is a SHA-256 over the PDF
//! bytes, the metadata serialized as JSON, and the model identifier. Renaming
//! the PDF file does not invalidate an entry; editing any metadata field or
//! switching models does.
//!
//! ## Storage
//!
//! One JSON file per entry at `<temp-dir>/plans/<key>.json`, holding the
//! format version, the model, and the plan. An entry that is missing,
//! unreadable, of another version or not a valid plan is a miss; the next
//! successful generation overwrites it.
//!
//! ## Bypassing the cache
//!
//! Pass `--no-cache` to `generate` or `build`. Lookups are skipped; the fresh
//! plan is still stored.

use crate::types::{Metadata, PdfFile, Plan};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Subdirectory of the temp dir holding cache entries.
const CACHE_DIRNAME: &str = "plans";

/// Version of the entry format. Bump this to invalidate all existing entries
/// when the format or key computation changes.
const ENTRY_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    version: u32,
    model: String,
    plan: Plan,
}

/// SHA-256 key of one generation request, as a hex string.
pub fn plan_key(pdf: &PdfFile, metadata: &Metadata, model: &str) -> Result<String, CacheError> {
    let metadata_json = serde_json::to_vec(metadata)?;
    let mut hasher = Sha256::new();
    hasher.update(b"pdf\0");
    hasher.update((pdf.bytes.len() as u64).to_le_bytes());
    hasher.update(&pdf.bytes);
    hasher.update(b"metadata\0");
    hasher.update((metadata_json.len() as u64).to_le_bytes());
    hasher.update(&metadata_json);
    hasher.update(b"model\0");
    hasher.update(model.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// On-disk store of generated plans.
#[derive(Debug, Clone)]
pub struct PlanCache {
    dir: PathBuf,
}

impl PlanCache {
    /// Cache rooted at `<temp_dir>/plans`. Nothing is created until the first
    /// [`put`](Self::put).
    pub fn new(temp_dir: &Path) -> Self {
        Self {
            dir: temp_dir.join(CACHE_DIRNAME),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Look up a plan. Every failure mode is a miss.
    pub fn get(&self, key: &str) -> Option<Plan> {
        let path = self.entry_path(key);
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<CacheEntry>(&content) {
            Ok(entry) if entry.version == ENTRY_VERSION => {
                tracing::debug!(key, model = %entry.model, "plan cache hit");
                Some(entry.plan)
            }
            Ok(entry) => {
                tracing::debug!(key, version = entry.version, "stale plan cache entry");
                None
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt plan cache entry");
                None
            }
        }
    }

    /// Store a plan under `key`, replacing any previous entry.
    pub fn put(&self, key: &str, model: &str, plan: &Plan) -> Result<PathBuf, CacheError> {
        std::fs::create_dir_all(&self.dir)?;
        let entry = CacheEntry {
            version: ENTRY_VERSION,
            model: model.to_string(),
            plan: plan.clone(),
        };
        let path = self.entry_path(key);
        std::fs::write(&path, serde_json::to_string_pretty(&entry)?)?;
        Ok(path)
    }

    /// Return the cached plan for `key`, or call `generate` and store its
    /// result. `generate` runs only on a miss or when `bypass` is set, so
    /// anything it needs (such as an API client) is built lazily.
    pub fn get_or_generate<E, F>(
        &self,
        key: &str,
        model: &str,
        bypass: bool,
        generate: F,
    ) -> Result<(Plan, CacheStatus), E>
    where
        F: FnOnce() -> Result<Plan, E>,
    {
        if !bypass && let Some(plan) = self.get(key) {
            return Ok((plan, CacheStatus::Hit));
        }
        let plan = generate()?;
        if let Err(e) = self.put(key, model, &plan) {
            tracing::warn!(error = %e, "could not store plan in cache");
        }
        let status = if bypass {
            CacheStatus::Bypassed
        } else {
            CacheStatus::Miss
        };
        Ok((plan, status))
    }
}

/// Whether a plan came from the cache or a fresh generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    Bypassed,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheStatus::Hit => write!(f, "cached"),
            CacheStatus::Miss => write!(f, "generated"),
            CacheStatus::Bypassed => write!(f, "generated (cache bypassed)"),
        }
    }
}
