// store.rs — PolicyStore: fresh-per-call reads, atomic administrative writes.
//
// The store holds only a path. `load()` re-reads and re-parses the file on
// every call, so a profile change (in particular entering `locked`) is
// visible to the very next call with no restart and no in-flight call
// observing a stale snapshot. Readers never hold a lock and never block.
//
// Administrative writes (lock/unlock/set_profile/save) go through a temp
// file in the same directory followed by a rename, so a reader either sees
// the old document or the new one, never a partial write.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::document::{ExecutionProfile, PolicyDocument};
use crate::error::PolicyError;
use crate::rules::CompiledPolicy;

/// Handle to the on-disk policy document.
#[derive(Debug, Clone)]
pub struct PolicyStore {
    path: PathBuf,
}

impl PolicyStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Construct a store from a project root (uses `.vigil/policy.yaml`).
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(".vigil").join("policy.yaml"))
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and compile the policy document.
    ///
    /// Re-reads from disk on every call; there is no caching anywhere in
    /// the pipeline. A missing, unreadable, or malformed document is an
    /// error, and callers treat any error as deny (fail closed).
    pub fn load(&self) -> Result<CompiledPolicy, PolicyError> {
        let data = fs::read_to_string(&self.path).map_err(|source| PolicyError::ReadFailed {
            path: self.path.clone(),
            source,
        })?;
        let document: PolicyDocument =
            serde_yaml::from_str(&data).map_err(|source| PolicyError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(
            version = document.version,
            profile = %document.execution_profile,
            "policy loaded"
        );
        CompiledPolicy::compile(document)
    }

    /// Atomically replace the document. Bumps the version and `updated_at`.
    ///
    /// This is the administrative write path, never called by the gates.
    pub fn save(&self, mut document: PolicyDocument) -> Result<(), PolicyError> {
        document.version += 1;
        document.updated_at = Utc::now();
        self.write_atomic(&document)
    }

    /// Write an initial document without bumping the version.
    pub fn init(&self, document: &PolicyDocument) -> Result<(), PolicyError> {
        self.write_atomic(document)
    }

    /// Set the execution profile, preserving everything else.
    pub fn set_profile(&self, profile: ExecutionProfile) -> Result<(), PolicyError> {
        let mut document = self.load()?.document;
        document.execution_profile = profile;
        tracing::warn!(profile = %profile, "execution profile changed");
        self.save(document)
    }

    /// Engage the panic lock: every gate refuses on its next call.
    pub fn lock(&self) -> Result<(), PolicyError> {
        self.set_profile(ExecutionProfile::Locked)
    }

    /// Release the panic lock back to the standard profile.
    pub fn unlock(&self) -> Result<(), PolicyError> {
        self.set_profile(ExecutionProfile::Standard)
    }

    fn write_atomic(&self, document: &PolicyDocument) -> Result<(), PolicyError> {
        let yaml = serde_yaml::to_string(document)?;
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|source| PolicyError::WriteFailed {
            path: dir.to_path_buf(),
            source,
        })?;
        // Temp file must live in the same directory for rename to be atomic.
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|source| PolicyError::WriteFailed {
                path: self.path.clone(),
                source,
            })?;
        tmp.write_all(yaml.as_bytes())
            .map_err(|source| PolicyError::WriteFailed {
                path: self.path.clone(),
                source,
            })?;
        tmp.persist(&self.path)
            .map_err(|e| PolicyError::WriteFailed {
                path: self.path.clone(),
                source: e.error,
            })?;
        Ok(())
    }
}
