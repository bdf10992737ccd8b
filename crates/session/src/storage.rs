//! Durable storage for the raw session credential.
//!
//! The persisted layout is a single key holding the credential string
//! verbatim; absence or unreadable content means "no session". Storage
//! failures are logged and swallowed; losing persistence degrades to an
//! in-memory session, never a crash.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::warn;

/// Fixed storage key for the session credential.
pub const STORAGE_KEY: &str = "auth.token";

/// Durable raw-credential cell.
///
/// Implementations are infallible at the trait surface: errors are an
/// implementation concern (logged, degraded to absence).
pub trait CredentialStorage {
    /// Read the persisted credential, if any.
    fn load(&self) -> Option<String>;

    /// Persist the credential verbatim.
    fn store(&self, raw: &str);

    /// Remove any persisted credential.
    fn remove(&self);
}

// ─────────────────────────────────────────────────────────────────────────────
// File-backed storage
// ─────────────────────────────────────────────────────────────────────────────

/// Credential storage backed by a single file.
#[derive(Debug, Clone)]
pub struct FileCredentialStorage {
    path: PathBuf,
}

impl FileCredentialStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage under `dir` using the fixed [`STORAGE_KEY`] file name.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(STORAGE_KEY))
    }

    fn try_store(&self, raw: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create credential dir {parent:?}"))?;
        }
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write credential to {:?}", self.path))
    }
}

impl CredentialStorage for FileCredentialStorage {
    fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.is_empty() => None,
            Ok(raw) => Some(raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(path = ?self.path, %err, "failed to read persisted credential");
                None
            }
        }
    }

    fn store(&self, raw: &str) {
        if let Err(err) = self.try_store(raw) {
            warn!("{err:#}");
        }
    }

    fn remove(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!(path = ?self.path, %err, "failed to remove persisted credential"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory storage
// ─────────────────────────────────────────────────────────────────────────────

/// Process-local storage cell (tests, simulations).
#[derive(Debug, Default)]
pub struct MemoryCredentialStorage {
    cell: RefCell<Option<String>>,
}

impl MemoryCredentialStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded storage, as if a previous session had persisted `raw`.
    pub fn seeded(raw: impl Into<String>) -> Self {
        Self {
            cell: RefCell::new(Some(raw.into())),
        }
    }
}

impl CredentialStorage for MemoryCredentialStorage {
    fn load(&self) -> Option<String> {
        self.cell.borrow().clone()
    }

    fn store(&self, raw: &str) {
        *self.cell.borrow_mut() = Some(raw.to_string());
    }

    fn remove(&self) {
        *self.cell.borrow_mut() = None;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
