// src/store/json.rs
// =============================================================================
// Crash-safe, concurrency-safe JSON result file.
//
// Every append does read -> add record -> write under ONE lock per file, so
// two workers saving at the same time can never both read the old list and
// have one of them silently drop the other's page. Two locks are taken:
// - an in-process async Mutex, so our own workers queue up without blocking
//   threads
// - an OS advisory lock on `<file>.lock`, so two site-scribe processes
//   writing the same file also take turns
//
// Writing never touches the real file directly:
// 1. Serialize the new document into a temp file in the same directory
// 2. fsync it
// 3. Rename it over the old file (atomic on the same filesystem)
// If anything fails before step 3 the old file is exactly as it was, and the
// temp file is deleted when it goes out of scope.
//
// A missing or unreadable file counts as an empty store, not an error.
//
// Rust concepts:
// - DashMap: a concurrent HashMap, here holding one lock per file path
// - tokio::sync::Mutex: a lock that can be held across .await
// - spawn_blocking: run std file I/O without stalling the async workers
// - fd_lock::RwLock: an flock()/LockFileEx lock released when the guard drops
// =============================================================================

use dashmap::DashMap;
use fd_lock::RwLock;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{PageRecord, StoreDocument};
use crate::error::StoreError;

#[derive(Debug, Default)]
pub struct ResultStore {
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Appends one record to the file at `key`
    pub async fn append(&self, key: &Path, record: PageRecord) -> Result<(), StoreError> {
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        let path = key.to_path_buf();
        tokio::task::spawn_blocking(move || {
            with_file_lock(&path, || {
                let mut document = read_document(&path);
                document.webpages.push(record);
                write_document(&path, &document)
            })
        })
        .await?
    }

    // Reads the current contents of the file at `key`
    pub async fn load(&self, key: &Path) -> Result<StoreDocument, StoreError> {
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        let path = key.to_path_buf();
        Ok(tokio::task::spawn_blocking(move || read_document(&path)).await?)
    }

    fn lock_for(&self, key: &Path) -> Arc<Mutex<()>> {
        Arc::clone(&self.locks.entry(key.to_path_buf()).or_default())
    }
}

// Path of the sidecar lock file: `<file>.lock` next to `path`
fn lock_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("store"));
    name.push(".lock");
    path.with_file_name(name)
}

// Runs `f` while holding an exclusive OS lock on `path`'s sidecar lock file.
// Blocks until any other process holding it lets go.
fn with_file_lock<T>(
    path: &Path,
    f: impl FnOnce() -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    let lock_file = lock_path(path);
    let io_error = |source: io::Error| StoreError::Io {
        path: lock_file.display().to_string(),
        source,
    };

    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(&lock_file)
        .map_err(io_error)?;
    let mut lock = RwLock::new(file);
    let _guard = lock.write().map_err(io_error)?;

    f()
}

// Loads the document, treating a missing or corrupt file as empty
fn read_document(path: &Path) -> StoreDocument {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no existing store, starting empty");
            return StoreDocument::default();
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "could not read store, starting empty");
            return StoreDocument::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(document) => document,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "store is not valid JSON, starting empty");
            StoreDocument::default()
        }
    }
}

fn write_document(path: &Path, document: &StoreDocument) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(document)?;
    replace_atomically(path, |file| file.write_all(&bytes))
}

// Writes a new version of `path` through a temp file + rename
//
// `write` fills the temp file. If it fails, or the sync or rename fails,
// `path` keeps its previous contents.
pub(crate) fn replace_atomically<F>(path: &Path, write: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let io_error = |source: io::Error| StoreError::Io {
        path: path.display().to_string(),
        source,
    };

    // The temp file must live next to the target so rename stays atomic
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store".to_string());

    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{}.", file_name))
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(io_error)?;

    write(temp.as_file_mut()).map_err(io_error)?;
    temp.as_file().sync_all().map_err(io_error)?;

    temp.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}


// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does NamedTempFile::persist do?
//    - Renames the temp file onto the target path
//    - On the same filesystem a rename is atomic: readers see either the
//      old file or the new one, never half of each
//    - If we return early instead, the temp file's Drop deletes it
//
// 2. Why sync_all() before persist()?
//    - Writes sit in the OS cache at first
//    - sync_all() pushes them to disk so a power cut after the rename
//      cannot leave an empty file behind
//
// 3. Why two locks?
//    - The tokio Mutex only knows about tasks in THIS process
//    - The fd-lock on `<file>.lock` is an OS lock, so another site-scribe
//      process appending to the same file waits its turn
//    - The OS lock blocks a thread, which is why it is taken inside
//      spawn_blocking
//
// 4. Why spawn_blocking?
//    - std::fs calls block the thread
//    - tokio runs many tasks on few threads; blocking one of them stalls
//      every task scheduled on it
// -----------------------------------------------------------------------------
