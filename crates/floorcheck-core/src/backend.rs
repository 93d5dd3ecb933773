//! Key-value storage backends. One opaque record per namespace.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::StorageError;

/// Durable byte storage keyed by namespace. Writes are synchronous: when
/// `write` returns `Ok`, the record survives a reload.
pub trait StorageBackend: fmt::Debug {
    fn read(&self, namespace: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn write(&mut self, namespace: &str, bytes: &[u8]) -> Result<(), StorageError>;
    /// Removing a missing record is not an error.
    fn remove(&mut self, namespace: &str) -> Result<(), StorageError>;
    fn namespaces(&self) -> Result<Vec<String>, StorageError>;
}

/// Process-local backend. A quota models a full browser-style store and
/// `set_offline` models one that refuses all access.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    records: HashMap<String, Vec<u8>>,
    quota: Option<usize>,
    offline: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total bytes across all namespaces may not exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    fn check_online(&self) -> Result<(), StorageError> {
        if self.offline {
            return Err(StorageError::Unavailable("memory backend is offline".into()));
        }
        Ok(())
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, namespace: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.check_online()?;
        Ok(self.records.get(namespace).cloned())
    }

    fn write(&mut self, namespace: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.check_online()?;
        if let Some(quota) = self.quota {
            let others: usize = self
                .records
                .iter()
                .filter(|(k, _)| k.as_str() != namespace)
                .map(|(_, v)| v.len())
                .sum();
            let available = quota.saturating_sub(others);
            if bytes.len() > available {
                return Err(StorageError::QuotaExceeded {
                    needed: bytes.len(),
                    available,
                });
            }
        }
        self.records.insert(namespace.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&mut self, namespace: &str) -> Result<(), StorageError> {
        self.check_online()?;
        self.records.remove(namespace);
        Ok(())
    }

    fn namespaces(&self) -> Result<Vec<String>, StorageError> {
        self.check_online()?;
        let mut names: Vec<String> = self.records.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// One file per namespace under a directory.
///
/// Writes go to a hidden temp file, are synced to disk, then renamed into
/// place, so a crash mid-write leaves the previous record intact.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
    extension: String,
}

impl FileBackend {
    /// Creates the directory if needed.
    pub fn new(dir: impl AsRef<Path>, extension: &str) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!("file backend at {}", dir.display());
        Ok(Self {
            dir,
            extension: extension.to_string(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{namespace}.{}", self.extension))
    }

    fn temp_path_for(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!(".{namespace}.{}.tmp", self.extension))
    }
}

/// Makes a completed rename durable.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

impl StorageBackend for FileBackend {
    fn read(&self, namespace: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.path_for(namespace)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, namespace: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let tmp = self.temp_path_for(namespace);
        let written = fs::File::create(&tmp).and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|()| fs::rename(&tmp, self.path_for(namespace))) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        sync_dir(&self.dir)?;
        Ok(())
    }

    fn remove(&mut self, namespace: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(namespace)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn namespaces(&self) -> Result<Vec<String>, StorageError> {
        let suffix = format!(".{}", self.extension);
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            if let Some(ns) = name.strip_suffix(&suffix) {
                names.push(ns.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
