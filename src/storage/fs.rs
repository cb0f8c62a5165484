//! Directory-backed local store
//!
//! Transcript pages are flat files named after their document path. On open,
//! files below the minimum size are deleted (they are leftovers of error
//! pages or interrupted writes) and the remaining names form the presence
//! index.

use crate::storage::traits::{LocalStore, StorageError, StorageResult};
use encoding_rs::WINDOWS_1250;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Separates the key from the rest of a transcript filename
const KEY_SEPARATOR: &str = "_stenprot_";

/// Local store rooted at a download directory
#[derive(Debug)]
pub struct FsStore {
    root: PathBuf,
    files: HashSet<String>,
}

/// Summary of what a download directory holds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatistics {
    /// Number of transcript files
    pub files: u64,

    /// Combined size of all files in bytes
    pub total_bytes: u64,

    /// File count and byte size per key
    pub per_key: BTreeMap<String, KeyStatistics>,
}

/// Files and bytes stored for one key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyStatistics {
    pub files: u64,
    pub bytes: u64,
}

impl FsStore {
    /// Opens (creating if needed) the download directory
    ///
    /// Files smaller than `min_file_size` bytes are deleted before the
    /// presence index is built, so they will be fetched again.
    ///
    /// # Arguments
    ///
    /// * `root` - The download directory
    /// * `min_file_size` - Minimum size of a valid transcript file
    ///
    /// # Returns
    ///
    /// * `Ok(FsStore)` - Store with every valid file indexed
    /// * `Err(StorageError)` - The directory could not be created or listed
    pub fn open(root: &Path, min_file_size: u64) -> StorageResult<Self> {
        std::fs::create_dir_all(root).map_err(|e| io_error(root, e))?;
        tracing::info!("Ensured download directory exists: {}", root.display());

        let deleted = purge_small_files(root, min_file_size)?;
        tracing::info!(
            "Deleted {} files smaller than {} bytes in {}",
            deleted,
            min_file_size,
            root.display()
        );

        let files = index_files(root)?;
        tracing::info!(
            "Found {} already downloaded files in {}",
            files.len(),
            root.display()
        );

        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    /// Opens an existing download directory without changing it
    ///
    /// Nothing is created or purged, so undersized files are indexed too. A
    /// missing directory gives an empty store.
    pub fn inspect(root: &Path) -> StorageResult<Self> {
        let files = if root.is_dir() {
            index_files(root)?
        } else {
            HashSet::new()
        };

        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    /// Path a filename is stored under
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Summarizes the files of at least `min_file_size` bytes
    pub fn statistics(&self, min_file_size: u64) -> StorageResult<StoreStatistics> {
        let mut stats = StoreStatistics::default();

        for name in &self.files {
            let path = self.path_for(name);
            let metadata = match std::fs::metadata(&path) {
                Ok(m) if m.is_file() && m.len() >= min_file_size => m,
                Ok(_) => continue,
                Err(e) => return Err(io_error(&path, e)),
            };

            stats.files += 1;
            stats.total_bytes += metadata.len();

            let entry = stats.per_key.entry(key_of(name)).or_default();
            entry.files += 1;
            entry.bytes += metadata.len();
        }

        Ok(stats)
    }
}

impl LocalStore for FsStore {
    fn contains(&self, filename: &str) -> bool {
        self.files.contains(filename)
    }

    fn write(&mut self, filename: &str, text: &str) -> StorageResult<()> {
        if filename.is_empty() || filename.contains('/') || filename.contains('\\') {
            return Err(StorageError::InvalidFilename(filename.to_string()));
        }

        let path = self.path_for(filename);
        std::fs::write(&path, encode_legacy(text)).map_err(|e| io_error(&path, e))?;
        self.files.insert(filename.to_string());
        Ok(())
    }

    fn len(&self) -> usize {
        self.files.len()
    }
}

/// Re-encodes transcript text as windows-1250
///
/// Characters the encoding cannot represent (in practice the replacement
/// characters left by decoding) are dropped rather than escaped.
pub fn encode_legacy(text: &str) -> Vec<u8> {
    let (bytes, _, had_unmappable) = WINDOWS_1250.encode(text);
    if !had_unmappable {
        return bytes.into_owned();
    }

    let mut out = Vec::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        let (encoded, _, unmappable) = WINDOWS_1250.encode(ch.encode_utf8(&mut buf));
        if !unmappable {
            out.extend_from_slice(&encoded);
        }
    }
    out
}

/// Recovers the key from a transcript filename
///
/// `2021ps_stenprot_001schuz_s001001.htm` belongs to `2021ps`, and
/// `1920ns_ps_stenprot_...` to `1920ns/ps`.
pub fn key_of(filename: &str) -> String {
    match filename.split_once(KEY_SEPARATOR) {
        Some((key, _)) => key.replace('_', "/"),
        None => filename.to_string(),
    }
}

/// Names of the regular files directly inside `dir`
fn index_files(dir: &Path) -> StorageResult<HashSet<String>> {
    let mut files = HashSet::new();
    let entries = std::fs::read_dir(dir).map_err(|e| io_error(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| io_error(dir, e))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            files.insert(name.to_string());
        }
    }

    Ok(files)
}

/// Deletes files smaller than `min_size` below `dir`, returning how many went
fn purge_small_files(dir: &Path, min_size: u64) -> StorageResult<u64> {
    let mut deleted = 0;
    let entries = std::fs::read_dir(dir).map_err(|e| io_error(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| io_error(dir, e))?;
        let path = entry.path();

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("Error processing file {}: {}", path.display(), e);
                continue;
            }
        };

        if metadata.is_dir() {
            deleted += purge_small_files(&path, min_size)?;
            continue;
        }

        if metadata.len() < min_size {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    tracing::info!("Deleted: {} (size: {} bytes)", path.display(), metadata.len());
                    deleted += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!("File already gone during size check: {}", path.display());
                }
                Err(e) => {
                    tracing::warn!("Error deleting file {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(deleted)
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}
