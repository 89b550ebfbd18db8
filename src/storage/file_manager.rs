//! File Manager - block I/O over a directory of database files.
//!
//! The [`FileManager`] handles all direct file operations:
//! - Reading and writing blocks
//! - Appending new blocks to a file
//! - Opening files lazily and keeping their handles

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use log::{info, trace};
use parking_lot::Mutex;

use crate::common::config::PAGE_SIZE;
use crate::common::{BlockId, Error, Result};
use crate::storage::page::Page;
use crate::storage::{BlockStore, FileStats};

/// Manages block I/O for every file in one database directory.
///
/// # File Layout
/// Each file is a sequence of fixed-size blocks:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Block 0 │ Block 1 │ Block 2 │  ...    │ Block N │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// # Thread Safety
/// Open file handles sit behind a single `Mutex`, so block I/O is serialized
/// across all files.
///
/// # Durability
/// Writes and appends are followed by `fsync()`.
pub struct FileManager {
    dir: PathBuf,
    is_new: bool,
    files: Mutex<HashMap<String, File>>,
    stats: FileStats,
}

impl FileManager {
    /// Open the database directory, creating it if it doesn't exist.
    ///
    /// When the directory already existed, leftover files whose name starts
    /// with `temp` are removed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let is_new = !dir.exists();

        if is_new {
            fs::create_dir_all(&dir)?;
        } else {
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                if entry.file_name().to_string_lossy().starts_with("temp") {
                    info!("Removing temporary file {:?}", entry.path());
                    fs::remove_file(entry.path())?;
                }
            }
        }

        Ok(Self {
            dir,
            is_new,
            files: Mutex::new(HashMap::new()),
            stats: FileStats::new(),
        })
    }

    /// True if `open` had to create the directory.
    #[inline]
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// The database directory.
    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Block I/O counters.
    #[inline]
    pub fn stats(&self) -> &FileStats {
        &self.stats
    }

    /// Get the handle for `file_name`, opening (or creating) it on first use.
    fn file<'a>(
        &self,
        files: &'a mut HashMap<String, File>,
        file_name: &str,
    ) -> Result<&'a mut File> {
        match files.entry(file_name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                validate_file_name(file_name)?;
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(self.dir.join(file_name))?;
                Ok(entry.insert(file))
            }
        }
    }
}

fn validate_file_name(file_name: &str) -> Result<()> {
    let bad = file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains('/')
        || file_name.contains('\\');
    if bad {
        return Err(Error::InvalidFileName(file_name.to_string()));
    }
    Ok(())
}

fn blocks_in(file: &File) -> Result<u32> {
    Ok((file.metadata()?.len() / PAGE_SIZE as u64) as u32)
}

#[inline]
fn offset_of(number: u32) -> u64 {
    (number as u64) * (PAGE_SIZE as u64)
}

impl BlockStore for FileManager {
    /// # Errors
    /// Returns `Error::BlockNotFound` if the block lies past the end of its file.
    fn read_block(&self, block: &BlockId, page: &mut Page) -> Result<()> {
        let mut files = self.files.lock();
        let file = self.file(&mut files, block.file_name())?;

        if block.number() >= blocks_in(file)? {
            return Err(Error::BlockNotFound(block.clone()));
        }

        trace!("Reading {}", block);
        file.seek(SeekFrom::Start(offset_of(block.number())))?;
        file.read_exact(page.as_mut_slice())?;

        self.stats.blocks_read.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// # Errors
    /// Returns `Error::BlockNotFound` if the block hasn't been appended yet.
    fn write_block(&self, block: &BlockId, page: &Page) -> Result<()> {
        let mut files = self.files.lock();
        let file = self.file(&mut files, block.file_name())?;

        if block.number() >= blocks_in(file)? {
            return Err(Error::BlockNotFound(block.clone()));
        }

        trace!("Writing {}", block);
        file.seek(SeekFrom::Start(offset_of(block.number())))?;
        file.write_all(page.as_slice())?;
        file.sync_all()?; // fsync for durability

        self.stats.blocks_written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn append_block(&self, file_name: &str, page: &Page) -> Result<BlockId> {
        let mut files = self.files.lock();
        let file = self.file(&mut files, file_name)?;

        let block = BlockId::new(file_name, blocks_in(file)?);

        trace!("Appending {}", block);
        file.seek(SeekFrom::Start(offset_of(block.number())))?;
        file.write_all(page.as_slice())?;
        file.sync_all()?;

        self.stats.blocks_appended.fetch_add(1, Ordering::Relaxed);
        Ok(block)
    }

    fn block_count(&self, file_name: &str) -> Result<u32> {
        let mut files = self.files.lock();
        let file = self.file(&mut files, file_name)?;
        blocks_in(file)
    }
}
