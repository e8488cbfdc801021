//! Local cache scratch files.
//!
//! Each open file handle gets one scratch file under the configured cache
//! directory. Reads and writes go to the scratch file; a flush uploads its
//! whole content as the object body. This is a read-modify-write cycle:
//!
//! 1. The scratch starts empty, or is filled from the remote object
//!    ([`ScratchFile::replace_with`]) before its first use
//! 2. Writes and resizes mark it dirty
//! 3. A flush reads it back ([`ScratchFile::read_all`]) and clears the flag
//!
//! The file is removed when the [`ScratchFile`] is dropped, including on
//! error paths.

use crate::error::{BlobFsError, BlobFsResult};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Directory in which scratch files are created.
#[derive(Debug, Clone)]
pub struct ScratchRoot {
    dir: PathBuf,
}

impl ScratchRoot {
    /// Uses an existing directory as the scratch root.
    ///
    /// The directory is not created: a missing cache directory is a
    /// configuration error reported at mount time.
    pub fn open(dir: impl Into<PathBuf>) -> BlobFsResult<Self> {
        let dir = dir.into();
        match std::fs::metadata(&dir) {
            Ok(meta) if meta.is_dir() => Ok(Self { dir }),
            Ok(_) => Err(BlobFsError::CacheRoot {
                path: dir,
                source: io::Error::other("not a directory"),
            }),
            Err(source) => Err(BlobFsError::CacheRoot { path: dir, source }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Creates an empty scratch file. `label` only shows up in the file name.
    pub fn create(&self, label: &str) -> BlobFsResult<ScratchFile> {
        let prefix = format!("blobfs-{}-", sanitize(label));
        let file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".scratch")
            .tempfile_in(&self.dir)?;
        Ok(ScratchFile { file, dirty: false })
    }
}

/// Keeps file names portable: `report.txt` stays, separators and the like
/// become `_`.
fn sanitize(label: &str) -> String {
    label
        .chars()
        .take(32)
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}

/// Random-access scratch file bound to one open handle.
#[derive(Debug)]
pub struct ScratchFile {
    file: NamedTempFile,
    dirty: bool,
}

impl ScratchFile {
    /// Reads up to `buf.len()` bytes at `offset`; returns 0 at or past the end.
    pub fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let file = self.file.as_file_mut();
        file.seek(SeekFrom::Start(offset))?;
        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    /// Writes `data` at `offset`. A gap past the current end reads back as
    /// zeros. Empty writes change nothing.
    pub fn write_at(&mut self, offset: u64, data: &[u8]) -> io::Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let file = self.file.as_file_mut();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;
        self.dirty = true;
        Ok(data.len())
    }

    /// Truncates or zero-extends to `len` bytes.
    pub fn set_len(&mut self, len: u64) -> io::Result<()> {
        if self.len()? != len {
            self.file.as_file().set_len(len)?;
            self.dirty = true;
        }
        Ok(())
    }

    pub fn len(&self) -> io::Result<u64> {
        Ok(self.file.as_file().metadata()?.len())
    }

    pub fn is_empty(&self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Whole content, for upload.
    pub fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let file = self.file.as_file_mut();
        file.seek(SeekFrom::Start(0))?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Ok(content)
    }

    /// Replaces the content with a copy of the remote body. Leaves the file
    /// clean.
    pub fn replace_with(&mut self, data: &[u8]) -> io::Result<()> {
        let file = self.file.as_file_mut();
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(data)?;
        self.dirty = false;
        Ok(())
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Location on disk, for diagnostics.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
