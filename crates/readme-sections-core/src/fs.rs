//! File-access capability used by the merger, plus the implementations the
//! crate ships: the real file system, an in-memory double and a dry-run
//! overlay.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Mode for documents the merger creates: owner read/write, others read.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Whole-file read/write access to documents.
pub trait DocumentFs {
    type Error: StdError + Send + Sync + 'static;

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, Self::Error>;

    /// Replaces the whole file. `mode` applies when the file is created.
    fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> Result<(), Self::Error>;

    /// Reports whether `err` means the path does not exist.
    fn is_not_exist(&self, err: &Self::Error) -> bool;
}

impl<T: DocumentFs + ?Sized> DocumentFs for &T {
    type Error = T::Error;

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, Self::Error> {
        (**self).read_file(path)
    }

    fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> Result<(), Self::Error> {
        (**self).write_file(path, data, mode)
    }

    fn is_not_exist(&self, err: &Self::Error) -> bool {
        (**self).is_not_exist(err)
    }
}

/// The real file system. Writes are atomic renames of a synced temp file.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs {
    pub backup: bool,
}

impl StdFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backup(backup: bool) -> Self {
        Self { backup }
    }
}

impl DocumentFs for StdFs {
    type Error = io::Error;

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()> {
        write_atomic(path, data, mode, self.backup)
    }

    fn is_not_exist(&self, err: &io::Error) -> bool {
        err.kind() == io::ErrorKind::NotFound
    }
}

/// Writes `data` to a temporary sibling and renames it over `path`.
///
/// An existing file keeps its permissions and, with `backup`, is copied to
/// `<path>.bak` first. New files get `mode`.
pub fn write_atomic(path: &Path, data: &[u8], mode: u32, backup: bool) -> io::Result<()> {
    let tmp_path = unique_tmp_path(path);
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
    }

    let existing = fs::metadata(path).ok();
    let permissions = match &existing {
        Some(metadata) => fs::set_permissions(&tmp_path, metadata.permissions()),
        None => set_mode(&tmp_path, mode),
    };
    if let Err(err) = permissions {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    if backup && existing.is_some() {
        if let Err(err) = fs::copy(path, path.with_extension("bak")) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

fn unique_tmp_path(path: &Path) -> PathBuf {
    let mut counter = 0u32;
    loop {
        let candidate = if counter == 0 {
            path.with_extension("tmp")
        } else {
            path.with_extension(format!("tmp{counter}"))
        };

        if !candidate.exists() {
            return candidate;
        }

        counter += 1;
    }
}

#[derive(Debug, Clone)]
struct MemoryFile {
    data: Vec<u8>,
    mode: u32,
}

/// In-memory documents for tests and embedding. Not thread-safe.
#[derive(Debug, Default)]
pub struct MemoryFs {
    files: RefCell<HashMap<PathBuf, MemoryFile>>,
    read_failures: RefCell<HashMap<PathBuf, io::ErrorKind>>,
    write_limit: Cell<Option<usize>>,
    writes: Cell<usize>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        self.files.borrow_mut().insert(
            path.into(),
            MemoryFile {
                data: content.into(),
                mode: DEFAULT_FILE_MODE,
            },
        );
    }

    /// Makes every read of `path` fail with `kind`.
    pub fn fail_reads(&self, path: impl Into<PathBuf>, kind: io::ErrorKind) {
        self.read_failures.borrow_mut().insert(path.into(), kind);
    }

    /// Lets `count` more writes succeed, then fails the rest.
    pub fn fail_writes_after(&self, count: usize) {
        self.write_limit.set(Some(self.writes.get() + count));
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .borrow()
            .get(path.as_ref())
            .map(|file| String::from_utf8_lossy(&file.data).into_owned())
    }

    pub fn mode(&self, path: impl AsRef<Path>) -> Option<u32> {
        self.files.borrow().get(path.as_ref()).map(|file| file.mode)
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl DocumentFs for MemoryFs {
    type Error = io::Error;

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        if let Some(kind) = self.read_failures.borrow().get(path) {
            return Err(io::Error::new(*kind, format!("read of {} failed", path.display())));
        }

        self.files
            .borrow()
            .get(path)
            .map(|file| file.data.clone())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()> {
        if let Some(limit) = self.write_limit.get() {
            if self.writes.get() >= limit {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("write of {} failed", path.display()),
                ));
            }
        }

        let mut files = self.files.borrow_mut();
        let mode = files.get(path).map_or(mode, |existing| existing.mode);
        files.insert(
            path.to_path_buf(),
            MemoryFile {
                data: data.to_vec(),
                mode,
            },
        );
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn is_not_exist(&self, err: &io::Error) -> bool {
        err.kind() == io::ErrorKind::NotFound
    }
}

/// Reads through to `inner` until a path is written; writes stay in memory.
#[derive(Debug)]
pub struct OverlayFs<F> {
    inner: F,
    staged: RefCell<HashMap<PathBuf, Vec<u8>>>,
}

impl<F: DocumentFs> OverlayFs<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            staged: RefCell::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Content written for `path`, if any write reached the overlay.
    pub fn staged(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.staged.borrow().get(path.as_ref()).cloned()
    }

    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F: DocumentFs> DocumentFs for OverlayFs<F> {
    type Error = F::Error;

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, F::Error> {
        if let Some(data) = self.staged.borrow().get(path) {
            return Ok(data.clone());
        }
        self.inner.read_file(path)
    }

    fn write_file(&self, path: &Path, data: &[u8], _mode: u32) -> Result<(), F::Error> {
        self.staged
            .borrow_mut()
            .insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }

    fn is_not_exist(&self, err: &F::Error) -> bool {
        self.inner.is_not_exist(err)
    }
}
