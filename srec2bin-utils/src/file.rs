use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A created file that will be deleted when the handle is dropped, unless
/// `persist` is called first. Used for outputs that must not be left behind
/// half-written.
#[derive(Debug)]
pub struct TransientFile {
    file: File,
    path: PathBuf,
    persist: bool,
}

impl TransientFile {
    /// Create (or truncate) the file at `path`.
    pub fn create<P: Into<PathBuf>>(path: P) -> io::Result<Self> {
        let path = path.into();
        let file = File::create(&path)?;
        Ok(Self {
            file,
            path,
            persist: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush everything to disk and keep the file once the handle is dropped.
    pub fn persist(mut self) -> io::Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        self.persist = true;
        Ok(())
    }
}

impl Drop for TransientFile {
    fn drop(&mut self) {
        if !self.persist {
            // We can't report an error or panic here, so just ignore the result.
            let _ = fs::remove_file(&self.path);
        }
    }
}

impl Write for TransientFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
