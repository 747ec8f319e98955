use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Lazy factory for a readable stream over one downloaded file.
///
/// Download runners return openers instead of open handles so callers
/// control resource lifetime and can re-open a file any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct FileOpener {
    base: PathBuf,
    relative: PathBuf,
}

impl FileOpener {
    pub fn new(base: impl Into<PathBuf>, relative: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            relative: relative.into(),
        }
    }

    /// Absolute location of the file.
    pub fn path(&self) -> PathBuf {
        self.base.join(&self.relative)
    }

    /// Location relative to the download root, as named by the source
    /// `File` record.
    pub fn relative_path(&self) -> &Path {
        &self.relative
    }

    /// Open the file for reading. The handle closes when dropped.
    pub fn open(&self) -> io::Result<fs::File> {
        fs::File::open(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::io::Write;

    #[test]
    fn opens_lazily_and_repeatedly() {
        let dir = tempfile::tempdir().unwrap();
        let opener = FileOpener::new(dir.path(), "greeting.txt");

        // The file does not exist yet; constructing the opener is fine.
        assert!(opener.open().is_err());

        fs::File::create(dir.path().join("greeting.txt"))
            .unwrap()
            .write_all(b"hello")
            .unwrap();

        for _ in 0..2 {
            let mut contents = String::new();
            opener.open().unwrap().read_to_string(&mut contents).unwrap();
            assert_eq!(contents, "hello");
        }
    }
}
