//! Scoped temporary file holding the decoded audio of the active track.

use std::io;
use std::path::Path;

use tempfile::NamedTempFile;

/// Exclusively owned decoded audio on disk.
///
/// Released by [`TempAudio::release`] (close, then delete explicitly) or, on
/// any other exit path, by `Drop`.
#[derive(Debug)]
pub struct TempAudio {
    file: Option<NamedTempFile>,
}

impl TempAudio {
    pub fn create(prefix: &str) -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".wav")
            .tempfile()?;
        Ok(Self { file: Some(file) })
    }

    pub fn path(&self) -> &Path {
        match &self.file {
            Some(f) => f.path(),
            None => Path::new(""),
        }
    }

    pub fn as_file_mut(&mut self) -> Option<&mut std::fs::File> {
        self.file.as_mut().map(NamedTempFile::as_file_mut)
    }

    /// Close the handle and delete the file. Idempotent.
    pub fn release(&mut self) -> io::Result<()> {
        match self.file.take() {
            // `close` drops our handle before unlinking, which platforms that
            // refuse to delete open files require.
            Some(f) => f.close(),
            None => Ok(()),
        }
    }

    #[cfg(test)]
    pub fn is_released(&self) -> bool {
        self.file.is_none()
    }
}

impl Drop for TempAudio {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!(error = %e, "failed to delete temporary audio");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_deletes_the_file_and_is_idempotent() {
        let mut t = TempAudio::create("segue-test_").unwrap();
        let path = t.path().to_path_buf();
        assert!(path.exists());
        assert!(
            path.file_name()
                .and_then(|n| n.to_str())
                .unwrap()
                .starts_with("segue-test_")
        );

        t.release().unwrap();
        assert!(!path.exists());
        assert!(t.is_released());
        t.release().unwrap();
    }

    #[test]
    fn drop_deletes_the_file() {
        let t = TempAudio::create("segue-test_").unwrap();
        let path = t.path().to_path_buf();
        drop(t);
        assert!(!path.exists());
    }
}
