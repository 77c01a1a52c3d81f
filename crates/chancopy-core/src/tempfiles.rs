use std::path::{Path, PathBuf};

use tracing::debug;

/// Scoped cleanup for per-post downloads.
///
/// Every file tracked here is removed when the batch drops, which covers all
/// exit paths of a copy attempt: success, upload failure, and early `?`.
/// Files that are already gone are not an error.
#[derive(Debug, Default)]
pub struct TempBatch {
    files: Vec<PathBuf>,
}

impl TempBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, path: impl Into<PathBuf>) {
        self.files.push(path.into());
    }
}

impl Drop for TempBatch {
    fn drop(&mut self) {
        for path in self.files.drain(..) {
            remove_quietly(&path);
        }
    }
}

fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed temp file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => debug!(path = %path.display(), error = %e, "could not remove temp file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_file(prefix: &str) -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let pid = std::process::id();
        PathBuf::from(format!("/tmp/{prefix}-{pid}-{ts}"))
    }

    #[test]
    fn removes_tracked_files_on_drop() {
        let a = tmp_file("chancopy-batch-a");
        let b = tmp_file("chancopy-batch-b");
        std::fs::write(&a, b"x").unwrap();
        std::fs::write(&b, b"y").unwrap();

        {
            let mut batch = TempBatch::new();
            batch.track(&a);
            batch.track(&b);
            assert!(a.exists());
        }

        assert!(!a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn missing_files_are_tolerated() {
        let mut batch = TempBatch::new();
        batch.track(tmp_file("chancopy-batch-missing"));
        drop(batch); // must not panic
    }
}
