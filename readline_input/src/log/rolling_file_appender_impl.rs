// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use miette::IntoDiagnostic;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// A file appender that never rotates, writing to `path`.
///
/// Wrapping this in [`tracing_appender::non_blocking`] loses lines when the program
/// exits right after logging, so it is used as is.
///
/// # Errors
///
/// If `path` has no file name, or the file can't be created.
pub fn try_create(path: &Path) -> miette::Result<RollingFileAppender> {
    let file_name = path.file_name().ok_or_else(|| {
        miette::miette!("Can't use {} as a log file, it has no file name.", path.display())
    })?;

    let parent = match path.parent() {
        Some(it) if !it.as_os_str().is_empty() => it,
        _ => Path::new("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(parent)
        .into_diagnostic()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_path_without_file_name() {
        assert!(try_create(Path::new("/")).is_err());
    }

    #[test]
    fn test_creates_file_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.log");
        assert!(try_create(&path).is_ok());
        assert!(path.exists());
    }
}
