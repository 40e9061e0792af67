use chrono::{DateTime, Local};
use std::fmt::{self, Display};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A candidate export file found in the working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    /// Size in bytes, for display only
    pub size: u64,
    /// Last-modified time, the selection key
    pub modified: SystemTime,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: SystemTime) -> Self {
        Self {
            path: path.into(),
            size,
            modified,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name component, lossily decoded
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn human_size(&self) -> String {
        format_size(self.size)
    }

    pub fn modified_local(&self) -> DateTime<Local> {
        DateTime::<Local>::from(self.modified)
    }
}

impl Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, modified {})",
            self.path.display(),
            self.human_size(),
            self.modified_local().format("%Y-%m-%d %H:%M:%S")
        )
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
