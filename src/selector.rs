//! Locating the newest export in a directory.

use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

use crate::artifact::Artifact;
use crate::error::{MailerError, Result};
use crate::pattern::FilePattern;

/// One regular file in a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub size: u64,
    pub modified: SystemTime,
}

/// Source of directory contents, one level deep.
///
/// Implementations return regular files only. Subdirectories and entries that
/// cannot be inspected are left out.
pub trait DirectoryListing {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>>;
}

impl<F> DirectoryListing for F
where
    F: Fn(&Path) -> io::Result<Vec<DirEntryInfo>>,
{
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        self(dir)
    }
}

/// Lists the real file system
#[derive(Debug, Default, Clone, Copy)]
pub struct FsListing;

impl DirectoryListing for FsListing {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let path = entry.path();
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!("Cannot stat {}: {}", path.display(), e);
                    continue;
                }
            };

            if !metadata.is_file() {
                continue;
            }

            let modified = match metadata.modified() {
                Ok(modified) => modified,
                Err(e) => {
                    warn!("No modification time for {}: {}", path.display(), e);
                    continue;
                }
            };

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                debug!("Skipping non UTF-8 file name: {}", path.display());
                continue;
            };

            entries.push(DirEntryInfo {
                name,
                size: metadata.len(),
                modified,
            });
        }

        Ok(entries)
    }
}

/// Picks the newest file matching a pattern
pub struct ArtifactSelector<L> {
    listing: L,
    pattern: FilePattern,
}

impl<L: DirectoryListing> ArtifactSelector<L> {
    pub fn new(listing: L, pattern: FilePattern) -> Self {
        Self { listing, pattern }
    }

    pub fn pattern(&self) -> &FilePattern {
        &self.pattern
    }

    /// All matching files in `dir`, newest first.
    ///
    /// Equal modification times fall back to file name order.
    pub fn candidates(&self, dir: &Path) -> io::Result<Vec<Artifact>> {
        let mut matching: Vec<DirEntryInfo> = self
            .listing
            .list(dir)?
            .into_iter()
            .filter(|entry| self.pattern.matches(&entry.name))
            .collect();

        matching.sort_by(newest_first);

        Ok(matching
            .into_iter()
            .map(|entry| Artifact::new(dir.join(&entry.name), entry.size, entry.modified))
            .collect())
    }

    /// The newest matching file in `dir`
    pub fn select(&self, dir: &Path) -> Result<Artifact> {
        let not_found = |source: Option<io::Error>| MailerError::ArtifactNotFound {
            dir: PathBuf::from(dir),
            pattern: self.pattern.to_string(),
            source,
        };

        let candidates = self.candidates(dir).map_err(|e| not_found(Some(e)))?;
        debug!(
            "{} file(s) match '{}' in {}",
            candidates.len(),
            self.pattern,
            dir.display()
        );

        let newest = candidates.into_iter().next().ok_or_else(|| not_found(None))?;
        info!("Selected {}", newest.path.display());
        Ok(newest)
    }
}

fn newest_first(a: &DirEntryInfo, b: &DirEntryInfo) -> Ordering {
    b.modified
        .cmp(&a.modified)
        .then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn entry(name: &str, secs: u64) -> DirEntryInfo {
        DirEntryInfo {
            name: name.to_string(),
            size: 100,
            modified: UNIX_EPOCH + Duration::from_secs(secs),
        }
    }

    fn selector_over(
        entries: Vec<DirEntryInfo>,
    ) -> ArtifactSelector<impl Fn(&Path) -> io::Result<Vec<DirEntryInfo>>> {
        let listing = move |_: &Path| -> io::Result<Vec<DirEntryInfo>> { Ok(entries.clone()) };
        ArtifactSelector::new(listing, FilePattern::new("chat_ebook_*.pdf"))
    }

    #[test]
    fn test_selects_newest() {
        let selector = selector_over(vec![
            entry("chat_ebook_2025-01-01.pdf", 1_000),
            entry("chat_ebook_2025-01-02.pdf", 2_000),
            entry("notes.txt", 9_000),
        ]);

        let artifact = selector.select(Path::new("/exports")).unwrap();
        assert_eq!(artifact.path, PathBuf::from("/exports/chat_ebook_2025-01-02.pdf"));
        assert_eq!(artifact.size, 100);
    }

    #[test]
    fn test_tie_break_by_name() {
        let selector = selector_over(vec![
            entry("chat_ebook_b.pdf", 5_000),
            entry("chat_ebook_c.pdf", 5_000),
            entry("chat_ebook_a.pdf", 5_000),
            entry("chat_ebook_old.pdf", 1_000),
        ]);

        let names: Vec<String> = selector
            .candidates(Path::new("."))
            .unwrap()
            .iter()
            .map(Artifact::file_name)
            .collect();
        assert_eq!(
            names,
            vec![
                "chat_ebook_a.pdf",
                "chat_ebook_b.pdf",
                "chat_ebook_c.pdf",
                "chat_ebook_old.pdf"
            ]
        );
    }

    #[test]
    fn test_no_match_is_not_found() {
        let selector = selector_over(vec![entry("ebook_state.json", 1), entry("chat.pdf", 2)]);

        let err = selector.select(Path::new("/exports")).unwrap_err();
        match err {
            MailerError::ArtifactNotFound { dir, pattern, source } => {
                assert_eq!(dir, PathBuf::from("/exports"));
                assert_eq!(pattern, "chat_ebook_*.pdf");
                assert!(source.is_none());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_listing_failure_is_not_found() {
        let listing = |_: &Path| -> io::Result<Vec<DirEntryInfo>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        };
        let selector = ArtifactSelector::new(listing, FilePattern::new("*.pdf"));

        let err = selector.select(Path::new("/locked")).unwrap_err();
        assert!(matches!(err, MailerError::ArtifactNotFound { source: Some(_), .. }));
    }

    #[test]
    fn test_fs_listing_skips_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("chat_ebook_1.pdf"), b"%PDF-1.4").unwrap();
        fs::create_dir(dir.path().join("chat_ebook_dir.pdf")).unwrap();

        let entries = FsListing.list(dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "chat_ebook_1.pdf");
        assert_eq!(entries[0].size, 8);
    }
}
