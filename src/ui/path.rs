//! File path completion

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::prompt::{Completion, Suggestion};

/// Lists the entries of one directory
pub trait DirectoryListing: Send + Sync {
    /// Entries directly under `dir`; unreadable directories list as empty
    fn list(&self, dir: &Path) -> Vec<PathBuf>;
}

/// Completes paths typed relative to `base` (or absolute ones)
pub struct PathCompletion {
    base: PathBuf,
    listing: Arc<dyn DirectoryListing>,
}

impl PathCompletion {
    pub fn new(base: &Path, listing: Arc<dyn DirectoryListing>) -> Self {
        Self {
            base: base.to_path_buf(),
            listing,
        }
    }
}

impl Completion for PathCompletion {
    fn complete(&self, line: &str) -> Vec<Suggestion> {
        // "keys/ali" -> ("keys/", "ali")
        let (dir_part, prefix) = match line.rfind('/') {
            Some(idx) => line.split_at(idx + 1),
            None => ("", line),
        };
        let dir = if dir_part.is_empty() {
            self.base.clone()
        } else {
            self.base.join(dir_part)
        };

        self.listing
            .list(&dir)
            .into_iter()
            .filter_map(|entry| {
                let name = entry.file_name()?.to_str()?.to_string();
                if !name.starts_with(prefix) {
                    return None;
                }
                if name.starts_with('.') && !prefix.starts_with('.') {
                    return None;
                }
                Some(if entry.is_dir() {
                    Suggestion::new(format!("{dir_part}{name}/"), "dir")
                } else {
                    Suggestion::new(format!("{dir_part}{name}"), "")
                })
            })
            .collect()
    }
}
