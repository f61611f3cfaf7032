//! Operating system capabilities: directory listing and Ctrl-C

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::domain::contract::Interrupt;
use crate::ui::path::DirectoryListing;

/// Lists one directory level with walkdir
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkDirListing;

impl DirectoryListing for WalkDirListing {
    fn list(&self, dir: &Path) -> Vec<PathBuf> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            match entry {
                Ok(entry) => entries.push(entry.into_path()),
                Err(err) => {
                    let quiet = err.io_error().is_some_and(|e| {
                        matches!(
                            e.kind(),
                            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
                        )
                    });
                    if !quiet {
                        tracing::debug!(dir = %dir.display(), "listing failed: {err}");
                    }
                }
            }
        }
        entries.sort();
        entries
    }
}

/// Interrupt notices from the process Ctrl-C signal
#[derive(Debug, Clone, Copy, Default)]
pub struct CtrlC;

#[async_trait::async_trait]
impl Interrupt for CtrlC {
    async fn notified(&self) {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!("cannot listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    }
}
