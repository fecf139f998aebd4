//! File system watcher feeding the ingestion coordinator.

use crate::error::{IngestError, IngestResult};
use glob::Pattern;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, Debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Events emitted by the directory watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A file was created or modified.
    Modified(PathBuf),
    /// A file was deleted.
    Deleted(PathBuf),
}

/// Configuration for the directory watcher.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Directories to watch recursively.
    pub roots: Vec<PathBuf>,
    /// Patterns to ignore.
    pub ignore_patterns: Vec<Pattern>,
    /// Debounce duration for raw filesystem events.
    pub debounce: Duration,
}

impl WatcherConfig {
    /// Create from config.
    pub fn from_config(config: &tome_config::WatchConfig) -> Self {
        let roots = config
            .directories
            .iter()
            .map(|s| {
                let expanded = shellexpand::tilde(s);
                PathBuf::from(expanded.as_ref())
            })
            .collect();

        let ignore_patterns = config
            .ignore_patterns
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect();

        Self {
            roots,
            ignore_patterns,
            debounce: Duration::from_millis(500),
        }
    }
}

/// Recursive directory watcher with debounced events.
pub struct DirWatcher {
    config: WatcherConfig,
    debouncer: Debouncer<RecommendedWatcher>,
    receiver: Receiver<Result<Vec<DebouncedEvent>, notify::Error>>,
}

impl DirWatcher {
    /// Create a new watcher.
    pub fn new(config: WatcherConfig) -> IngestResult<Self> {
        let (tx, rx) = channel();

        let debouncer = new_debouncer(config.debounce, tx)
            .map_err(|e| IngestError::WatchError(e.to_string()))?;

        Ok(Self {
            config,
            debouncer,
            receiver: rx,
        })
    }

    /// Start watching configured directories.
    pub fn start(&mut self) -> IngestResult<()> {
        for dir in &self.config.roots {
            if !dir.exists() {
                warn!("Watch directory does not exist: {:?}", dir);
                continue;
            }

            info!("Watching directory: {:?}", dir);
            self.debouncer
                .watcher()
                .watch(dir, RecursiveMode::Recursive)
                .map_err(|e| IngestError::WatchError(e.to_string()))?;
        }

        Ok(())
    }

    /// Poll for pending events (non-blocking).
    pub fn poll(&self) -> Vec<WatchEvent> {
        let mut events = Vec::new();

        while let Ok(result) = self.receiver.try_recv() {
            match result {
                Ok(debounced_events) => {
                    for event in debounced_events {
                        self.process_event(event, &mut events);
                    }
                }
                Err(e) => {
                    error!("Watch error: {:?}", e);
                }
            }
        }

        events
    }

    /// Process a debounced event, expanding directories into per-file
    /// modify events.
    fn process_event(&self, event: DebouncedEvent, out: &mut Vec<WatchEvent>) {
        let path = &event.path;

        if self.should_ignore(path) {
            debug!("Ignoring file: {:?}", path);
            return;
        }

        if path.is_dir() {
            // A created directory is expanded into modify events for every
            // file already inside it.
            for entry in walkdir::WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let file_path = entry.path();
                if file_path.is_dir() || self.should_ignore(file_path) {
                    continue;
                }
                debug!("Directory event expanded to file: {:?}", file_path);
                out.push(WatchEvent::Modified(file_path.to_path_buf()));
            }
            return;
        }

        if path.exists() {
            debug!("File changed: {:?}", path);
            out.push(WatchEvent::Modified(path.clone()));
        } else {
            debug!("File deleted: {:?}", path);
            out.push(WatchEvent::Deleted(path.clone()));
        }
    }

    /// Check if a path should be ignored.
    fn should_ignore(&self, path: &Path) -> bool {
        if let Some(filename) = path.file_name().and_then(|n| n.to_str()) {
            // Hidden and OS-metadata files
            if filename.starts_with('.') {
                return true;
            }

            for pattern in &self.config.ignore_patterns {
                if pattern.matches(filename) {
                    return true;
                }
            }
        }

        let path_str = path.to_string_lossy();
        for pattern in &self.config.ignore_patterns {
            if pattern.matches(&path_str) {
                return true;
            }
        }

        false
    }
}

/// Scan a directory for existing ingestable files.
pub fn scan_directory(dir: &Path, ignore_patterns: &[Pattern]) -> IngestResult<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(IngestError::WatchError(format!(
            "Directory does not exist: {}",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_dir() || should_ignore_path(path, ignore_patterns) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    Ok(files)
}

fn should_ignore_path(path: &Path, patterns: &[Pattern]) -> bool {
    if let Some(filename) = path.file_name().and_then(|n| n.to_str()) {
        if filename.starts_with('.') {
            return true;
        }

        for pattern in patterns {
            if pattern.matches(filename) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_ignore() {
        let patterns = vec![
            Pattern::new("*.tmp").unwrap(),
            Pattern::new(".DS_Store").unwrap(),
        ];

        assert!(should_ignore_path(Path::new("/foo/bar/.hidden"), &patterns));
        assert!(should_ignore_path(Path::new("/foo/bar/file.tmp"), &patterns));
        assert!(should_ignore_path(Path::new("/foo/.DS_Store"), &patterns));
        assert!(!should_ignore_path(Path::new("/foo/bar/file.txt"), &patterns));
        assert!(!should_ignore_path(Path::new("/foo/bar/paper.pdf"), &patterns));
    }

    #[test]
    fn test_scan_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::fs::write(dir.path().join("b.tmp"), "b").unwrap();
        std::fs::write(dir.path().join(".hidden"), "h").unwrap();

        let patterns = vec![Pattern::new("*.tmp").unwrap()];
        let files = scan_directory(dir.path(), &patterns).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.txt"));
    }

    #[test]
    fn test_watcher_reports_created_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = WatcherConfig {
            roots: vec![dir.path().to_path_buf()],
            ignore_patterns: vec![],
            debounce: Duration::from_millis(100),
        };

        let mut watcher = DirWatcher::new(config).unwrap();
        watcher.start().unwrap();

        let file_path = dir.path().join("incoming.txt");
        std::fs::write(&file_path, "new document").unwrap();

        // Debounced events can take a moment to arrive.
        let mut events = Vec::new();
        for _ in 0..100 {
            events.extend(watcher.poll());
            if !events.is_empty() {
                break;
            }
            std::thread::sleep(Duration::from_millis(100));
        }

        assert!(events
            .iter()
            .any(|e| matches!(e, WatchEvent::Modified(p) if p.ends_with("incoming.txt"))));
    }
}
