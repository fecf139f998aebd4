//! Watch supervisor: owns the worker thread and its stop signal.
//!
//! Events accumulate in two pending path sets between drains; every batch
//! interval both sets are drained as one batch, modified paths first, then
//! deleted paths. Batches are strictly sequential, and the stop signal is
//! honored between batches, never mid-file.

use crate::error::{IngestError, IngestResult};
use crate::pipeline::{IngestOutcome, IngestPipeline};
use crate::watcher::{DirWatcher, WatchEvent, WatcherConfig};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tome_config::Config;
use tome_store::write_manifest;
use tracing::{debug, info, warn};

/// Pending file paths awaiting the next batch drain, deduplicated by path.
#[derive(Debug, Default)]
pub struct PendingBatch {
    modified: HashSet<PathBuf>,
    deleted: HashSet<PathBuf>,
}

impl PendingBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, event: WatchEvent) {
        match event {
            WatchEvent::Modified(path) => {
                self.modified.insert(path);
            }
            WatchEvent::Deleted(path) => {
                self.deleted.insert(path);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.modified.is_empty() && self.deleted.is_empty()
    }

    /// Drain both sets as one atomic batch.
    ///
    /// A path present in both sets within the same cycle is classified by
    /// its current existence on disk: still present means modified, gone
    /// means deleted.
    pub fn drain(&mut self) -> (Vec<PathBuf>, Vec<PathBuf>) {
        let mut modified: Vec<PathBuf> = Vec::new();
        let mut deleted: Vec<PathBuf> = Vec::new();

        for path in self.modified.drain() {
            if self.deleted.contains(&path) {
                continue; // classified below
            }
            modified.push(path);
        }

        for path in self.deleted.drain() {
            if path.exists() {
                modified.push(path);
            } else {
                deleted.push(path);
            }
        }

        modified.sort();
        deleted.sort();
        (modified, deleted)
    }
}

/// Process one batch: all modified paths through the pipeline, then all
/// deleted paths. Each path's failure is logged individually; one bad file
/// never blocks the batch. Returns whether the store was mutated.
pub fn process_batch(
    pipeline: &IngestPipeline,
    modified: &[PathBuf],
    deleted: &[PathBuf],
) -> bool {
    let mut mutated = false;

    for path in modified {
        match pipeline.ingest_file(path) {
            Ok(IngestOutcome::Stored {
                version,
                chunk_count,
            }) => {
                info!(
                    "Ingested {:?}: version {} ({} chunks)",
                    path, version, chunk_count
                );
                mutated = true;
            }
            Ok(IngestOutcome::Duplicate) => {
                debug!("Unchanged file skipped: {:?}", path);
            }
            Ok(IngestOutcome::SkippedEmpty) => {
                warn!("No usable text extracted from {:?}", path);
            }
            Err(e) => {
                warn!("Failed to ingest {:?}: {}", path, e);
            }
        }
    }

    for path in deleted {
        match pipeline.delete_file(path) {
            Ok(0) => debug!("No stored chunks for deleted file {:?}", path),
            Ok(removed) => {
                info!("Removed {} chunks for {:?}", removed, path);
                mutated = true;
            }
            Err(e) => {
                warn!("Failed to process deletion of {:?}: {}", path, e);
            }
        }
    }

    mutated
}

/// Status of the watch worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchStatus {
    Running,
    Stopped,
}

impl std::fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatchStatus::Running => write!(f, "running"),
            WatchStatus::Stopped => write!(f, "stopped"),
        }
    }
}

/// Owns the watch worker thread and a cooperative stop token.
pub struct WatchSupervisor {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl WatchSupervisor {
    /// Start the watch worker.
    ///
    /// The worker subscribes to filesystem events under the configured
    /// roots, drains pending paths on the configured interval, and rewrites
    /// the manifest after every mutating batch.
    pub fn start(
        config: &Config,
        pipeline: IngestPipeline,
        manifest_path: PathBuf,
    ) -> IngestResult<Self> {
        if config.watch.directories.is_empty() {
            return Err(IngestError::WatchError(
                "no watch directories configured".to_string(),
            ));
        }

        let watcher_config = WatcherConfig::from_config(&config.watch);
        let mut watcher = DirWatcher::new(watcher_config)?;
        watcher.start()?;

        let interval = Duration::from_secs(config.watch.batch_interval_seconds.max(1));
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = std::thread::spawn(move || {
            run_watch_loop(watcher, pipeline, manifest_path, interval, stop_flag);
        });

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Request a cooperative stop and wait for the worker to finish its
    /// current batch.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Watch worker panicked during shutdown");
            }
        }
    }

    /// Current worker status.
    pub fn status(&self) -> WatchStatus {
        match &self.handle {
            Some(handle) if !handle.is_finished() => WatchStatus::Running,
            _ => WatchStatus::Stopped,
        }
    }
}

impl Drop for WatchSupervisor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_watch_loop(
    watcher: DirWatcher,
    pipeline: IngestPipeline,
    manifest_path: PathBuf,
    interval: Duration,
    stop: Arc<AtomicBool>,
) {
    info!("Watch worker started (batch interval {:?})", interval);

    let mut pending = PendingBatch::new();
    let mut last_drain = Instant::now();

    while !stop.load(Ordering::Relaxed) {
        std::thread::sleep(Duration::from_millis(100));

        for event in watcher.poll() {
            pending.absorb(event);
        }

        if last_drain.elapsed() >= interval {
            if !pending.is_empty() {
                let (modified, deleted) = pending.drain();
                debug!(
                    "Draining batch: {} modified, {} deleted",
                    modified.len(),
                    deleted.len()
                );

                let mutated = process_batch(&pipeline, &modified, &deleted);
                if mutated {
                    if let Err(e) = write_manifest(pipeline.store().as_ref(), &manifest_path) {
                        warn!("Failed to write manifest: {}", e);
                    }
                }
            }
            last_drain = Instant::now();
        }
    }

    info!("Watch worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tome_llm::{LlmResult, TextGenerator};
    use tome_store::{DocumentStore, SqliteStore};

    struct WholeTextGenerator;

    impl TextGenerator for WholeTextGenerator {
        fn generate(&self, prompt: &str, _system: &str) -> LlmResult<String> {
            let total: usize = prompt
                .lines()
                .find_map(|line| {
                    line.strip_prefix("# Original Data (Text Length: ")
                        .and_then(|rest| rest.trim_end_matches(')').parse().ok())
                })
                .unwrap_or(0);

            Ok(serde_json::json!({
                "summary": { "content": "A short summary." },
                "chunks": [
                    { "id": 1, "content_range": [0, total], "reasoning": "whole text" }
                ],
            })
            .to_string())
        }
    }

    fn test_pipeline() -> (IngestPipeline, Arc<dyn DocumentStore>) {
        let store: Arc<dyn DocumentStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let pipeline = IngestPipeline::new(
            &Config::default(),
            Box::new(WholeTextGenerator),
            Arc::clone(&store),
        );
        (pipeline, store)
    }

    #[test]
    fn test_pending_batch_deduplicates_paths() {
        let mut pending = PendingBatch::new();
        pending.absorb(WatchEvent::Modified(PathBuf::from("/tmp/a.txt")));
        pending.absorb(WatchEvent::Modified(PathBuf::from("/tmp/a.txt")));
        pending.absorb(WatchEvent::Deleted(PathBuf::from("/tmp/b.txt")));

        let (modified, deleted) = pending.drain();
        assert_eq!(modified.len(), 1);
        assert_eq!(deleted.len(), 1);
        assert!(pending.is_empty());
    }

    #[test]
    fn test_path_in_both_sets_classified_by_existence() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("still_here.txt");
        std::fs::write(&existing, "content").unwrap();
        let missing = dir.path().join("gone.txt");

        let mut pending = PendingBatch::new();
        pending.absorb(WatchEvent::Modified(existing.clone()));
        pending.absorb(WatchEvent::Deleted(existing.clone()));
        pending.absorb(WatchEvent::Modified(missing.clone()));
        pending.absorb(WatchEvent::Deleted(missing.clone()));

        let (modified, deleted) = pending.drain();
        assert_eq!(modified, vec![existing]);
        assert_eq!(deleted, vec![missing]);
    }

    #[test]
    fn test_process_batch_isolates_path_failures() {
        let (pipeline, store) = test_pipeline();
        let dir = tempfile::tempdir().unwrap();

        let good = dir.path().join("good.txt");
        std::fs::write(&good, "A perfectly fine document body.").unwrap();
        let bad = dir.path().join("bad.exe");
        std::fs::write(&bad, "binary").unwrap();

        let mutated = process_batch(&pipeline, &[bad, good], &[]);
        assert!(mutated);
        assert_eq!(store.stats().unwrap().total_documents, 1);
    }

    #[test]
    fn test_process_batch_handles_deletions_after_modifications() {
        let (pipeline, store) = test_pipeline();
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "A document that will be deleted.").unwrap();
        process_batch(&pipeline, std::slice::from_ref(&path), &[]);
        assert_eq!(store.stats().unwrap().total_documents, 1);

        std::fs::remove_file(&path).unwrap();
        let mutated = process_batch(&pipeline, &[], &[path]);
        assert!(mutated);
        assert_eq!(store.stats().unwrap().total_documents, 0);
    }

    #[test]
    fn test_supervisor_ingests_new_files_and_stops_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("file_list.json");
        let watch_dir = dir.path().join("docs");
        std::fs::create_dir_all(&watch_dir).unwrap();

        let mut config = Config::default();
        config.watch.directories = vec![watch_dir.to_string_lossy().to_string()];
        config.watch.batch_interval_seconds = 1;

        let (pipeline, store) = test_pipeline();
        let mut supervisor =
            WatchSupervisor::start(&config, pipeline, manifest.clone()).unwrap();
        assert_eq!(supervisor.status(), WatchStatus::Running);

        std::fs::write(watch_dir.join("incoming.txt"), "A brand new document body.").unwrap();

        // Allow the debouncer and a batch drain to run.
        let deadline = Instant::now() + Duration::from_secs(15);
        while Instant::now() < deadline {
            if store.stats().unwrap().total_documents > 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(200));
        }

        supervisor.stop();
        assert_eq!(supervisor.status(), WatchStatus::Stopped);

        assert_eq!(store.stats().unwrap().total_documents, 1);
        assert!(manifest.exists());
    }

    #[test]
    fn test_supervisor_requires_watch_directories() {
        let (pipeline, _) = test_pipeline();
        let result = WatchSupervisor::start(
            &Config::default(),
            pipeline,
            PathBuf::from("/tmp/file_list.json"),
        );
        assert!(result.is_err());
    }
}
