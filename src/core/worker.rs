//! Preview worker thread for fiander.
//!
//! Reading and highlighting a file is the one thing fiander does off the main thread.
//! Requests [WorkerTask] come in from the AppState, results [WorkerResponse] go back the same
//! way. Every task carries a generation id; the worker drops tasks that are already stale and
//! the session drops responses that no longer match its current generation.

use crate::core::error::PreviewError;
use crate::core::fm::FileEntry;
use crate::core::highlight::Highlighter;
use crate::core::listing::{DirectoryListing, SortSpec};

use crossbeam_channel::{Receiver, Sender, unbounded};

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

/// Channels and the shared generation counter of the preview worker.
pub struct Workers {
    preview_tx: Sender<WorkerTask>,
    response_rx: Receiver<WorkerResponse>,
    generation: Arc<AtomicU64>,
}

impl Workers {
    /// Spawns the preview thread around `highlighter`.
    pub fn spawn(highlighter: Arc<dyn Highlighter>) -> Self {
        let (preview_tx, preview_rx) = unbounded::<WorkerTask>();
        let (res_tx, response_rx) = unbounded::<WorkerResponse>();
        let generation = Arc::new(AtomicU64::new(0));

        start_preview_worker(preview_rx, res_tx, highlighter, Arc::clone(&generation));

        Self {
            preview_tx,
            response_rx,
            generation,
        }
    }

    /// Invalidates every preview in flight and returns the new current generation.
    pub fn next_generation(&self) -> u64 {
        self.generation
            .fetch_add(1, Ordering::AcqRel)
            .wrapping_add(1)
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Accessor for the preview worker task sender.
    pub fn preview_tx(&self) -> &Sender<WorkerTask> {
        &self.preview_tx
    }

    /// Accessor for the worker response receiver.
    pub fn response_rx(&self) -> &Receiver<WorkerResponse> {
        &self.response_rx
    }
}

/// Tasks sent to the worker thread via channel.
#[derive(Debug, Clone)]
pub enum WorkerTask {
    LoadPreview {
        path: PathBuf,
        is_dir: bool,
        max_lines: usize,
        show_hidden: bool,
        sort: SortSpec,
        request_id: u64,
    },
}

/// What a preview resolved to.
#[derive(Debug, Clone)]
pub enum PreviewContent {
    Lines(Vec<String>),
    Directory { entries: Vec<FileEntry>, total: usize },
}

/// Responses sent from the worker thread back to the main thread via the channel.
#[derive(Debug)]
pub enum WorkerResponse {
    PreviewLoaded {
        path: PathBuf,
        content: PreviewContent,
        request_id: u64,
    },
    PreviewFailed {
        path: PathBuf,
        error: PreviewError,
        request_id: u64,
    },
}

impl WorkerResponse {
    pub fn request_id(&self) -> u64 {
        match self {
            WorkerResponse::PreviewLoaded { request_id, .. }
            | WorkerResponse::PreviewFailed { request_id, .. } => *request_id,
        }
    }
}

/// Starts the preview worker thread
///
/// # Arguments
/// * `task_rx` - Receiver channel for incoming tasks
/// * `res_tx` - Sender channel for outgoing responses
/// * `highlighter` - Produces the lines of file previews
/// * `generation` - The session's current generation, shared with [Workers]
fn start_preview_worker(
    task_rx: Receiver<WorkerTask>,
    res_tx: Sender<WorkerResponse>,
    highlighter: Arc<dyn Highlighter>,
    generation: Arc<AtomicU64>,
) {
    thread::spawn(move || {
        while let Ok(mut task) = task_rx.recv() {
            // Coalesce queued tasks to only process the latest
            while let Ok(next) = task_rx.try_recv() {
                task = next;
            }

            let WorkerTask::LoadPreview {
                path,
                is_dir,
                max_lines,
                show_hidden,
                sort,
                request_id,
            } = task;

            let is_stale = || generation.load(Ordering::Acquire) != request_id;
            if is_stale() {
                tracing::trace!(request_id, "skipping stale preview before load");
                continue;
            }

            let result = if is_dir {
                DirectoryListing::read(&path, sort, show_hidden)
                    .map(|listing| PreviewContent::Directory {
                        total: listing.len(),
                        entries: listing.entries().iter().take(max_lines).cloned().collect(),
                    })
                    .map_err(|e| PreviewError::Unreadable(e.to_string()))
            } else {
                highlighter
                    .highlight(&path, max_lines)
                    .map(PreviewContent::Lines)
            };

            if is_stale() {
                tracing::trace!(request_id, "dropping stale preview after load");
                continue;
            }

            let response = match result {
                Ok(content) => WorkerResponse::PreviewLoaded {
                    path,
                    content,
                    request_id,
                },
                Err(error) => WorkerResponse::PreviewFailed {
                    path,
                    error,
                    request_id,
                },
            };
            if res_tx.send(response).is_err() {
                break;
            }
        }
    });
}
