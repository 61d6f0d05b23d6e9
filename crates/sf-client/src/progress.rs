//! Upload progress reporting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

/// Chunk size used when streaming request bodies.
pub(crate) const CHUNK_SIZE: usize = 64 * 1024;

/// Snapshot of an upload in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    /// Bytes handed to the connection so far.
    pub sent: u64,
    /// Total body size.
    pub total: u64,
}

impl UploadProgress {
    pub fn is_complete(&self) -> bool {
        self.sent >= self.total
    }
}

/// Callback invoked as a request body is transferred.
#[derive(Clone)]
pub struct ProgressObserver(Arc<dyn Fn(UploadProgress) + Send + Sync>);

impl ProgressObserver {
    pub fn new(f: impl Fn(UploadProgress) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn notify(&self, progress: UploadProgress) {
        (self.0)(progress)
    }
}

impl std::fmt::Debug for ProgressObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ProgressObserver(..)")
    }
}

/// Split `body` into chunks and report each one as it is pulled by the transport.
pub(crate) fn observed_stream(
    body: Bytes,
    observer: ProgressObserver,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static {
    let total = body.len() as u64;
    let sent = Arc::new(AtomicU64::new(0));

    let chunks: Vec<Bytes> = if body.is_empty() {
        Vec::new()
    } else {
        (0..body.len())
            .step_by(CHUNK_SIZE)
            .map(|start| body.slice(start..(start + CHUNK_SIZE).min(body.len())))
            .collect()
    };

    stream::iter(chunks).map(move |chunk| {
        let sent = sent.fetch_add(chunk.len() as u64, Ordering::SeqCst) + chunk.len() as u64;
        observer.notify(UploadProgress { sent, total });
        Ok(chunk)
    })
}
