//! Per-stream request coordination
//!
//! Each stream (browsing a user's repositories, full-text search) has at most
//! one live request. Issuing a new one cancels its predecessor, and a
//! superseded request never reports success to its caller.

use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Independent sequence of user-driven queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    /// `user/repo` and `/repo` lookups
    Browse,
    /// Debounced full-text search
    Search,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Browse => write!(f, "browse"),
            Stream::Search => write!(f, "search"),
        }
    }
}

struct StreamState {
    /// Cancelled by an explicit `cancel`, reaching every request of the stream
    root: CancellationToken,
    /// Most recently issued request that has not finished yet
    current: Option<(u64, CancellationToken)>,
}

#[derive(Default)]
pub struct RequestCoordinator {
    streams: Mutex<HashMap<Stream, StreamState>>,
    next_generation: AtomicU64,
}

impl RequestCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `request` as the newest request of `stream`.
    ///
    /// With `cancel_previous`, the outstanding request of the stream is
    /// cancelled first, and this request reports `Cancelled` if it is itself
    /// superseded before it completes, even when the fetch succeeded. A
    /// cancelled request's future is dropped, so it never gets to publish
    /// anything.
    pub async fn issue<T, F, Fut>(
        &self,
        stream: Stream,
        request: F,
        cancel_previous: bool,
    ) -> Result<T, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let (generation, token) = self.register(stream, cancel_previous);

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(FetchError::Cancelled),
            result = request() => result,
        };

        let still_current = self.finish(stream, generation);

        match outcome {
            Err(FetchError::Cancelled) => {
                debug!("Request {} on {} stream cancelled", generation, stream);
                Err(FetchError::Cancelled)
            }
            _ if cancel_previous && !still_current => {
                debug!(
                    "Request {} on {} stream superseded, discarding result",
                    generation, stream
                );
                Err(FetchError::Cancelled)
            }
            outcome => outcome,
        }
    }

    /// Cancel every outstanding request of `stream`
    pub fn cancel(&self, stream: Stream) {
        if let Some(state) = self.lock().remove(&stream) {
            debug!("Cancelling {} stream", stream);
            state.root.cancel();
        }
    }

    /// Whether `stream` has a request that has neither finished nor been superseded
    #[allow(dead_code)]
    pub fn is_outstanding(&self, stream: Stream) -> bool {
        self.lock()
            .get(&stream)
            .is_some_and(|state| state.current.is_some())
    }

    fn register(&self, stream: Stream, cancel_previous: bool) -> (u64, CancellationToken) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let mut streams = self.lock();
        let state = streams.entry(stream).or_insert_with(|| StreamState {
            root: CancellationToken::new(),
            current: None,
        });

        if cancel_previous {
            if let Some((previous, token)) = state.current.take() {
                debug!(
                    "Request {} on {} stream supersedes {}",
                    generation, stream, previous
                );
                token.cancel();
            }
        }

        let token = state.root.child_token();
        state.current = Some((generation, token.clone()));
        (generation, token)
    }

    /// Clear the slot if `generation` still owns it; false when superseded
    fn finish(&self, stream: Stream, generation: u64) -> bool {
        let mut streams = self.lock();
        match streams.get_mut(&stream) {
            Some(state) if matches!(state.current, Some((g, _)) if g == generation) => {
                state.current = None;
                true
            }
            _ => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Stream, StreamState>> {
        self.streams.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
