//! Asynchronous error channel: decouples error producers from consumers.
//!
//! Producers enqueue without blocking. Consumers pull a lazy stream; every
//! enqueued error is delivered to exactly one consumer.
//!
//! The queue lock is held only while popping. Waiting happens on a
//! [`Notify`] outside the lock, so a consumer that stops polling never
//! blocks the others.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::Stream;
use futures::stream;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use faultline_core::error::EngineError;
use faultline_core::raised::Raised;

/// State shared by the channel and every consumer stream.
#[derive(Debug, Default)]
struct Shared {
    /// Pending errors, oldest first.
    queue: Mutex<VecDeque<Raised>>,
    /// Wakes consumers waiting for the next error.
    available: Notify,
}

impl Shared {
    fn try_pop(&self) -> Option<Raised> {
        self.queue.lock().pop_front()
    }

    /// Waits for the next error. Cancel-safe: an error is removed from the
    /// queue only in the poll that returns it.
    async fn pop(&self) -> Raised {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            // Register before checking, so an enqueue in between is not missed.
            notified.as_mut().enable();

            let popped = self.try_pop();
            if let Some(error) = popped {
                return error;
            }
            notified.await;
        }
    }
}

/// Unbounded multi-producer, multi-consumer queue of raised errors.
#[derive(Debug)]
pub struct AsyncErrorChannel {
    shared: Arc<Shared>,
}

impl AsyncErrorChannel {
    /// Creates an empty channel.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
        }
    }

    /// Enqueues `error` without blocking.
    pub fn enqueue(&self, error: Raised) {
        trace!(error_type = %error.error_type(), "Error enqueued");
        self.shared.queue.lock().push_back(error);
        self.shared.available.notify_waiters();
    }

    /// Enqueues `error`; the asynchronous form of [`enqueue`](Self::enqueue).
    pub async fn write(&self, error: Raised) {
        self.enqueue(error);
    }

    /// Pulls the next error if one is queued, without waiting.
    pub fn try_next(&self) -> Option<Raised> {
        self.shared.try_pop()
    }

    /// Returns the number of queued errors.
    pub fn len(&self) -> usize {
        self.shared.queue.lock().len()
    }

    /// Returns whether no error is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a lazy stream of enqueued errors.
    ///
    /// The stream ends cleanly if `cancel` fires before it starts waiting
    /// for the next error. If `cancel` fires while it is waiting, it yields
    /// a single `Err(EngineError::Cancelled)` and then ends. Cancelling one
    /// consumer never affects other consumers or producers.
    pub fn consume(
        &self,
        cancel: CancellationToken,
    ) -> impl Stream<Item = Result<Raised, EngineError>> + Send + 'static {
        let shared = Arc::clone(&self.shared);

        stream::unfold(
            (shared, cancel, false),
            |(shared, cancel, finished)| async move {
                if finished || cancel.is_cancelled() {
                    return None;
                }

                let next = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(EngineError::Cancelled),
                    error = shared.pop() => Ok(error),
                };

                let finished = next.is_err();
                Some((next, (shared, cancel, finished)))
            },
        )
    }
}

impl Default for AsyncErrorChannel {
    fn default() -> Self {
        Self::new()
    }
}
