//! FIFO backlog of render requests waiting for an idle worker
//!
//! Every entry carries the sending half of a oneshot channel, so a completion
//! can be resolved at most once by construction. Entries are never dropped
//! unresolved by the executor; if one is dropped anyway the caller sees
//! `TaskFailure::Aborted` instead of hanging.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::{Notify, oneshot};
use tracing::{debug, warn};

use crate::render::{RenderError, RenderOutcome, RenderRequest, TaskFailure};

/// A queued request plus the write-once slot for its outcome
#[derive(Debug)]
pub struct QueueEntry {
    request: RenderRequest,
    completion: oneshot::Sender<RenderOutcome>,
}

impl QueueEntry {
    pub fn request(&self) -> &RenderRequest {
        &self.request
    }

    /// Deliver the outcome to the waiting caller
    ///
    /// Returns `false` when the caller stopped waiting.
    pub fn resolve(self, outcome: RenderOutcome) -> bool {
        self.completion.send(outcome).is_ok()
    }
}

/// Caller-side view of a queued request
#[derive(Debug)]
pub struct CompletionHandle {
    url: String,
    receiver: oneshot::Receiver<RenderOutcome>,
}

impl CompletionHandle {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Wait for the request to resolve
    pub async fn wait(self) -> RenderOutcome {
        match self.receiver.await {
            Ok(outcome) => outcome,
            Err(_) => Err(RenderError::new(
                self.url,
                TaskFailure::Aborted("task was dropped before completing".to_string()),
            )),
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    entries: VecDeque<QueueEntry>,
    closed: bool,
}

/// Unbounded multi-producer queue consumed by the scheduler
#[derive(Debug, Default)]
pub struct TaskQueue {
    state: Mutex<QueueState>,
    available: Notify,
}

impl TaskQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request and hand back its completion handle
    ///
    /// After `close()` the handle is resolved immediately with
    /// `TaskFailure::ShuttingDown`.
    pub fn enqueue(&self, request: RenderRequest) -> CompletionHandle {
        let (sender, receiver) = oneshot::channel();
        let handle = CompletionHandle {
            url: request.url().to_string(),
            receiver,
        };

        let mut state = self.state.lock();
        if state.closed {
            drop(state);
            warn!("Rejecting '{}': queue closed for shutdown", request.url());
            let url = request.url().to_string();
            let _ = sender.send(Err(RenderError::new(url, TaskFailure::ShuttingDown)));
            return handle;
        }

        state.entries.push_back(QueueEntry {
            request,
            completion: sender,
        });
        let depth = state.entries.len();
        drop(state);

        debug!("Enqueued render request, queue depth {}", depth);
        self.available.notify_one();
        handle
    }

    /// Remove the oldest entry, if any
    pub fn dequeue(&self) -> Option<QueueEntry> {
        self.state.lock().entries.pop_front()
    }

    /// Wait for the oldest entry
    ///
    /// Returns `None` once the queue is closed and fully drained.
    pub async fn next(&self) -> Option<QueueEntry> {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock();
                if let Some(entry) = state.entries.pop_front() {
                    return Some(entry);
                }
                if state.closed {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Stop intake; already queued entries are still handed out
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        let pending = state.entries.len();
        drop(state);

        debug!("Task queue closed with {} pending entries", pending);
        self.available.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{HeaderMap, RenderResult};
    use std::sync::Arc;
    use std::time::Duration;

    fn ok_result(url: &str) -> RenderResult {
        RenderResult {
            body: "<html></html>".to_string(),
            status_code: 200,
            headers: HeaderMap::new(),
            final_url: url.to_string(),
            duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn dequeues_in_submission_order() {
        let queue = TaskQueue::new();
        let _a = queue.enqueue(RenderRequest::new("http://a.test"));
        let _b = queue.enqueue(RenderRequest::new("http://b.test"));
        let _c = queue.enqueue(RenderRequest::new("http://c.test"));

        let order: Vec<_> = std::iter::from_fn(|| queue.dequeue())
            .map(|entry| entry.request().url().to_string())
            .collect();
        assert_eq!(order, ["http://a.test", "http://b.test", "http://c.test"]);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn resolving_an_entry_wakes_the_caller() {
        let queue = TaskQueue::new();
        let handle = queue.enqueue(RenderRequest::new("http://a.test"));
        let entry = queue.next().await.expect("entry");
        assert!(entry.resolve(Ok(ok_result("http://a.test"))));

        let result = handle.wait().await.expect("success");
        assert_eq!(result.final_url, "http://a.test");
    }

    #[tokio::test]
    async fn dropped_entry_surfaces_as_aborted() {
        let queue = TaskQueue::new();
        let handle = queue.enqueue(RenderRequest::new("http://a.test"));
        drop(queue.dequeue());

        let err = handle.wait().await.unwrap_err();
        assert_eq!(err.url, "http://a.test");
        assert!(matches!(err.failure, TaskFailure::Aborted(_)));
    }

    #[tokio::test]
    async fn enqueue_after_close_is_rejected() {
        let queue = TaskQueue::new();
        queue.close();
        let err = queue
            .enqueue(RenderRequest::new("http://late.test"))
            .wait()
            .await
            .unwrap_err();
        assert!(matches!(err.failure, TaskFailure::ShuttingDown));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn close_drains_remaining_entries_then_ends() {
        let queue = TaskQueue::new();
        let _a = queue.enqueue(RenderRequest::new("http://a.test"));
        queue.close();

        assert!(queue.next().await.is_some());
        assert!(queue.next().await.is_none());
    }

    #[tokio::test]
    async fn next_waits_for_enqueue() {
        let queue = Arc::new(TaskQueue::new());
        let consumer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.next().await.map(|e| e.request().url().to_string()) })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        let _handle = queue.enqueue(RenderRequest::new("http://later.test"));

        let url = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .expect("consumer woke")
            .expect("join");
        assert_eq!(url.as_deref(), Some("http://later.test"));
    }

    #[tokio::test]
    async fn close_wakes_idle_consumer() {
        let queue = Arc::new(TaskQueue::new());
        let consumer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.next().await.is_none() })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.close();

        let ended = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .expect("consumer woke")
            .expect("join");
        assert!(ended);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_producers_lose_nothing() {
        let queue = Arc::new(TaskQueue::new());
        let consumer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move {
                let mut urls = Vec::new();
                while let Some(entry) = queue.next().await {
                    urls.push(entry.request().url().to_string());
                }
                urls
            })
        };

        let producers: Vec<_> = (0..8)
            .map(|producer| {
                let queue = Arc::clone(&queue);
                tokio::spawn(async move {
                    let mut handles = Vec::with_capacity(50);
                    for i in 0..50 {
                        handles.push(queue.enqueue(RenderRequest::new(format!(
                            "http://p{producer}-{i}.test"
                        ))));
                        tokio::task::yield_now().await;
                    }
                    handles
                })
            })
            .collect();
        for producer in producers {
            producer.await.expect("producer");
        }
        queue.close();

        let urls = tokio::time::timeout(Duration::from_secs(5), consumer)
            .await
            .expect("consumer drained")
            .expect("join");
        let unique: std::collections::HashSet<_> = urls.iter().collect();
        assert_eq!(urls.len(), 400);
        assert_eq!(unique.len(), 400);
        assert!(queue.is_empty());
    }
}
