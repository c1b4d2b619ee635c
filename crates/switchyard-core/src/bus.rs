//! Async publish/subscribe event bus.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::events::Event;

/// How long the dispatch loop waits for the next event before re-checking
/// the running flag.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Future returned by a subscriber callback.
pub type CallbackFuture = BoxFuture<'static, Result<()>>;

/// Uniform task-producing callback invoked once per matching event.
pub type Callback = Arc<dyn Fn(Event) -> CallbackFuture + Send + Sync>;

/// Central pub/sub dispatcher.
///
/// Publishers enqueue events onto an unbounded FIFO queue and never block on
/// subscriber execution. The dispatch loop pulls one event at a time, invokes
/// every callback subscribed to the event's exact type concurrently, and
/// awaits the whole group before pulling the next event. A failing callback
/// is logged and discarded without affecting its siblings or the loop.
///
/// The bus is not restartable: once [`EventBus::start`] has returned after a
/// [`EventBus::stop`], a fresh instance is required.
pub struct EventBus {
    tx: mpsc::UnboundedSender<Event>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<Event>>>,
    subscribers: RwLock<HashMap<String, Vec<Callback>>>,
    running: AtomicBool,
}

impl EventBus {
    /// Create a stopped bus with an empty queue and no subscribers.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
            subscribers: RwLock::new(HashMap::new()),
            running: AtomicBool::new(false),
        }
    }

    /// Enqueue an event for dispatch.
    ///
    /// Returns immediately; subscriber execution happens later on the
    /// dispatch loop. The queue is unbounded, so publishers never see
    /// backpressure. Fails only if the bus has shut down for good.
    pub fn publish(&self, event: Event) -> Result<()> {
        debug!("Event published: {} from {}", event.event_type, event.source);
        self.tx.send(event).map_err(|_| Error::Closed)
    }

    /// Register an async callback for every future event of `event_type`.
    ///
    /// Matching is exact-string. Multiple callbacks may be registered for the
    /// same type, including duplicates; all of them run concurrently per
    /// event, in no guaranteed order.
    pub fn subscribe<F, Fut>(&self, event_type: impl Into<String>, callback: F)
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<()>> + Send + 'static,
    {
        self.push_callback(event_type.into(), Arc::new(move |event| callback(event).boxed()));
    }

    /// Register a blocking callback for every future event of `event_type`.
    ///
    /// The callback runs on the blocking thread pool so it can never stall
    /// delivery to other subscribers.
    pub fn subscribe_blocking<F>(&self, event_type: impl Into<String>, callback: F)
    where
        F: Fn(Event) -> Result<()> + Send + Sync + 'static,
    {
        let callback = Arc::new(callback);
        self.push_callback(
            event_type.into(),
            Arc::new(move |event| {
                let callback = Arc::clone(&callback);
                async move {
                    match tokio::task::spawn_blocking(move || callback(event)).await {
                        Ok(result) => result,
                        Err(e) => Err(Error::Subscriber(e.to_string())),
                    }
                }
                .boxed()
            }),
        );
    }

    fn push_callback(&self, event_type: String, callback: Callback) {
        debug!("Subscribed to event type: {}", event_type);
        self.subscribers.write().entry(event_type).or_default().push(callback);
    }

    /// Number of callbacks currently registered for `event_type`.
    pub fn subscriber_count(&self, event_type: &str) -> usize {
        self.subscribers.read().get(event_type).map_or(0, Vec::len)
    }

    /// Whether the dispatch loop is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run the dispatch loop until [`EventBus::stop`] is observed.
    ///
    /// Occupies the caller for the bus's whole lifetime; spawn it as a
    /// background task. Returns shortly after `stop`, once the current poll
    /// wait has elapsed. Calling `start` while the loop is already running is
    /// a warning no-op.
    pub async fn start(&self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Event bus is already running");
            return Ok(());
        }
        let rx = self.rx.lock().take();
        let Some(mut rx) = rx else {
            self.running.store(false, Ordering::SeqCst);
            return Err(Error::Closed);
        };

        info!("Event bus started");
        while self.running.load(Ordering::SeqCst) {
            match tokio::time::timeout(POLL_INTERVAL, rx.recv()).await {
                Ok(Some(event)) => self.dispatch(event).await,
                // All senders dropped, nothing more can arrive.
                Ok(None) => break,
                // Poll timeout, go around and re-check the running flag.
                Err(_) => continue,
            }
        }
        info!("Event bus stopped");
        Ok(())
    }

    /// Signal the dispatch loop to exit.
    ///
    /// Synchronous and idempotent. Does not wait for in-flight callback
    /// invocations; the loop notices the flag within one poll interval.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Invoke every callback subscribed to the event's type, concurrently,
    /// and await the whole group. Individual failures are logged and
    /// swallowed so one bad subscriber can never poison the loop.
    async fn dispatch(&self, event: Event) {
        let callbacks: Vec<Callback> = self
            .subscribers
            .read()
            .get(&event.event_type)
            .map(|list| list.to_vec())
            .unwrap_or_default();
        if callbacks.is_empty() {
            debug!("No subscribers for event type: {}", event.event_type);
            return;
        }

        let tasks: Vec<_> = callbacks
            .into_iter()
            .map(|callback| tokio::spawn(callback(event.clone())))
            .collect();
        for (i, joined) in join_all(tasks).await.into_iter().enumerate() {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Error in event callback {}: {}", i, e),
                Err(e) => error!("Error in event callback {}: {}", i, e),
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("running", &self.is_running())
            .field("subscriber_types", &self.subscribers.read().len())
            .finish()
    }
}
