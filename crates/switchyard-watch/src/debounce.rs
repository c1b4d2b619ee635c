//! Per-path timers that coalesce bursts of raw notifications.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

/// Kind of coalesced change reported for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileAction {
    /// File newly created under the watch root.
    Created,
    /// Existing file changed.
    Modified,
}

impl FileAction {
    /// Action string carried in the published event payload.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            FileAction::Created => "file_created",
            FileAction::Modified => "file_modified",
        }
    }
}

/// Callback invoked once a path's quiet period has elapsed.
pub(crate) type FireHandler = Arc<dyn Fn(&Path, FileAction) + Send + Sync>;

#[derive(Default)]
struct DebounceState {
    /// Scheduled delayed-publish task per path.
    pending: HashMap<PathBuf, JoinHandle<()>>,
    /// Most recent raw notification time per path.
    last_event: HashMap<PathBuf, Instant>,
    /// Current timer id per path; stale tasks compare against this.
    timer_ids: HashMap<PathBuf, u64>,
    next_timer_id: u64,
}

/// Debouncer that delays publishing until a path has been quiet for the
/// configured delay.
///
/// Every raw notification supersedes the path's previous timer: a fresh
/// timer id is installed before the old task is cancelled, so even a task
/// that escapes cancellation notices it is stale and abandons silently. The
/// task that does run to completion clears the path's bookkeeping only
/// while it still owns the current id, which keeps a superseded task from
/// erasing a newer timer's state.
pub(crate) struct Debouncer {
    delay: Duration,
    on_fire: FireHandler,
    state: Arc<Mutex<DebounceState>>,
}

impl Debouncer {
    /// Create a debouncer that calls `on_fire` for each coalesced change.
    pub(crate) fn new(delay: Duration, on_fire: FireHandler) -> Self {
        Self {
            delay,
            on_fire,
            state: Arc::new(Mutex::new(DebounceState::default())),
        }
    }

    /// Record a raw notification for `path` and restart its quiet timer.
    ///
    /// The action of the newest notification wins: if a create is followed
    /// by a modify within the window, the coalesced event reports a modify.
    pub(crate) fn schedule(&self, path: PathBuf, action: FileAction) {
        let mut state = self.state.lock();
        state.last_event.insert(path.clone(), Instant::now());

        let timer_id = state.next_timer_id;
        state.next_timer_id += 1;
        state.timer_ids.insert(path.clone(), timer_id);
        trace!(
            "Armed debounce timer {} for {} ({})",
            timer_id,
            path.display(),
            action.as_str()
        );

        // Cancellation is best-effort; a task that already woke fails the
        // timer id check instead.
        if let Some(old) = state.pending.remove(&path) {
            old.abort();
        }

        let task = tokio::spawn(delayed_publish(
            Arc::clone(&self.state),
            Arc::clone(&self.on_fire),
            self.delay,
            path.clone(),
            action,
            timer_id,
        ));
        state.pending.insert(path, task);
    }

    /// Cancel every pending timer and drop all tracking state.
    pub(crate) fn clear(&self) {
        let mut state = self.state.lock();
        for (_, task) in state.pending.drain() {
            task.abort();
        }
        state.last_event.clear();
        state.timer_ids.clear();
        trace!("Cleared debounce timers and tracking state");
    }

    #[cfg(test)]
    fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }
}

/// Sleep out the quiet period, then publish only if this timer is still the
/// path's current one and no fresher notification has been recorded.
async fn delayed_publish(
    state: Arc<Mutex<DebounceState>>,
    on_fire: FireHandler,
    delay: Duration,
    path: PathBuf,
    action: FileAction,
    timer_id: u64,
) {
    tokio::time::sleep(delay).await;

    let mut state = state.lock();
    if state.timer_ids.get(&path) != Some(&timer_id) {
        trace!(
            "Skipping stale debounce timer {} for {}",
            timer_id,
            path.display()
        );
    } else {
        match state.last_event.get(&path) {
            Some(last) if last.elapsed() >= delay => {
                trace!(
                    "Debounce elapsed for {} (timer {})",
                    path.display(),
                    timer_id
                );
                (on_fire)(&path, action);
            }
            // A fresher notification raced in between our wakeup and
            // taking the lock; its own timer handles the path.
            Some(_) => trace!(
                "Skipping debounce timer {} for {}: newer notification pending",
                timer_id,
                path.display()
            ),
            None => trace!(
                "Skipping debounce timer {} for {}: tracking entry gone",
                timer_id,
                path.display()
            ),
        }
    }

    // Only the owner of the current timer id may clear the path's state.
    if state.timer_ids.get(&path) == Some(&timer_id) {
        state.timer_ids.remove(&path);
        state.last_event.remove(&path);
        state.pending.remove(&path);
        trace!("Cleaned up debounce state for {}", path.display());
    }
}
