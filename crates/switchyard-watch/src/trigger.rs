//! File system trigger that publishes debounced change events.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use notify::event::ModifyKind;
use notify::{
    Config as NotifyConfig, Event as RawEvent, EventKind, RecommendedWatcher, RecursiveMode,
    Watcher,
};
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use switchyard_core::{Event, EventBus, JsonMap, Result as CoreResult, Trigger};

use crate::config::WatchConfig;
use crate::debounce::{Debouncer, FileAction, FireHandler};
use crate::error::{Error, Result};
use crate::filter::EventFilter;

/// Live resources for an active watch session.
struct WatchState {
    /// Keeps the OS watcher alive; dropping it stops the watch threads.
    watcher: RecommendedWatcher,
    debouncer: Arc<Debouncer>,
    forward_task: JoinHandle<()>,
}

/// Trigger that watches a directory tree and publishes one event per file
/// once its change burst settles.
///
/// Raw notifications stream from the OS watcher into a forwarding task,
/// which filters out directories, temp files, and unwanted kinds before
/// handing paths to the debouncer. The debounced publication carries the
/// file path, name, extension, and parent directory in its payload.
pub struct FileWatchTrigger {
    state: Mutex<Option<WatchState>>,
}

impl FileWatchTrigger {
    /// Create a trigger with no active watch.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    fn begin(&self, bus: Arc<EventBus>, config: &JsonMap) -> Result<()> {
        let mut state = self.state.lock();
        if state.is_some() {
            return Err(Error::AlreadyRunning);
        }

        let cfg = WatchConfig::from_config(config)?;
        if !cfg.path.exists() {
            return Err(Error::InvalidPath(cfg.path.display().to_string()));
        }
        // Published payloads carry absolute paths regardless of how the
        // watch root was spelled in the config.
        let root = cfg.path.canonicalize()?;

        let filter = EventFilter::new(&cfg.filename_patterns, &cfg.ignore_temp_files)?;
        let on_fire = publish_handler(bus, cfg.event_type.clone());
        let debouncer = Arc::new(Debouncer::new(cfg.debounce_delay, on_fire));

        let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<RawEvent>();
        let mut watcher = RecommendedWatcher::new(
            move |result: notify::Result<RawEvent>| match result {
                Ok(event) => {
                    let _ = raw_tx.send(event);
                }
                Err(e) => error!("File watch error: {}", e),
            },
            NotifyConfig::default(),
        )?;
        let mode = if cfg.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(&root, mode)?;

        let forward_debouncer = Arc::clone(&debouncer);
        let watch_created = cfg.watch_created;
        let watch_modified = cfg.watch_modified;
        let forward_task = tokio::spawn(async move {
            while let Some(raw) = raw_rx.recv().await {
                handle_raw_event(raw, watch_created, watch_modified, &filter, &forward_debouncer);
            }
        });

        info!(
            "File watcher started on {} (recursive: {})",
            root.display(),
            cfg.recursive
        );
        *state = Some(WatchState {
            watcher,
            debouncer,
            forward_task,
        });
        Ok(())
    }
}

impl Default for FileWatchTrigger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Trigger for FileWatchTrigger {
    async fn start(&self, bus: Arc<EventBus>, config: JsonMap) -> CoreResult<()> {
        self.begin(bus, &config)?;
        Ok(())
    }

    async fn stop(&self) -> CoreResult<()> {
        let state = self.state.lock().take();
        if let Some(WatchState {
            watcher,
            debouncer,
            forward_task,
        }) = state
        {
            debouncer.clear();
            forward_task.abort();
            drop(watcher);
            info!("File watcher stopped");
        }
        Ok(())
    }
}

/// Route one raw notification into the debouncer.
fn handle_raw_event(
    raw: RawEvent,
    watch_created: bool,
    watch_modified: bool,
    filter: &EventFilter,
    debouncer: &Debouncer,
) {
    let action = match raw.kind {
        EventKind::Create(_) => FileAction::Created,
        // Renames show up as name modifications; the create half of a
        // rename-into-place is reported separately.
        EventKind::Modify(ModifyKind::Name(_)) => return,
        EventKind::Modify(_) => FileAction::Modified,
        _ => return,
    };
    let enabled = match action {
        FileAction::Created => watch_created,
        FileAction::Modified => watch_modified,
    };
    if !enabled {
        return;
    }

    for path in raw.paths {
        if path.is_dir() {
            continue;
        }
        let file_name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => continue,
        };
        if !filter.allows(&file_name) {
            continue;
        }
        debug!("Detected {} for {}", action.as_str(), path.display());
        debouncer.schedule(path, action);
    }
}

/// Build the handler the debouncer calls once a path settles.
fn publish_handler(bus: Arc<EventBus>, event_type: String) -> FireHandler {
    Arc::new(move |path: &Path, action: FileAction| {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parent = path
            .parent()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default();

        let mut data = JsonMap::new();
        data.insert("action".into(), json!(action.as_str()));
        data.insert("file_path".into(), json!(path.display().to_string()));
        data.insert("file_name".into(), json!(file_name));
        data.insert("file_extension".into(), json!(file_extension(path)));
        data.insert("parent_directory".into(), json!(parent));

        debug!("Debounce complete, publishing change for {}", path.display());
        if let Err(e) = bus.publish(Event::new(event_type.clone(), data, "file_watcher")) {
            error!("Failed to publish file change event: {}", e);
        }
    })
}

/// Extension with its leading dot, or empty when the name has none.
fn file_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
