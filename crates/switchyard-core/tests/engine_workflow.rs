//! End-to-end engine tests with stub components.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use switchyard_core::prelude::*;
use tokio::task::JoinHandle;

// -- Stub components --

#[derive(Default)]
struct RecordingTrigger {
    starts: AtomicUsize,
    stops: AtomicUsize,
    last_config: Mutex<Option<JsonMap>>,
}

#[async_trait]
impl Trigger for RecordingTrigger {
    async fn start(&self, _bus: Arc<EventBus>, config: JsonMap) -> Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        *self.last_config.lock() = Some(config);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct StubAgent;

#[async_trait]
impl Agent for StubAgent {
    async fn process(&self, _event: &Event, _config: &JsonMap) -> Result<JsonMap> {
        let mut result = JsonMap::new();
        result.insert("status".to_string(), json!("ok"));
        Ok(result)
    }
}

struct FailingAgent;

#[async_trait]
impl Agent for FailingAgent {
    async fn process(&self, _event: &Event, _config: &JsonMap) -> Result<JsonMap> {
        Err(Error::Agent("stub agent failure".to_string()))
    }
}

#[derive(Default)]
struct RecordingOutput {
    calls: Mutex<Vec<JsonMap>>,
}

impl RecordingOutput {
    fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Output for RecordingOutput {
    async fn send(&self, result: &JsonMap, _config: &JsonMap) -> Result<()> {
        self.calls.lock().push(result.clone());
        Ok(())
    }
}

// -- Helpers --

fn config(pairs: &[(&str, &str)]) -> JsonMap {
    let mut map = JsonMap::new();
    for (key, value) in pairs {
        map.insert(key.to_string(), json!(value));
    }
    map
}

fn spawn_engine(engine: &Arc<Engine>) -> JoinHandle<Result<()>> {
    let engine = Arc::clone(engine);
    tokio::spawn(async move { engine.start().await })
}

async fn wait_until(check: impl Fn() -> bool) {
    for _ in 0..300 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

async fn shutdown(engine: &Arc<Engine>, task: JoinHandle<Result<()>>) {
    engine.stop().await;
    tokio::time::timeout(Duration::from_secs(3), task)
        .await
        .expect("engine did not stop in time")
        .expect("engine task panicked")
        .expect("engine returned an error");
}

// -- Tests --

#[tokio::test]
async fn event_flows_from_trigger_through_agent_to_output() {
    let engine = Arc::new(Engine::new());
    let output = Arc::new(RecordingOutput::default());
    engine.register_trigger("stub", Arc::new(RecordingTrigger::default()));
    engine.register_agent("stub_agent", Arc::new(StubAgent));
    engine.register_output("recorder", Arc::clone(&output) as Arc<dyn Output>);

    engine.add_workflow(Workflow::new(
        "pipeline",
        config(&[("type", "stub"), ("event_type", "change")]),
        config(&[("type", "stub_agent")]),
        config(&[("type", "recorder")]),
    ));

    let task = spawn_engine(&engine);
    let bus = Arc::clone(engine.bus());
    wait_until(move || bus.is_running()).await;

    engine
        .bus()
        .publish(Event::new("change", JsonMap::new(), "tests"))
        .unwrap();

    let recorded = Arc::clone(&output);
    wait_until(move || recorded.call_count() == 1).await;
    let mut expected = JsonMap::new();
    expected.insert("status".to_string(), json!("ok"));
    assert_eq!(output.calls.lock().as_slice(), &[expected]);

    shutdown(&engine, task).await;
}

#[tokio::test]
async fn unregistered_trigger_fails_startup_before_any_trigger_starts() {
    let engine = Engine::new();
    let good = Arc::new(RecordingTrigger::default());
    engine.register_trigger("good", Arc::clone(&good) as Arc<dyn Trigger>);

    // The valid workflow comes first; it must still not start.
    engine.add_workflow(Workflow::new(
        "valid",
        config(&[("type", "good")]),
        config(&[("type", "a")]),
        config(&[("type", "o")]),
    ));
    engine.add_workflow(Workflow::new(
        "broken",
        config(&[("type", "ghost")]),
        config(&[("type", "a")]),
        config(&[("type", "o")]),
    ));

    let err = engine.start().await.unwrap_err();
    assert!(matches!(
        err,
        Error::TriggerNotRegistered { ref trigger, ref workflow }
            if trigger == "ghost" && workflow == "broken"
    ));
    assert_eq!(good.starts.load(Ordering::SeqCst), 0);
    assert!(!engine.is_running());
}

#[tokio::test]
async fn broken_workflow_does_not_affect_sibling_on_same_event() {
    let engine = Arc::new(Engine::new());
    engine.register_trigger("stub", Arc::new(RecordingTrigger::default()));
    engine.register_agent("ok_agent", Arc::new(StubAgent));
    engine.register_agent("bad_agent", Arc::new(FailingAgent));

    let missing_out = Arc::new(RecordingOutput::default());
    let failing_out = Arc::new(RecordingOutput::default());
    let healthy_out = Arc::new(RecordingOutput::default());
    engine.register_output("missing_out", Arc::clone(&missing_out) as Arc<dyn Output>);
    engine.register_output("failing_out", Arc::clone(&failing_out) as Arc<dyn Output>);
    engine.register_output("healthy_out", Arc::clone(&healthy_out) as Arc<dyn Output>);

    // Agent name never registered.
    engine.add_workflow(Workflow::new(
        "missing-agent",
        config(&[("type", "stub"), ("event_type", "change")]),
        config(&[("type", "nobody")]),
        config(&[("type", "missing_out")]),
    ));
    // Agent registered but failing.
    engine.add_workflow(Workflow::new(
        "failing-agent",
        config(&[("type", "stub"), ("event_type", "change")]),
        config(&[("type", "bad_agent")]),
        config(&[("type", "failing_out")]),
    ));
    engine.add_workflow(Workflow::new(
        "healthy",
        config(&[("type", "stub"), ("event_type", "change")]),
        config(&[("type", "ok_agent")]),
        config(&[("type", "healthy_out")]),
    ));

    let task = spawn_engine(&engine);
    let bus = Arc::clone(engine.bus());
    wait_until(move || bus.is_running()).await;

    engine
        .bus()
        .publish(Event::new("change", JsonMap::new(), "tests"))
        .unwrap();
    let healthy = Arc::clone(&healthy_out);
    wait_until(move || healthy.call_count() == 1).await;

    // A second event confirms dispatch survived the failures.
    engine
        .bus()
        .publish(Event::new("change", JsonMap::new(), "tests"))
        .unwrap();
    let healthy = Arc::clone(&healthy_out);
    wait_until(move || healthy.call_count() == 2).await;

    assert_eq!(missing_out.call_count(), 0);
    assert_eq!(failing_out.call_count(), 0);

    shutdown(&engine, task).await;
}

#[tokio::test]
async fn workflow_without_trigger_type_still_processes_bus_events() {
    let engine = Arc::new(Engine::new());
    let output = Arc::new(RecordingOutput::default());
    engine.register_agent("a", Arc::new(StubAgent));
    engine.register_output("o", Arc::clone(&output) as Arc<dyn Output>);

    // No trigger component at all; events come straight from the bus.
    engine.add_workflow(Workflow::new(
        "bus-driven",
        config(&[("event_type", "external")]),
        config(&[("type", "a")]),
        config(&[("type", "o")]),
    ));

    let task = spawn_engine(&engine);
    let bus = Arc::clone(engine.bus());
    wait_until(move || bus.is_running()).await;

    engine
        .bus()
        .publish(Event::new("external", JsonMap::new(), "tests"))
        .unwrap();
    let recorded = Arc::clone(&output);
    wait_until(move || recorded.call_count() == 1).await;

    shutdown(&engine, task).await;
}

#[tokio::test]
async fn shared_trigger_starts_once_with_first_workflow_config() {
    let engine = Arc::new(Engine::new());
    let trigger = Arc::new(RecordingTrigger::default());
    engine.register_trigger("shared", Arc::clone(&trigger) as Arc<dyn Trigger>);
    engine.register_agent("a", Arc::new(StubAgent));
    engine.register_output("o", Arc::new(RecordingOutput::default()));

    engine.add_workflow(Workflow::new(
        "first",
        config(&[("type", "shared"), ("event_type", "x")]),
        config(&[("type", "a")]),
        config(&[("type", "o")]),
    ));
    engine.add_workflow(Workflow::new(
        "second",
        config(&[("type", "shared"), ("event_type", "y")]),
        config(&[("type", "a")]),
        config(&[("type", "o")]),
    ));

    let task = spawn_engine(&engine);
    let t = Arc::clone(&trigger);
    wait_until(move || t.starts.load(Ordering::SeqCst) > 0).await;

    assert_eq!(trigger.starts.load(Ordering::SeqCst), 1);
    let seen = trigger.last_config.lock().clone().unwrap();
    assert_eq!(seen.get("event_type"), Some(&json!("x")));

    shutdown(&engine, task).await;
}

#[tokio::test]
async fn second_start_while_running_fails() {
    let engine = Arc::new(Engine::new());
    let task = spawn_engine(&engine);
    let bus = Arc::clone(engine.bus());
    wait_until(move || bus.is_running()).await;

    let err = engine.start().await.unwrap_err();
    assert!(matches!(err, Error::AlreadyRunning(_)));
    assert!(engine.is_running());

    shutdown(&engine, task).await;
}

#[tokio::test]
async fn stop_stops_every_registered_trigger() {
    let engine = Arc::new(Engine::new());
    let used = Arc::new(RecordingTrigger::default());
    let unused = Arc::new(RecordingTrigger::default());
    engine.register_trigger("used", Arc::clone(&used) as Arc<dyn Trigger>);
    engine.register_trigger("unused", Arc::clone(&unused) as Arc<dyn Trigger>);
    engine.register_agent("a", Arc::new(StubAgent));
    engine.register_output("o", Arc::new(RecordingOutput::default()));

    engine.add_workflow(Workflow::new(
        "only",
        config(&[("type", "used")]),
        config(&[("type", "a")]),
        config(&[("type", "o")]),
    ));

    let task = spawn_engine(&engine);
    let t = Arc::clone(&used);
    wait_until(move || t.starts.load(Ordering::SeqCst) == 1).await;

    shutdown(&engine, task).await;
    assert_eq!(used.stops.load(Ordering::SeqCst), 1);
    assert_eq!(unused.stops.load(Ordering::SeqCst), 1);
    assert_eq!(unused.starts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn manual_trigger_drives_a_workflow_end_to_end() {
    let engine = Arc::new(Engine::new());
    let manual = Arc::new(ManualTrigger::new());
    let output = Arc::new(RecordingOutput::default());
    engine.register_trigger("manual", Arc::clone(&manual) as Arc<dyn Trigger>);
    engine.register_agent("a", Arc::new(StubAgent));
    engine.register_output("o", Arc::clone(&output) as Arc<dyn Output>);

    engine.add_workflow(Workflow::new(
        "on-demand",
        config(&[("type", "manual"), ("event_type", "requested")]),
        config(&[("type", "a")]),
        config(&[("type", "o")]),
    ));

    let task = spawn_engine(&engine);
    let started = Arc::clone(&manual);
    wait_until(move || started.is_running()).await;

    manual.trigger(JsonMap::new()).await.unwrap();
    let recorded = Arc::clone(&output);
    wait_until(move || recorded.call_count() == 1).await;

    shutdown(&engine, task).await;
}
