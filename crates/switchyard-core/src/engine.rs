//! Component registries, workflow routing, and lifecycle orchestration.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::bus::EventBus;
use crate::error::{Error, Result};
use crate::events::{Event, JsonMap};
use crate::traits::{Agent, Output, Trigger};
use crate::workflow::Workflow;

type AgentRegistry = Arc<RwLock<HashMap<String, Arc<dyn Agent>>>>;
type OutputRegistry = Arc<RwLock<HashMap<String, Arc<dyn Output>>>>;

/// Orchestrator owning the bus, the component registries, and the active
/// workflows.
///
/// Components are registered under string names and resolved from workflow
/// configs: trigger names at [`Engine::start`] (a miss is fatal), agent and
/// output names per event (a miss aborts only that invocation). One engine
/// drives one process run; it is not restartable.
pub struct Engine {
    bus: Arc<EventBus>,
    triggers: RwLock<HashMap<String, Arc<dyn Trigger>>>,
    agents: AgentRegistry,
    outputs: OutputRegistry,
    workflows: RwLock<Vec<Arc<Workflow>>>,
    running: AtomicBool,
}

impl Engine {
    /// Create an engine with a fresh bus and empty registries.
    pub fn new() -> Self {
        Self {
            bus: Arc::new(EventBus::new()),
            triggers: RwLock::new(HashMap::new()),
            agents: Arc::new(RwLock::new(HashMap::new())),
            outputs: Arc::new(RwLock::new(HashMap::new())),
            workflows: RwLock::new(Vec::new()),
            running: AtomicBool::new(false),
        }
    }

    /// The engine's event bus, for publishing or direct subscription.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Whether [`Engine::start`] has run and [`Engine::stop`] has not.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Register a trigger under `name`. Last write wins on collision.
    pub fn register_trigger(&self, name: impl Into<String>, trigger: Arc<dyn Trigger>) {
        let name = name.into();
        debug!("Registered trigger: {}", name);
        self.triggers.write().insert(name, trigger);
    }

    /// Register an agent under `name`. Last write wins on collision.
    pub fn register_agent(&self, name: impl Into<String>, agent: Arc<dyn Agent>) {
        let name = name.into();
        debug!("Registered agent: {}", name);
        self.agents.write().insert(name, agent);
    }

    /// Register an output under `name`. Last write wins on collision.
    pub fn register_output(&self, name: impl Into<String>, output: Arc<dyn Output>) {
        let name = name.into();
        debug!("Registered output: {}", name);
        self.outputs.write().insert(name, output);
    }

    /// Add a workflow and subscribe it to its configured event type.
    ///
    /// The agent and output names it references are looked up per event, so
    /// they may be registered after the workflow is added. The trigger name
    /// is validated at [`Engine::start`].
    pub fn add_workflow(&self, workflow: Workflow) {
        let workflow = Arc::new(workflow);
        let event_type = workflow.event_type().to_string();
        debug!(
            "Added workflow '{}' for event type '{}'",
            workflow.name, event_type
        );
        self.workflows.write().push(Arc::clone(&workflow));

        let agents = Arc::clone(&self.agents);
        let outputs = Arc::clone(&self.outputs);
        self.bus.subscribe(event_type, move |event| {
            let agents = Arc::clone(&agents);
            let outputs = Arc::clone(&outputs);
            let workflow = Arc::clone(&workflow);
            async move {
                if let Err(e) = process_workflow(&event, &workflow, &agents, &outputs).await {
                    error!("Error processing workflow '{}': {}", workflow.name, e);
                }
                Ok(())
            }
        });
    }

    /// Start the bus and all triggers, then block until [`Engine::stop`].
    ///
    /// Every workflow's trigger name is resolved before any trigger starts,
    /// so a misconfigured workflow fails the whole startup without side
    /// effects. Workflows whose trigger config has no `type` are driven by
    /// bus events alone and start nothing. Triggers shared by several
    /// workflows start once, with the config of the first workflow naming
    /// them.
    pub async fn start(&self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyRunning("Engine"));
        }
        info!("Starting engine");

        let bus = Arc::clone(&self.bus);
        let bus_task = tokio::spawn(async move {
            if let Err(e) = bus.start().await {
                error!("Event bus task failed: {}", e);
            }
        });

        let workflows: Vec<Arc<Workflow>> = self.workflows.read().clone();

        // Resolve every trigger before starting any, so a bad reference
        // never leaves a subset of triggers running.
        let mut to_start: Vec<(String, Arc<dyn Trigger>, JsonMap)> = Vec::new();
        let mut seen = HashSet::new();
        for workflow in &workflows {
            let Some(trigger_type) = workflow.trigger_type().map(str::to_string) else {
                // Workflow is driven purely by bus events, nothing to start.
                continue;
            };
            let trigger = self.triggers.read().get(&trigger_type).cloned();
            let Some(trigger) = trigger else {
                self.abort_startup(bus_task).await;
                return Err(Error::TriggerNotRegistered {
                    trigger: trigger_type,
                    workflow: workflow.name.clone(),
                });
            };
            if seen.insert(trigger_type.clone()) {
                to_start.push((trigger_type, trigger, workflow.trigger_config.clone()));
            }
        }

        let mut started: Vec<(String, Arc<dyn Trigger>)> = Vec::new();
        for (name, trigger, config) in to_start {
            debug!("Starting trigger: {}", name);
            if let Err(e) = trigger.start(Arc::clone(&self.bus), config).await {
                for (name, trigger) in started {
                    if let Err(stop_err) = trigger.stop().await {
                        error!("Error stopping trigger {}: {}", name, stop_err);
                    }
                }
                self.abort_startup(bus_task).await;
                return Err(e);
            }
            started.push((name, trigger));
        }

        info!("Engine started with {} workflows", workflows.len());
        if let Err(e) = bus_task.await {
            error!("Event bus task failed: {}", e);
        }
        Ok(())
    }

    /// Stop the bus, then stop every registered trigger in turn.
    ///
    /// Trigger stop failures are logged and do not prevent the remaining
    /// triggers from being stopped.
    pub async fn stop(&self) {
        info!("Stopping engine");
        self.running.store(false, Ordering::SeqCst);
        self.bus.stop();
        let triggers: Vec<(String, Arc<dyn Trigger>)> = self
            .triggers
            .read()
            .iter()
            .map(|(name, trigger)| (name.clone(), Arc::clone(trigger)))
            .collect();
        for (name, trigger) in triggers {
            if let Err(e) = trigger.stop().await {
                error!("Error stopping trigger {}: {}", name, e);
            }
        }
        info!("Engine stopped");
    }

    async fn abort_startup(&self, bus_task: JoinHandle<()>) {
        self.bus.stop();
        bus_task.abort();
        let _ = bus_task.await;
        self.running.store(false, Ordering::SeqCst);
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one workflow for one event: resolve the agent, process, resolve the
/// output, deliver. Any failure aborts this invocation only.
async fn process_workflow(
    event: &Event,
    workflow: &Workflow,
    agents: &RwLock<HashMap<String, Arc<dyn Agent>>>,
    outputs: &RwLock<HashMap<String, Arc<dyn Output>>>,
) -> Result<()> {
    let agent_type = workflow.agent_type().unwrap_or_default().to_string();
    let agent = agents.read().get(&agent_type).cloned();
    let Some(agent) = agent else {
        return Err(Error::AgentNotRegistered {
            agent: agent_type,
            workflow: workflow.name.clone(),
        });
    };
    let result = agent.process(event, &workflow.agent_config).await?;

    let output_type = workflow.output_type().unwrap_or_default().to_string();
    let output = outputs.read().get(&output_type).cloned();
    let Some(output) = output else {
        return Err(Error::OutputNotRegistered {
            output: output_type,
            workflow: workflow.name.clone(),
        });
    };
    output.send(&result, &workflow.output_config).await
}
