//! Dependency graph and worker pool of the deferred pipeline
//!
//! Every node holds one boxed operation and the identifiers of the nodes it
//! reads. A node becomes ready once all of its dependencies have produced a
//! value. Workers take ready nodes from a shared queue, run the operation
//! outside the graph lock and publish the result, which may in turn release
//! dependents. A failed node marks every transitive dependent as skipped.
//!
//! A node's value is dropped once no handle names it and every dependent has
//! taken its inputs, so a long chain keeps only the values still reachable.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, trace, warn};

use crate::io::configuration::default_worker_count;
use crate::io::error::{MaskError, Result, invalid_parameter};
use crate::pipeline::value::MaskValue;

/// Identifier of a pipeline node, its registration index
pub type NodeId = usize;

/// Operation of a node, applied to the values of its dependencies in order
pub(crate) type NodeOp = Box<dyn FnOnce(&[Arc<MaskValue>]) -> Result<MaskValue> + Send>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NodeState {
    Pending,
    Ready,
    Running,
    Completed,
}

#[derive(Clone, Debug)]
enum Outcome {
    Value(Arc<MaskValue>),
    Failed(String),
    Skipped(NodeId),
    Released,
}

struct Node {
    name: &'static str,
    dependencies: Vec<NodeId>,
    dependents: Vec<NodeId>,
    unresolved: usize,
    operation: Option<NodeOp>,
    state: NodeState,
    outcome: Option<Outcome>,
    // handles naming this node
    holders: usize,
    // registered dependents that have not taken their inputs yet
    readers: usize,
}

/// Counters describing the progress of a pipeline
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Nodes registered so far
    pub registered: usize,
    /// Nodes whose operation completed successfully
    pub executed: usize,
    /// Nodes whose operation returned an error or panicked
    pub failed: usize,
    /// Nodes skipped because a dependency failed
    pub skipped: usize,
    /// Computed values dropped after their last reader finished with them
    pub released: usize,
}

impl PipelineStats {
    /// Nodes that have not reached a final state
    pub const fn outstanding(&self) -> usize {
        self.registered - self.executed - self.failed - self.skipped
    }
}

#[derive(Default)]
struct Graph {
    nodes: Vec<Node>,
    ready: VecDeque<NodeId>,
    shutdown: bool,
    stats: PipelineStats,
}

impl Graph {
    fn insert(&mut self, name: &'static str, dependencies: Vec<NodeId>, operation: NodeOp) -> NodeId {
        let id = self.nodes.len();
        let mut unresolved = 0;
        let mut upstream_failure = None;
        let mut unavailable = None;

        for &dependency in &dependencies {
            let Some(parent) = self.nodes.get_mut(dependency) else {
                unavailable.get_or_insert(dependency);
                continue;
            };
            match &parent.outcome {
                Some(Outcome::Value(_)) => {}
                Some(Outcome::Released) => {
                    unavailable.get_or_insert(dependency);
                }
                Some(Outcome::Failed(_)) => {
                    upstream_failure.get_or_insert(dependency);
                }
                Some(Outcome::Skipped(origin)) => {
                    upstream_failure.get_or_insert(*origin);
                }
                None => {
                    parent.dependents.push(id);
                    unresolved += 1;
                }
            }
        }

        self.stats.registered += 1;
        let mut node = Node {
            name,
            dependencies,
            dependents: Vec::new(),
            unresolved,
            operation: Some(operation),
            state: NodeState::Pending,
            outcome: None,
            holders: 1,
            readers: 0,
        };

        if let Some(dependency) = unavailable {
            let reason = format!("dependency {dependency} is not a live node of this pipeline");
            warn!(node = id, name, %reason, "Pipeline node failed");
            node.operation = None;
            node.state = NodeState::Completed;
            node.outcome = Some(Outcome::Failed(reason));
            self.stats.failed += 1;
        } else if let Some(dependency) = upstream_failure {
            node.operation = None;
            node.state = NodeState::Completed;
            node.outcome = Some(Outcome::Skipped(dependency));
            self.stats.skipped += 1;
        } else {
            for &dependency in &node.dependencies {
                if let Some(parent) = self.nodes.get_mut(dependency) {
                    parent.readers += 1;
                }
            }
            if unresolved == 0 {
                node.state = NodeState::Ready;
                self.ready.push_back(id);
            }
        }

        self.nodes.push(node);
        id
    }

    /// Take the next ready node and the values it reads
    fn claim(&mut self) -> Option<(NodeId, &'static str, NodeOp, Vec<Arc<MaskValue>>)> {
        while let Some(id) = self.ready.pop_front() {
            let Some(dependencies) = self.nodes.get(id).map(|node| node.dependencies.clone()) else {
                continue;
            };
            let inputs: Vec<Arc<MaskValue>> = dependencies
                .iter()
                .filter_map(|&dependency| match self.nodes.get(dependency)?.outcome.as_ref()? {
                    Outcome::Value(value) => Some(Arc::clone(value)),
                    Outcome::Failed(_) | Outcome::Skipped(_) | Outcome::Released => None,
                })
                .collect();
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            let Some(operation) = node.operation.take() else {
                continue;
            };
            node.state = NodeState::Running;
            let name = node.name;
            self.stop_reading(&dependencies);
            return Some((id, name, operation, inputs));
        }
        None
    }

    fn stop_reading(&mut self, dependencies: &[NodeId]) {
        for &dependency in dependencies {
            if let Some(parent) = self.nodes.get_mut(dependency) {
                parent.readers = parent.readers.saturating_sub(1);
            }
            self.release_if_unused(dependency);
        }
    }

    fn drop_holder(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.holders = node.holders.saturating_sub(1);
        }
        self.release_if_unused(id);
    }

    fn release_if_unused(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.holders == 0 && node.readers == 0 && matches!(node.outcome, Some(Outcome::Value(_))) {
            node.outcome = Some(Outcome::Released);
            self.stats.released += 1;
            trace!(node = id, name = node.name, "Released pipeline value");
        }
    }

    /// Publish a node's outcome; returns the number of dependents made ready
    fn complete(&mut self, id: NodeId, outcome: Outcome) -> usize {
        let Some(node) = self.nodes.get_mut(id) else {
            return 0;
        };
        node.state = NodeState::Completed;
        let dependents = node.dependents.clone();
        let succeeded = matches!(outcome, Outcome::Value(_));
        node.outcome = Some(outcome);

        if !succeeded {
            self.stats.failed += 1;
            self.skip_downstream(id, dependents);
            return 0;
        }

        self.stats.executed += 1;
        let mut released = 0;
        for dependent in dependents {
            let Some(child) = self.nodes.get_mut(dependent) else {
                continue;
            };
            child.unresolved = child.unresolved.saturating_sub(1);
            if child.unresolved == 0 && child.state == NodeState::Pending {
                child.state = NodeState::Ready;
                self.ready.push_back(dependent);
                released += 1;
            }
        }
        self.release_if_unused(id);
        released
    }

    fn skip_downstream(&mut self, failed: NodeId, dependents: Vec<NodeId>) {
        let mut queue = VecDeque::from(dependents);
        while let Some(id) = queue.pop_front() {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            if node.state == NodeState::Completed {
                continue;
            }
            node.state = NodeState::Completed;
            node.operation = None;
            node.outcome = Some(Outcome::Skipped(failed));
            queue.extend(node.dependents.iter().copied());
            self.stats.skipped += 1;
            debug!(node = id, name = node.name, dependency = failed, "Skipped pipeline node");
            let dependencies = node.dependencies.clone();
            self.stop_reading(&dependencies);
        }
    }
}

struct Shared {
    graph: Mutex<Graph>,
    work_available: Condvar,
    node_completed: Condvar,
}

impl Shared {
    fn lock(&self) -> Result<MutexGuard<'_, Graph>> {
        self.graph.lock().map_err(|_poisoned| MaskError::Poisoned)
    }

    // Graph mutations never panic under the lock, so a poisoned guard still
    // holds a consistent graph
    fn lock_recovering(&self) -> MutexGuard<'_, Graph> {
        self.graph.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Deferred mask pipeline backed by a fixed pool of worker threads
///
/// Nodes are registered through [`MaskHandle`](crate::pipeline::MaskHandle)s
/// and start executing as soon as their inputs are available. Dropping the
/// pipeline stops the workers once their current node finishes.
pub struct Pipeline {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("workers", &self.worker_count())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Start a pipeline with `worker_count` worker threads
    ///
    /// # Errors
    ///
    /// Returns an error if `worker_count` is zero or a thread fails to spawn
    pub fn new(worker_count: usize) -> Result<Self> {
        if worker_count == 0 {
            return Err(invalid_parameter(
                "worker_count",
                &worker_count,
                &"a pipeline needs at least one worker",
            ));
        }

        let shared = Arc::new(Shared {
            graph: Mutex::new(Graph::default()),
            work_available: Condvar::new(),
            node_completed: Condvar::new(),
        });
        let mut pipeline = Self {
            shared,
            workers: Vec::with_capacity(worker_count),
        };

        for index in 0..worker_count {
            let shared = Arc::clone(&pipeline.shared);
            let handle = thread::Builder::new()
                .name(format!("mask-pipeline-{index}"))
                .spawn(move || worker_loop(&shared))
                .map_err(|source| MaskError::WorkerSpawn { index, source })?;
            pipeline.workers.push(handle);
        }

        info!(workers = worker_count, "Started mask pipeline");
        Ok(pipeline)
    }

    /// Start a pipeline with one worker per available core
    ///
    /// # Errors
    ///
    /// Returns an error if a worker thread fails to spawn
    pub fn with_default_workers() -> Result<Self> {
        Self::new(default_worker_count())
    }

    /// Number of worker threads
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Snapshot of the node counters
    ///
    /// # Errors
    ///
    /// Returns an error if the graph lock is poisoned
    pub fn stats(&self) -> Result<PipelineStats> {
        Ok(self.shared.lock()?.stats)
    }

    /// Block until every registered node has completed, failed or been skipped
    ///
    /// # Errors
    ///
    /// Returns an error if the graph lock is poisoned
    pub fn wait_all(&self) -> Result<PipelineStats> {
        let mut graph = self.shared.lock()?;
        while graph.stats.outstanding() > 0 && !graph.shutdown {
            graph = self
                .shared
                .node_completed
                .wait(graph)
                .map_err(|_poisoned| MaskError::Poisoned)?;
        }
        Ok(graph.stats)
    }

    pub(crate) fn register(
        &self,
        name: &'static str,
        dependencies: Vec<NodeId>,
        operation: NodeOp,
    ) -> NodeId {
        let mut graph = self.shared.lock_recovering();
        let id = graph.insert(name, dependencies, operation);
        if let Some(node) = graph.nodes.get(id) {
            debug!(node = id, name, dependencies = ?node.dependencies, state = ?node.state, "Registered pipeline node");
        }
        let ready = !graph.ready.is_empty();
        drop(graph);
        if ready {
            self.shared.work_available.notify_one();
        }
        id
    }

    /// Forget one handle naming `node`
    pub(crate) fn drop_holder(&self, node: NodeId) {
        self.shared.lock_recovering().drop_holder(node);
    }

    /// Block until `node` completes and return its value
    pub(crate) fn wait_for(&self, node: NodeId) -> Result<Arc<MaskValue>> {
        let mut graph = self.shared.lock()?;
        loop {
            let Some(entry) = graph.nodes.get(node) else {
                return Err(invalid_parameter("node", &node, &"no such pipeline node"));
            };
            match &entry.outcome {
                Some(Outcome::Value(value)) => return Ok(Arc::clone(value)),
                Some(Outcome::Failed(reason)) => {
                    return Err(MaskError::NodeFailed {
                        node,
                        name: entry.name.to_owned(),
                        reason: reason.clone(),
                    });
                }
                Some(Outcome::Skipped(dependency)) => {
                    return Err(MaskError::UpstreamFailed {
                        node,
                        name: entry.name.to_owned(),
                        dependency: *dependency,
                    });
                }
                Some(Outcome::Released) => {
                    return Err(invalid_parameter("node", &node, &"value was already released"));
                }
                None if graph.shutdown => return Err(MaskError::ShutDown { node }),
                None => {}
            }
            graph = self
                .shared
                .node_completed
                .wait(graph)
                .map_err(|_poisoned| MaskError::Poisoned)?;
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.shared.lock_recovering().shutdown = true;
        self.shared.work_available.notify_all();
        self.shared.node_completed.notify_all();

        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("Pipeline worker exited abnormally");
            }
        }
        info!("Stopped mask pipeline");
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let claimed = {
            let Ok(mut graph) = shared.lock() else {
                return;
            };
            loop {
                if graph.shutdown {
                    return;
                }
                if let Some(claimed) = graph.claim() {
                    break claimed;
                }
                graph = match shared.work_available.wait(graph) {
                    Ok(graph) => graph,
                    Err(_poisoned) => return,
                };
            }
        };
        let (id, name, operation, inputs) = claimed;

        trace!(node = id, name, inputs = inputs.len(), "Executing pipeline node");
        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| operation(&inputs))) {
            Ok(Ok(value)) => Outcome::Value(Arc::new(value)),
            Ok(Err(error)) => Outcome::Failed(error.to_string()),
            Err(payload) => Outcome::Failed(panic_message(payload.as_ref())),
        };
        if let Outcome::Failed(reason) = &outcome {
            warn!(node = id, name, %reason, "Pipeline node failed");
        }

        let released = {
            let mut graph = shared.lock_recovering();
            graph.complete(id, outcome)
        };
        shared.node_completed.notify_all();
        match released {
            0 => {}
            1 => shared.work_available.notify_one(),
            _ => shared.work_available.notify_all(),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .map_or_else(|| "operation panicked".to_owned(), |message| format!("operation panicked: {message}"))
}
