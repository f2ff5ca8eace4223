//! An executor that owns its backend on a dedicated thread.
//!
//! Backends that wrap a toolkit with thread affinity are constructed on the
//! executor thread by a factory and never leave it. Each action is posted as
//! one job; [`ActionExecutor::apply`] blocks until the thread confirms the
//! pass. Compatibility questions travel to the thread the same way, so the
//! backend's [`Backend::compatibility`] still decides.

use std::thread::{self, JoinHandle};

use async_channel::{Receiver, Sender};
use tracing::{debug, error, warn};

use crate::action::ReconcileAction;
use crate::backend::Backend;
use crate::error::ExecuteError;
use crate::executor::{ActionExecutor, Executor};
use crate::lookup::{CompatibilityOracle, NodeLookup, TreeIndex};
use crate::node::{Compatibility, ShadowNode};
use crate::trace::Uid;

type Inspect<B> = Box<dyn FnOnce(&mut Executor<B>) + Send>;

enum Job<B: Backend> {
    Begin(ShadowNode),
    Action(ReconcileAction),
    Finish(ShadowNode, Sender<(Result<(), ExecuteError>, TreeIndex)>),
    Classify(ShadowNode, ShadowNode, Sender<Compatibility>),
    Inspect(Inspect<B>),
}

/// Runs an [`Executor`] on its own thread.
#[derive(Debug)]
pub struct ThreadedExecutor<B: Backend> {
    jobs: Sender<Job<B>>,
    index: TreeIndex,
    handle: Option<JoinHandle<()>>,
}

impl<B: Backend + 'static> ThreadedExecutor<B> {
    /// Spawns the executor thread and builds the backend on it.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError::Spawn`] if the thread cannot be started.
    pub fn spawn<F>(factory: F) -> Result<Self, ExecuteError>
    where
        F: FnOnce() -> B + Send + 'static,
    {
        let (jobs, inbox) = async_channel::unbounded();
        let handle = thread::Builder::new()
            .name("reactk-executor".into())
            .spawn(move || run(factory(), &inbox))?;
        Ok(Self {
            jobs,
            index: TreeIndex::empty(),
            handle: Some(handle),
        })
    }

    fn post(&self, job: Job<B>) -> Result<(), ExecuteError> {
        self.jobs
            .send_blocking(job)
            .map_err(|_| ExecuteError::Disconnected)
    }

    /// Runs `f` against the executor on its thread and returns the result.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError::Disconnected`] if the thread is gone.
    pub fn inspect<T, F>(&self, f: F) -> Result<T, ExecuteError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Executor<B>) -> T + Send + 'static,
    {
        let (reply, answer) = async_channel::bounded(1);
        self.post(Job::Inspect(Box::new(move |executor| {
            // The caller may have given up waiting.
            let _ = reply.send_blocking(f(executor));
        })))?;
        answer
            .recv_blocking()
            .map_err(|_| ExecuteError::Disconnected)
    }
}

fn run<B: Backend>(backend: B, inbox: &Receiver<Job<B>>) {
    let mut executor = Executor::new(backend);
    let mut failure: Option<ExecuteError> = None;
    while let Ok(job) = inbox.recv_blocking() {
        match job {
            Job::Begin(top) => {
                failure = None;
                executor.begin(&top);
            }
            Job::Action(action) => {
                if failure.is_some() {
                    debug!(%action, "skipped after failure");
                    continue;
                }
                if let Err(err) = executor.execute(&action) {
                    error!(%action, error = %err, "action failed, abandoning pass");
                    failure = Some(err);
                }
            }
            Job::Finish(top, reply) => {
                let result = match failure.take() {
                    Some(err) => {
                        if let Err(cleanup) = executor.abort() {
                            error!(error = %cleanup, "cleanup of abandoned pass failed");
                        }
                        Err(err)
                    }
                    None => executor.finish(&top),
                };
                let snapshot = executor.resources().snapshot();
                if reply.send_blocking((result, snapshot)).is_err() {
                    debug!("pass result dropped by caller");
                }
            }
            Job::Classify(old, new, reply) => {
                let verdict = executor.classify(&old, &new);
                if reply.send_blocking(verdict).is_err() {
                    debug!("classification dropped by caller");
                }
            }
            Job::Inspect(f) => f(&mut executor),
        }
    }
    debug!("executor thread exiting");
}

impl<B: Backend> NodeLookup for ThreadedExecutor<B> {
    fn previous(&self, uid: &Uid) -> Option<&ShadowNode> {
        self.index.previous(uid)
    }
}

impl<B: Backend + 'static> CompatibilityOracle for ThreadedExecutor<B> {
    fn classify(&self, old: &ShadowNode, new: &ShadowNode) -> Compatibility {
        let (reply, answer) = async_channel::bounded(1);
        self.post(Job::Classify(old.clone(), new.clone(), reply))
            .and_then(|()| {
                answer
                    .recv_blocking()
                    .map_err(|_| ExecuteError::Disconnected)
            })
            .unwrap_or_else(|_| {
                warn!(uid = %new.uid(), "executor thread gone, classifying by kind");
                new.kind().compatibility(old, new)
            })
    }
}

impl<B: Backend + 'static> ActionExecutor for ThreadedExecutor<B> {
    fn apply(
        &mut self,
        actions: Vec<ReconcileAction>,
        top: &ShadowNode,
    ) -> Result<(), ExecuteError> {
        self.post(Job::Begin(top.clone()))?;
        for action in actions {
            self.post(Job::Action(action))?;
        }
        let (reply, answer) = async_channel::bounded(1);
        self.post(Job::Finish(top.clone(), reply))?;
        let (result, snapshot) = answer
            .recv_blocking()
            .map_err(|_| ExecuteError::Disconnected)?;
        self.index = snapshot;
        result
    }
}

impl<B: Backend> Drop for ThreadedExecutor<B> {
    fn drop(&mut self) {
        self.jobs.close();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("executor thread panicked");
            }
        }
    }
}
