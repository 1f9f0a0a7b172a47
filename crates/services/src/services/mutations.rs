//! Write path: run one backend write, invalidate what it touched, report progress.
//!
//! Writes are never retried or de-duplicated; two identical calls issue two requests.

use std::{future::Future, sync::Arc};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use super::{
    notification::{Notification, NotificationPhase, Notifier},
    query_cache::{QueryCache, QueryKey},
};
use crate::error::ServiceError;

/// Messages shown for each phase of a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationMessages {
    pub pending: String,
    pub success: String,
    pub failure: String,
}

/// Describes one kind of write: what to tell the user and which keys go stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationSpec {
    pub name: String,
    pub messages: MutationMessages,
    pub invalidates: Vec<QueryKey>,
}

impl MutationSpec {
    pub fn new(
        name: impl Into<String>,
        pending: impl Into<String>,
        success: impl Into<String>,
        failure: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            messages: MutationMessages {
                pending: pending.into(),
                success: success.into(),
                failure: failure.into(),
            },
            invalidates: Vec::new(),
        }
    }

    pub fn invalidates(mut self, key: QueryKey) -> Self {
        self.invalidates.push(key);
        self
    }
}

/// Three-state outcome of a write.
#[derive(Debug, Clone)]
pub enum MutationState<T> {
    Pending,
    Ok(T),
    Err(ServiceError),
}

impl<T> MutationState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Handle to a mutation running in the background.
pub struct MutationHandle<T> {
    state: watch::Receiver<MutationState<T>>,
    task: JoinHandle<Result<T, ServiceError>>,
}

impl<T: Clone> MutationHandle<T> {
    pub fn state(&self) -> MutationState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationState<T>> {
        self.state.clone()
    }

    /// Wait for the write to finish. Dropping the handle instead lets it run to completion.
    pub async fn wait(self) -> Result<T, ServiceError> {
        self.task
            .await
            .map_err(|e| ServiceError::Task(e.to_string()))?
    }
}

#[derive(Clone)]
pub struct Mutations {
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
}

impl Mutations {
    pub fn new(cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self { cache, notifier }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    async fn emit(&self, spec: &MutationSpec, phase: NotificationPhase, message: String) {
        self.notifier
            .notify(Notification {
                mutation: spec.name.clone(),
                phase,
                message,
            })
            .await;
    }

    /// Perform `write`, then on success mark every key in `spec.invalidates` stale.
    pub async fn run<T, Fut>(&self, spec: &MutationSpec, write: Fut) -> Result<T, ServiceError>
    where
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        self.emit(spec, NotificationPhase::Pending, spec.messages.pending.clone())
            .await;
        debug!(mutation = %spec.name, "Running mutation");

        match write.await {
            Ok(value) => {
                let touched: usize = spec
                    .invalidates
                    .iter()
                    .map(|key| self.cache.invalidate(key))
                    .sum();
                info!(mutation = %spec.name, invalidated = touched, "Mutation succeeded");
                self.emit(spec, NotificationPhase::Success, spec.messages.success.clone())
                    .await;
                Ok(value)
            }
            Err(e) => {
                warn!(mutation = %spec.name, error = %e, "Mutation failed");
                self.emit(
                    spec,
                    NotificationPhase::Failure,
                    format!("{}: {}", spec.messages.failure, e),
                )
                .await;
                Err(e)
            }
        }
    }

    /// Fire-and-forget variant of [`run`](Self::run).
    pub fn spawn<T, Fut>(&self, spec: MutationSpec, write: Fut) -> MutationHandle<T>
    where
        T: Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ServiceError>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(MutationState::Pending);
        let mutations = self.clone();
        let task = tokio::spawn(async move {
            let result = mutations.run(&spec, write).await;
            let state = match &result {
                Ok(value) => MutationState::Ok(value.clone()),
                Err(e) => MutationState::Err(e.clone()),
            };
            tx.send_replace(state);
            result
        });
        MutationHandle { state: rx, task }
    }
}
