use crate::error::{ApiError, Result};
use crate::resource::{LoadOutcome, Resource};
use crate::state::FetchState;
use std::future::Future;
use tokio::sync::watch;

/// Imperative write with its own loading/error slot.
///
/// Unlike a fetch, a mutation is never triggered by a dependency change; the
/// caller fires it and gets the result back as well as through `state()`.
#[derive(Clone)]
pub struct Mutation<T> {
    resource: Resource<T>,
}

impl<T: Clone> Default for Mutation<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Mutation<T> {
    pub fn new() -> Self {
        Self {
            resource: Resource::new(),
        }
    }

    pub async fn mutate<F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let mut result = None;
        let outcome = self
            .resource
            .load(async {
                let r = fut.await;
                result = Some(r.clone());
                r
            })
            .await;
        if outcome != LoadOutcome::Applied {
            log::debug!("[bindings] mutation settled as {:?}", outcome);
        }
        // Disposed before the call started: the future was never polled.
        result.unwrap_or(Err(ApiError::Cancelled))
    }

    pub fn state(&self) -> FetchState<T> {
        self.resource.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.resource.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.resource.snapshot().loading
    }

    pub fn error(&self) -> Option<String> {
        self.resource.snapshot().error
    }

    pub fn reset(&self) {
        self.resource.reset();
    }

    pub fn dispose(&self) {
        self.resource.dispose();
    }
}
