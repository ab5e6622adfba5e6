//! Generation-tagged fetch slot.
//!
//! Each call to [`Resource::load`] takes a new generation number when it is
//! issued. When its response arrives, the outcome is written only if no newer
//! load has been issued since and the resource has not been disposed. The
//! displayed state therefore tracks the most recently *requested* data, not
//! the most recently *resolved* response.
//!
//! State lives in a `tokio::sync::watch` channel. The generation check and the
//! write happen under the channel's lock, so a load that starts between them
//! cannot be clobbered.

use crate::error::Result;
use crate::state::FetchState;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response was written to state.
    Applied,
    /// A newer load was issued before this one resolved; response dropped.
    Superseded,
    /// The resource was disposed; response dropped.
    Disposed,
}

struct Shared<T> {
    state: watch::Sender<FetchState<T>>,
    generation: AtomicU64,
    disposed: AtomicBool,
}

pub struct Resource<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone> Default for Resource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Resource<T> {
    pub fn new() -> Self {
        let (state, _) = watch::channel(FetchState::default());
        Self {
            shared: Arc::new(Shared {
                state,
                generation: AtomicU64::new(0),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    pub fn snapshot(&self) -> FetchState<T> {
        self.shared.state.borrow().clone()
    }

    /// Receiver that wakes on every state change (the view's re-render hook).
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.shared.state.subscribe()
    }

    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.load(Ordering::SeqCst)
    }

    /// Unmount. Any response still in flight is dropped when it arrives.
    pub fn dispose(&self) {
        let shared = &self.shared;
        shared.state.send_if_modified(|_| {
            shared.disposed.store(true, Ordering::SeqCst);
            shared.generation.fetch_add(1, Ordering::SeqCst);
            false
        });
    }

    /// Back to Idle. In-flight responses are dropped like after a new load.
    pub fn reset(&self) {
        let shared = &self.shared;
        shared.state.send_if_modified(|s| {
            shared.generation.fetch_add(1, Ordering::SeqCst);
            *s = FetchState::default();
            true
        });
    }

    /// Run one fetch through the Loading -> Success | Failed transition.
    pub async fn load<F>(&self, fut: F) -> LoadOutcome
    where
        F: Future<Output = Result<T>>,
    {
        let Some(generation) = self.begin() else {
            return LoadOutcome::Disposed;
        };
        let result = fut.await;
        self.settle(generation, result)
    }

    fn begin(&self) -> Option<u64> {
        let shared = &self.shared;
        let mut issued = None;
        shared.state.send_if_modified(|s| {
            if shared.disposed.load(Ordering::SeqCst) {
                return false;
            }
            issued = Some(shared.generation.fetch_add(1, Ordering::SeqCst) + 1);
            s.loading = true;
            s.data = None;
            s.error = None;
            s.error_status = None;
            true
        });
        issued
    }

    fn settle(&self, generation: u64, result: Result<T>) -> LoadOutcome {
        let shared = &self.shared;
        let mut outcome = LoadOutcome::Applied;
        shared.state.send_if_modified(|s| {
            if shared.disposed.load(Ordering::SeqCst) {
                outcome = LoadOutcome::Disposed;
                return false;
            }
            if shared.generation.load(Ordering::SeqCst) != generation {
                outcome = LoadOutcome::Superseded;
                return false;
            }
            match result {
                Ok(v) => {
                    s.data = Some(v);
                    s.error = None;
                    s.error_status = None;
                }
                Err(e) => {
                    s.data = None;
                    s.error_status = e.status();
                    s.error = Some(e.to_string());
                }
            }
            s.loading = false;
            true
        });
        if outcome != LoadOutcome::Applied {
            log::debug!("[resource] dropped generation {} response: {:?}", generation, outcome);
        }
        outcome
    }

    /// Synchronously patch loaded data. Returns `None` when nothing is loaded.
    pub fn update_data<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut ret = None;
        self.shared.state.send_if_modified(|s| match s.data.as_mut() {
            Some(data) => {
                ret = Some(f(data));
                true
            }
            None => false,
        });
        ret
    }
}
