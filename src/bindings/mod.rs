//! View bindings.
//!
//! Per-view state containers: each one owns a [`Resource`], knows which
//! endpoint fills it, decides when a dependency change warrants a refetch, and
//! exposes mutation helpers that patch local state before the server answers.
//!
//! Bindings are cheap `Clone` handles; a view keeps one, subscribes to its
//! state, and calls `dispose()` when it goes away.

mod mutation;
mod nft_detail;
mod nft_list;
mod notifications;
mod query;

pub use mutation::Mutation;
pub use nft_detail::NftDetailBinding;
pub use nft_list::NftListBinding;
pub use notifications::NotificationsBinding;
pub use query::QueryBinding;

use crate::error::{ApiError, Result};
use crate::http::ApiClient;
use crate::models::{Nft, Notification};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// What happens to an optimistic patch when the endpoint call fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RollbackPolicy {
    /// Put the pre-patch snapshot back and record a mutation error.
    Restore,
    /// Leave the patched value in place and only record the error. Local
    /// state may diverge from the server until the next refetch.
    #[default]
    KeepPatched,
}

/// Result of an optimistic mutation that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The patch was applied and the server accepted the call.
    Confirmed,
    /// Nothing loaded held the target (no data yet, a refetch in flight, or
    /// an unknown id). No patch, no request.
    NotLoaded,
    /// The target already had the requested state; no request was sent.
    Unchanged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatchDelta {
    LikeToggle,
    CartToggle,
    MarkRead,
    Remove,
}

/// A local-only change applied before the server confirms it.
#[derive(Clone, Debug, PartialEq)]
pub struct OptimisticPatch<T> {
    pub target: String,
    pub delta: PatchDelta,
    /// Item as it was before the patch.
    pub before: T,
    /// Position in the list when the patch was taken.
    pub index: usize,
    /// Resource generation at patch time. A refetch since then means the
    /// list already holds server state and must not be reverted over.
    pub generation: u64,
}

pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Nft {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Notification {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Apply `delta` to the item keyed `id`. `edit` runs for every delta but
/// `Remove`.
pub(crate) fn apply_patch<T: Keyed + Clone>(
    list: &mut Vec<T>,
    id: &str,
    delta: PatchDelta,
    generation: u64,
    edit: impl FnOnce(&mut T),
) -> Option<OptimisticPatch<T>> {
    let index = list.iter().position(|item| item.key() == id)?;
    let before = list[index].clone();
    match delta {
        PatchDelta::Remove => {
            list.remove(index);
        }
        _ => edit(&mut list[index]),
    }
    Some(OptimisticPatch {
        target: id.to_string(),
        delta,
        before,
        index,
        generation,
    })
}

pub(crate) fn revert_patch<T: Keyed + Clone>(list: &mut Vec<T>, patch: &OptimisticPatch<T>) {
    let current = list.iter().position(|item| item.key() == patch.target);
    match (patch.delta, current) {
        (PatchDelta::Remove, None) => {
            let at = patch.index.min(list.len());
            list.insert(at, patch.before.clone());
        }
        (PatchDelta::Remove, Some(_)) => {}
        (_, Some(i)) => list[i] = patch.before.clone(),
        (_, None) => {}
    }
}

pub(crate) fn flip_like(nft: &mut Nft) {
    nft.is_liked = !nft.is_liked;
    nft.likes_count += if nft.is_liked { 1 } else { -1 };
}

/// Send the like/unlike matching the pre-patch flag.
///
/// The backend answers 409 when the NFT is already liked and 404 when there
/// is no like to remove. Both mean the server already holds the state the
/// client just switched to, so they count as confirmation.
pub(crate) async fn send_like(api: &ApiClient, nft_id: &str, was_liked: bool) -> Result<Value> {
    let res = if was_liked {
        api.nfts().unlike(nft_id).await
    } else {
        api.nfts().like(nft_id).await
    };
    match res {
        Err(ApiError::Status { status: 409, .. }) if !was_liked => Ok(Value::Null),
        Err(ApiError::Status { status: 404, .. }) if was_liked => Ok(Value::Null),
        other => other,
    }
}

/// Server-reported like count, if the response carried one.
pub(crate) fn confirmed_likes(response: &Value) -> Option<i64> {
    response.get("likes_count").and_then(|v| v.as_i64())
}

/// Last failed optimistic mutation, for views that want to surface it.
#[derive(Clone, Default)]
pub(crate) struct MutationErrors {
    /// Target id and message.
    last: Arc<Mutex<Option<(String, String)>>>,
}

impl MutationErrors {
    pub fn record(&self, what: &str, target: &str, err: &ApiError) {
        log::warn!("[bindings] {} on {} failed: {}", what, target, err);
        if let Ok(mut slot) = self.last.lock() {
            *slot = Some((target.to_string(), err.to_string()));
        }
    }

    /// Forget the recorded failure if it belongs to `target`.
    pub fn clear_for(&self, target: &str) {
        if let Ok(mut slot) = self.last.lock() {
            if slot.as_ref().is_some_and(|(t, _)| t == target) {
                *slot = None;
            }
        }
    }

    pub fn get(&self) -> Option<String> {
        self.last
            .lock()
            .ok()
            .and_then(|s| s.as_ref().map(|(_, msg)| msg.clone()))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport for binding tests.

    use crate::error::{ApiError, Result};
    use crate::http::{ApiClient, ApiRequest, ApiResponse, Method, Transport};
    use crate::session::MemoryTokenStore;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::sync::oneshot;

    pub enum Reply {
        Json(u16, serde_json::Value),
        Fail(ApiError),
        /// Hold the request until the test releases it.
        Gate(oneshot::Receiver<Reply>),
    }

    #[derive(Default)]
    pub struct Script {
        routes: Mutex<Vec<(Method, String, VecDeque<Reply>)>>,
        pub seen: Mutex<Vec<ApiRequest>>,
    }

    impl Script {
        pub fn on(&self, method: Method, path: &str, reply: Reply) {
            let mut routes = self.routes.lock().unwrap();
            match routes.iter_mut().find(|(m, p, _)| *m == method && p == path) {
                Some((_, _, q)) => q.push_back(reply),
                None => routes.push((method, path.to_string(), VecDeque::from([reply]))),
            }
        }

        pub fn count(&self, method: Method, path: &str) -> usize {
            self.seen
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.method == method && r.url.ends_with(path))
                .count()
        }
    }

    #[async_trait]
    impl Transport for Script {
        async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
            let path = request
                .url
                .strip_prefix("http://mock/api/v1")
                .unwrap_or(&request.url)
                .to_string();
            let method = request.method;
            self.seen.lock().unwrap().push(request);
            let reply = {
                let mut routes = self.routes.lock().unwrap();
                routes
                    .iter_mut()
                    .find(|(m, p, _)| *m == method && *p == path)
                    .and_then(|(_, _, q)| q.pop_front())
            };

            let mut reply = reply.unwrap_or(Reply::Json(404, serde_json::json!({"message": "no route"})));
            loop {
                match reply {
                    Reply::Json(status, body) => {
                        return Ok(ApiResponse {
                            status,
                            body: body.to_string(),
                        })
                    }
                    Reply::Fail(e) => return Err(e),
                    Reply::Gate(rx) => {
                        reply = rx.await.unwrap_or(Reply::Fail(ApiError::Network("gate dropped".into())))
                    }
                }
            }
        }
    }

    pub fn scripted() -> (ApiClient, Arc<Script>) {
        let script = Arc::new(Script::default());
        let client = ApiClient::new(
            "http://mock/api/v1",
            script.clone(),
            Arc::new(MemoryTokenStore::with_token("t0k")),
        );
        (client, script)
    }
}
