use super::{
    confirmed_likes, flip_like, send_like, MutationErrors, MutationOutcome, QueryBinding,
    RollbackPolicy,
};
use crate::error::Result;
use crate::filter::FilterSpec;
use crate::http::ApiClient;
use crate::models::Nft;
use crate::resource::LoadOutcome;
use crate::state::FetchState;
use serde_json::Value;
use tokio::sync::watch;

const ID_KEY: &str = "id";

/// Single NFT keyed by id. No id, no request.
#[derive(Clone)]
pub struct NftDetailBinding {
    query: QueryBinding<Nft>,
    policy: RollbackPolicy,
    errors: MutationErrors,
}

/// Accepts a bare NFT object or `{"nft": {...}}`.
fn nft_from_value(v: Value) -> Result<Nft> {
    let inner = match v {
        Value::Object(mut o) if o.contains_key("nft") => o.remove("nft").unwrap_or_default(),
        other => other,
    };
    Ok(serde_json::from_value(inner)?)
}

impl NftDetailBinding {
    pub fn new(client: ApiClient, policy: RollbackPolicy) -> Self {
        let query = QueryBinding::new(client, FilterSpec::new(), |api, deps| async move {
            let id = deps
                .get(ID_KEY)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            nft_from_value(api.nfts().get(&id).await?)
        });
        Self {
            query,
            policy,
            errors: MutationErrors::default(),
        }
    }

    pub fn state(&self) -> FetchState<Nft> {
        self.query.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<Nft>> {
        self.query.subscribe()
    }

    pub fn mutation_error(&self) -> Option<String> {
        self.errors.get()
    }

    /// Point the binding at `id`. `None` clears state without a request;
    /// the same id again is a no-op.
    pub async fn set_id(&self, id: Option<&str>) -> Option<LoadOutcome> {
        match id {
            Some(id) if !id.is_empty() => {
                self.query
                    .update(FilterSpec::new().with(ID_KEY, id))
                    .await
            }
            _ => {
                self.query.clear(FilterSpec::new());
                None
            }
        }
    }

    pub async fn refetch(&self) -> Option<LoadOutcome> {
        if self.query.filter().get(ID_KEY).is_none() {
            return None;
        }
        Some(self.query.refetch().await)
    }

    /// The last fetch failed with 404.
    pub fn is_not_found(&self) -> bool {
        self.query.state().error_status == Some(404)
    }

    pub fn dispose(&self) {
        self.query.dispose();
    }

    pub async fn toggle_like(&self) -> Result<MutationOutcome> {
        let resource = self.query.resource();
        let generation = resource.generation();
        let Some(before) = resource.update_data(|nft| {
            let before = nft.clone();
            flip_like(nft);
            before
        }) else {
            return Ok(MutationOutcome::NotLoaded);
        };

        match send_like(self.query.client(), &before.id, before.is_liked).await {
            Ok(resp) => {
                if resource.generation() == generation {
                    if let Some(count) = confirmed_likes(&resp) {
                        resource.update_data(|nft| nft.likes_count = count);
                    }
                }
                self.errors.clear_for(&before.id);
                Ok(MutationOutcome::Confirmed)
            }
            Err(e) => {
                self.errors.record("toggle_like", &before.id, &e);
                if self.policy == RollbackPolicy::Restore && resource.generation() == generation {
                    resource.update_data(|nft| *nft = before);
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::testing::{scripted, Reply};
    use crate::error::ApiError;
    use crate::http::Method;
    use crate::state::Phase;
    use serde_json::json;

    #[tokio::test]
    async fn no_id_no_request() {
        let (client, script) = scripted();
        let b = NftDetailBinding::new(client, RollbackPolicy::Restore);
        assert_eq!(b.set_id(None).await, None);
        assert_eq!(b.state().phase(), Phase::Idle);
        assert!(script.seen.lock().unwrap().is_empty());
        assert_eq!(b.refetch().await, None);
    }

    #[tokio::test]
    async fn cleared_id_stays_cleared_on_refetch() {
        let (client, script) = scripted();
        script.on(Method::Get, "/nfts/3", Reply::Json(200, json!({"id": "3"})));
        script.on(Method::Get, "/nfts/3", Reply::Json(200, json!({"id": "3"})));
        let b = NftDetailBinding::new(client, RollbackPolicy::default());

        b.set_id(Some("3")).await;
        assert_eq!(b.set_id(None).await, None);
        assert_eq!(b.refetch().await, None);
        assert_eq!(script.count(Method::Get, "/nfts/3"), 1);
        assert!(b.state().data.is_none());

        // coming back to the same id fetches again
        assert_eq!(b.set_id(Some("3")).await, Some(LoadOutcome::Applied));
        assert_eq!(script.count(Method::Get, "/nfts/3"), 2);
    }

    #[tokio::test]
    async fn toggle_without_detail_is_not_loaded() {
        let (client, script) = scripted();
        let b = NftDetailBinding::new(client, RollbackPolicy::default());
        assert_eq!(b.toggle_like().await, Ok(MutationOutcome::NotLoaded));
        assert!(script.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn like_count_ignored_after_detail_refetch() {
        let (client, script) = scripted();
        script.on(Method::Get, "/nfts/3", Reply::Json(200, json!({"id": "3", "likes_count": 2})));
        script.on(
            Method::Get,
            "/nfts/3",
            Reply::Json(200, json!({"id": "3", "likes_count": 20, "isLiked": true})),
        );
        let (release, gate) = tokio::sync::oneshot::channel();
        script.on(Method::Post, "/nfts/3/like", Reply::Gate(gate));

        let b = NftDetailBinding::new(client, RollbackPolicy::default());
        b.set_id(Some("3")).await;
        let like = {
            let b = b.clone();
            tokio::spawn(async move { b.toggle_like().await })
        };
        while script.count(Method::Post, "/nfts/3/like") < 1 {
            tokio::task::yield_now().await;
        }
        b.refetch().await;

        let _ = release.send(Reply::Json(200, json!({"likes_count": 3})));
        assert_eq!(like.await.unwrap(), Ok(MutationOutcome::Confirmed));
        assert_eq!(b.state().data.unwrap().likes_count, 20);
    }

    #[tokio::test]
    async fn missing_nft_reports_not_found() {
        let (client, script) = scripted();
        script.on(Method::Get, "/nfts/7", Reply::Json(404, json!({"error": "NFT not found"})));
        let b = NftDetailBinding::new(client, RollbackPolicy::Restore);
        b.set_id(Some("7")).await;
        assert!(b.is_not_found());
        assert_eq!(b.state().error.as_deref(), Some("HTTP 404: NFT not found"));
    }

    #[tokio::test]
    async fn wrapped_detail_and_same_id_dedup() {
        let (client, script) = scripted();
        script.on(
            Method::Get,
            "/nfts/3",
            Reply::Json(200, json!({"nft": {"id": 3, "title": "Bream", "likes_count": 2}})),
        );
        let b = NftDetailBinding::new(client, RollbackPolicy::Restore);
        assert_eq!(b.set_id(Some("3")).await, Some(LoadOutcome::Applied));
        assert_eq!(b.set_id(Some("3")).await, None);
        assert_eq!(script.count(Method::Get, "/nfts/3"), 1);
        assert_eq!(b.state().data.unwrap().title.as_deref(), Some("Bream"));
    }

    #[tokio::test]
    async fn failed_like_restores_detail() {
        let (client, script) = scripted();
        script.on(Method::Get, "/nfts/3", Reply::Json(200, json!({"id": "3", "likes_count": 2})));
        script.on(
            Method::Post,
            "/nfts/3/like",
            Reply::Fail(ApiError::Network("timed out".into())),
        );
        let b = NftDetailBinding::new(client, RollbackPolicy::Restore);
        b.set_id(Some("3")).await;
        assert!(b.toggle_like().await.is_err());
        let nft = b.state().data.unwrap();
        assert_eq!((nft.likes_count, nft.is_liked), (2, false));
        assert!(b.mutation_error().is_some());
    }
}
