use async_trait::async_trait;
use cfish::{
    http::{ApiRequest, ApiResponse},
    ApiClient, ApiError, FilterSpec, LoadOutcome, MemoryTokenStore, NftListBinding, Phase,
    RollbackPolicy, Transport,
};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

type Reply = std::result::Result<(u16, Value), ApiError>;

/// Transport whose responses are released by the test, one by one.
#[derive(Default)]
struct Held {
    queues: Mutex<HashMap<String, VecDeque<oneshot::Receiver<Reply>>>>,
    arrived: AtomicUsize,
}

impl Held {
    fn hold(&self, path_and_query: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.queues
            .lock()
            .unwrap()
            .entry(path_and_query.to_string())
            .or_default()
            .push_back(rx);
        tx
    }

    /// Yield until `n` requests in total have reached the transport.
    async fn until(&self, n: usize) {
        while self.arrived.load(Ordering::SeqCst) < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl Transport for Held {
    async fn execute(&self, request: ApiRequest) -> cfish::Result<ApiResponse> {
        let mut key = request.url.trim_start_matches("http://held/api/v1").to_string();
        if !request.query.is_empty() {
            let qs: Vec<String> = request.query.iter().map(|(k, v)| format!("{k}={v}")).collect();
            key = format!("{key}?{}", qs.join("&"));
        }
        let rx = self
            .queues
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(|q| q.pop_front());
        self.arrived.fetch_add(1, Ordering::SeqCst);
        let Some(rx) = rx else {
            return Ok(ApiResponse {
                status: 404,
                body: json!({"message": format!("no route for {key}")}).to_string(),
            });
        };
        let (status, body) = rx
            .await
            .unwrap_or_else(|_| Err(ApiError::Network("released without reply".into())))?;
        Ok(ApiResponse {
            status,
            body: body.to_string(),
        })
    }
}

fn held() -> (ApiClient, Arc<Held>) {
    let held = Arc::new(Held::default());
    let client = ApiClient::new(
        "http://held/api/v1",
        held.clone(),
        Arc::new(MemoryTokenStore::with_token("t0k")),
    );
    (client, held)
}

fn page(items: Value) -> Value {
    json!({"nfts": items, "total": 1, "pages": 1, "current_page": 1})
}

fn koi() -> Value {
    page(json!([{"id": "1", "title": "Koi", "likes_count": 5, "isLiked": false}]))
}

async fn mounted(policy: RollbackPolicy) -> (NftListBinding, Arc<Held>) {
    let (client, held) = held();
    let gate = held.hold("/nfts");
    gate.send(Ok((200, koi()))).unwrap();
    let listing = NftListBinding::new(client, FilterSpec::new(), policy);
    listing.mount().await;
    (listing, held)
}

#[tokio::test]
async fn loading_until_exactly_one_outcome() {
    let (client, held) = held();
    let gate = held.hold("/nfts");
    let listing = NftListBinding::new(client, FilterSpec::new(), RollbackPolicy::Restore);

    let task = {
        let listing = listing.clone();
        tokio::spawn(async move { listing.mount().await })
    };
    held.until(1).await;

    let s = listing.state();
    assert_eq!(s.phase(), Phase::Loading);
    assert!(s.data.is_none() && s.error.is_none());

    gate.send(Ok((500, json!({"error": "Internal server error"})))).unwrap();
    assert_eq!(task.await.unwrap(), Some(LoadOutcome::Applied));
    let s = listing.state();
    assert!(!s.loading);
    assert!(s.data.is_none());
    assert_eq!(s.error.as_deref(), Some("HTTP 500: Internal server error"));
    assert_eq!(s.error_status, Some(500));
}

#[tokio::test]
async fn like_patch_shows_before_server_answers() {
    let (listing, held) = mounted(RollbackPolicy::Restore).await;
    let gate = held.hold("/nfts/1/like");

    let task = {
        let listing = listing.clone();
        tokio::spawn(async move { listing.toggle_like("1").await })
    };
    held.until(2).await;

    let nft = listing.state().data.unwrap().nfts[0].clone();
    assert_eq!((nft.likes_count, nft.is_liked), (6, true));

    gate.send(Ok((200, json!({"message": "liked"})))).unwrap();
    task.await.unwrap().unwrap();
    let nft = listing.state().data.unwrap().nfts[0].clone();
    assert_eq!((nft.likes_count, nft.is_liked), (6, true));
}

#[tokio::test]
async fn rejected_like_keeps_patch_by_default() {
    let (listing, held) = mounted(RollbackPolicy::default()).await;
    let gate = held.hold("/nfts/1/like");
    gate.send(Err(ApiError::Network("connection reset".into()))).unwrap();

    assert!(listing.toggle_like("1").await.is_err());
    let nft = listing.state().data.unwrap().nfts[0].clone();
    assert_eq!((nft.likes_count, nft.is_liked), (6, true));
    assert_eq!(
        listing.mutation_error().as_deref(),
        Some("Network error: connection reset")
    );
}

#[tokio::test]
async fn rejected_like_restores_under_restore_policy() {
    let (listing, held) = mounted(RollbackPolicy::Restore).await;
    let gate = held.hold("/nfts/1/like");

    let task = {
        let listing = listing.clone();
        tokio::spawn(async move { listing.toggle_like("1").await })
    };
    held.until(2).await;
    let nft = listing.state().data.unwrap().nfts[0].clone();
    assert_eq!((nft.likes_count, nft.is_liked), (6, true));

    gate.send(Ok((400, json!({"message": "Invalid request"})))).unwrap();
    let err = task.await.unwrap().unwrap_err();
    assert_eq!(err.status(), Some(400));

    let nft = listing.state().data.unwrap().nfts[0].clone();
    assert_eq!((nft.likes_count, nft.is_liked), (5, false));
    assert_eq!(listing.mutation_error().as_deref(), Some("HTTP 400: Invalid request"));
    assert_eq!(listing.state().error, None);
}

#[tokio::test]
async fn refetch_during_like_is_not_reverted_over() {
    let (listing, held) = mounted(RollbackPolicy::Restore).await;
    let like = held.hold("/nfts/1/like");

    let task = {
        let listing = listing.clone();
        tokio::spawn(async move { listing.toggle_like("1").await })
    };
    held.until(2).await;

    let refresh = held.hold("/nfts");
    refresh
        .send(Ok((200, page(json!([{"id": "1", "likes_count": 11, "isLiked": false}])))))
        .unwrap();
    listing.refetch().await;

    like.send(Ok((503, json!({"message": "busy"})))).unwrap();
    assert!(task.await.unwrap().is_err());
    assert_eq!(listing.state().data.unwrap().nfts[0].likes_count, 11);
}

#[tokio::test]
async fn stale_filter_response_never_overwrites_newer() {
    let (client, held) = held();
    let slow = held.hold("/nfts?category=art");
    let fast = held.hold("/nfts?category=music");
    let listing = NftListBinding::new(
        client,
        FilterSpec::new().with("category", "art"),
        RollbackPolicy::Restore,
    );

    let first = {
        let listing = listing.clone();
        tokio::spawn(async move { listing.mount().await })
    };
    held.until(1).await;

    fast.send(Ok((200, page(json!([{"id": "m1", "category": "music"}])))))
        .unwrap();
    assert_eq!(
        listing
            .set_filter(FilterSpec::new().with("category", "music"))
            .await,
        Some(LoadOutcome::Applied)
    );

    slow.send(Ok((200, page(json!([{"id": "a1", "category": "art"}])))))
        .unwrap();
    assert_eq!(first.await.unwrap(), Some(LoadOutcome::Superseded));

    let state = listing.state();
    assert!(!state.loading);
    assert_eq!(state.data.unwrap().nfts[0].id, "m1");
}

#[tokio::test]
async fn reordered_filter_does_not_refetch() {
    let (client, held) = held();
    let gate = held.hold("/nfts?category=art&sort=newest");
    gate.send(Ok((200, koi()))).unwrap();
    let listing = NftListBinding::new(
        client,
        FilterSpec::new().with("category", "art").with("sort", "newest"),
        RollbackPolicy::Restore,
    );
    listing.mount().await;

    let reordered = FilterSpec::new().with("sort", "newest").with("category", "art");
    assert_eq!(listing.set_filter(reordered).await, None);
    assert_eq!(listing.state().data.unwrap().nfts.len(), 1);
}

#[tokio::test]
async fn disposed_listing_drops_late_response() {
    let (client, held) = held();
    let gate = held.hold("/nfts");
    let listing = NftListBinding::new(client, FilterSpec::new(), RollbackPolicy::Restore);

    let task = {
        let listing = listing.clone();
        tokio::spawn(async move { listing.mount().await })
    };
    held.until(1).await;
    listing.dispose();

    gate.send(Ok((200, koi()))).unwrap();
    assert_eq!(task.await.unwrap(), Some(LoadOutcome::Disposed));
    assert!(listing.state().data.is_none());
}
