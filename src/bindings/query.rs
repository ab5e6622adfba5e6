use crate::error::Result;
use crate::filter::FilterSpec;
use crate::http::ApiClient;
use crate::resource::{LoadOutcome, Resource};
use crate::state::FetchState;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

type Fetcher<T> = Arc<dyn Fn(ApiClient, FilterSpec) -> BoxFuture<'static, Result<T>> + Send + Sync>;

struct Deps {
    filter: FilterSpec,
    /// Canonical key of the last fetched filter; `None` until the first fetch.
    fetched: Option<String>,
}

/// Generic dependency-keyed binding over any endpoint.
///
/// ```ignore
/// let pools = QueryBinding::new(client.clone(), FilterSpec::new(), |api, _| async move {
///     api.staking().pools().await
/// });
/// pools.mount().await;
/// ```
pub struct QueryBinding<T> {
    client: ApiClient,
    resource: Resource<T>,
    fetch: Fetcher<T>,
    deps: Arc<Mutex<Deps>>,
}

impl<T> Clone for QueryBinding<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            resource: self.resource.clone(),
            fetch: Arc::clone(&self.fetch),
            deps: Arc::clone(&self.deps),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> QueryBinding<T> {
    pub fn new<F, Fut>(client: ApiClient, filter: FilterSpec, fetch: F) -> Self
    where
        F: Fn(ApiClient, FilterSpec) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let fetch: Fetcher<T> = Arc::new(
            move |api: ApiClient, f: FilterSpec| -> BoxFuture<'static, Result<T>> {
                Box::pin(fetch(api, f))
            },
        );
        Self {
            client,
            resource: Resource::new(),
            fetch,
            deps: Arc::new(Mutex::new(Deps {
                filter,
                fetched: None,
            })),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn resource(&self) -> &Resource<T> {
        &self.resource
    }

    pub fn state(&self) -> FetchState<T> {
        self.resource.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.resource.subscribe()
    }

    pub fn filter(&self) -> FilterSpec {
        self.deps
            .lock()
            .map(|d| d.filter.clone())
            .unwrap_or_default()
    }

    /// First fetch. No-op once anything has been fetched.
    pub async fn mount(&self) -> Option<LoadOutcome> {
        let filter = {
            let mut deps = self.deps.lock().ok()?;
            if deps.fetched.is_some() {
                return None;
            }
            deps.fetched = Some(deps.filter.canonical_key());
            deps.filter.clone()
        };
        Some(self.run(filter).await)
    }

    /// Replace the dependency filter. Fetches only when its canonical key
    /// differs from the last fetched one; returns `None` otherwise.
    pub async fn update(&self, filter: FilterSpec) -> Option<LoadOutcome> {
        let key = filter.canonical_key();
        {
            let mut deps = self.deps.lock().ok()?;
            if deps.fetched.as_deref() == Some(key.as_str()) {
                deps.filter = filter;
                return None;
            }
            deps.filter = filter.clone();
            deps.fetched = Some(key);
        }
        Some(self.run(filter).await)
    }

    /// Re-run the current fetch whether or not anything changed.
    pub async fn refetch(&self) -> LoadOutcome {
        let filter = match self.deps.lock() {
            Ok(mut deps) => {
                deps.fetched = Some(deps.filter.canonical_key());
                deps.filter.clone()
            }
            Err(_) => FilterSpec::new(),
        };
        self.run(filter).await
    }

    /// Drop loaded data, replace the dependency filter and forget the last
    /// fetched key, so the next `update` fetches even for an unchanged filter.
    pub fn clear(&self, filter: FilterSpec) {
        if let Ok(mut deps) = self.deps.lock() {
            deps.filter = filter;
            deps.fetched = None;
        }
        self.resource.reset();
    }

    pub fn dispose(&self) {
        self.resource.dispose();
    }

    async fn run(&self, filter: FilterSpec) -> LoadOutcome {
        let fut = (self.fetch)(self.client.clone(), filter);
        self.resource.load(fut).await
    }
}
