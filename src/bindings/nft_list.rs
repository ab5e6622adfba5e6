use super::{
    apply_patch, confirmed_likes, flip_like, revert_patch, send_like, MutationErrors,
    MutationOutcome, PatchDelta, QueryBinding, RollbackPolicy,
};
use crate::error::Result;
use crate::filter::FilterSpec;
use crate::http::ApiClient;
use crate::models::NftPage;
use crate::resource::LoadOutcome;
use crate::state::FetchState;
use tokio::sync::watch;

/// Marketplace listing: `GET /nfts` filtered by a [`FilterSpec`], with
/// optimistic like and cart toggles.
#[derive(Clone)]
pub struct NftListBinding {
    query: QueryBinding<NftPage>,
    policy: RollbackPolicy,
    errors: MutationErrors,
}

impl NftListBinding {
    pub fn new(client: ApiClient, filter: FilterSpec, policy: RollbackPolicy) -> Self {
        let query = QueryBinding::new(client, filter, |api, filter| async move {
            let raw = api.nfts().list(&filter).await?;
            NftPage::from_value(raw)
        });
        Self {
            query,
            policy,
            errors: MutationErrors::default(),
        }
    }

    pub fn state(&self) -> FetchState<NftPage> {
        self.query.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<NftPage>> {
        self.query.subscribe()
    }

    pub fn filter(&self) -> FilterSpec {
        self.query.filter()
    }

    /// Error from the last failed like/cart toggle. Fetch errors live in
    /// `state().error` instead.
    pub fn mutation_error(&self) -> Option<String> {
        self.errors.get()
    }

    pub async fn mount(&self) -> Option<LoadOutcome> {
        self.query.mount().await
    }

    /// Refetches only when the filter's logical content changed.
    pub async fn set_filter(&self, filter: FilterSpec) -> Option<LoadOutcome> {
        self.query.update(filter).await
    }

    pub async fn refetch(&self) -> LoadOutcome {
        self.query.refetch().await
    }

    pub fn dispose(&self) {
        self.query.dispose();
    }

    /// Flip `is_liked` and adjust `likes_count` locally, then call like or
    /// unlike depending on the flag before the flip. A `likes_count` in the
    /// response replaces the local count unless a refetch landed meanwhile.
    pub async fn toggle_like(&self, nft_id: &str) -> Result<MutationOutcome> {
        let resource = self.query.resource();
        let generation = resource.generation();
        let Some(patch) = resource
            .update_data(|page| {
                apply_patch(&mut page.nfts, nft_id, PatchDelta::LikeToggle, generation, flip_like)
            })
            .flatten()
        else {
            log::debug!("[bindings] toggle_like: {} not in current listing", nft_id);
            return Ok(MutationOutcome::NotLoaded);
        };

        match send_like(self.query.client(), nft_id, patch.before.is_liked).await {
            Ok(resp) => {
                let current = resource.generation() == patch.generation;
                if let Some(count) = confirmed_likes(&resp).filter(|_| current) {
                    resource.update_data(|page| {
                        if let Some(nft) = page.find_mut(nft_id) {
                            nft.likes_count = count;
                        }
                    });
                }
                self.errors.clear_for(nft_id);
                Ok(MutationOutcome::Confirmed)
            }
            Err(e) => {
                self.errors.record("toggle_like", nft_id, &e);
                if self.policy == RollbackPolicy::Restore && resource.generation() == patch.generation {
                    resource.update_data(|page| revert_patch(&mut page.nfts, &patch));
                }
                Err(e)
            }
        }
    }

    /// Flip `in_cart` locally, then add to or remove from the cart.
    pub async fn toggle_cart(&self, nft_id: &str) -> Result<MutationOutcome> {
        let resource = self.query.resource();
        let generation = resource.generation();
        let Some(patch) = resource
            .update_data(|page| {
                apply_patch(&mut page.nfts, nft_id, PatchDelta::CartToggle, generation, |n| {
                    n.in_cart = !n.in_cart
                })
            })
            .flatten()
        else {
            log::debug!("[bindings] toggle_cart: {} not in current listing", nft_id);
            return Ok(MutationOutcome::NotLoaded);
        };

        let cart = self.query.client().cart();
        let res = if patch.before.in_cart {
            cart.remove_item(nft_id).await
        } else {
            cart.add_item(nft_id).await
        };

        match res {
            Ok(_) => {
                self.errors.clear_for(nft_id);
                Ok(MutationOutcome::Confirmed)
            }
            Err(e) => {
                self.errors.record("toggle_cart", nft_id, &e);
                if self.policy == RollbackPolicy::Restore && resource.generation() == patch.generation {
                    resource.update_data(|page| revert_patch(&mut page.nfts, &patch));
                }
                Err(e)
            }
        }
    }
}
