use crate::error::Result;
use crate::filter::FilterSpec;
use crate::http::{seg, ApiClient};
use serde_json::{json, Value};

pub struct Nfts<'a> {
    pub(super) api: &'a ApiClient,
}

impl Nfts<'_> {
    pub async fn list(&self, filter: &FilterSpec) -> Result<Value> {
        self.api.get_with("/nfts", filter.to_query()).await
    }

    pub async fn get(&self, nft_id: &str) -> Result<Value> {
        self.api.get(&format!("/nfts/{}", seg(nft_id))).await
    }

    pub async fn history(&self, nft_id: &str) -> Result<Value> {
        self.api.get(&format!("/nfts/{}/history", seg(nft_id))).await
    }

    pub async fn properties(&self, nft_id: &str) -> Result<Value> {
        self.api
            .get(&format!("/nfts/{}/properties", seg(nft_id)))
            .await
    }

    pub async fn like(&self, nft_id: &str) -> Result<Value> {
        self.api
            .post(&format!("/nfts/{}/like", seg(nft_id)), None)
            .await
    }

    pub async fn unlike(&self, nft_id: &str) -> Result<Value> {
        self.api.delete(&format!("/nfts/{}/like", seg(nft_id))).await
    }

    pub async fn likes(&self, nft_id: &str) -> Result<Value> {
        self.api.get(&format!("/nfts/{}/likes", seg(nft_id))).await
    }
}

pub struct Cart<'a> {
    pub(super) api: &'a ApiClient,
}

impl Cart<'_> {
    pub async fn add_item(&self, nft_id: &str) -> Result<Value> {
        self.api
            .post("/cart/items", Some(json!({ "nft_id": nft_id })))
            .await
    }

    pub async fn get(&self) -> Result<Value> {
        self.api.get("/cart").await
    }

    pub async fn remove_item(&self, nft_id: &str) -> Result<Value> {
        self.api
            .delete(&format!("/cart/items/{}", seg(nft_id)))
            .await
    }
}

pub struct Barter<'a> {
    pub(super) api: &'a ApiClient,
}

impl Barter<'_> {
    pub async fn create_offer(&self, nft_id: &str, offer: Value) -> Result<Value> {
        self.api
            .post(&format!("/barter/offers/{}", seg(nft_id)), Some(offer))
            .await
    }

    pub async fn offers(&self, nft_id: &str) -> Result<Value> {
        self.api
            .get(&format!("/barter/offers/{}", seg(nft_id)))
            .await
    }

    pub async fn accept_offer(&self, offer_id: &str) -> Result<Value> {
        self.api
            .post(&format!("/barter/offers/{}/accept", seg(offer_id)), None)
            .await
    }

    pub async fn reject_offer(&self, offer_id: &str) -> Result<Value> {
        self.api
            .post(&format!("/barter/offers/{}/reject", seg(offer_id)), None)
            .await
    }
}

pub struct BulkOperations<'a> {
    pub(super) api: &'a ApiClient,
}

impl BulkOperations<'_> {
    pub async fn mint(&self, data: Value) -> Result<Value> {
        self.api.post("/bulk-operations/mint", Some(data)).await
    }

    pub async fn transfer(&self, data: Value) -> Result<Value> {
        self.api.post("/bulk-operations/transfer", Some(data)).await
    }

    pub async fn list(&self, data: Value) -> Result<Value> {
        self.api.post("/bulk-operations/list", Some(data)).await
    }
}

pub struct Minting<'a> {
    pub(super) api: &'a ApiClient,
}

impl Minting<'_> {
    pub async fn contracts(&self) -> Result<Value> {
        self.api.get("/minting/contracts").await
    }

    pub async fn estimate_fees(&self, data: Value) -> Result<Value> {
        self.api.post("/minting/fees/estimate", Some(data)).await
    }

    pub async fn record_event(&self, data: Value) -> Result<Value> {
        self.api.post("/minting/events", Some(data)).await
    }

    pub async fn network_status(&self) -> Result<Value> {
        self.api.get("/minting/network/status").await
    }

    pub async fn manage_queue(&self, data: Value) -> Result<Value> {
        self.api.post("/minting/queue", Some(data)).await
    }

    pub async fn templates(&self) -> Result<Value> {
        self.api.get("/minting/templates").await
    }
}

pub struct Auctions<'a> {
    pub(super) api: &'a ApiClient,
}

impl Auctions<'_> {
    pub async fn create(&self, data: Value) -> Result<Value> {
        self.api.post("/auction/auctions", Some(data)).await
    }

    pub async fn list(&self, filter: &FilterSpec) -> Result<Value> {
        self.api
            .get_with("/auction/auctions", filter.to_query())
            .await
    }

    pub async fn place_bid(&self, auction_id: &str, data: Value) -> Result<Value> {
        self.api
            .post(
                &format!("/auction/auctions/{}/bid", seg(auction_id)),
                Some(data),
            )
            .await
    }

    pub async fn watch(&self, auction_id: &str) -> Result<Value> {
        self.api
            .post(
                &format!("/auction/auctions/{}/watchlist", seg(auction_id)),
                None,
            )
            .await
    }

    pub async fn end(&self, auction_id: &str) -> Result<Value> {
        self.api
            .post(&format!("/auction/auctions/{}/end", seg(auction_id)), None)
            .await
    }

    pub async fn analytics(&self, auction_id: &str) -> Result<Value> {
        self.api
            .get(&format!("/auction/auctions/{}/analytics", seg(auction_id)))
            .await
    }

    pub async fn user_bids(&self, user_id: &str) -> Result<Value> {
        self.api
            .get(&format!("/auction/bids/user/{}", seg(user_id)))
            .await
    }
}
