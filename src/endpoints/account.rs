use crate::error::Result;
use crate::http::{seg, ApiClient};
use serde_json::{json, Value};

pub struct Auth<'a> {
    pub(super) api: &'a ApiClient,
}

impl Auth<'_> {
    pub async fn login(&self, wallet_address: &str, signature: &str, message: &str) -> Result<Value> {
        self.api
            .post(
                "/auth/login",
                Some(json!({
                    "wallet_address": wallet_address,
                    "signature": signature,
                    "message": message,
                })),
            )
            .await
    }

    pub async fn refresh(&self) -> Result<Value> {
        self.api.post("/auth/refresh", None).await
    }

    pub async fn logout(&self) -> Result<Value> {
        self.api.post("/auth/logout", None).await
    }
}

pub struct Notifications<'a> {
    pub(super) api: &'a ApiClient,
}

impl Notifications<'_> {
    pub async fn list(&self) -> Result<Value> {
        self.api.get("/notifications").await
    }

    pub async fn mark_as_read(&self, notification_id: &str) -> Result<Value> {
        self.api
            .put(
                &format!("/notifications/{}/read", seg(notification_id)),
                None,
            )
            .await
    }

    pub async fn delete(&self, notification_id: &str) -> Result<Value> {
        self.api
            .delete(&format!("/notifications/{}", seg(notification_id)))
            .await
    }
}

pub struct Users<'a> {
    pub(super) api: &'a ApiClient,
}

impl Users<'_> {
    pub async fn profile(&self, user_id: &str) -> Result<Value> {
        self.api.get(&format!("/users/{}", seg(user_id))).await
    }

    pub async fn update_profile(&self, user_id: &str, data: Value) -> Result<Value> {
        self.api
            .put(&format!("/users/{}", seg(user_id)), Some(data))
            .await
    }

    pub async fn add_social_link(&self, user_id: &str, platform: &str, url: &str) -> Result<Value> {
        self.api
            .post(
                &format!("/users/{}/social-links", seg(user_id)),
                Some(json!({ "platform": platform, "url": url })),
            )
            .await
    }

    pub async fn delete_social_link(&self, user_id: &str, link_id: &str) -> Result<Value> {
        self.api
            .delete(&format!(
                "/users/{}/social-links/{}",
                seg(user_id),
                seg(link_id)
            ))
            .await
    }

    pub async fn follow(&self, user_id: &str) -> Result<Value> {
        self.api
            .post(&format!("/users/{}/follow", seg(user_id)), None)
            .await
    }

    pub async fn unfollow(&self, user_id: &str) -> Result<Value> {
        self.api
            .delete(&format!("/users/{}/follow", seg(user_id)))
            .await
    }

    pub async fn followers(&self, user_id: &str) -> Result<Value> {
        self.api
            .get(&format!("/users/{}/followers", seg(user_id)))
            .await
    }

    pub async fn following(&self, user_id: &str) -> Result<Value> {
        self.api
            .get(&format!("/users/{}/following", seg(user_id)))
            .await
    }
}

pub struct Analytics<'a> {
    pub(super) api: &'a ApiClient,
}

impl Analytics<'_> {
    pub async fn daily_metrics(&self) -> Result<Value> {
        self.api.get("/analytics/daily-metrics").await
    }

    pub async fn nft_performance(&self) -> Result<Value> {
        self.api.get("/analytics/nft-performance").await
    }

    pub async fn user_engagement(&self) -> Result<Value> {
        self.api.get("/analytics/user-engagement").await
    }

    pub async fn sales_trends(&self) -> Result<Value> {
        self.api.get("/analytics/sales-trends").await
    }
}

pub struct Referral<'a> {
    pub(super) api: &'a ApiClient,
}

impl Referral<'_> {
    pub async fn code(&self) -> Result<Value> {
        self.api.get("/referral/code").await
    }

    pub async fn stats(&self) -> Result<Value> {
        self.api.get("/referral/stats").await
    }

    pub async fn history(&self) -> Result<Value> {
        self.api.get("/referral/history").await
    }
}

pub struct Staking<'a> {
    pub(super) api: &'a ApiClient,
}

impl Staking<'_> {
    pub async fn pools(&self) -> Result<Value> {
        self.api.get("/staking/pools").await
    }

    pub async fn stake(&self, pool_id: &str, amount: f64) -> Result<Value> {
        self.api
            .post(
                &format!("/staking/stake/{}", seg(pool_id)),
                Some(json!({ "amount": amount })),
            )
            .await
    }

    pub async fn unstake(&self, pool_id: &str, amount: f64) -> Result<Value> {
        self.api
            .post(
                &format!("/staking/unstake/{}", seg(pool_id)),
                Some(json!({ "amount": amount })),
            )
            .await
    }

    pub async fn rewards(&self) -> Result<Value> {
        self.api.get("/staking/rewards").await
    }
}

pub struct Wallet<'a> {
    pub(super) api: &'a ApiClient,
}

impl Wallet<'_> {
    pub async fn balance(&self, user_id: &str) -> Result<Value> {
        self.api
            .get(&format!("/wallet/{}/balance", seg(user_id)))
            .await
    }

    pub async fn transactions(&self, user_id: &str) -> Result<Value> {
        self.api
            .get(&format!("/wallet/{}/transactions", seg(user_id)))
            .await
    }

    pub async fn deposit(&self, user_id: &str, amount: f64, currency: &str) -> Result<Value> {
        self.api
            .post(
                &format!("/wallet/{}/deposit", seg(user_id)),
                Some(json!({ "amount": amount, "currency": currency })),
            )
            .await
    }

    pub async fn withdraw(&self, user_id: &str, amount: f64, currency: &str) -> Result<Value> {
        self.api
            .post(
                &format!("/wallet/{}/withdraw", seg(user_id)),
                Some(json!({ "amount": amount, "currency": currency })),
            )
            .await
    }
}
