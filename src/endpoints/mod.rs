//! Endpoint groups.
//!
//! One function per backend operation, grouped by domain. Every function is a
//! straight passthrough to [`ApiClient`]: no validation, no reshaping, errors
//! propagate as-is. Callers interpret status codes themselves.
//!
//! ```ignore
//! let page = client.nfts().list(&FilterSpec::new().with("category", "art")).await?;
//! client.staking().stake("pool-1", 250.0).await?;
//! ```

mod account;
mod community;
mod market;

pub use account::{Analytics, Auth, Notifications, Referral, Staking, Users, Wallet};
pub use community::{ActivityCalendar, AntiBrushing, Disputes, IntentPool};
pub use market::{Auctions, Barter, BulkOperations, Cart, Minting, Nfts};

use crate::http::ApiClient;

impl ApiClient {
    pub fn auth(&self) -> Auth<'_> {
        Auth { api: self }
    }

    pub fn nfts(&self) -> Nfts<'_> {
        Nfts { api: self }
    }

    pub fn cart(&self) -> Cart<'_> {
        Cart { api: self }
    }

    pub fn notifications(&self) -> Notifications<'_> {
        Notifications { api: self }
    }

    pub fn users(&self) -> Users<'_> {
        Users { api: self }
    }

    pub fn analytics(&self) -> Analytics<'_> {
        Analytics { api: self }
    }

    pub fn referral(&self) -> Referral<'_> {
        Referral { api: self }
    }

    pub fn anti_brushing(&self) -> AntiBrushing<'_> {
        AntiBrushing { api: self }
    }

    pub fn staking(&self) -> Staking<'_> {
        Staking { api: self }
    }

    pub fn wallet(&self) -> Wallet<'_> {
        Wallet { api: self }
    }

    pub fn barter(&self) -> Barter<'_> {
        Barter { api: self }
    }

    pub fn bulk(&self) -> BulkOperations<'_> {
        BulkOperations { api: self }
    }

    pub fn calendar(&self) -> ActivityCalendar<'_> {
        ActivityCalendar { api: self }
    }

    pub fn intents(&self) -> IntentPool<'_> {
        IntentPool { api: self }
    }

    pub fn minting(&self) -> Minting<'_> {
        Minting { api: self }
    }

    pub fn auctions(&self) -> Auctions<'_> {
        Auctions { api: self }
    }

    pub fn disputes(&self) -> Disputes<'_> {
        Disputes { api: self }
    }
}
