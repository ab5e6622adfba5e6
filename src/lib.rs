//! CFISH marketplace client
//!
//! Data-fetching layer for the CFISH NFT marketplace: a thin HTTP adapter
//! over the backend's REST API, one typed endpoint group per backend area,
//! and view bindings that hold `{data, loading, error}` for a screen.
//!
//! ## Layers
//!
//! - [`http`]: base URL, bearer token, JSON in and out, error mapping
//! - [`endpoints`]: `client.nfts().list(&filter)`, `client.cart().add_item(id)`, ...
//! - [`bindings`]: `NftListBinding`, `NftDetailBinding`, `NotificationsBinding`,
//!   generic `QueryBinding` and `Mutation`, all built on [`resource::Resource`]
//!
//! The `native` feature adds SQLite search history and the `cfish` CLI.

pub mod bindings;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod filter;
pub mod http;
pub mod models;
pub mod resource;
pub mod session;
pub mod state;

#[cfg(feature = "native")]
pub mod search_history;

pub use bindings::{
    Mutation, MutationOutcome, NftDetailBinding, NftListBinding, NotificationsBinding,
    QueryBinding, RollbackPolicy,
};
pub use error::{ApiError, Result};
pub use filter::FilterSpec;
pub use http::{ApiClient, ReqwestTransport, Transport};
pub use resource::{LoadOutcome, Resource};
pub use session::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use state::{FetchState, Phase};
