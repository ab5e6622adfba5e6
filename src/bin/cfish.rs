// Command-line client for the CFISH marketplace backend

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;

use cfish::{
    config::{self, CliArgs, Config},
    search_history::{SearchHistory, DISPLAY_ENTRIES},
    session::absorb_tokens,
    ApiClient, FetchState, FileTokenStore, FilterSpec, MutationOutcome, NftDetailBinding,
    NftListBinding, NotificationsBinding, TokenStore,
};

#[derive(Parser, Debug)]
#[command(name = "cfish", version, about = "CFISH NFT marketplace client")]
struct Cli {
    #[command(flatten)]
    args: CliArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse the marketplace listing
    Nfts {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show one NFT
    Nft { id: String },
    /// Toggle the like on an NFT
    Like { id: String },
    /// Shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Log in with a signed wallet message and store the returned tokens
    Login {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        signature: String,
        #[arg(long)]
        message: String,
    },
    Logout,
    /// List notifications
    Notifications {
        #[arg(long)]
        mark_all_read: bool,
    },
    /// Recent marketplace searches
    Searches {
        #[arg(long)]
        clear: bool,
    },
    /// Analytics overview
    Dashboard,
    /// Print the resolved configuration
    Config,
}

#[derive(Subcommand, Debug)]
enum CartAction {
    Show,
    Add { id: String },
    Remove { id: String },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a settled binding state, turning a fetch error into a failed exit.
fn report<T: Serialize>(state: FetchState<T>) -> Result<()> {
    if let Some(err) = state.error {
        bail!(err);
    }
    print_json(&state.data)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = config::load(cli.args).context("Failed to load configuration")?;

    let tokens: Arc<dyn TokenStore> = Arc::new(
        FileTokenStore::open(&cfg.session_path).context("Failed to open session file")?,
    );
    let client = ApiClient::from_config(&cfg, tokens.clone())?;
    log::debug!("[cli] backend {}", client.base_url());

    match cli.command {
        Command::Nfts {
            category,
            search,
            sort,
            page,
        } => {
            let mut filter = FilterSpec::new().with("per_page", cfg.per_page);
            if let Some(c) = category {
                filter.set("category", c);
            }
            if let Some(q) = &search {
                filter.set("search", q.as_str());
                remember_search(&cfg, q);
            }
            if let Some(s) = sort {
                filter.set("sort", s);
            }
            if let Some(p) = page {
                filter.set("page", p);
            }
            let listing = NftListBinding::new(client, filter, cfg.rollback);
            listing.mount().await;
            report(listing.state())?;
        }
        Command::Nft { id } => {
            let detail = NftDetailBinding::new(client, cfg.rollback);
            detail.set_id(Some(&id)).await;
            if detail.is_not_found() {
                bail!("NFT {id} not found");
            }
            report(detail.state())?;
        }
        Command::Like { id } => {
            let detail = NftDetailBinding::new(client, cfg.rollback);
            detail.set_id(Some(&id)).await;
            if detail.is_not_found() {
                bail!("NFT {id} not found");
            }
            if detail.toggle_like().await? == MutationOutcome::NotLoaded {
                bail!("NFT {id} could not be loaded: {}", detail.state().error.unwrap_or_default());
            }
            report(detail.state())?;
        }
        Command::Cart { action } => {
            let res = match action {
                CartAction::Show => client.cart().get().await?,
                CartAction::Add { id } => client.cart().add_item(&id).await?,
                CartAction::Remove { id } => client.cart().remove_item(&id).await?,
            };
            print_json(&res)?;
        }
        Command::Login {
            wallet,
            signature,
            message,
        } => {
            let res = client.auth().login(&wallet, &signature, &message).await?;
            if !absorb_tokens(tokens.as_ref(), &res)? {
                bail!("login response carried no access token");
            }
            log::info!("Logged in as {}", wallet);
        }
        Command::Logout => {
            if let Err(e) = client.auth().logout().await {
                log::warn!("[cli] backend logout failed: {}", e);
            }
            tokens.clear()?;
            log::info!("Logged out");
        }
        Command::Notifications { mark_all_read } => {
            let inbox = NotificationsBinding::new(client, cfg.rollback);
            inbox.mount().await;
            if mark_all_read {
                inbox.mark_all_as_read().await?;
            }
            eprintln!("{} unread", inbox.unread_count());
            report(inbox.state())?;
        }
        Command::Searches { clear } => {
            let history = SearchHistory::open(&cfg.history_db_path)?;
            if clear {
                history.clear()?;
            }
            for entry in history.recent(DISPLAY_ENTRIES)? {
                println!("{}  {}", entry.searched_at.format("%Y-%m-%d %H:%M"), entry.query);
            }
        }
        Command::Dashboard => {
            let analytics = client.analytics();
            let (daily, performance, engagement, sales) = futures::join!(
                analytics.daily_metrics(),
                analytics.nft_performance(),
                analytics.user_engagement(),
                analytics.sales_trends(),
            );
            print_json(&serde_json::json!({
                "daily_metrics": daily?,
                "nft_performance": performance?,
                "user_engagement": engagement?,
                "sales_trends": sales?,
            }))?;
        }
        Command::Config => cfg.print_summary(),
    }

    Ok(())
}

fn remember_search(cfg: &Config, query: &str) {
    let res = SearchHistory::open(&cfg.history_db_path).and_then(|h| h.add(query));
    if let Err(e) = res {
        log::warn!("[cli] could not record search: {:#}", e);
    }
}
