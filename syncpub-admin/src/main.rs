//! Synchronized publisher admin tool.
//!
//! Opens a content store, wires the publisher onto it, and either serves the
//! admin HTTP API or runs a single command against the store.
//!
//! Usage:
//!   syncpub --db content.db serve --port 4080
//!   syncpub --db content.db group create "Launch day"
//!   syncpub --db content.db item publish <ID>

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};
use syncpub_admin::build_router;
use syncpub_core::{PublisherConfig, SyncPublisher};
use syncpub_store::{ContentStore, SqliteStore};
use syncpub_types::{ItemId, ItemStatus, NewItem};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "syncpub")]
#[command(about = "Publish grouped content items together")]
struct Args {
    /// Path to the SQLite content database
    #[arg(long, default_value = "syncpub.db")]
    db: PathBuf,

    /// Path to the publisher config file
    #[arg(short, long, default_value = "syncpub.toml")]
    config: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the admin HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        #[arg(short, long, default_value = "4080")]
        port: u16,
    },
    /// Manage groups
    #[command(subcommand)]
    Group(GroupCommand),
    /// Manage content items
    #[command(subcommand)]
    Item(ItemCommand),
    /// Place an item into a group
    Assign { item: ItemId, group: ItemId },
    /// Take an item out of a group
    Remove { group: ItemId, item: ItemId },
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
    Create { title: String },
    List,
    Members { group: ItemId },
}

#[derive(Subcommand, Debug)]
enum ItemCommand {
    Create {
        title: String,
        #[arg(long = "type", default_value = "post")]
        item_type: String,
        #[arg(long, default_value = "draft")]
        status: ItemStatus,
    },
    /// Publish an item; grouped siblings follow
    Publish { item: ItemId },
    /// Trash an item, or remove it entirely with --hard
    Delete {
        item: ItemId,
        #[arg(long)]
        hard: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = PublisherConfig::load_from(&args.config).context("Failed to load config")?;
    let store = Arc::new(
        SqliteStore::open(&args.db)
            .with_context(|| format!("Failed to open content store {:?}", args.db))?,
    );
    let publisher = SyncPublisher::new(store.clone(), config);

    match args.command {
        Command::Serve { bind, port } => {
            let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}"))
                .await
                .with_context(|| format!("Failed to bind {bind}:{port}"))?;
            info!("Admin API listening on {}:{}", bind, port);
            axum::serve(listener, build_router(publisher))
                .await
                .context("HTTP server failed")?;
        }
        Command::Group(GroupCommand::Create { title }) => {
            let group = publisher.create_group(&title)?;
            println!("{}", group.id);
        }
        Command::Group(GroupCommand::List) => {
            for summary in publisher.groups()? {
                println!(
                    "{}  {:<40}  {} waiting",
                    summary.group.id, summary.group.title, summary.member_count
                );
            }
        }
        Command::Group(GroupCommand::Members { group }) => {
            if publisher.find_group(group)?.is_none() {
                bail!("No group with id {group}");
            }
            for item in publisher.members(group)? {
                println!("{}  {:<8}  {}", item.id, item.status, item.title);
            }
        }
        Command::Item(ItemCommand::Create {
            title,
            item_type,
            status,
        }) => {
            let item = store.create(NewItem::new(item_type, title, status))?;
            println!("{}", item.id);
        }
        Command::Item(ItemCommand::Publish { item }) => {
            let before = publisher.cascade_stats();
            store.update_status(item, ItemStatus::Published)?;
            let after = publisher.cascade_stats();
            println!(
                "Published {item}; {} grouped item(s) followed, {} failed",
                after.published - before.published,
                after.failed - before.failed
            );
        }
        Command::Item(ItemCommand::Delete { item, hard }) => {
            store.delete(item, hard)?;
            println!("{} {item}", if hard { "Deleted" } else { "Trashed" });
        }
        Command::Assign { item, group } => {
            publisher.assign(item, group)?;
            println!("Added {item} to group {group}");
        }
        Command::Remove { group, item } => {
            if publisher.remove_member(group, item)? {
                println!("Post removed from group.");
            } else {
                println!("{item} is not in group {group}");
            }
        }
    }
    Ok(())
}
