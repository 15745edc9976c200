use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex, PoisonError};

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use env_logger::Env;
use log::{error, info};

use subsync::models::GroupId;
use subsync::settings::{update_settings_from_file, Settings};
use subsync::store::MemoryStore;
use subsync::sync::{ChannelReporter, FixedPrompt, Prompt, RawUpdater, UpdateMode};
use subsync::utils::http::HttpFetcher;

/// Decode proxy share links and subscriptions into a profile store
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON snapshot of the profile store, created if missing
    #[arg(short, long, value_name = "FILE", default_value = "subsync-store.json")]
    store: PathBuf,

    /// Subscription group to update; the payload is then its URL
    #[arg(short, long, value_name = "ID")]
    group: Option<u32>,

    /// Treat a bare http(s) URL as a link without asking
    #[arg(long, conflicts_with = "as_subscription")]
    as_link: bool,

    /// Treat a bare http(s) URL as a subscription without asking
    #[arg(long)]
    as_subscription: bool,

    /// Read the payload from a file
    #[arg(short, long, value_name = "FILE", conflicts_with = "payload")]
    file: Option<PathBuf>,

    /// Link, base64 blob, Clash document or subscription URL
    payload: Option<String>,
}

/// Asks on the terminal whether a URL is a subscription.
struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn choose(&self, url: &str) -> Option<UpdateMode> {
        print!("{} looks like a URL. Import as [s]ubscription or as [l]ink? ", url);
        io::stdout().flush().ok()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer).ok()?;
        match answer.trim().to_ascii_lowercase().as_str() {
            "s" | "subscription" => Some(UpdateMode::AsSubscription),
            "l" | "link" => Some(UpdateMode::AsLink),
            _ => None,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config_result = args.config.as_deref().map(update_settings_from_file);
    let settings = Settings::current();

    // Initialize the logger
    env_logger::init_from_env(Env::default().default_filter_or(settings.log_level.as_str()));
    if let Some(Err(err)) = config_result {
        error!("Failed to load configuration: {}", err);
    }

    let payload = match (&args.file, &args.payload) {
        (Some(path), _) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload from {}", path.display()))?,
        (None, Some(payload)) => payload.clone(),
        (None, None) => bail!("Either a payload or --file must be given"),
    };

    let mut store = MemoryStore::load(&args.store)
        .with_context(|| format!("Failed to load store {}", args.store.display()))?;
    let group = args.group.map(GroupId);
    if let Some(gid) = group {
        store.ensure_group(gid);
    }
    let store = Arc::new(Mutex::new(store));

    let prompt: Box<dyn Prompt> = if args.as_link {
        Box::new(FixedPrompt(Some(UpdateMode::AsLink)))
    } else if args.as_subscription {
        Box::new(FixedPrompt(Some(UpdateMode::AsSubscription)))
    } else {
        Box::new(StdinPrompt)
    };

    let (tx, rx) = mpsc::channel();
    let updater = RawUpdater::new(
        Arc::clone(&store),
        Arc::new(HttpFetcher::new(Arc::clone(&settings))),
        prompt,
        Arc::new(ChannelReporter::new(tx)),
        settings,
    );

    let Some(handle) = updater.async_update(&payload, group) else {
        info!("Update cancelled");
        return Ok(());
    };
    handle
        .join()
        .map_err(|_| anyhow!("Sync worker panicked"))?;
    let summary = rx.recv().context("Sync worker exited without a result")??;
    println!("{}", summary);

    store
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .save(&args.store)
        .with_context(|| format!("Failed to save store {}", args.store.display()))?;
    Ok(())
}
