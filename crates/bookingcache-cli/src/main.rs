//! bookingcache - show booking data from the local cache and keep it fresh.
//!
//! A thin terminal collaborator around `BookingDataManager`: it issues
//! requests and prints whatever the manager publishes.

mod demo;
mod display;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bookingcache_core::{
    BookingCache, BookingDataManager, BookingDataResult, BookingSource, Config, FileBookingCache,
    FileBookingSource, HttpBookingSource,
};
use demo::DemoBookingSource;

// ============================================================================
// Constants
// ============================================================================

/// How long `show` waits for a background refresh to republish.
const BACKGROUND_WAIT_SECS: u64 = 5;

#[derive(Parser)]
#[command(name = "bookingcache", version, about = "Show cached booking data and keep it fresh")]
struct Cli {
    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Use the built-in demo source instead of the configured one
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the booking, fetching only when the cache cannot be used
    Show {
        /// Ignore the cache and fetch
        #[arg(long)]
        force: bool,
    },
    /// Fetch a fresh booking
    Refresh,
    /// Remove the cached booking
    Clear,
    /// Print cache freshness and the current state
    Status,
    /// Request data periodically and print every published change
    Watch {
        #[arg(long, default_value_t = 10)]
        interval: u64,
        /// Number of requests to issue before exiting
        #[arg(long, default_value_t = 6)]
        count: u32,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_file: Option<&PathBuf>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
            let name = path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("bookingcache.log"));
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn build_source(config: &Config, demo: bool) -> Result<Arc<dyn BookingSource>> {
    if demo {
        return Ok(Arc::new(DemoBookingSource::default()));
    }
    if let Some(ref url) = config.source_url {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        return Ok(Arc::new(HttpBookingSource::with_timeout(url.clone(), timeout)?));
    }
    if let Some(ref path) = config.source_file {
        return Ok(Arc::new(FileBookingSource::new(path.clone())));
    }
    warn!("No booking source configured, using demo source");
    Ok(Arc::new(DemoBookingSource::default()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_ref());
    info!("bookingcache starting");

    let mut config = Config::load()?;
    config.apply_overrides(|key| std::env::var(key).ok());

    let cache = Arc::new(FileBookingCache::new(config.cache_dir()?)?);
    let source = build_source(&config, cli.demo)?;
    let manager = BookingDataManager::new(cache.clone(), source);

    match cli.command {
        Command::Show { force } => show(&manager, force).await,
        Command::Refresh => {
            report(&manager, manager.refresh().await);
            Ok(())
        }
        Command::Clear => {
            manager.clear_cache()?;
            println!("Cache cleared");
            Ok(())
        }
        Command::Status => {
            let entry = cache.load()?;
            println!(
                "{}",
                display::format_cache_status(entry.as_ref(), manager.is_data_valid())
            );
            println!("{}", display::format_snapshot(&manager.state().snapshot()));
            Ok(())
        }
        Command::Watch { interval, count } => watch_updates(&manager, interval, count).await,
    }
}

fn report(manager: &BookingDataManager, result: BookingDataResult) {
    if let BookingDataResult::Failure(ref e) = result {
        eprintln!("Refresh failed: {}", e);
    }
    println!("{}", display::format_snapshot(&manager.state().snapshot()));
}

async fn show(manager: &BookingDataManager, force: bool) -> Result<()> {
    let mut subscriber = manager.subscribe();
    let result = manager.request_data(force).await;
    let refreshing_from = match result {
        BookingDataResult::Cached {
            cached_at,
            refreshing: true,
            ..
        } => Some(cached_at),
        _ => None,
    };
    report(manager, result);

    if let Some(cached_at) = refreshing_from {
        println!("Cached data is stale, waiting for background refresh...");
        let wait = Duration::from_secs(BACKGROUND_WAIT_SECS);
        if wait_for_refresh(&mut subscriber.last_updated, cached_at, wait).await {
            println!("{}", display::format_snapshot(&manager.state().snapshot()));
        } else {
            println!("Background refresh did not complete");
        }
    }
    Ok(())
}

/// Wait until the last-updated time moves away from the served cache time.
/// A refresh may republish an identical record, so the record itself is not
/// a reliable signal.
async fn wait_for_refresh(
    last_updated: &mut watch::Receiver<Option<DateTime<Utc>>>,
    cached_at: DateTime<Utc>,
    wait: Duration,
) -> bool {
    let republished = last_updated.wait_for(|updated| *updated != Some(cached_at));
    matches!(tokio::time::timeout(wait, republished).await, Ok(Ok(_)))
}

async fn watch_updates(manager: &BookingDataManager, interval: u64, count: u32) -> Result<()> {
    let subscriber = manager.subscribe();

    let mut loading = subscriber.is_loading.clone();
    tokio::spawn(async move {
        while loading.changed().await.is_ok() {
            let value = *loading.borrow_and_update();
            println!("[loading] {}", value);
        }
    });

    let mut error = subscriber.error.clone();
    tokio::spawn(async move {
        while error.changed().await.is_ok() {
            if let Some(ref e) = *error.borrow_and_update() {
                println!("[error] {}", e);
            }
        }
    });

    let mut record = subscriber.record.clone();
    tokio::spawn(async move {
        while record.changed().await.is_ok() {
            match *record.borrow_and_update() {
                Some(ref r) => println!("[record] {} token={}", r.ship_reference, r.ship_token),
                None => println!("[record] none"),
            }
        }
    });

    let mut updated = subscriber.last_updated.clone();
    tokio::spawn(async move {
        while updated.changed().await.is_ok() {
            if let Some(at) = *updated.borrow_and_update() {
                println!("[updated] {}", at.format("%H:%M:%S"));
            }
        }
    });

    let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));
    for _ in 0..count {
        ticker.tick().await;
        manager.request_data(false).await;
    }
    // Let in-flight background refreshes report before exiting
    tokio::time::sleep(Duration::from_secs(1)).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bookingcache_core::cache::{now_epoch_seconds, CacheEntry, MemoryBookingCache};
    use bookingcache_core::{BookingError, BookingRecord};

    /// Returns the same booking on every fetch, like a real file or HTTP source.
    struct FixedSource(BookingRecord);

    #[async_trait]
    impl BookingSource for FixedSource {
        async fn fetch_booking(&self) -> Result<BookingRecord, BookingError> {
            Ok(self.0.clone())
        }
    }

    fn record() -> BookingRecord {
        BookingRecord {
            ship_reference: "ABCDEF".to_string(),
            ship_token: "AAAABBBCCCCDDD".to_string(),
            can_issue_ticket_checking: false,
            expiry_timestamp: "1722409261".to_string(),
            duration_minutes: 2430,
            segments: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_wait_for_refresh_detects_identical_republish() {
        let now = now_epoch_seconds();
        let mut entry = CacheEntry::at(record(), now - 400.0);
        entry.expires_at = now + 1_000.0;
        let cache = Arc::new(MemoryBookingCache::with_entry(&entry).unwrap());
        let manager = BookingDataManager::new(cache, Arc::new(FixedSource(record())));
        let mut subscriber = manager.subscribe();

        let cached_at = match manager.request_data(false).await {
            BookingDataResult::Cached {
                record: served,
                cached_at,
                refreshing: true,
            } => {
                assert_eq!(served, record());
                cached_at
            }
            other => panic!("expected stale cached result, got {other:?}"),
        };

        let refreshed =
            wait_for_refresh(&mut subscriber.last_updated, cached_at, Duration::from_secs(2)).await;

        assert!(refreshed);
        assert_eq!(manager.state().snapshot().record, Some(record()));
    }

    #[tokio::test]
    async fn test_wait_for_refresh_times_out_without_publish() {
        let cached_at = Utc::now();
        let (_tx, mut rx) = watch::channel(Some(cached_at));

        let refreshed = wait_for_refresh(&mut rx, cached_at, Duration::from_millis(50)).await;

        assert!(!refreshed);
    }
}
