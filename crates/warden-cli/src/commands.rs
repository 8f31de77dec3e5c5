use crate::cli::{Commands, KeyArgs, ScanArgs};
use anyhow::{bail, Result};
use serde_json::Value;
use warden_cache::{run_probe, CacheKey, CacheOutcome, CacheStore, ProbeReport, ScanCriteria};
use warden_config::AppConfig;
use warden_service::cache_store_from_config;

const REDACTED: &str = "********";

/// Runs one subcommand. The cache store is only built for commands that
/// touch the cache.
pub async fn execute(command: &Commands, config: &AppConfig) -> Result<()> {
    let store = || cache_store_from_config(config);
    match command {
        Commands::Probe => {
            let store = store()?;
            probe(&store).await
        }
        Commands::Scan(args) => {
            let store = store()?;
            scan(&store, args).await
        }
        Commands::Get(args) => {
            let store = store()?;
            get(&store, args).await
        }
        Commands::Evict(args) => {
            let store = store()?;
            evict(&store, args).await
        }
        Commands::Config => show_config(config),
    }
}

pub async fn probe(store: &CacheStore) -> Result<()> {
    match run_probe(store).await {
        ProbeReport::Reachable { sampled } => {
            println!("{} reachable (sampled {} entries)", store.backend_name(), sampled);
            Ok(())
        }
        ProbeReport::Skipped => {
            println!("cache reads disabled; nothing to probe");
            Ok(())
        }
        ProbeReport::Unreachable(detail) => bail!("{} unreachable: {}", store.backend_name(), detail),
    }
}

pub async fn scan(store: &CacheStore, args: &ScanArgs) -> Result<()> {
    let criteria = match (&args.field, &args.value) {
        (Some(field), Some(raw)) => ScanCriteria::FieldEquals {
            field: field.clone(),
            value: parse_value(raw),
            limit: Some(args.limit),
        },
        _ => ScanCriteria::Limit(args.limit),
    };

    match store.scan(args.table, criteria).await? {
        CacheOutcome::Ok(entries) => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
            Ok(())
        }
        CacheOutcome::NotFound => bail!("cache reads are disabled"),
        CacheOutcome::BackendError(detail) => bail!("scan of {} failed: {}", store.table_name(args.table), detail),
    }
}

pub async fn get(store: &CacheStore, args: &KeyArgs) -> Result<()> {
    let key_field = args.key_field.as_deref().unwrap_or(args.table.default_key_field());
    let key = CacheKey::from_raw(key_field, &args.key);

    match store.get_keyed(args.table, key.clone(), key_field).await {
        CacheOutcome::Ok(entry) => {
            println!("{}", serde_json::to_string_pretty(&entry)?);
            Ok(())
        }
        CacheOutcome::NotFound => bail!("no live entry for {} = {}", key_field, key),
        CacheOutcome::BackendError(detail) => bail!("get failed: {}", detail),
    }
}

pub async fn evict(store: &CacheStore, args: &KeyArgs) -> Result<()> {
    let key_field = args.key_field.as_deref().unwrap_or(args.table.default_key_field());
    let key = CacheKey::from_raw(key_field, &args.key);

    match store.delete_keyed(args.table, key.clone(), key_field).await {
        CacheOutcome::Ok(()) | CacheOutcome::NotFound => {
            println!("evicted {} = {} from {}", key_field, key, store.table_name(args.table));
            Ok(())
        }
        CacheOutcome::BackendError(detail) => bail!("evict failed: {}", detail),
    }
}

pub fn show_config(config: &AppConfig) -> Result<()> {
    let mut redacted = config.clone();
    redacted.security.access_token_secret = REDACTED.to_string();
    redacted.security.activation_token_secret = REDACTED.to_string();
    println!("{}", serde_json::to_string_pretty(&redacted)?);
    Ok(())
}

/// Parses a CLI value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
