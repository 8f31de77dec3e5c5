use clap::{Parser, Subcommand};
use std::path::PathBuf;
use warden_cache::CacheTable;
use warden_config::DeploymentEnvironment;

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Inspect and maintain the Warden identity cache")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding default.toml and per-environment overrides
    #[arg(short, long, global = true, env = "WARDEN_CONFIG_DIR", default_value = "./config")]
    pub config_dir: PathBuf,

    /// Deployment environment (overrides WARDEN_ENVIRONMENT)
    #[arg(short, long, global = true)]
    pub environment: Option<DeploymentEnvironment>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the cache connectivity test once and report the result
    Probe,
    /// List live entries of a cache table
    Scan(ScanArgs),
    /// Read one entry
    Get(KeyArgs),
    /// Delete one entry
    Evict(KeyArgs),
    /// Print the effective configuration with secrets redacted
    Config,
}

#[derive(clap::Args)]
pub struct ScanArgs {
    /// Logical table (identity, organization, project)
    #[arg(short, long, default_value = "identity")]
    pub table: CacheTable,
    /// Maximum number of entries
    #[arg(short, long, default_value_t = 20)]
    pub limit: usize,
    /// Only entries whose field equals --value
    #[arg(long, requires = "value")]
    pub field: Option<String>,
    /// Value to match; parsed as JSON when possible
    #[arg(long, requires = "field")]
    pub value: Option<String>,
}

#[derive(clap::Args)]
pub struct KeyArgs {
    /// Entry key (numeric id or slug)
    pub key: String,
    /// Logical table (identity, organization, project)
    #[arg(short, long, default_value = "identity")]
    pub table: CacheTable,
    /// Key field, when not the table default
    #[arg(long)]
    pub key_field: Option<String>,
}
