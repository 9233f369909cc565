use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::CacheBackendType;
use super::constants::{
    ENV_ANALYTICS_CACHE_TTL, ENV_ANALYTICS_TIMEZONE, ENV_CACHE_BACKEND, ENV_CACHE_MAX_ENTRIES,
    ENV_CACHE_REDIS_URL, ENV_CONFIG, ENV_DEBUG, ENV_HOST, ENV_PORT,
};

#[derive(Parser)]
#[command(name = "learnhub")]
#[command(version, about = "Learning management backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Enable debug mode (verbose request logging)
    #[arg(long, global = true, env = ENV_DEBUG)]
    pub debug: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// IANA time zone used for analytics bucket boundaries (e.g. Europe/Berlin)
    #[arg(long, global = true, env = ENV_ANALYTICS_TIMEZONE)]
    pub analytics_timezone: Option<String>,

    /// Analytics series cache TTL in seconds (0 disables caching)
    #[arg(long, global = true, env = ENV_ANALYTICS_CACHE_TTL)]
    pub analytics_cache_ttl: Option<u64>,

    /// Cache backend: memory (default) or redis
    #[arg(long, global = true, env = ENV_CACHE_BACKEND, value_parser = parse_cache_backend_type)]
    pub cache_backend: Option<CacheBackendType>,

    /// Maximum cache entries (memory backend only)
    #[arg(long, global = true, env = ENV_CACHE_MAX_ENTRIES)]
    pub cache_max_entries: Option<u64>,

    /// Redis URL for cache (redis:// or rediss://)
    #[arg(long, global = true, env = ENV_CACHE_REDIS_URL)]
    pub cache_redis_url: Option<String>,
}

/// Parse cache backend type from CLI/env string
fn parse_cache_backend_type(s: &str) -> Result<CacheBackendType, String> {
    match s.to_lowercase().as_str() {
        "memory" => Ok(CacheBackendType::Memory),
        "redis" => Ok(CacheBackendType::Redis),
        _ => Err(format!(
            "Invalid cache backend '{}'. Valid options: memory, redis",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// System maintenance commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum SystemCommands {
    /// Delete local data directory (database and caches). Requires confirmation.
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub analytics_timezone: Option<String>,
    pub analytics_cache_ttl: Option<u64>,
    pub cache_backend: Option<CacheBackendType>,
    pub cache_max_entries: Option<u64>,
    pub cache_redis_url: Option<String>,
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            debug: cli.debug,
            config: cli.config,
            analytics_timezone: cli.analytics_timezone,
            analytics_cache_ttl: cli.analytics_cache_ttl,
            cache_backend: cli.cache_backend,
            cache_max_entries: cli.cache_max_entries,
            cache_redis_url: cli.cache_redis_url,
        }
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let mut cli = Cli::parse();
    let command = cli.command.take();
    (cli.into(), command)
}
