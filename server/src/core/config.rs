use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_ANALYTICS_CACHE_TTL_SECS,
    DEFAULT_ANALYTICS_TIMEZONE, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_HOST, DEFAULT_PORT,
};

// =============================================================================
// Cache Backend Enum
// =============================================================================

/// Cache backend type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendType {
    #[default]
    Memory,
    Redis,
}

impl fmt::Display for CacheBackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheBackendType::Memory => write!(f, "memory"),
            CacheBackendType::Redis => write!(f, "redis"),
        }
    }
}

// =============================================================================
// File Config (JSON)
// =============================================================================

/// Server configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Analytics configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AnalyticsFileConfig {
    /// IANA time zone name for bucket boundaries and labels
    pub timezone: Option<String>,
    /// Series cache TTL in seconds, 0 disables caching
    pub cache_ttl_secs: Option<u64>,
}

/// Redis cache configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RedisFileConfig {
    /// Connection URL for Redis-compatible backends
    pub url: Option<String>,
}

/// Memory cache configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MemoryCacheFileConfig {
    /// Maximum number of cache entries
    pub max_entries: Option<u64>,
}

/// Database configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    /// Cache backend: memory (default) or redis
    pub cache: Option<CacheBackendType>,
    /// Redis cache configuration
    pub redis: Option<RedisFileConfig>,
    /// Memory cache configuration
    pub memory_cache: Option<MemoryCacheFileConfig>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub analytics: Option<AnalyticsFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    pub debug: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        // Server
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        // Analytics
        if let Some(analytics) = other.analytics {
            let current = self
                .analytics
                .get_or_insert_with(AnalyticsFileConfig::default);
            if analytics.timezone.is_some() {
                tracing::trace!(timezone = ?analytics.timezone, "Merging analytics.timezone");
                current.timezone = analytics.timezone;
            }
            if analytics.cache_ttl_secs.is_some() {
                tracing::trace!(
                    cache_ttl_secs = ?analytics.cache_ttl_secs,
                    "Merging analytics.cache_ttl_secs"
                );
                current.cache_ttl_secs = analytics.cache_ttl_secs;
            }
        }

        // Database
        if let Some(database) = other.database {
            let current = self
                .database
                .get_or_insert_with(DatabaseFileConfig::default);
            if database.cache.is_some() {
                tracing::trace!(cache = ?database.cache, "Merging database.cache");
                current.cache = database.cache;
            }
            if let Some(redis) = database.redis {
                let current_redis = current.redis.get_or_insert_with(RedisFileConfig::default);
                if redis.url.is_some() {
                    tracing::trace!("Merging database.redis.url");
                    current_redis.url = redis.url;
                }
            }
            if let Some(memory_cache) = database.memory_cache {
                let current_memory = current
                    .memory_cache
                    .get_or_insert_with(MemoryCacheFileConfig::default);
                if memory_cache.max_entries.is_some() {
                    tracing::trace!(
                        max_entries = ?memory_cache.max_entries,
                        "Merging database.memory_cache.max_entries"
                    );
                    current_memory.max_entries = memory_cache.max_entries;
                }
            }
        }

        if other.debug.is_some() {
            self.debug = other.debug;
        }
    }
}

// =============================================================================
// Runtime Config
// =============================================================================

/// Server configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Analytics configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Zone in which month arithmetic and labels are evaluated
    pub timezone: Tz,
    /// Series cache TTL in seconds, 0 disables caching
    pub cache_ttl_secs: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            cache_ttl_secs: DEFAULT_ANALYTICS_CACHE_TTL_SECS,
        }
    }
}

/// Redis cache configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Connection URL for Redis-compatible backends
    pub url: String,
}

/// Memory cache configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct MemoryCacheConfig {
    /// Maximum number of cache entries
    pub max_entries: u64,
}

/// Cache configuration (used internally by CacheService)
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Cache backend type
    pub backend: CacheBackendType,
    /// Maximum entries (memory backend)
    pub max_entries: u64,
    /// Redis URL (redis backend)
    pub redis_url: Option<String>,
}

/// Database configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Cache backend: memory (default) or redis
    pub cache: CacheBackendType,
    /// Redis cache configuration (only used if cache = redis)
    pub redis: Option<RedisConfig>,
    /// Memory cache configuration
    pub memory_cache: MemoryCacheConfig,
}

impl DatabaseConfig {
    /// Build a CacheConfig for use by CacheService
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            backend: self.cache,
            max_entries: self.memory_cache.max_entries,
            redis_url: self.redis.as_ref().map(|r| r.url.clone()),
        }
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub analytics: AnalyticsConfig,
    pub database: DatabaseConfig,
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.learnhub/learnhub.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Profile dir, skipped if missing
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        // 3. Extract file config values with defaults
        let file_server = file_config.server.unwrap_or_default();
        let file_analytics = file_config.analytics.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();

        // 4. Layer configs: defaults -> file config -> CLI/env overrides
        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let debug = cli.debug || file_config.debug.unwrap_or(false);

        let timezone_name = cli
            .analytics_timezone
            .clone()
            .or(file_analytics.timezone)
            .unwrap_or_else(|| DEFAULT_ANALYTICS_TIMEZONE.to_string());
        let timezone = parse_timezone(&timezone_name)?;

        let cache_ttl_secs = cli
            .analytics_cache_ttl
            .or(file_analytics.cache_ttl_secs)
            .unwrap_or(DEFAULT_ANALYTICS_CACHE_TTL_SECS);

        let cache_backend = cli
            .cache_backend
            .or(file_database.cache)
            .unwrap_or_default();

        let file_memory_cache = file_database.memory_cache.unwrap_or_default();
        let memory_cache = MemoryCacheConfig {
            max_entries: cli
                .cache_max_entries
                .or(file_memory_cache.max_entries)
                .unwrap_or(DEFAULT_CACHE_MAX_ENTRIES),
        };

        // Redis config (only populated if using redis backend)
        let redis = if cache_backend == CacheBackendType::Redis {
            let file_redis = file_database.redis.unwrap_or_default();
            let url = cli
                .cache_redis_url
                .clone()
                .or(file_redis.url)
                .unwrap_or_default();
            Some(RedisConfig { url })
        } else {
            None
        };

        let config = Self {
            server: ServerConfig { host, port },
            analytics: AnalyticsConfig {
                timezone,
                cache_ttl_secs,
            },
            database: DatabaseConfig {
                cache: cache_backend,
                redis,
                memory_cache,
            },
            debug,
        };

        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            debug = config.debug,
            analytics_timezone = %config.analytics.timezone,
            analytics_cache_ttl_secs = config.analytics.cache_ttl_secs,
            cache_backend = %config.database.cache,
            cache_max_entries = config.database.memory_cache.max_entries,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port 0 would bind to a random port
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        if self.database.cache == CacheBackendType::Redis
            && self
                .database
                .redis
                .as_ref()
                .is_none_or(|r| r.url.is_empty())
        {
            anyhow::bail!(
                "Configuration error: database.redis.url is required when database.cache is 'redis'"
            );
        }

        if self.analytics.cache_ttl_secs == 0 {
            tracing::debug!("analytics.cache_ttl_secs is 0, analytics series will not be cached");
        }

        if is_all_interfaces(&self.server.host) {
            tracing::warn!(
                host = %self.server.host,
                "Binding to all network interfaces. The API has no authentication layer; \
                 put it behind a gateway before exposing it."
            );
        }

        Ok(())
    }
}

/// Parse an IANA time zone name
fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim().parse::<Tz>().map_err(|_| {
        anyhow::anyhow!(
            "Configuration error: analytics.timezone '{}' is not a known IANA time zone",
            name
        )
    })
}

/// Get the profile config path (~/.learnhub/learnhub.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        temp_file.write_all(json.as_bytes()).unwrap();
        temp_file
    }

    #[test]
    fn test_cache_backend_serde() {
        let backend: CacheBackendType = serde_json::from_str(r#""redis""#).unwrap();
        assert_eq!(backend, CacheBackendType::Redis);
        assert_eq!(CacheBackendType::Memory.to_string(), "memory");
        assert_eq!(CacheBackendType::default(), CacheBackendType::Memory);
    }

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080 },
            "analytics": { "timezone": "Europe/Berlin", "cache_ttl_secs": 60 },
            "database": {
                "cache": "redis",
                "redis": { "url": "redis://localhost:6379" },
                "memory_cache": { "max_entries": 10 }
            },
            "debug": true
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        let server = config.server.as_ref().unwrap();
        assert_eq!(server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(server.port, Some(8080));

        let analytics = config.analytics.as_ref().unwrap();
        assert_eq!(analytics.timezone.as_deref(), Some("Europe/Berlin"));
        assert_eq!(analytics.cache_ttl_secs, Some(60));

        let database = config.database.as_ref().unwrap();
        assert_eq!(database.cache, Some(CacheBackendType::Redis));
        assert_eq!(
            database.redis.as_ref().unwrap().url.as_deref(),
            Some("redis://localhost:6379")
        );
        assert_eq!(database.memory_cache.as_ref().unwrap().max_entries, Some(10));
        assert_eq!(config.debug, Some(true));
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.analytics.is_none());
        assert!(config.database.is_none());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "host": "localhost" }, "unknown_field": 123 }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.extra.get("unknown_field").unwrap(), 123);
    }

    #[test]
    fn test_file_config_merge() {
        let mut base = FileConfig {
            server: Some(ServerFileConfig {
                host: Some("127.0.0.1".to_string()),
                port: Some(3000),
            }),
            analytics: Some(AnalyticsFileConfig {
                timezone: Some("UTC".to_string()),
                cache_ttl_secs: Some(100),
            }),
            ..Default::default()
        };

        let overlay = FileConfig {
            server: Some(ServerFileConfig {
                host: None,
                port: Some(4000),
            }),
            analytics: Some(AnalyticsFileConfig {
                timezone: Some("Asia/Tokyo".to_string()),
                cache_ttl_secs: None,
            }),
            database: Some(DatabaseFileConfig {
                cache: Some(CacheBackendType::Redis),
                ..Default::default()
            }),
            ..Default::default()
        };

        base.merge(overlay);

        let server = base.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(server.port, Some(4000));

        let analytics = base.analytics.unwrap();
        assert_eq!(analytics.timezone.as_deref(), Some("Asia/Tokyo"));
        assert_eq!(analytics.cache_ttl_secs, Some(100));

        assert_eq!(base.database.unwrap().cache, Some(CacheBackendType::Redis));
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::load(&CliConfig::default()).unwrap();
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.analytics.timezone, Tz::UTC);
        assert_eq!(
            config.analytics.cache_ttl_secs,
            DEFAULT_ANALYTICS_CACHE_TTL_SECS
        );
        assert_eq!(config.database.cache, CacheBackendType::Memory);
        assert!(config.database.redis.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn test_app_config_cli_override() {
        let cli = CliConfig {
            host: Some("0.0.0.0".to_string()),
            port: Some(9000),
            debug: true,
            analytics_timezone: Some("America/New_York".to_string()),
            analytics_cache_ttl: Some(0),
            cache_max_entries: Some(42),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert!(config.debug);
        assert_eq!(config.analytics.timezone, chrono_tz::America::New_York);
        assert_eq!(config.analytics.cache_ttl_secs, 0);
        assert_eq!(config.database.memory_cache.max_entries, 42);
    }

    #[test]
    fn test_app_config_file_then_cli() {
        let temp_file = write_config(
            r#"{
                "server": { "port": 7000 },
                "analytics": { "timezone": "Pacific/Auckland", "cache_ttl_secs": 30 }
            }"#,
        );
        let cli = CliConfig {
            config: Some(temp_file.path().to_path_buf()),
            analytics_cache_ttl: Some(15),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.analytics.timezone, chrono_tz::Pacific::Auckland);
        assert_eq!(config.analytics.cache_ttl_secs, 15);
    }

    #[test]
    fn test_app_config_missing_config_file() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/nonexistent/learnhub.json")),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_app_config_invalid_json() {
        let temp_file = write_config("{ not json");
        let cli = CliConfig {
            config: Some(temp_file.path().to_path_buf()),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_app_config_validation_unknown_timezone() {
        let cli = CliConfig {
            analytics_timezone: Some("Mars/Olympus_Mons".to_string()),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("analytics.timezone"));
    }

    #[test]
    fn test_app_config_validation_server_port_zero() {
        let cli = CliConfig {
            port: Some(0),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("server.port must be greater than 0"));
    }

    #[test]
    fn test_app_config_validation_empty_host() {
        let cli = CliConfig {
            host: Some(String::new()),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("server.host must not be empty"));
    }

    #[test]
    fn test_app_config_validation_redis_url_required() {
        let cli = CliConfig {
            cache_backend: Some(CacheBackendType::Redis),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("database.redis.url is required"));
    }

    #[test]
    fn test_app_config_redis_from_cli() {
        let cli = CliConfig {
            cache_backend: Some(CacheBackendType::Redis),
            cache_redis_url: Some("redis://localhost:6379".to_string()),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        let cache = config.database.cache_config();
        assert_eq!(cache.backend, CacheBackendType::Redis);
        assert_eq!(cache.redis_url.as_deref(), Some("redis://localhost:6379"));
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(is_all_interfaces("[::]"));
        assert!(!is_all_interfaces("127.0.0.1"));
        assert!(!is_all_interfaces("localhost"));
    }
}
