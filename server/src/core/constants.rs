// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "LearnHub";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "learnhub";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".learnhub";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "learnhub.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "LEARNHUB_CONFIG";

// =============================================================================
// Environment Variables - Debug
// =============================================================================

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "LEARNHUB_DEBUG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "LEARNHUB_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "LEARNHUB_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "LEARNHUB_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5480;

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "LEARNHUB_DATA_DIR";

// =============================================================================
// Analytics
// =============================================================================

/// Environment variable for the IANA time zone used for bucket boundaries
pub const ENV_ANALYTICS_TIMEZONE: &str = "LEARNHUB_ANALYTICS_TIMEZONE";

/// Environment variable for the analytics series cache TTL (seconds, 0 = off)
pub const ENV_ANALYTICS_CACHE_TTL: &str = "LEARNHUB_ANALYTICS_CACHE_TTL";

/// Default analytics time zone
pub const DEFAULT_ANALYTICS_TIMEZONE: &str = "UTC";

/// Default analytics series cache TTL (5 min)
pub const DEFAULT_ANALYTICS_CACHE_TTL_SECS: u64 = 300;

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "learnhub.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite cache size (negative = KB, so -64000 = 64MB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

/// SQLite WAL auto-checkpoint threshold (pages, ~4MB at 1000)
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// WAL checkpoint interval in seconds (5 minutes)
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Request Body Limits
// =============================================================================

/// Default body limit for API requests (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// Course Search
// =============================================================================

/// Page size when the request gives none
pub const SEARCH_DEFAULT_LIMIT: u32 = 10;

/// Largest accepted page size
pub const SEARCH_MAX_LIMIT: u32 = 100;

// =============================================================================
// Shutdown
// =============================================================================

/// Graceful shutdown timeout in seconds
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Cache
// =============================================================================

/// Environment variable for cache backend
pub const ENV_CACHE_BACKEND: &str = "LEARNHUB_CACHE_BACKEND";

/// Environment variable for cache max entries
pub const ENV_CACHE_MAX_ENTRIES: &str = "LEARNHUB_CACHE_MAX_ENTRIES";

/// Environment variable for Redis cache URL (redis:// or rediss://)
pub const ENV_CACHE_REDIS_URL: &str = "LEARNHUB_CACHE_REDIS_URL";

/// Default cache max entries
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 100_000;

/// Cache key version (bump on format changes to invalidate all cached data)
pub const CACHE_KEY_VERSION: &str = "v1";

/// Cache TTL for user records (7 days, the session lifetime)
pub const CACHE_TTL_USER: u64 = 7 * 24 * 60 * 60;

/// Cache TTL for course records (7 days)
pub const CACHE_TTL_COURSE: u64 = 7 * 24 * 60 * 60;

/// Cache TTL for negative lookups (1 min)
pub const CACHE_TTL_NEGATIVE: u64 = 60;
