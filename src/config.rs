use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// Reverse proxies trusted to set X-Forwarded-For (IP or CIDR)
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Geolocation API URL template, `{ip}` is substituted per lookup
    #[serde(default = "default_geoip_api_url")]
    pub geoip_api_url: String,
    /// Outbound lookup timeout in seconds
    #[serde(default = "default_geoip_timeout_secs")]
    pub geoip_timeout_secs: u64,
    /// Geo cache entry lifetime in seconds
    #[serde(default = "default_geo_cache_ttl_secs")]
    pub geo_cache_ttl_secs: u64,
    /// Geo cache capacity bound
    #[serde(default = "default_geo_cache_capacity")]
    pub geo_cache_capacity: u64,
    /// Salt mixed into the one-way visitor hash
    #[serde(default = "default_visitor_salt")]
    pub visitor_salt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HMAC secret for session tokens; generated at startup when empty
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_session_hours")]
    pub session_hours: u64,
    #[serde(default)]
    pub cors_origin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file path; empty writes to stdout
    #[serde(default)]
    pub file: Option<String>,
    /// "json" or "text"
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub enable_rotation: bool,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
}

// Default value functions
fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "sqlite://cardtrace.db?mode=rwc".to_string()
}

fn default_pool_size() -> u32 {
    10
}

fn default_geoip_api_url() -> String {
    "http://ip-api.com/json/{ip}?fields=status,country,countryCode,regionName,city,lat,lon"
        .to_string()
}

fn default_geoip_timeout_secs() -> u64 {
    5
}

fn default_geo_cache_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_geo_cache_capacity() -> u64 {
    10_000
}

fn default_visitor_salt() -> String {
    "cardtrace_visitor_salt".to_string()
}

fn default_session_hours() -> u64 {
    12
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    7
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            analytics: AnalyticsConfig::default(),
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            trusted_proxies: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            pool_size: default_pool_size(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            geoip_api_url: default_geoip_api_url(),
            geoip_timeout_secs: default_geoip_timeout_secs(),
            geo_cache_ttl_secs: default_geo_cache_ttl_secs(),
            geo_cache_capacity: default_geo_cache_capacity(),
            visitor_salt: default_visitor_salt(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            session_hours: default_session_hours(),
            cors_origin: String::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            format: default_log_format(),
            enable_rotation: false,
            max_backups: default_max_backups(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file with environment variable fallback
    pub fn load() -> Self {
        let mut config = Self::load_from_file();
        config.override_with_env();
        config
    }

    /// Load configuration from TOML file
    fn load_from_file() -> Self {
        let config_paths = [
            "config.toml",
            "cardtrace.toml",
            "config/config.toml",
            "/etc/cardtrace/config.toml",
        ];

        for path in &config_paths {
            if Path::new(path).exists() {
                debug!("Loading config from: {}", path);
                match fs::read_to_string(path) {
                    Ok(content) => match toml::from_str::<Config>(&content) {
                        Ok(config) => {
                            debug!("Successfully loaded config from: {}", path);
                            return config;
                        }
                        Err(e) => {
                            warn!("Failed to parse config file {}: {}", path, e);
                        }
                    },
                    Err(e) => {
                        warn!("Failed to read config file {}: {}", path, e);
                    }
                }
            }
        }

        debug!("No config file found, using defaults");
        Self::default()
    }

    /// Override configuration with environment variables
    fn override_with_env(&mut self) {
        // Server config
        if let Ok(host) = env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("SERVER_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(cpu_count) = env::var("CPU_COUNT") {
            if let Ok(count) = cpu_count.parse() {
                self.server.cpu_count = count;
            }
        }
        if let Ok(proxies) = env::var("TRUSTED_PROXIES") {
            self.server.trusted_proxies = proxies
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Database config
        if let Ok(database_url) = env::var("DATABASE_URL") {
            self.database.url = database_url;
        }
        if let Ok(pool_size) = env::var("DATABASE_POOL_SIZE") {
            if let Ok(size) = pool_size.parse() {
                self.database.pool_size = size;
            }
        }

        // Analytics config
        if let Ok(api_url) = env::var("GEOIP_API_URL") {
            self.analytics.geoip_api_url = api_url;
        }
        if let Ok(timeout) = env::var("GEOIP_TIMEOUT_SECS") {
            if let Ok(timeout) = timeout.parse() {
                self.analytics.geoip_timeout_secs = timeout;
            }
        }
        if let Ok(ttl) = env::var("GEO_CACHE_TTL_SECS") {
            if let Ok(ttl) = ttl.parse() {
                self.analytics.geo_cache_ttl_secs = ttl;
            }
        }
        if let Ok(capacity) = env::var("GEO_CACHE_CAPACITY") {
            if let Ok(capacity) = capacity.parse() {
                self.analytics.geo_cache_capacity = capacity;
            }
        }
        if let Ok(salt) = env::var("VISITOR_SALT") {
            self.analytics.visitor_salt = salt;
        }

        // API config
        if let Ok(jwt_secret) = env::var("JWT_SECRET") {
            self.api.jwt_secret = jwt_secret;
        }
        if let Ok(session_hours) = env::var("SESSION_HOURS") {
            if let Ok(hours) = session_hours.parse() {
                self.api.session_hours = hours;
            }
        }
        if let Ok(cors_origin) = env::var("CORS_ORIGIN") {
            self.api.cors_origin = cors_origin;
        }

        // Logging config
        if let Ok(log_level) = env::var("RUST_LOG") {
            self.logging.level = log_level;
        }
        if let Ok(log_file) = env::var("LOG_FILE") {
            self.logging.file = Some(log_file);
        }
        if let Ok(log_format) = env::var("LOG_FORMAT") {
            self.logging.format = log_format;
        }
    }

    /// Generate a sample TOML configuration file
    pub fn generate_sample_config() -> String {
        let sample_config = Config::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

// Global configuration instance
use std::sync::OnceLock;
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration instance
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(Config::load)
}

/// Initialize the global configuration
pub fn init_config() {
    CONFIG.get_or_init(Config::load);
}
