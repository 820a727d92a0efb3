#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide settings, resolved once at startup and passed by value or
/// `Arc` into the components that need them.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub tmdb_api_key: String,
    pub tmdb_api_base_url: String,
    pub tmdb_image_base_url: String,
    pub tmdb_request_timeout_secs: u64,
    pub tmdb_max_retries: u32,
    pub tmdb_retry_backoff_base_ms: u64,
    pub appwrite_endpoint: String,
    pub appwrite_project_id: String,
    pub appwrite_database_id: String,
    pub appwrite_collection_id: String,
    pub appwrite_request_timeout_secs: u64,
    pub search_debounce_ms: u64,
    pub trending_limit: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("tmdb_api_key", &"[redacted]")
            .field("tmdb_api_base_url", &self.tmdb_api_base_url)
            .field("tmdb_image_base_url", &self.tmdb_image_base_url)
            .field("tmdb_request_timeout_secs", &self.tmdb_request_timeout_secs)
            .field("tmdb_max_retries", &self.tmdb_max_retries)
            .field(
                "tmdb_retry_backoff_base_ms",
                &self.tmdb_retry_backoff_base_ms,
            )
            .field("appwrite_endpoint", &self.appwrite_endpoint)
            .field("appwrite_project_id", &self.appwrite_project_id)
            .field("appwrite_database_id", &self.appwrite_database_id)
            .field("appwrite_collection_id", &self.appwrite_collection_id)
            .field(
                "appwrite_request_timeout_secs",
                &self.appwrite_request_timeout_secs,
            )
            .field("search_debounce_ms", &self.search_debounce_ms)
            .field("trending_limit", &self.trending_limit)
            .finish()
    }
}
