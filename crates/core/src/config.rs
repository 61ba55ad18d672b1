//! Configuration management for trendcast.
//!
//! Configuration is merged from, in increasing precedence:
//! - Built-in defaults
//! - The YAML config file (`.trendcast/config.yaml` in the workspace, or an
//!   explicit path)
//! - Environment variables
//! - Command-line flags
//!
//! The generation credential is only ever read from the environment
//! (`GEMINI_API_KEY`), never from the YAML file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Environment variable holding the generation API credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Generation providers the service can talk to.
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["gemini"];

/// Embedding providers the relevance index can be built with.
pub const KNOWN_EMBEDDING_PROVIDERS: &[&str] = &["gemini", "ollama", "hashed"];

/// An API credential. Its `Debug` output is redacted so configs can be logged.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw secret, for building request headers.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Workspace root (contains `.trendcast/` and, by default, `data/`)
    pub workspace: PathBuf,

    /// Explicit config file path, if one was given
    pub config_file: Option<PathBuf>,

    /// Directory holding the collector CSV tables
    pub data_dir: PathBuf,

    /// Directory with `<id>.yml` prompt overrides
    pub prompts_dir: Option<PathBuf>,

    /// Credential for the generation (and Gemini embedding) API
    pub api_key: Option<ApiKey>,

    /// Log filter override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub server: ServerSettings,
    pub collectors: CollectorSettings,
}

/// Text-generation provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: String,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

/// Embedding provider settings for the relevance index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// "gemini", "ollama" or "hashed"
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
    /// Endpoint override; each provider has its own default
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    /// Maximum texts per embedding request
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "text-embedding-004".to_string(),
            dimensions: 768,
            endpoint: None,
            timeout_secs: 30,
            batch_size: 100,
        }
    }
}

/// HTTP service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    /// Number of trends retrieved as context for `/askai`
    pub top_k: usize,
    /// Single allowed CORS origin; permissive when unset
    pub cors_origin: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5001".to_string(),
            top_k: 5,
            cors_origin: None,
        }
    }
}

/// Collector and poller settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CollectorSettings {
    pub timeout_secs: u64,
    pub interval_mins: u64,
    pub max_retries: u32,
    pub user_agent: String,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            interval_mins: 30,
            max_retries: 2,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    data_dir: Option<String>,
    prompts_dir: Option<String>,
    llm: Option<LlmSettings>,
    embedding: Option<EmbeddingSettings>,
    server: Option<ServerSettings>,
    collectors: Option<CollectorSettings>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let workspace = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            data_dir: workspace.join("data"),
            workspace,
            config_file: None,
            prompts_dir: None,
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: LlmSettings::default(),
            embedding: EmbeddingSettings::default(),
            server: ServerSettings::default(),
            collectors: CollectorSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration for a workspace.
    ///
    /// `workspace` and `config_file` come from the command line (clap also
    /// reads `TRENDCAST_WORKSPACE` / `TRENDCAST_CONFIG`); both default to the
    /// current directory and `<workspace>/.trendcast/config.yaml`.
    ///
    /// Environment variables:
    /// - `GEMINI_API_KEY`: generation credential
    /// - `TRENDCAST_DATA_DIR`: CSV table directory
    /// - `TRENDCAST_MODEL`: generation model
    /// - `TRENDCAST_EMBEDDING_PROVIDER`: embedding provider
    /// - `TRENDCAST_BIND`: server bind address
    /// - `RUST_LOG`: log filter
    /// - `NO_COLOR`: disable colored output
    pub fn load(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace {
            config.data_dir = workspace.join("data");
            config.workspace = workspace;
        }
        config.config_file = config_file;

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.trendcast_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        config.apply_env();
        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(dir) = file.data_dir {
            result.data_dir = result.resolve(&dir);
        }
        if let Some(dir) = file.prompts_dir {
            result.prompts_dir = Some(result.resolve(&dir));
        }
        if let Some(llm) = file.llm {
            result.llm = llm;
        }
        if let Some(embedding) = file.embedding {
            result.embedding = embedding;
        }
        if let Some(server) = file.server {
            result.server = server;
        }
        if let Some(collectors) = file.collectors {
            result.collectors = collectors;
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Environment variables override YAML config.
    fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var("TRENDCAST_DATA_DIR") {
            self.data_dir = self.resolve(&dir);
        }
        if let Ok(model) = std::env::var("TRENDCAST_MODEL") {
            self.llm.model = model;
        }
        if let Ok(provider) = std::env::var("TRENDCAST_EMBEDDING_PROVIDER") {
            self.embedding.provider = provider;
        }
        if let Ok(bind) = std::env::var("TRENDCAST_BIND") {
            self.server.bind = bind;
        }
        self.api_key = std::env::var(API_KEY_ENV)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(ApiKey::new);
        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }
        if std::env::var_os("NO_COLOR").is_some() {
            self.no_color = true;
        }
    }

    /// Apply CLI overrides to the configuration.
    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = if dir.is_absolute() {
                dir
            } else {
                self.workspace.join(dir)
            };
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the `.trendcast` directory.
    pub fn trendcast_dir(&self) -> PathBuf {
        self.workspace.join(".trendcast")
    }

    /// Parsed server bind address.
    pub fn bind_addr(&self) -> AppResult<SocketAddr> {
        self.server.bind.parse().map_err(|e| {
            AppError::Config(format!("Invalid bind address '{}': {}", self.server.bind, e))
        })
    }

    /// Validate everything the answering service needs before it starts.
    ///
    /// A missing generation credential is fatal: the service refuses to
    /// start rather than run without a model.
    pub fn validate_for_serve(&self) -> AppResult<()> {
        if !KNOWN_LLM_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown LLM provider: {}. Supported: {}",
                self.llm.provider,
                KNOWN_LLM_PROVIDERS.join(", ")
            )));
        }

        if self.api_key.is_none() {
            return Err(AppError::Config(format!(
                "{} is not set. Export it or add it to the workspace .env file.",
                API_KEY_ENV
            )));
        }

        self.validate_embedding()?;

        if self.server.top_k == 0 {
            return Err(AppError::Config("server.top_k must be at least 1".to_string()));
        }

        self.bind_addr()?;
        Ok(())
    }

    /// Validate the embedding settings (used by `serve` and `search`).
    pub fn validate_embedding(&self) -> AppResult<()> {
        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }
        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "embedding.dimensions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            path
        } else {
            self.workspace.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_with_key() -> AppConfig {
        AppConfig {
            api_key: Some(ApiKey::new("test-key")),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.server.top_k, 5);
        assert_eq!(config.server.bind, "0.0.0.0:5001");
        assert_eq!(config.collectors.interval_mins, 30);
        assert!(config.data_dir.ends_with("data"));
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let config = config_with_key();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("test-key"));
        assert!(rendered.contains("ApiKey(***)"));
    }

    #[test]
    fn test_validate_requires_api_key() {
        let config = AppConfig::default();
        let err = config.validate_for_serve().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(config_with_key().validate_for_serve().is_ok());
    }

    #[test]
    fn test_validate_unknown_providers() {
        let mut config = config_with_key();
        config.llm.provider = "unknown".to_string();
        assert!(config.validate_for_serve().is_err());

        let mut config = config_with_key();
        config.embedding.provider = "word2vec".to_string();
        assert!(config.validate_for_serve().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_top_k_and_bad_bind() {
        let mut config = config_with_key();
        config.server.top_k = 0;
        assert!(config.validate_for_serve().is_err());

        let mut config = config_with_key();
        config.server.bind = "not-an-address".to_string();
        assert!(config.validate_for_serve().is_err());
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let workspace = config.workspace.clone();
        let overridden =
            config.with_overrides(Some(PathBuf::from("tables")), None, true, false);

        assert_eq!(overridden.data_dir, workspace.join("tables"));
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml_partial_sections() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
data_dir: tables
server:
  top_k: 3
embedding:
  provider: hashed
  dimensions: 64
logging:
  color: false
"#,
        )
        .unwrap();

        let base = AppConfig {
            workspace: temp.path().to_path_buf(),
            ..AppConfig::default()
        };
        let merged = base.merge_yaml(&path).unwrap();

        assert_eq!(merged.data_dir, temp.path().join("tables"));
        assert_eq!(merged.server.top_k, 3);
        assert_eq!(merged.server.bind, "0.0.0.0:5001");
        assert_eq!(merged.embedding.provider, "hashed");
        assert_eq!(merged.embedding.dimensions, 64);
        assert_eq!(merged.embedding.batch_size, 100);
        assert!(merged.no_color);
    }

    #[test]
    fn test_load_missing_explicit_config_file() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load(
            Some(temp.path().to_path_buf()),
            Some(temp.path().join("missing.yaml")),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_missing_workspace() {
        let result = AppConfig::load(Some(PathBuf::from("/definitely/not/here")), None);
        assert!(result.is_err());
    }
}
