use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

/// Deployment environment; selects the log format and default verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Dev,
    Prod,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub env: Environment,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthSettings,
    /// Client applications provisioned into the `app` table at startup.
    #[serde(default)]
    pub apps: Vec<AppSeed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 44044,
            worker_threads: Some(4),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    #[serde(default)]
    pub hashing: HashingSettings,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self { token_ttl_secs: default_token_ttl(), hashing: HashingSettings::default() }
    }
}

impl AuthSettings {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

/// Argon2id cost parameters. Defaults follow the OWASP baseline.
#[derive(Debug, Clone, Deserialize)]
pub struct HashingSettings {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for HashingSettings {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct AppSeed {
    pub id: i32,
    pub name: String,
    pub secret: String,
}

// Secrets must never reach the startup log line that dumps the config.
impl fmt::Debug for AppSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSeed")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}

fn default_request_timeout() -> u64 { 10 }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_token_ttl() -> u64 { 3600 }
/// One year.
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 3600;
fn default_memory_kib() -> u32 { 19 * 1024 }
fn default_iterations() -> u32 { 2 }
fn default_parallelism() -> u32 { 1 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("cannot read config file {path}: {e}"))?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        // DATABASE_URL fills an empty url
        self.database.normalize_from_env();
        self.database.validate()?;
        self.auth.validate()?;
        validate_apps(&self.apps)?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("server.request_timeout_secs must be positive"));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://")
            || lower.starts_with("postgres://")
            || lower.starts_with("sqlite:"))
        {
            return Err(anyhow!("database.url must start with postgres://, postgresql:// or sqlite:"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl AuthSettings {
    pub fn validate(&self) -> Result<()> {
        if self.token_ttl_secs == 0 || self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(anyhow!("auth.token_ttl_secs must be within 1..={MAX_TOKEN_TTL_SECS}"));
        }
        let h = &self.hashing;
        if h.iterations == 0 || h.parallelism == 0 {
            return Err(anyhow!("auth.hashing iterations and parallelism must be >= 1"));
        }
        // argon2 requires at least 8 KiB per lane
        if h.memory_kib < 8 * h.parallelism {
            return Err(anyhow!("auth.hashing.memory_kib must be >= 8 * parallelism"));
        }
        Ok(())
    }
}

fn validate_apps(apps: &[AppSeed]) -> Result<()> {
    let mut seen = HashSet::new();
    for app in apps {
        if app.id == 0 {
            return Err(anyhow!("apps: id 0 is reserved"));
        }
        if app.name.trim().is_empty() {
            return Err(anyhow!("apps[{}]: name is required", app.id));
        }
        if app.secret.is_empty() {
            return Err(anyhow!("apps[{}]: secret is required", app.id));
        }
        if !seen.insert(app.id) {
            return Err(anyhow!("apps: duplicate id {}", app.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
env = "prod"

[server]
host = "0.0.0.0"
port = 44044

[database]
url = "sqlite::memory:"

[auth]
token_ttl_secs = 900

[[apps]]
id = 7
name = "billing"
secret = "billing-secret"
"#;

    #[test]
    fn parses_full_config() {
        let mut cfg = load_from_str(SAMPLE).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.env, Environment::Prod);
        assert_eq!(cfg.server.port, 44044);
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.auth.token_ttl(), Duration::from_secs(900));
        assert_eq!(cfg.auth.hashing.iterations, 2);
        assert_eq!(cfg.apps.len(), 1);
        assert_eq!(cfg.apps[0].id, 7);
    }

    #[test]
    fn app_secret_is_redacted_in_debug() {
        let cfg = load_from_str(SAMPLE).unwrap();
        let dump = format!("{:?}", cfg);
        assert!(!dump.contains("billing-secret"));
        assert!(dump.contains("<redacted>"));
    }

    #[test]
    fn rejects_zero_ttl() {
        let mut cfg = load_from_str(&SAMPLE.replace("token_ttl_secs = 900", "token_ttl_secs = 0")).unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn rejects_ttl_beyond_one_year() {
        let huge = SAMPLE.replace("token_ttl_secs = 900", "token_ttl_secs = 9000000000000");
        let mut cfg = load_from_str(&huge).unwrap();
        assert!(cfg.normalize_and_validate().is_err());

        let year = SAMPLE.replace("token_ttl_secs = 900", &format!("token_ttl_secs = {MAX_TOKEN_TTL_SECS}"));
        let mut cfg = load_from_str(&year).unwrap();
        assert!(cfg.normalize_and_validate().is_ok());
    }

    #[test]
    fn rejects_duplicate_app_ids() {
        let doubled = format!("{SAMPLE}\n[[apps]]\nid = 7\nname = \"other\"\nsecret = \"s\"\n");
        let mut cfg = load_from_str(&doubled).unwrap();
        let err = cfg.normalize_and_validate().unwrap_err();
        assert!(err.to_string().contains("duplicate id 7"));
    }

    #[test]
    fn rejects_unsupported_database_scheme() {
        let db = DatabaseConfig { url: "mysql://localhost/sso".into(), ..Default::default() };
        assert!(db.validate().is_err());
    }
}
