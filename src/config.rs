use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub chart_api: ChartApiConfig,
    pub text_api: TextApiConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartApiConfig {
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_chart_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextApiConfig {
    pub url: String,
    pub api_key: String,
    pub model: String,
    #[serde(default = "default_text_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![DEFAULT_ORIGIN.to_string()],
        }
    }
}

const DEFAULT_CHART_URL: &str = "https://www.thailandfxwarrior.com/node/api/v1/bazi";
const DEFAULT_TEXT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_TEXT_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_ORIGIN: &str = "http://localhost:3000";

fn default_chart_timeout() -> u64 {
    10
}

fn default_text_timeout() -> u64 {
    15
}

/// Splits a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| format!("failed to parse config file {config_path}: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_env_defaults()?,
            Err(e) => {
                return Err(format!("cannot read config file {config_path}: {e}").into());
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn from_env_defaults() -> Result<Self, Box<dyn std::error::Error>> {
        fn get_env(name: &str) -> Option<String> {
            env::var(name).ok()
        }
        fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
            env::var(name)
                .ok()
                .and_then(|v| v.parse::<T>().ok())
                .unwrap_or(default)
        }

        let database_url = get_env("DATABASE_URL")
            .ok_or("DATABASE_URL is not set and no config.toml was found")?;

        Ok(Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse("SERVER_PORT", 3000u16),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
            },
            chart_api: ChartApiConfig {
                url: get_env("CHART_API_URL").unwrap_or_else(|| DEFAULT_CHART_URL.to_string()),
                api_key: get_env("CHART_API_KEY").unwrap_or_default(),
                timeout_secs: default_chart_timeout(),
            },
            text_api: TextApiConfig {
                url: get_env("TEXT_API_URL").unwrap_or_else(|| DEFAULT_TEXT_URL.to_string()),
                api_key: get_env("TEXT_API_KEY").unwrap_or_default(),
                model: get_env("TEXT_API_MODEL").unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
                timeout_secs: default_text_timeout(),
            },
            cors: CorsConfig {
                allowed_origins: get_env("ALLOWED_ORIGINS")
                    .map(|v| parse_origins(&v))
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| vec![DEFAULT_ORIGIN.to_string()]),
            },
        })
    }

    // Environment always wins over the file.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("CHART_API_URL") {
            self.chart_api.url = v;
        }
        if let Ok(v) = env::var("CHART_API_KEY") {
            self.chart_api.api_key = v;
        }
        if let Ok(v) = env::var("TEXT_API_URL") {
            self.text_api.url = v;
        }
        if let Ok(v) = env::var("TEXT_API_KEY") {
            self.text_api.api_key = v;
        }
        if let Ok(v) = env::var("TEXT_API_MODEL") {
            self.text_api.model = v;
        }
        if let Ok(v) = env::var("ALLOWED_ORIGINS") {
            let origins = parse_origins(&v);
            if !origins.is_empty() {
                self.cors.allowed_origins = origins;
            }
        }
    }
}
