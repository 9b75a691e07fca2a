use once_cell::sync::OnceCell;
use url::Url;

use crate::error::ClientError;

/// Process-wide client configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root of the TaskFlow service, e.g. `http://localhost:8000`.
    pub backend_url: Url,
    /// API entry point the gateway talks to: backend root plus `/api`.
    pub api_base: Url,
}

static CONFIG: OnceCell<AppConfig> = OnceCell::new();

impl AppConfig {
    /// Resolve from `TASKFLOW_BACKEND_URL`. A missing or malformed value is
    /// fatal at startup; nothing downstream may run with an undefined base URL.
    pub fn from_env() -> Result<Self, ClientError> {
        let raw = std::env::var("TASKFLOW_BACKEND_URL").map_err(|_| {
            ClientError::Config("TASKFLOW_BACKEND_URL is not set".to_string())
        })?;
        Self::from_backend_url(&raw)
    }

    pub fn from_backend_url(raw: &str) -> Result<Self, ClientError> {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ClientError::Config(
                "TASKFLOW_BACKEND_URL is empty".to_string(),
            ));
        }

        let backend_url = Url::parse(trimmed).map_err(|e| {
            ClientError::Config(format!("invalid backend URL {raw:?}: {e}"))
        })?;
        let api_base = Url::parse(&format!("{trimmed}/api")).map_err(|e| {
            ClientError::Config(format!("invalid backend URL {raw:?}: {e}"))
        })?;

        Ok(Self {
            backend_url,
            api_base,
        })
    }
}

/// Resolve the configuration singleton; the first resolution wins.
pub fn init() -> Result<&'static AppConfig, ClientError> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }
    let config = AppConfig::from_env()?;
    Ok(CONFIG.get_or_init(|| config))
}
