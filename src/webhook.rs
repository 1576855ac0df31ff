// One-shot webhook registration against the Bot API.

use crate::config::{AppConfig, ConfigError};
use reqwest::Client;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not reach the Bot API: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Status and body of the `setWebhook` call, exactly as Telegram sent them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub status: u16,
    pub body: String,
}

pub struct Registrar {
    client: Client,
    api_url: Url,
    token: String,
}

impl Registrar {
    pub fn new(api_url: Url, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url,
            token: token.into(),
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(cfg.api_url.clone(), cfg.token.clone())
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_url.as_str().trim_end_matches('/'),
            self.token,
            method
        )
    }

    /// Drop any existing webhook, then point Telegram at `target`.
    pub async fn register(
        &self,
        target: &Url,
        secret: Option<&str>,
    ) -> Result<Registration, RegistrationError> {
        let deleted = self
            .client
            .get(self.method_url("deleteWebhook"))
            .send()
            .await?;
        if !deleted.status().is_success() {
            warn!("deleteWebhook returned {}", deleted.status());
        }

        let mut query: Vec<(&str, &str)> = vec![("url", target.as_str())];
        if let Some(secret) = secret {
            query.push(("secret_token", secret));
        }

        let res = self
            .client
            .get(self.method_url("setWebhook"))
            .query(&query)
            .send()
            .await?;
        let status = res.status().as_u16();
        let body = res.text().await?;

        info!("setWebhook to {target} returned {status}");
        Ok(Registration { status, body })
    }
}

/// Read configuration from the environment and register `{WEBHOOK_URL}/api/webhook`.
pub async fn register_from_env() -> Result<Registration, RegistrationError> {
    let cfg = AppConfig::from_env()?;
    let target = cfg.webhook_target()?;
    Registrar::from_config(&cfg)
        .register(&target, cfg.webhook_secret.as_deref())
        .await
}
