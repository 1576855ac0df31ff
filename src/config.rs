use dotenvy::dotenv;
use std::env;
use thiserror::Error;
use url::Url;

/// Path Telegram posts updates to, relative to `WEBHOOK_URL`.
pub const WEBHOOK_PATH: &str = "/api/webhook";

const DEFAULT_API_URL: &str = "https://api.telegram.org";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),
    #[error("invalid HOSTING value (expected true|false): {0}")]
    InvalidHosting(String),
    #[error("invalid WEBHOOK_URL: {0}")]
    InvalidWebhookUrl(String),
    #[error("invalid TELEGRAM_API_URL: {0}")]
    InvalidApiUrl(String),
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub token: String,
    pub hosting: bool,
    pub webhook_url: Option<Url>,
    pub webhook_secret: Option<String>,
    pub api_url: Url,
    pub register_on_start: bool,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        if cfg!(not(test)) {
            let _ = dotenv();
        }

        let token = env::var("BOT_TOKEN")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingEnv("BOT_TOKEN"))?;

        let hosting = match env::var("HOSTING") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidHosting(raw))?,
            Err(_) => true,
        };

        let webhook_url = match env::var("WEBHOOK_URL") {
            Ok(s) if !s.trim().is_empty() => {
                let parsed = Url::parse(s.trim())
                    .map_err(|_| ConfigError::InvalidWebhookUrl(s.clone()))?;
                Some(parsed)
            }
            _ => None,
        };

        if hosting && webhook_url.is_none() {
            return Err(ConfigError::MissingEnv("WEBHOOK_URL"));
        }

        let webhook_secret = env::var("WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let api_url = match env::var("TELEGRAM_API_URL") {
            Ok(s) if !s.trim().is_empty() => {
                Url::parse(s.trim()).map_err(|_| ConfigError::InvalidApiUrl(s.clone()))?
            }
            _ => Url::parse(DEFAULT_API_URL)
                .map_err(|_| ConfigError::InvalidApiUrl(DEFAULT_API_URL.to_string()))?,
        };

        let register_on_start = env::var("REGISTER_ON_START")
            .ok()
            .and_then(|s| parse_flag(&s))
            .unwrap_or(false);

        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080u16);

        Ok(AppConfig {
            token,
            hosting,
            webhook_url,
            webhook_secret,
            api_url,
            register_on_start,
            port,
        })
    }

    /// Full URL Telegram should deliver updates to: `{WEBHOOK_URL}/api/webhook`.
    pub fn webhook_target(&self) -> Result<Url, ConfigError> {
        let base = self
            .webhook_url
            .as_ref()
            .ok_or(ConfigError::MissingEnv("WEBHOOK_URL"))?;
        let joined = format!("{}{}", base.as_str().trim_end_matches('/'), WEBHOOK_PATH);
        Url::parse(&joined).map_err(|_| ConfigError::InvalidWebhookUrl(joined))
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const VARS: [&str; 7] = [
        "BOT_TOKEN",
        "HOSTING",
        "WEBHOOK_URL",
        "WEBHOOK_SECRET",
        "TELEGRAM_API_URL",
        "REGISTER_ON_START",
        "PORT",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn from_env_parses_all() {
        clear_env();
        unsafe {
            env::set_var("BOT_TOKEN", "tok");
            env::set_var("HOSTING", "true");
            env::set_var("WEBHOOK_URL", "https://example.com");
            env::set_var("WEBHOOK_SECRET", "s3cret");
            env::set_var("TELEGRAM_API_URL", "http://127.0.0.1:8081");
            env::set_var("REGISTER_ON_START", "yes");
            env::set_var("PORT", "1234");
        }

        let cfg = AppConfig::from_env().unwrap();
        assert_eq!(cfg.token, "tok");
        assert!(cfg.hosting);
        assert!(cfg.register_on_start);
        assert_eq!(cfg.port, 1234);
        assert_eq!(cfg.webhook_secret.as_deref(), Some("s3cret"));
        assert_eq!(cfg.api_url.as_str(), "http://127.0.0.1:8081/");
        assert_eq!(
            cfg.webhook_target().unwrap().as_str(),
            "https://example.com/api/webhook"
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn from_env_missing_token() {
        clear_env();
        unsafe {
            env::set_var("HOSTING", "false");
        }

        let res = AppConfig::from_env();
        match res {
            Err(ConfigError::MissingEnv("BOT_TOKEN")) => {}
            other => panic!("expected MissingEnv BOT_TOKEN, got {:?}", other),
        }

        clear_env();
    }

    #[test]
    #[serial]
    fn hosting_requires_webhook_url() {
        clear_env();
        unsafe {
            env::set_var("BOT_TOKEN", "tok");
        }

        match AppConfig::from_env() {
            Err(ConfigError::MissingEnv("WEBHOOK_URL")) => {}
            other => panic!("expected MissingEnv WEBHOOK_URL, got {:?}", other),
        }

        clear_env();
    }

    #[test]
    #[serial]
    fn polling_mode_uses_defaults() {
        clear_env();
        unsafe {
            env::set_var("BOT_TOKEN", "tok");
            env::set_var("HOSTING", "no");
        }

        let cfg = AppConfig::from_env().unwrap();
        assert!(!cfg.hosting);
        assert!(!cfg.register_on_start);
        assert!(cfg.webhook_url.is_none());
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.api_url.as_str(), "https://api.telegram.org/");
        assert!(matches!(
            cfg.webhook_target(),
            Err(ConfigError::MissingEnv("WEBHOOK_URL"))
        ));

        clear_env();
    }

    #[test]
    #[serial]
    fn invalid_hosting_is_rejected() {
        clear_env();
        unsafe {
            env::set_var("BOT_TOKEN", "tok");
            env::set_var("HOSTING", "maybe");
        }

        match AppConfig::from_env() {
            Err(ConfigError::InvalidHosting(v)) => assert_eq!(v, "maybe"),
            other => panic!("expected InvalidHosting, got {:?}", other),
        }

        clear_env();
    }

    #[test]
    #[serial]
    fn webhook_target_strips_trailing_slash() {
        clear_env();
        unsafe {
            env::set_var("BOT_TOKEN", "tok");
            env::set_var("WEBHOOK_URL", "https://bot.example.org/prefix/");
        }

        let cfg = AppConfig::from_env().unwrap();
        assert_eq!(
            cfg.webhook_target().unwrap().as_str(),
            "https://bot.example.org/prefix/api/webhook"
        );

        clear_env();
    }
}
