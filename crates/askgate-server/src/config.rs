use anyhow::Context;
use std::env;

use askgate_flags::FlagClientConfig;

/// Environment-sourced server configuration. Credentials for the provider
/// adapters are read separately by each adapter's `from_env`.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub flags_base_url: String,
    pub flags_sdk_key: String,
    pub flags_environment: String,
    pub targeting_key: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT must be a valid u16 number")?,
            Err(_) => 3001,
        };

        let flags_base_url =
            env::var("FLAGS_BASE_URL").context("FLAGS_BASE_URL missing, it is required")?;
        let flags_sdk_key =
            env::var("FLAGS_SDK_KEY").context("FLAGS_SDK_KEY missing, it is required")?;
        let flags_environment =
            env::var("FLAGS_ENVIRONMENT").unwrap_or_else(|_| "production".to_string());
        let targeting_key =
            env::var("TARGETING_KEY").unwrap_or_else(|_| "user-key-123abc".to_string());

        Ok(Self {
            port,
            flags_base_url,
            flags_sdk_key,
            flags_environment,
            targeting_key,
        })
    }

    pub fn addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn flag_client_config(&self) -> FlagClientConfig {
        FlagClientConfig {
            base_url: self.flags_base_url.clone(),
            sdk_key: self.flags_sdk_key.clone(),
            environment: self.flags_environment.clone(),
        }
    }
}
