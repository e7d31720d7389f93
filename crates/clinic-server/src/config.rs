use std::path::PathBuf;

use anyhow::{Result, bail};
use tracing::warn;

use clinic_api::notifier::{DEFAULT_API_BASE, WhatsAppConfig};

/// Verify token accepted outside production when none is configured.
const DEV_VERIFY_TOKEN: &str = "test_token";

#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub verify_token: String,
    pub app_secret: Option<String>,
    pub whatsapp: WhatsAppConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let production = var("CLINIC_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production"));

        let verify_token = match var("CLINIC_VERIFY_TOKEN") {
            Some(token) => token,
            None if production => bail!("CLINIC_VERIFY_TOKEN must be set in production"),
            None => {
                warn!("CLINIC_VERIFY_TOKEN not set, using development default");
                DEV_VERIFY_TOKEN.to_string()
            }
        };

        let port = match var("CLINIC_PORT") {
            Some(port) => port.parse::<u16>()?,
            None => 3001,
        };

        let whatsapp = WhatsAppConfig {
            api_base: var("CLINIC_WHATSAPP_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            phone_number_id: var("CLINIC_WHATSAPP_PHONE_NUMBER_ID"),
            access_token: var("CLINIC_WHATSAPP_TOKEN"),
        };
        if whatsapp.phone_number_id.is_none() || whatsapp.access_token.is_none() {
            warn!("WhatsApp credentials not set, outbound notifications will be skipped");
        }

        Ok(Self {
            host: var("CLINIC_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: var("CLINIC_DB_PATH").unwrap_or_else(|| "clinic.db".into()).into(),
            verify_token,
            app_secret: var("CLINIC_WHATSAPP_APP_SECRET"),
            whatsapp,
        })
    }
}
